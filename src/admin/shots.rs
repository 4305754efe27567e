use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, QueryOrder, Set};

use super::{
    choices,
    forms::{self, FieldKind, FieldSpec, FormData},
    site::{Cell, ListQuery, ListRow, ModelAdmin},
};
use crate::{
    catalog::Catalog,
    entities::{movie, movie_shot},
    error::{AppError, AppResult, Invalid},
    media::UploadTo,
};

const THUMB: (u32, u32) = (50, 60);

pub struct MovieShotAdmin;

#[async_trait]
impl ModelAdmin for MovieShotAdmin {
    fn key(&self) -> &'static str {
        "movieshot"
    }

    fn verbose_name(&self) -> &'static str {
        "Image from movie"
    }

    fn verbose_name_plural(&self) -> &'static str {
        "Images from movie"
    }

    fn list_display(&self) -> &'static [&'static str] {
        &["Title", "Movie", "Image"]
    }

    async fn rows(&self, catalog: &Catalog, _query: &ListQuery) -> AppResult<Vec<ListRow>> {
        let shots = movie_shot::Entity::find()
            .find_also_related(movie::Entity)
            .order_by_asc(movie_shot::Column::Id)
            .all(catalog.db())
            .await?;
        Ok(shots
            .into_iter()
            .map(|(s, m)| ListRow {
                id: s.id,
                cells: vec![
                    Cell::Link(s.title),
                    Cell::Text(m.map_or_else(|| "-".to_string(), |m| m.title)),
                    Cell::Image { url: catalog.media().url(&s.image), width: THUMB.0, height: THUMB.1 },
                ],
            })
            .collect())
    }

    async fn fields(&self, catalog: &Catalog) -> AppResult<Vec<FieldSpec>> {
        Ok(vec![
            FieldSpec::char("title", "Title", 100),
            FieldSpec::text("description", "Description"),
            FieldSpec::image("image", "Image", UploadTo::MovieShots).preview(THUMB.0, THUMB.1),
            FieldSpec::new("movie", "Movie", FieldKind::Choice(choices::movies(catalog.db()).await?)),
        ])
    }

    async fn initial(&self, catalog: &Catalog, id: i32) -> AppResult<FormData> {
        let s = movie_shot::Entity::find_by_id(id).one(catalog.db()).await?.ok_or(AppError::NotFound)?;
        let mut data = FormData::default();
        data.set("title", s.title);
        data.set("description", s.description);
        data.set("image", s.image);
        data.set("movie", s.movie_id.to_string());
        Ok(data)
    }

    async fn describe(&self, catalog: &Catalog, id: i32) -> AppResult<String> {
        let s = movie_shot::Entity::find_by_id(id).one(catalog.db()).await?.ok_or(AppError::NotFound)?;
        Ok(s.title)
    }

    async fn save(&self, catalog: &Catalog, id: Option<i32>, data: &FormData) -> AppResult<i32> {
        let db = catalog.db();
        let existing = match id {
            Some(id) => {
                Some(movie_shot::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?)
            }
            None => None,
        };

        let mut invalid = Invalid::default();
        let fields = self.fields(catalog).await?;
        let cleaned = forms::clean(&fields, data, id.is_some(), "", &mut invalid);
        invalid.finish()?;

        let mut active: movie_shot::ActiveModel =
            existing.map(IntoActiveModel::into_active_model).unwrap_or_default();
        active.title = Set(cleaned.text("title"));
        active.description = Set(cleaned.text("description"));
        active.image = Set(cleaned.text("image"));
        let movie_id = cleaned.id("movie").ok_or_else(|| AppError::BadRequest("Movie is required.".into()))?;
        active.movie_id = Set(movie_id);
        let saved = if id.is_some() { active.update(db).await? } else { active.insert(db).await? };
        Ok(saved.id)
    }

    async fn delete(&self, catalog: &Catalog, id: i32) -> AppResult<bool> {
        catalog.delete_movie_shot(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, fixtures, media::Media};

    #[tokio::test]
    async fn lists_shots_with_movie_and_thumbnail() {
        let catalog = Catalog::new(db::memory().await, Media::new("media", "/files/"));
        let heat = fixtures::movie(catalog.db(), "Heat", false).await;
        let shot = fixtures::shot(catalog.db(), heat.id).await;

        let rows = MovieShotAdmin.rows(&catalog, &ListQuery::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, shot.id);
        assert_eq!(rows[0].cells[1], Cell::Text("Heat".into()));
        assert_eq!(
            rows[0].cells[2],
            Cell::Image { url: "/files/movies_shot/still.jpg".into(), width: 50, height: 60 }
        );
    }

    #[tokio::test]
    async fn movie_must_exist() {
        let catalog = Catalog::new(db::memory().await, Media::new("media", "/media/"));
        let mut data = FormData::default();
        data.set("title", "Still");
        data.set("description", "Frame");
        data.set("image", "still.jpg");
        data.set("movie", "42");

        let err = MovieShotAdmin.save(&catalog, None, &data).await.unwrap_err();
        let AppError::Validation(errors) = err else { panic!("expected validation error") };
        assert!(errors.contains_key("movie"));
    }
}
