//! Rating stars and the ratings that point at them.

use async_trait::async_trait;
use futures::TryFutureExt;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use super::{
    choices,
    forms::{self, FieldKind, FieldSpec, FormData},
    site::{Cell, ListQuery, ListRow, ModelAdmin},
};
use crate::{
    catalog::Catalog,
    entities::{movie, rating, rating_star},
    error::{AppError, AppResult, Invalid},
};

pub struct RatingStarAdmin;

#[async_trait]
impl ModelAdmin for RatingStarAdmin {
    fn key(&self) -> &'static str {
        "ratingstar"
    }

    fn verbose_name(&self) -> &'static str {
        "Rating star"
    }

    fn verbose_name_plural(&self) -> &'static str {
        "Rating stars"
    }

    fn list_display(&self) -> &'static [&'static str] {
        &["Value"]
    }

    async fn rows(&self, catalog: &Catalog, _query: &ListQuery) -> AppResult<Vec<ListRow>> {
        let stars = rating_star::Entity::find()
            .order_by_desc(rating_star::Column::Value)
            .all(catalog.db())
            .await?;
        Ok(stars
            .into_iter()
            .map(|s| ListRow { id: s.id, cells: vec![Cell::Link(s.value.to_string())] })
            .collect())
    }

    async fn fields(&self, _catalog: &Catalog) -> AppResult<Vec<FieldSpec>> {
        Ok(vec![FieldSpec::new("value", "Value", FieldKind::Number)])
    }

    fn defaults(&self) -> FormData {
        let mut data = FormData::default();
        data.set("value", "0");
        data
    }

    async fn initial(&self, catalog: &Catalog, id: i32) -> AppResult<FormData> {
        let s = rating_star::Entity::find_by_id(id).one(catalog.db()).await?.ok_or(AppError::NotFound)?;
        let mut data = FormData::default();
        data.set("value", s.value.to_string());
        Ok(data)
    }

    async fn describe(&self, catalog: &Catalog, id: i32) -> AppResult<String> {
        let s = rating_star::Entity::find_by_id(id).one(catalog.db()).await?.ok_or(AppError::NotFound)?;
        Ok(s.value.to_string())
    }

    async fn save(&self, catalog: &Catalog, id: Option<i32>, data: &FormData) -> AppResult<i32> {
        let db = catalog.db();
        let existing = match id {
            Some(id) => {
                Some(rating_star::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?)
            }
            None => None,
        };

        let mut invalid = Invalid::default();
        let fields = self.fields(catalog).await?;
        let cleaned = forms::clean(&fields, data, id.is_some(), "", &mut invalid);
        let value = i16::try_from(cleaned.number("value"));
        if value.is_err() {
            invalid.add("value", format!("Ensure this value is less than or equal to {}.", i16::MAX));
        }
        invalid.finish()?;

        let mut active: rating_star::ActiveModel =
            existing.map(IntoActiveModel::into_active_model).unwrap_or_default();
        active.value = Set(value.unwrap_or_default());
        let saved = if id.is_some() { active.update(db).await? } else { active.insert(db).await? };
        Ok(saved.id)
    }

    async fn delete(&self, catalog: &Catalog, id: i32) -> AppResult<bool> {
        catalog.delete_rating_star(id).await
    }
}

pub struct RatingAdmin;

#[async_trait]
impl ModelAdmin for RatingAdmin {
    fn key(&self) -> &'static str {
        "rating"
    }

    fn verbose_name(&self) -> &'static str {
        "Rating"
    }

    fn verbose_name_plural(&self) -> &'static str {
        "Ratings"
    }

    fn list_display(&self) -> &'static [&'static str] {
        &["Star", "Movie", "Ip"]
    }

    async fn rows(&self, catalog: &Catalog, _query: &ListQuery) -> AppResult<Vec<ListRow>> {
        let db = catalog.db();
        let (ratings, stars, movies) = futures::try_join!(
            rating::Entity::find().order_by_asc(rating::Column::Id).all(db).map_err(AppError::from),
            choices::stars(db),
            choices::movies(db),
        )?;
        Ok(ratings
            .into_iter()
            .map(|r| ListRow {
                id: r.id,
                cells: vec![
                    Cell::Link(choices::label(&stars, Some(r.star_id))),
                    Cell::Text(choices::label(&movies, Some(r.movie_id))),
                    Cell::Text(r.ip),
                ],
            })
            .collect())
    }

    async fn fields(&self, catalog: &Catalog) -> AppResult<Vec<FieldSpec>> {
        let db = catalog.db();
        Ok(vec![
            FieldSpec::char("ip", "IP address", 45),
            FieldSpec::new("star", "Star", FieldKind::Choice(choices::stars(db).await?)),
            FieldSpec::new("movie", "Movie", FieldKind::Choice(choices::movies(db).await?)),
        ])
    }

    async fn initial(&self, catalog: &Catalog, id: i32) -> AppResult<FormData> {
        let r = rating::Entity::find_by_id(id).one(catalog.db()).await?.ok_or(AppError::NotFound)?;
        let mut data = FormData::default();
        data.set("ip", r.ip);
        data.set("star", r.star_id.to_string());
        data.set("movie", r.movie_id.to_string());
        Ok(data)
    }

    async fn describe(&self, catalog: &Catalog, id: i32) -> AppResult<String> {
        let db = catalog.db();
        let (r, star) = rating::Entity::find_by_id(id)
            .find_also_related(rating_star::Entity)
            .one(db)
            .await?
            .ok_or(AppError::NotFound)?;
        let title = movie::Entity::find_by_id(r.movie_id).one(db).await?.map(|m| m.title);
        Ok(format!(
            "{} - {}",
            star.map(|s| s.value.to_string()).unwrap_or_default(),
            title.unwrap_or_default()
        ))
    }

    async fn save(&self, catalog: &Catalog, id: Option<i32>, data: &FormData) -> AppResult<i32> {
        let db = catalog.db();
        let existing = match id {
            Some(id) => Some(rating::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?),
            None => None,
        };

        let mut invalid = Invalid::default();
        let fields = self.fields(catalog).await?;
        let cleaned = forms::clean(&fields, data, id.is_some(), "", &mut invalid);
        let (star_id, movie_id) = (cleaned.id("star"), cleaned.id("movie"));
        let ip = cleaned.text("ip");

        if let Some(movie_id) = movie_id.filter(|_| !ip.is_empty()) {
            let clash = rating::Entity::find()
                .filter(rating::Column::Ip.eq(&ip))
                .filter(rating::Column::MovieId.eq(movie_id))
                .filter(rating::Column::Id.ne(id.unwrap_or_default()))
                .one(db)
                .await?;
            if clash.is_some() {
                invalid.add("__all__", "Rating with this Ip and Movie already exists.");
            }
        }
        invalid.finish()?;

        let (Some(star_id), Some(movie_id)) = (star_id, movie_id) else {
            return Err(AppError::BadRequest("Star and movie are required.".into()));
        };
        let mut active: rating::ActiveModel =
            existing.map(IntoActiveModel::into_active_model).unwrap_or_default();
        active.ip = Set(ip);
        active.star_id = Set(star_id);
        active.movie_id = Set(movie_id);
        let saved = if id.is_some() { active.update(db).await? } else { active.insert(db).await? };

        info!(rating_id = saved.id, movie_id, "rating saved");
        Ok(saved.id)
    }

    async fn delete(&self, catalog: &Catalog, id: i32) -> AppResult<bool> {
        catalog.delete_rating(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, fixtures, media::Media};

    async fn catalog() -> Catalog {
        Catalog::new(db::memory().await, Media::new("media", "/media/"))
    }

    #[tokio::test]
    async fn stars_list_highest_first() {
        let catalog = catalog().await;
        let rows = RatingStarAdmin.rows(&catalog, &ListQuery::default()).await.unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].cells, vec![Cell::Link("10".into())]);
        assert_eq!(rows[9].cells, vec![Cell::Link("1".into())]);
    }

    #[tokio::test]
    async fn second_rating_from_same_ip_is_rejected() {
        let catalog = catalog().await;
        let heat = fixtures::movie(catalog.db(), "Heat", false).await;
        fixtures::rate(catalog.db(), "10.0.0.1", 7, heat.id).await;
        let star = fixtures::star(catalog.db(), 3).await;

        let mut data = FormData::default();
        data.set("ip", "10.0.0.1");
        data.set("star", star.id.to_string());
        data.set("movie", heat.id.to_string());
        let err = RatingAdmin.save(&catalog, None, &data).await.unwrap_err();
        let AppError::Validation(errors) = err else { panic!("expected validation error") };
        assert!(errors.contains_key("__all__"));

        data.set("ip", "10.0.0.2");
        let id = RatingAdmin.save(&catalog, None, &data).await.unwrap();
        let rows = RatingAdmin.rows(&catalog, &ListQuery::default()).await.unwrap();
        let row = rows.iter().find(|r| r.id == id).unwrap();
        assert_eq!(
            row.cells,
            vec![Cell::Link("3".into()), Cell::Text("Heat".into()), Cell::Text("10.0.0.2".into())]
        );
    }

    #[tokio::test]
    async fn deleting_star_removes_its_ratings() {
        let catalog = catalog().await;
        let heat = fixtures::movie(catalog.db(), "Heat", false).await;
        let rating = fixtures::rate(catalog.db(), "10.0.0.1", 5, heat.id).await;

        assert!(RatingStarAdmin.delete(&catalog, rating.star_id).await.unwrap());
        let left = rating::Entity::find_by_id(rating.id).one(catalog.db()).await.unwrap();
        assert!(left.is_none());
    }
}
