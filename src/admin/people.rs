use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, QueryOrder, Set};
use tracing::info;

use super::{
    forms::{self, FieldKind, FieldSpec, FormData},
    site::{Cell, ListQuery, ListRow, ModelAdmin},
};
use crate::{
    catalog::Catalog,
    entities::actor,
    error::{AppError, AppResult, Invalid},
    media::UploadTo,
};

const THUMB: (u32, u32) = (50, 60);
const MAX_AGE: i64 = 32767;

pub struct ActorAdmin;

fn fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::char("name", "Name", 100),
        FieldSpec::new("age", "Age", FieldKind::Number),
        FieldSpec::text("description", "Description"),
        FieldSpec::image("image", "Image", UploadTo::Actors).preview(THUMB.0, THUMB.1),
    ]
}

#[async_trait]
impl ModelAdmin for ActorAdmin {
    fn key(&self) -> &'static str {
        "actor"
    }

    fn verbose_name(&self) -> &'static str {
        "Actors and directors"
    }

    fn verbose_name_plural(&self) -> &'static str {
        "Actors and directors"
    }

    fn list_display(&self) -> &'static [&'static str] {
        &["Name", "Age", "Image"]
    }

    async fn rows(&self, catalog: &Catalog, _query: &ListQuery) -> AppResult<Vec<ListRow>> {
        let rows = actor::Entity::find().order_by_asc(actor::Column::Name).all(catalog.db()).await?;
        Ok(rows
            .into_iter()
            .map(|a| ListRow {
                id: a.id,
                cells: vec![
                    Cell::Link(a.name),
                    Cell::Text(a.age.to_string()),
                    Cell::Image { url: catalog.media().url(&a.image), width: THUMB.0, height: THUMB.1 },
                ],
            })
            .collect())
    }

    async fn fields(&self, _catalog: &Catalog) -> AppResult<Vec<FieldSpec>> {
        Ok(fields())
    }

    fn defaults(&self) -> FormData {
        let mut data = FormData::default();
        data.set("age", "0");
        data
    }

    async fn initial(&self, catalog: &Catalog, id: i32) -> AppResult<FormData> {
        let a = actor::Entity::find_by_id(id).one(catalog.db()).await?.ok_or(AppError::NotFound)?;
        let mut data = FormData::default();
        data.set("name", a.name);
        data.set("age", a.age.to_string());
        data.set("description", a.description);
        data.set("image", a.image);
        Ok(data)
    }

    async fn describe(&self, catalog: &Catalog, id: i32) -> AppResult<String> {
        let a = actor::Entity::find_by_id(id).one(catalog.db()).await?.ok_or(AppError::NotFound)?;
        Ok(a.name)
    }

    async fn save(&self, catalog: &Catalog, id: Option<i32>, data: &FormData) -> AppResult<i32> {
        let db = catalog.db();
        let existing = match id {
            Some(id) => Some(actor::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?),
            None => None,
        };

        let mut invalid = Invalid::default();
        let cleaned = forms::clean(&fields(), data, id.is_some(), "", &mut invalid);
        let age = cleaned.number("age");
        if age > MAX_AGE {
            invalid.add("age", format!("Ensure this value is less than or equal to {MAX_AGE}."));
        }
        invalid.finish()?;

        let mut active: actor::ActiveModel =
            existing.map(IntoActiveModel::into_active_model).unwrap_or_default();
        active.name = Set(cleaned.text("name"));
        active.age = Set(i32::try_from(age).unwrap_or_default());
        active.description = Set(cleaned.text("description"));
        active.image = Set(cleaned.text("image"));
        let saved = if id.is_some() { active.update(db).await? } else { active.insert(db).await? };

        info!(actor_id = saved.id, "actor saved");
        Ok(saved.id)
    }

    async fn delete(&self, catalog: &Catalog, id: i32) -> AppResult<bool> {
        catalog.delete_actor(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, media::Media};

    async fn catalog() -> Catalog {
        Catalog::new(db::memory().await, Media::new("media", "/media/"))
    }

    #[tokio::test]
    async fn saves_image_under_actor_directory() {
        let catalog = catalog().await;
        let mut data = ActorAdmin.defaults();
        data.set("name", "Keanu Reeves");
        data.set("age", "60");
        data.set("description", "Neo");
        data.set("image", "keanu.jpg");

        let id = ActorAdmin.save(&catalog, None, &data).await.unwrap();

        let rows = ActorAdmin.rows(&catalog, &ListQuery::default()).await.unwrap();
        assert_eq!(rows[0].id, id);
        assert_eq!(
            rows[0].cells[2],
            Cell::Image { url: "/media/actors/keanu.jpg".into(), width: 50, height: 60 }
        );
    }

    #[tokio::test]
    async fn rejects_out_of_range_age() {
        let catalog = catalog().await;
        let mut data = FormData::default();
        data.set("name", "Methuselah");
        data.set("age", "40000");
        data.set("description", "Old");
        data.set("image", "m.jpg");

        let err = ActorAdmin.save(&catalog, None, &data).await.unwrap_err();
        let AppError::Validation(errors) = err else { panic!("expected validation error") };
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["age"]);
    }
}
