//! Categories and genres: a name, a description and a unique url slug.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use super::{
    forms::{self, FieldKind, FieldSpec, FormData},
    site::{Cell, ListQuery, ListRow, ModelAdmin},
};
use crate::{
    catalog::Catalog,
    entities::{category, genre},
    error::{AppError, AppResult, Invalid},
};

fn fields(name_max: usize) -> Vec<FieldSpec> {
    vec![
        FieldSpec::char("name", "Name", name_max),
        FieldSpec::text("description", "Description"),
        FieldSpec::new("url", "Url", FieldKind::Slug { max: 160 }),
    ]
}

fn initial(name: String, description: String, url: String) -> FormData {
    let mut data = FormData::default();
    data.set("name", name);
    data.set("description", description);
    data.set("url", url);
    data
}

pub struct CategoryAdmin;

#[async_trait]
impl ModelAdmin for CategoryAdmin {
    fn key(&self) -> &'static str {
        "category"
    }

    fn verbose_name(&self) -> &'static str {
        "Category"
    }

    fn verbose_name_plural(&self) -> &'static str {
        "Categories"
    }

    fn list_display(&self) -> &'static [&'static str] {
        &["Id", "Name", "Url"]
    }

    async fn rows(&self, catalog: &Catalog, _query: &ListQuery) -> AppResult<Vec<ListRow>> {
        let rows = category::Entity::find().order_by_asc(category::Column::Id).all(catalog.db()).await?;
        Ok(rows
            .into_iter()
            .map(|c| ListRow {
                id: c.id,
                cells: vec![Cell::Text(c.id.to_string()), Cell::Link(c.name), Cell::Text(c.url)],
            })
            .collect())
    }

    async fn fields(&self, _catalog: &Catalog) -> AppResult<Vec<FieldSpec>> {
        Ok(fields(150))
    }

    async fn initial(&self, catalog: &Catalog, id: i32) -> AppResult<FormData> {
        let c = category::Entity::find_by_id(id).one(catalog.db()).await?.ok_or(AppError::NotFound)?;
        Ok(initial(c.name, c.description, c.url))
    }

    async fn describe(&self, catalog: &Catalog, id: i32) -> AppResult<String> {
        let c = category::Entity::find_by_id(id).one(catalog.db()).await?.ok_or(AppError::NotFound)?;
        Ok(c.name)
    }

    async fn save(&self, catalog: &Catalog, id: Option<i32>, data: &FormData) -> AppResult<i32> {
        let db = catalog.db();
        let existing = match id {
            Some(id) => {
                Some(category::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?)
            }
            None => None,
        };

        let mut invalid = Invalid::default();
        let cleaned = forms::clean(&fields(150), data, id.is_some(), "", &mut invalid);
        let url = cleaned.text("url");
        let clash = category::Entity::find()
            .filter(category::Column::Url.eq(&url))
            .filter(category::Column::Id.ne(id.unwrap_or_default()))
            .one(db)
            .await?;
        if clash.is_some() {
            invalid.add("url", "Category with this Url already exists.");
        }
        invalid.finish()?;

        let mut active: category::ActiveModel =
            existing.map(IntoActiveModel::into_active_model).unwrap_or_default();
        active.name = Set(cleaned.text("name"));
        active.description = Set(cleaned.text("description"));
        active.url = Set(url);
        let saved = if id.is_some() { active.update(db).await? } else { active.insert(db).await? };

        info!(category_id = saved.id, "category saved");
        Ok(saved.id)
    }

    async fn delete(&self, catalog: &Catalog, id: i32) -> AppResult<bool> {
        catalog.delete_category(id).await
    }
}

pub struct GenreAdmin;

#[async_trait]
impl ModelAdmin for GenreAdmin {
    fn key(&self) -> &'static str {
        "genre"
    }

    fn verbose_name(&self) -> &'static str {
        "Genre"
    }

    fn verbose_name_plural(&self) -> &'static str {
        "Genres"
    }

    fn list_display(&self) -> &'static [&'static str] {
        &["Name", "Url"]
    }

    async fn rows(&self, catalog: &Catalog, _query: &ListQuery) -> AppResult<Vec<ListRow>> {
        let rows = genre::Entity::find().order_by_asc(genre::Column::Name).all(catalog.db()).await?;
        Ok(rows
            .into_iter()
            .map(|g| ListRow { id: g.id, cells: vec![Cell::Link(g.name), Cell::Text(g.url)] })
            .collect())
    }

    async fn fields(&self, _catalog: &Catalog) -> AppResult<Vec<FieldSpec>> {
        Ok(fields(100))
    }

    async fn initial(&self, catalog: &Catalog, id: i32) -> AppResult<FormData> {
        let g = genre::Entity::find_by_id(id).one(catalog.db()).await?.ok_or(AppError::NotFound)?;
        Ok(initial(g.name, g.description, g.url))
    }

    async fn describe(&self, catalog: &Catalog, id: i32) -> AppResult<String> {
        let g = genre::Entity::find_by_id(id).one(catalog.db()).await?.ok_or(AppError::NotFound)?;
        Ok(g.name)
    }

    async fn save(&self, catalog: &Catalog, id: Option<i32>, data: &FormData) -> AppResult<i32> {
        let db = catalog.db();
        let existing = match id {
            Some(id) => Some(genre::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?),
            None => None,
        };

        let mut invalid = Invalid::default();
        let cleaned = forms::clean(&fields(100), data, id.is_some(), "", &mut invalid);
        let url = cleaned.text("url");
        let clash = genre::Entity::find()
            .filter(genre::Column::Url.eq(&url))
            .filter(genre::Column::Id.ne(id.unwrap_or_default()))
            .one(db)
            .await?;
        if clash.is_some() {
            invalid.add("url", "Genre with this Url already exists.");
        }
        invalid.finish()?;

        let mut active: genre::ActiveModel =
            existing.map(IntoActiveModel::into_active_model).unwrap_or_default();
        active.name = Set(cleaned.text("name"));
        active.description = Set(cleaned.text("description"));
        active.url = Set(url);
        let saved = if id.is_some() { active.update(db).await? } else { active.insert(db).await? };

        info!(genre_id = saved.id, "genre saved");
        Ok(saved.id)
    }

    async fn delete(&self, catalog: &Catalog, id: i32) -> AppResult<bool> {
        catalog.delete_genre(id).await
    }
}
