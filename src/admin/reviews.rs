use async_trait::async_trait;
use futures::TryFutureExt;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use super::{
    choices,
    forms::{self, FieldKind, FieldSpec, FormData},
    site::{Cell, ListQuery, ListRow, ModelAdmin},
};
use crate::{
    catalog::{Catalog, REVIEW_NAME_MAX, REVIEW_TEXT_MAX},
    entities::review,
    error::{AppError, AppResult, Invalid},
};

pub struct ReviewAdmin;

#[async_trait]
impl ModelAdmin for ReviewAdmin {
    fn key(&self) -> &'static str {
        "review"
    }

    fn verbose_name(&self) -> &'static str {
        "Review"
    }

    fn verbose_name_plural(&self) -> &'static str {
        "Reviews"
    }

    fn list_display(&self) -> &'static [&'static str] {
        &["Name", "Email", "Parent", "Movie", "Id"]
    }

    async fn rows(&self, catalog: &Catalog, _query: &ListQuery) -> AppResult<Vec<ListRow>> {
        let db = catalog.db();
        let (reviews, movies) = futures::try_join!(
            review::Entity::find().order_by_asc(review::Column::Id).all(db).map_err(AppError::from),
            choices::movies(db),
        )?;
        let parents: choices::Choices =
            reviews.iter().map(|r| (r.id, choices::review_label(r))).collect();

        Ok(reviews
            .iter()
            .map(|r| ListRow {
                id: r.id,
                cells: vec![
                    Cell::Link(r.name.clone()),
                    Cell::Text(r.email.clone()),
                    Cell::Text(choices::label(&parents, r.parent_id)),
                    Cell::Text(choices::label(&movies, Some(r.movie_id))),
                    Cell::Text(r.id.to_string()),
                ],
            })
            .collect())
    }

    async fn fields(&self, catalog: &Catalog) -> AppResult<Vec<FieldSpec>> {
        let db = catalog.db();
        Ok(vec![
            FieldSpec::char("name", "Name", REVIEW_NAME_MAX).readonly_on_change(),
            FieldSpec::new("email", "Email", FieldKind::Email).readonly_on_change(),
            FieldSpec::new("text", "Message", FieldKind::Text { max: Some(REVIEW_TEXT_MAX), rich: false }),
            FieldSpec::new("parent", "Parent", FieldKind::Choice(choices::reviews(db, None).await?))
                .optional(),
            FieldSpec::new("movie", "Movie", FieldKind::Choice(choices::movies(db).await?)),
        ])
    }

    async fn initial(&self, catalog: &Catalog, id: i32) -> AppResult<FormData> {
        let r = review::Entity::find_by_id(id).one(catalog.db()).await?.ok_or(AppError::NotFound)?;
        let mut data = FormData::default();
        data.set("name", r.name);
        data.set("email", r.email);
        data.set("text", r.text);
        if let Some(parent) = r.parent_id {
            data.set("parent", parent.to_string());
        }
        data.set("movie", r.movie_id.to_string());
        Ok(data)
    }

    async fn describe(&self, catalog: &Catalog, id: i32) -> AppResult<String> {
        let r = review::Entity::find_by_id(id).one(catalog.db()).await?.ok_or(AppError::NotFound)?;
        Ok(choices::review_label(&r))
    }

    async fn save(&self, catalog: &Catalog, id: Option<i32>, data: &FormData) -> AppResult<i32> {
        let db = catalog.db();
        let existing = match id {
            Some(id) => Some(review::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?),
            None => None,
        };

        let mut invalid = Invalid::default();
        let fields = self.fields(catalog).await?;
        let cleaned = forms::clean(&fields, data, id.is_some(), "", &mut invalid);
        let (parent_id, movie_id) = (cleaned.id("parent"), cleaned.id("movie"));

        if let Some(parent_id) = parent_id {
            if id == Some(parent_id) {
                invalid.add("parent", "A review cannot reply to itself.");
            } else if let (Some(parent), Some(movie_id)) =
                (review::Entity::find_by_id(parent_id).one(db).await?, movie_id)
            {
                if parent.movie_id != movie_id {
                    invalid.add("parent", "The parent review belongs to another movie.");
                }
            }
        }

        // Replies must stay on their parent's movie.
        if let (Some(current), Some(movie_id)) = (&existing, movie_id) {
            if current.movie_id != movie_id {
                let replies = review::Entity::find()
                    .filter(review::Column::ParentId.eq(current.id))
                    .count(db)
                    .await?;
                if replies > 0 {
                    invalid.add(
                        "movie",
                        format!("This review has {replies} replies on its current movie."),
                    );
                }
            }
        }
        invalid.finish()?;

        let movie_id = movie_id.ok_or_else(|| AppError::BadRequest("Movie is required.".into()))?;
        let mut active: review::ActiveModel =
            existing.map(IntoActiveModel::into_active_model).unwrap_or_default();
        if cleaned.contains("name") {
            active.name = Set(cleaned.text("name"));
        }
        if cleaned.contains("email") {
            active.email = Set(cleaned.text("email"));
        }
        active.text = Set(cleaned.text("text"));
        active.parent_id = Set(parent_id);
        active.movie_id = Set(movie_id);
        let saved = if id.is_some() { active.update(db).await? } else { active.insert(db).await? };

        info!(review_id = saved.id, movie_id, "review saved");
        Ok(saved.id)
    }

    async fn delete(&self, catalog: &Catalog, id: i32) -> AppResult<bool> {
        catalog.delete_review(id).await
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
    async fn author_fields_are_fixed_once_saved() {
        let catalog = catalog().await;
        let heat = fixtures::movie(catalog.db(), "Heat", false).await;
        let review = fixtures::review(catalog.db(), heat.id, None).await;

        let mut data = ReviewAdmin.initial(&catalog, review.id).await.unwrap();
        data.set("name", "Someone else");
        data.set("email", "not-an-email");
        data.set("text", "Changed my mind");
        ReviewAdmin.save(&catalog, Some(review.id), &data).await.unwrap();

        let saved = review::Entity::find_by_id(review.id).one(catalog.db()).await.unwrap().unwrap();
        assert_eq!(saved.name, "Reader");
        assert_eq!(saved.email, "reader@example.com");
        assert_eq!(saved.text, "Changed my mind");
    }

    #[tokio::test]
    async fn parent_must_share_the_movie() {
        let catalog = catalog().await;
        let heat = fixtures::movie(catalog.db(), "Heat", false).await;
        let alien = fixtures::movie(catalog.db(), "Alien", false).await;
        let elsewhere = fixtures::review(catalog.db(), alien.id, None).await;

        let mut data = FormData::default();
        data.set("name", "Ann");
        data.set("email", "ann@example.com");
        data.set("text", "Agreed");
        data.set("parent", elsewhere.id.to_string());
        data.set("movie", heat.id.to_string());

        let err = ReviewAdmin.save(&catalog, None, &data).await.unwrap_err();
        let AppError::Validation(errors) = err else { panic!("expected validation error") };
        assert!(errors.contains_key("parent"));

        data.set("movie", alien.id.to_string());
        let id = ReviewAdmin.save(&catalog, None, &data).await.unwrap();
        let rows = ReviewAdmin.rows(&catalog, &ListQuery::default()).await.unwrap();
        let row = rows.iter().find(|r| r.id == id).unwrap();
        assert_eq!(row.cells[2], Cell::Text(format!("Reader (#{})", elsewhere.id)));
        assert_eq!(row.cells[3], Cell::Text("Alien".into()));
    }

    #[tokio::test]
    async fn movie_is_fixed_while_replies_exist() {
        let catalog = catalog().await;
        let heat = fixtures::movie(catalog.db(), "Heat", false).await;
        let alien = fixtures::movie(catalog.db(), "Alien", false).await;
        let root = fixtures::review(catalog.db(), heat.id, None).await;
        let reply = fixtures::review(catalog.db(), heat.id, Some(root.id)).await;

        let mut data = ReviewAdmin.initial(&catalog, root.id).await.unwrap();
        data.set("movie", alien.id.to_string());
        let err = ReviewAdmin.save(&catalog, Some(root.id), &data).await.unwrap_err();
        let AppError::Validation(errors) = err else { panic!("expected validation error") };
        assert!(errors.contains_key("movie"));

        let root = review::Entity::find_by_id(root.id).one(catalog.db()).await.unwrap().unwrap();
        assert_eq!(root.movie_id, heat.id);

        // Once the reply is gone the review may move.
        assert!(ReviewAdmin.delete(&catalog, reply.id).await.unwrap());
        ReviewAdmin.save(&catalog, Some(root.id), &data).await.unwrap();
        let root = review::Entity::find_by_id(root.id).one(catalog.db()).await.unwrap().unwrap();
        assert_eq!(root.movie_id, alien.id);
    }

    #[tokio::test]
    async fn deleting_parent_detaches_replies() {
        let catalog = catalog().await;
        let heat = fixtures::movie(catalog.db(), "Heat", false).await;
        let root = fixtures::review(catalog.db(), heat.id, None).await;
        let reply = fixtures::review(catalog.db(), heat.id, Some(root.id)).await;

        assert!(ReviewAdmin.delete(&catalog, root.id).await.unwrap());
        let reply = review::Entity::find_by_id(reply.id).one(catalog.db()).await.unwrap().unwrap();
        assert_eq!(reply.parent_id, None);
    }
}
