//! Option lists for select inputs, labelled the way each object prints.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    entities::{actor, category, genre, movie, rating_star, review},
    error::AppResult,
};

pub type Choices = Vec<(i32, String)>;

pub async fn actors(db: &DatabaseConnection) -> AppResult<Choices> {
    let rows = actor::Entity::find().order_by_asc(actor::Column::Name).all(db).await?;
    Ok(rows.into_iter().map(|a| (a.id, a.name)).collect())
}

pub async fn categories(db: &DatabaseConnection) -> AppResult<Choices> {
    let rows = category::Entity::find().order_by_asc(category::Column::Name).all(db).await?;
    Ok(rows.into_iter().map(|c| (c.id, c.name)).collect())
}

pub async fn genres(db: &DatabaseConnection) -> AppResult<Choices> {
    let rows = genre::Entity::find().order_by_asc(genre::Column::Name).all(db).await?;
    Ok(rows.into_iter().map(|g| (g.id, g.name)).collect())
}

pub async fn movies(db: &DatabaseConnection) -> AppResult<Choices> {
    let rows = movie::Entity::find().order_by_asc(movie::Column::Title).all(db).await?;
    Ok(rows.into_iter().map(|m| (m.id, m.title)).collect())
}

/// Highest value first.
pub async fn stars(db: &DatabaseConnection) -> AppResult<Choices> {
    let rows = rating_star::Entity::find().order_by_desc(rating_star::Column::Value).all(db).await?;
    Ok(rows.into_iter().map(|s| (s.id, s.value.to_string())).collect())
}

/// Reviews a reply may point at; only those of `movie_id` when given.
pub async fn reviews(db: &DatabaseConnection, movie_id: Option<i32>) -> AppResult<Choices> {
    let mut query = review::Entity::find().order_by_asc(review::Column::Id);
    if let Some(movie_id) = movie_id {
        query = query.filter(review::Column::MovieId.eq(movie_id));
    }
    let rows = query.all(db).await?;
    Ok(rows.into_iter().map(|r| (r.id, review_label(&r))).collect())
}

pub fn review_label(review: &review::Model) -> String {
    format!("{} (#{})", review.name, review.id)
}

/// Label of `id` within `choices`, or `-` when unset or unknown.
pub fn label(choices: &Choices, id: Option<i32>) -> String {
    id.and_then(|id| choices.iter().find(|(c, _)| *c == id))
        .map(|(_, name)| name.clone())
        .unwrap_or_else(|| "-".to_string())
}
