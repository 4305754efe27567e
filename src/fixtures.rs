//! Rows for tests, inserted straight through the entities.

use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::{
    AppState, admin,
    catalog::Catalog,
    db,
    entities::{
        actor, category, genre, movie, movie_actor, movie_director, movie_genre, movie_shot,
        rating, rating_star, review,
    },
    media::Media,
};

/// Application state over a fresh in-memory database.
pub async fn state() -> Arc<AppState> {
    let catalog = Catalog::new(db::memory().await, Media::new("media", "/media/"));
    let admin = Arc::new(admin::site("Movies administration"));
    Arc::new(AppState { catalog, admin })
}

fn slug(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

async fn insert_movie(
    db: &DatabaseConnection,
    title: &str,
    draft: bool,
    year: i32,
    category_id: Option<i32>,
) -> movie::Model {
    let slug = slug(title);
    movie::ActiveModel {
        id: Default::default(),
        title: Set(title.to_string()),
        tagline: Set(String::new()),
        description: Set(format!("<p>{title}</p>")),
        poster: Set(format!("movies/{slug}.jpg")),
        year: Set(year),
        country: Set("USA".to_string()),
        world_premiere: Set(format!("{year}-06-01")),
        budget: Set(1_000_000),
        fees_in_usa: Set(0),
        fees_in_world: Set(0),
        category_id: Set(category_id),
        url: Set(slug),
        draft: Set(draft),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn movie(db: &DatabaseConnection, title: &str, draft: bool) -> movie::Model {
    insert_movie(db, title, draft, 1995, None).await
}

pub async fn movie_in_year(db: &DatabaseConnection, title: &str, year: i32) -> movie::Model {
    insert_movie(db, title, false, year, None).await
}

pub async fn movie_with_category(
    db: &DatabaseConnection,
    title: &str,
    category_id: Option<i32>,
) -> movie::Model {
    insert_movie(db, title, false, 1995, category_id).await
}

pub async fn category(db: &DatabaseConnection, name: &str) -> category::Model {
    category::ActiveModel {
        id: Default::default(),
        name: Set(name.to_string()),
        description: Set(String::new()),
        url: Set(slug(name)),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn genre(db: &DatabaseConnection, name: &str) -> genre::Model {
    genre::ActiveModel {
        id: Default::default(),
        name: Set(name.to_string()),
        description: Set(String::new()),
        url: Set(slug(name)),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn actor(db: &DatabaseConnection, name: &str) -> actor::Model {
    actor::ActiveModel {
        id: Default::default(),
        name: Set(name.to_string()),
        age: Set(50),
        description: Set(String::new()),
        image: Set("actors/portrait.jpg".to_string()),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn cast(db: &DatabaseConnection, movie_id: i32, actor_id: i32) {
    movie_actor::Entity::insert(movie_actor::ActiveModel {
        movie_id: Set(movie_id),
        actor_id: Set(actor_id),
    })
    .exec_without_returning(db)
    .await
    .unwrap();
}

pub async fn direct(db: &DatabaseConnection, movie_id: i32, actor_id: i32) {
    movie_director::Entity::insert(movie_director::ActiveModel {
        movie_id: Set(movie_id),
        actor_id: Set(actor_id),
    })
    .exec_without_returning(db)
    .await
    .unwrap();
}

pub async fn tag(db: &DatabaseConnection, movie_id: i32, genre_id: i32) {
    movie_genre::Entity::insert(movie_genre::ActiveModel {
        movie_id: Set(movie_id),
        genre_id: Set(genre_id),
    })
    .exec_without_returning(db)
    .await
    .unwrap();
}

pub async fn shot(db: &DatabaseConnection, movie_id: i32) -> movie_shot::Model {
    movie_shot::ActiveModel {
        id: Default::default(),
        title: Set("Still".to_string()),
        description: Set(String::new()),
        image: Set("movies_shot/still.jpg".to_string()),
        movie_id: Set(movie_id),
    }
    .insert(db)
    .await
    .unwrap()
}

/// One of the seeded stars, looked up by value.
pub async fn star(db: &DatabaseConnection, value: i16) -> rating_star::Model {
    rating_star::Entity::find()
        .filter(rating_star::Column::Value.eq(value))
        .one(db)
        .await
        .unwrap()
        .unwrap()
}

pub async fn rate(db: &DatabaseConnection, ip: &str, value: i16, movie_id: i32) -> rating::Model {
    let star = star(db, value).await;
    rating::ActiveModel {
        id: Default::default(),
        ip: Set(ip.to_string()),
        star_id: Set(star.id),
        movie_id: Set(movie_id),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn review(db: &DatabaseConnection, movie_id: i32, parent_id: Option<i32>) -> review::Model {
    review::ActiveModel {
        id: Default::default(),
        email: Set("reader@example.com".to_string()),
        name: Set("Reader".to_string()),
        text: Set("Worth it.".to_string()),
        parent_id: Set(parent_id),
        movie_id: Set(movie_id),
    }
    .insert(db)
    .await
    .unwrap()
}
