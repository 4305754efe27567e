use jiff::civil::Date;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

/// Row of the annotated movie list query.
#[derive(Clone, Debug, FromQueryResult)]
pub struct MovieListRow {
    pub id: i32,
    pub title: String,
    pub tagline: String,
    pub category_id: Option<i32>,
    pub rating_user: i64,
    pub middle_star: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovieListItem {
    pub id: i32,
    pub title: String,
    pub tagline: String,
    pub category: Option<i32>,
    /// Whether the requesting client has already voted for this movie.
    pub rating_user: bool,
    /// Mean star value, absent when nobody has voted.
    pub middle_star: Option<f64>,
}

impl From<MovieListRow> for MovieListItem {
    fn from(row: MovieListRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            tagline: row.tagline,
            category: row.category_id,
            rating_user: row.rating_user > 0,
            middle_star: row.middle_star,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MovieFilter {
    /// Comma separated genre names; any match qualifies.
    pub genres: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
}

impl MovieFilter {
    pub fn genre_names(&self) -> Vec<String> {
        self.genres
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct MovieDetail {
    pub id: i32,
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub poster: String,
    pub year: i32,
    pub country: String,
    pub directors: Vec<String>,
    pub actors: Vec<String>,
    pub genres: Vec<String>,
    pub world_premiere: Date,
    pub budget: i64,
    pub fees_in_usa: i64,
    pub fees_in_world: i64,
    pub category: Option<String>,
    pub url: String,
    pub reviews: Vec<ReviewItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReviewItem {
    pub id: i32,
    pub name: String,
    pub text: String,
    pub parent: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReviewPayload {
    pub email: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub parent: Option<i32>,
    pub movie: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReviewCreated {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub text: String,
    pub parent: Option<i32>,
    pub movie: i32,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RatingPayload {
    pub star: Option<i32>,
    pub movie: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RatingCreated {
    pub star: i32,
    pub movie: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActorListItem {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub image: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActorDetail {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub description: String,
    pub image: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_filter_splits_and_trims() {
        let filter = MovieFilter { genres: Some(" drama, ,sci-fi ".into()), ..Default::default() };
        assert_eq!(filter.genre_names(), vec!["drama".to_string(), "sci-fi".to_string()]);
        assert!(MovieFilter::default().genre_names().is_empty());
    }

    #[test]
    fn vote_count_becomes_flag() {
        let item = MovieListItem::from(MovieListRow {
            id: 1,
            title: "Heat".into(),
            tagline: String::new(),
            category_id: None,
            rating_user: 1,
            middle_star: Some(7.5),
        });
        assert!(item.rating_user);
        assert_eq!(item.middle_star, Some(7.5));
    }
}
