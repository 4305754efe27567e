use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
    sea_query::{Expr, Func, OnConflict, Query, SimpleExpr},
};
use tracing::{debug, info};

use crate::{
    entities::{
        actor, category, genre, movie, movie_actor, movie_director, movie_genre, movie_shot,
        rating, rating_star, review,
    },
    error::{AppError, AppResult, Invalid},
    media::Media,
    models::{
        ActorDetail, ActorListItem, MovieDetail, MovieFilter, MovieListItem, MovieListRow,
        RatingCreated, RatingPayload, ReviewCreated, ReviewItem, ReviewPayload,
    },
    validate,
};

pub const REVIEW_NAME_MAX: usize = 100;
pub const REVIEW_TEXT_MAX: usize = 5000;
pub const EMAIL_MAX: usize = 254;

#[derive(Clone)]
pub struct Catalog {
    db: DatabaseConnection,
    media: Media,
}

impl Catalog {
    pub fn new(db: DatabaseConnection, media: Media) -> Self {
        Self { db, media }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn media(&self) -> &Media {
        &self.media
    }

    /// Published movies, each annotated with whether `client_ip` has voted
    /// for it and the mean value of its rating stars.
    pub async fn list_movies(
        &self,
        client_ip: &str,
        filter: &MovieFilter,
    ) -> AppResult<Vec<MovieListItem>> {
        let voted = Expr::case(rating::Column::Ip.eq(client_ip), 1);
        let mean_star = Func::avg(Expr::col((rating_star::Entity, rating_star::Column::Value)));

        let mut query = movie::Entity::find()
            .select_only()
            .columns([
                movie::Column::Id,
                movie::Column::Title,
                movie::Column::Tagline,
                movie::Column::CategoryId,
            ])
            .column_as(SimpleExpr::from(Func::count(voted)), "rating_user")
            .column_as(SimpleExpr::from(mean_star), "middle_star")
            .join(JoinType::LeftJoin, movie::Relation::Rating.def())
            .join(JoinType::LeftJoin, rating::Relation::RatingStar.def())
            .filter(movie::Column::Draft.eq(false));

        let genres = filter.genre_names();
        if !genres.is_empty() {
            query = query.filter(
                movie::Column::Id.in_subquery(
                    Query::select()
                        .column((movie_genre::Entity, movie_genre::Column::MovieId))
                        .from(movie_genre::Entity)
                        .inner_join(
                            genre::Entity,
                            Expr::col((genre::Entity, genre::Column::Id))
                                .equals((movie_genre::Entity, movie_genre::Column::GenreId)),
                        )
                        .and_where(Expr::col((genre::Entity, genre::Column::Name)).is_in(genres))
                        .to_owned(),
                ),
            );
        }
        if let Some(year) = filter.year_min {
            query = query.filter(movie::Column::Year.gte(year));
        }
        if let Some(year) = filter.year_max {
            query = query.filter(movie::Column::Year.lte(year));
        }

        let rows = query
            .group_by(movie::Column::Id)
            .order_by_asc(movie::Column::Id)
            .into_model::<MovieListRow>()
            .all(&self.db)
            .await?;

        debug!(movies = rows.len(), "listed movies");
        Ok(rows.into_iter().map(MovieListItem::from).collect())
    }

    pub async fn movie_detail(&self, id: i32) -> AppResult<MovieDetail> {
        let movie = movie::Entity::find_by_id(id)
            .filter(movie::Column::Draft.eq(false))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let (category, actors, directors, genres, reviews) = futures::try_join!(
            movie.find_related(category::Entity).one(&self.db),
            movie.find_linked(movie::ActorsLink).order_by_asc(actor::Column::Id).all(&self.db),
            movie.find_linked(movie::DirectorsLink).order_by_asc(actor::Column::Id).all(&self.db),
            movie.find_related(genre::Entity).order_by_asc(genre::Column::Id).all(&self.db),
            movie.find_related(review::Entity).order_by_asc(review::Column::Id).all(&self.db),
        )?;

        Ok(MovieDetail {
            id: movie.id,
            world_premiere: movie.world_premiere.parse()?,
            poster: self.media.url(&movie.poster),
            title: movie.title,
            tagline: movie.tagline,
            description: movie.description,
            year: movie.year,
            country: movie.country,
            directors: directors.into_iter().map(|a| a.name).collect(),
            actors: actors.into_iter().map(|a| a.name).collect(),
            genres: genres.into_iter().map(|g| g.name).collect(),
            budget: movie.budget,
            fees_in_usa: movie.fees_in_usa,
            fees_in_world: movie.fees_in_world,
            category: category.map(|c| c.name),
            url: movie.url,
            reviews: reviews
                .into_iter()
                .map(|r| ReviewItem { id: r.id, name: r.name, text: r.text, parent: r.parent_id })
                .collect(),
        })
    }

    pub async fn create_review(&self, payload: ReviewPayload) -> AppResult<ReviewCreated> {
        let mut invalid = Invalid::default();

        let email = required(&mut invalid, "email", payload.email);
        if !email.is_empty() {
            if let Some(msg) = validate::max_length(&email, EMAIL_MAX) {
                invalid.add("email", msg);
            } else if let Some(msg) = validate::email(&email) {
                invalid.add("email", msg);
            }
        }

        let name = required(&mut invalid, "name", payload.name);
        if let Some(msg) = validate::max_length(&name, REVIEW_NAME_MAX) {
            invalid.add("name", msg);
        }

        let text = required(&mut invalid, "text", payload.text);
        if let Some(msg) = validate::max_length(&text, REVIEW_TEXT_MAX) {
            invalid.add("text", msg);
        }

        let movie = match payload.movie {
            None => {
                invalid.add("movie", validate::REQUIRED);
                None
            }
            Some(id) => {
                let found = movie::Entity::find_by_id(id).one(&self.db).await?;
                if found.is_none() {
                    invalid.add("movie", missing_pk(id));
                }
                found
            }
        };

        if let Some(parent_id) = payload.parent {
            match review::Entity::find_by_id(parent_id).one(&self.db).await? {
                None => invalid.add("parent", missing_pk(parent_id)),
                Some(parent) => {
                    if movie.as_ref().is_some_and(|m| m.id != parent.movie_id) {
                        invalid.add("parent", "A reply must belong to the same movie as its parent.");
                    }
                }
            }
        }

        invalid.finish()?;
        let Some(movie) = movie else {
            return Err(AppError::NotFound);
        };

        let saved = review::ActiveModel {
            id: Default::default(),
            email: Set(email),
            name: Set(name),
            text: Set(text),
            parent_id: Set(payload.parent),
            movie_id: Set(movie.id),
        }
        .insert(&self.db)
        .await?;

        info!(review_id = saved.id, movie_id = saved.movie_id, "review stored");
        Ok(ReviewCreated {
            id: saved.id,
            email: saved.email,
            name: saved.name,
            text: saved.text,
            parent: saved.parent_id,
            movie: saved.movie_id,
        })
    }

    /// Records a vote from `client_ip`. A repeat vote for the same movie
    /// replaces the earlier star.
    pub async fn rate_movie(
        &self,
        client_ip: &str,
        payload: RatingPayload,
    ) -> AppResult<RatingCreated> {
        let mut invalid = Invalid::default();

        match payload.star {
            None => invalid.add("star", validate::REQUIRED),
            Some(id) => {
                if rating_star::Entity::find_by_id(id).one(&self.db).await?.is_none() {
                    invalid.add("star", missing_pk(id));
                }
            }
        }
        match payload.movie {
            None => invalid.add("movie", validate::REQUIRED),
            Some(id) => {
                if movie::Entity::find_by_id(id).one(&self.db).await?.is_none() {
                    invalid.add("movie", missing_pk(id));
                }
            }
        }
        invalid.finish()?;

        let (Some(star), Some(movie)) = (payload.star, payload.movie) else {
            return Err(AppError::NotFound);
        };

        let model = rating::ActiveModel {
            id: Default::default(),
            ip: Set(client_ip.to_string()),
            star_id: Set(star),
            movie_id: Set(movie),
        };

        rating::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([rating::Column::Ip, rating::Column::MovieId])
                    .update_column(rating::Column::StarId)
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        info!(ip = %client_ip, movie_id = movie, star_id = star, "rating stored");
        Ok(RatingCreated { star, movie })
    }

    pub async fn list_actors(&self) -> AppResult<Vec<ActorListItem>> {
        let actors = actor::Entity::find().order_by_asc(actor::Column::Id).all(&self.db).await?;
        Ok(actors
            .into_iter()
            .map(|a| ActorListItem {
                id: a.id,
                image: self.media.url(&a.image),
                name: a.name,
                age: a.age,
            })
            .collect())
    }

    pub async fn actor_detail(&self, id: i32) -> AppResult<ActorDetail> {
        let actor = actor::Entity::find_by_id(id).one(&self.db).await?.ok_or(AppError::NotFound)?;
        Ok(ActorDetail {
            id: actor.id,
            image: self.media.url(&actor.image),
            name: actor.name,
            age: actor.age,
            description: actor.description,
        })
    }

    /// Flips `draft` on the given movies, returning how many rows changed.
    pub async fn set_draft(&self, ids: &[i32], draft: bool) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let res = movie::Entity::update_many()
            .col_expr(movie::Column::Draft, Expr::val(draft).into())
            .filter(movie::Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await?;

        info!(draft, updated = res.rows_affected, "movie visibility changed");
        Ok(res.rows_affected)
    }

    /// Deletes a movie with its stills, ratings, reviews and credits.
    pub async fn delete_movie(&self, id: i32) -> AppResult<bool> {
        let txn = self.db.begin().await?;

        movie_shot::Entity::delete_many()
            .filter(movie_shot::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        rating::Entity::delete_many().filter(rating::Column::MovieId.eq(id)).exec(&txn).await?;
        review::Entity::update_many()
            .col_expr(review::Column::ParentId, Expr::val(None::<i32>).into())
            .filter(review::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        review::Entity::delete_many().filter(review::Column::MovieId.eq(id)).exec(&txn).await?;
        movie_actor::Entity::delete_many()
            .filter(movie_actor::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        movie_director::Entity::delete_many()
            .filter(movie_director::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        movie_genre::Entity::delete_many()
            .filter(movie_genre::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        let res = movie::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        info!(movie_id = id, deleted = res.rows_affected, "movie deleted");
        Ok(res.rows_affected > 0)
    }

    /// Deletes a category; its movies stay, uncategorized.
    pub async fn delete_category(&self, id: i32) -> AppResult<bool> {
        let txn = self.db.begin().await?;
        movie::Entity::update_many()
            .col_expr(movie::Column::CategoryId, Expr::val(None::<i32>).into())
            .filter(movie::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?;
        let res = category::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<bool> {
        let txn = self.db.begin().await?;
        movie_genre::Entity::delete_many()
            .filter(movie_genre::Column::GenreId.eq(id))
            .exec(&txn)
            .await?;
        let res = genre::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn delete_actor(&self, id: i32) -> AppResult<bool> {
        let txn = self.db.begin().await?;
        movie_actor::Entity::delete_many()
            .filter(movie_actor::Column::ActorId.eq(id))
            .exec(&txn)
            .await?;
        movie_director::Entity::delete_many()
            .filter(movie_director::Column::ActorId.eq(id))
            .exec(&txn)
            .await?;
        let res = actor::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn delete_rating_star(&self, id: i32) -> AppResult<bool> {
        let txn = self.db.begin().await?;
        rating::Entity::delete_many().filter(rating::Column::StarId.eq(id)).exec(&txn).await?;
        let res = rating_star::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(res.rows_affected > 0)
    }

    /// Deletes a review; its replies stay, detached.
    pub async fn delete_review(&self, id: i32) -> AppResult<bool> {
        let txn = self.db.begin().await?;
        review::Entity::update_many()
            .col_expr(review::Column::ParentId, Expr::val(None::<i32>).into())
            .filter(review::Column::ParentId.eq(id))
            .exec(&txn)
            .await?;
        let res = review::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn delete_rating(&self, id: i32) -> AppResult<bool> {
        Ok(rating::Entity::delete_by_id(id).exec(&self.db).await?.rows_affected > 0)
    }

    pub async fn delete_movie_shot(&self, id: i32) -> AppResult<bool> {
        Ok(movie_shot::Entity::delete_by_id(id).exec(&self.db).await?.rows_affected > 0)
    }
}

fn required(invalid: &mut Invalid, field: &str, value: Option<String>) -> String {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        invalid.add(field, validate::REQUIRED);
    }
    value
}

pub fn missing_pk(id: i32) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, fixtures};

    async fn catalog() -> Catalog {
        Catalog::new(db::memory().await, Media::new("media", "/media/"))
    }

    #[tokio::test]
    async fn list_hides_drafts() {
        let catalog = catalog().await;
        let shown = fixtures::movie(catalog.db(), "Alien", false).await;
        fixtures::movie(catalog.db(), "Director's cut", true).await;

        let listed = catalog.list_movies("10.0.0.1", &MovieFilter::default()).await.unwrap();
        assert_eq!(listed.iter().map(|m| m.id).collect::<Vec<_>>(), vec![shown.id]);
    }

    #[tokio::test]
    async fn mean_star_is_arithmetic_mean_or_null() {
        let catalog = catalog().await;
        let rated = fixtures::movie(catalog.db(), "Rated", false).await;
        let unrated = fixtures::movie(catalog.db(), "Unrated", false).await;
        fixtures::rate(catalog.db(), "1.1.1.1", 3, rated.id).await;
        fixtures::rate(catalog.db(), "2.2.2.2", 8, rated.id).await;
        fixtures::rate(catalog.db(), "3.3.3.3", 10, rated.id).await;

        let listed = catalog.list_movies("9.9.9.9", &MovieFilter::default()).await.unwrap();
        let rated = listed.iter().find(|m| m.id == rated.id).unwrap();
        let unrated = listed.iter().find(|m| m.id == unrated.id).unwrap();
        assert!((rated.middle_star.unwrap() - 7.0).abs() < f64::EPSILON);
        assert_eq!(unrated.middle_star, None);
        assert!(!rated.rating_user);
    }

    #[tokio::test]
    async fn voting_sets_the_flag_for_that_ip_only() {
        let catalog = catalog().await;
        let movie = fixtures::movie(catalog.db(), "Heat", false).await;
        let star = fixtures::star(catalog.db(), 9).await;

        catalog
            .rate_movie("192.168.1.7", RatingPayload { star: Some(star.id), movie: Some(movie.id) })
            .await
            .unwrap();

        let mine = catalog.list_movies("192.168.1.7", &MovieFilter::default()).await.unwrap();
        let theirs = catalog.list_movies("192.168.1.8", &MovieFilter::default()).await.unwrap();
        assert!(mine[0].rating_user);
        assert!(!theirs[0].rating_user);
    }

    #[tokio::test]
    async fn revote_replaces_the_star() {
        let catalog = catalog().await;
        let movie = fixtures::movie(catalog.db(), "Heat", false).await;
        let low = fixtures::star(catalog.db(), 2).await;
        let high = fixtures::star(catalog.db(), 10).await;

        for star in [low.id, high.id] {
            catalog
                .rate_movie("5.5.5.5", RatingPayload { star: Some(star), movie: Some(movie.id) })
                .await
                .unwrap();
        }

        let votes = rating::Entity::find().all(catalog.db()).await.unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].star_id, high.id);
        let listed = catalog.list_movies("5.5.5.5", &MovieFilter::default()).await.unwrap();
        assert_eq!(listed[0].middle_star, Some(10.0));
    }

    #[tokio::test]
    async fn rating_rejects_unknown_references() {
        let catalog = catalog().await;
        let err = catalog
            .rate_movie("1.2.3.4", RatingPayload { star: Some(999), movie: None })
            .await
            .unwrap_err();
        let AppError::Validation(errors) = err else { panic!("expected validation error") };
        assert_eq!(errors["star"], vec![missing_pk(999)]);
        assert_eq!(errors["movie"], vec![validate::REQUIRED.to_string()]);
    }

    #[tokio::test]
    async fn filters_by_genre_and_year() {
        let catalog = catalog().await;
        let drama = fixtures::genre(catalog.db(), "drama").await;
        let comedy = fixtures::genre(catalog.db(), "comedy").await;
        let old = fixtures::movie_in_year(catalog.db(), "Old drama", 1975).await;
        let new = fixtures::movie_in_year(catalog.db(), "New drama", 2015).await;
        let funny = fixtures::movie_in_year(catalog.db(), "Funny", 2016).await;
        fixtures::tag(catalog.db(), old.id, drama.id).await;
        fixtures::tag(catalog.db(), new.id, drama.id).await;
        fixtures::tag(catalog.db(), funny.id, comedy.id).await;

        let filter = MovieFilter { genres: Some("drama".into()), year_min: Some(2000), year_max: None };
        let ids: Vec<i32> =
            catalog.list_movies("x", &filter).await.unwrap().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![new.id]);

        let filter = MovieFilter { genres: Some("drama,comedy".into()), year_min: None, year_max: Some(2015) };
        let ids: Vec<i32> =
            catalog.list_movies("x", &filter).await.unwrap().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![old.id, new.id]);
    }

    #[tokio::test]
    async fn detail_renders_relations_by_name() {
        let catalog = catalog().await;
        let category = fixtures::category(catalog.db(), "Feature").await;
        let movie = fixtures::movie_with_category(catalog.db(), "Heat", Some(category.id)).await;
        let pacino = fixtures::actor(catalog.db(), "Al Pacino").await;
        let mann = fixtures::actor(catalog.db(), "Michael Mann").await;
        let crime = fixtures::genre(catalog.db(), "crime").await;
        fixtures::cast(catalog.db(), movie.id, pacino.id).await;
        fixtures::direct(catalog.db(), movie.id, mann.id).await;
        fixtures::tag(catalog.db(), movie.id, crime.id).await;
        let root = fixtures::review(catalog.db(), movie.id, None).await;
        let reply = fixtures::review(catalog.db(), movie.id, Some(root.id)).await;

        let detail = catalog.movie_detail(movie.id).await.unwrap();
        assert_eq!(detail.category.as_deref(), Some("Feature"));
        assert_eq!(detail.actors, vec!["Al Pacino"]);
        assert_eq!(detail.directors, vec!["Michael Mann"]);
        assert_eq!(detail.genres, vec!["crime"]);
        assert_eq!(detail.poster, "/media/movies/heat.jpg");
        assert_eq!(detail.reviews.len(), 2);
        assert_eq!(detail.reviews[1].parent, Some(root.id));
        assert_eq!(detail.reviews[1].id, reply.id);
    }

    #[tokio::test]
    async fn detail_hides_drafts() {
        let catalog = catalog().await;
        let draft = fixtures::movie(catalog.db(), "Unfinished", true).await;
        assert!(matches!(catalog.movie_detail(draft.id).await, Err(AppError::NotFound)));
        assert!(matches!(catalog.movie_detail(4242).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn review_is_validated_and_stored() {
        let catalog = catalog().await;
        let movie = fixtures::movie(catalog.db(), "Heat", false).await;

        let err = catalog
            .create_review(ReviewPayload {
                email: Some("not-an-email".into()),
                name: Some("x".repeat(REVIEW_NAME_MAX + 1)),
                text: None,
                parent: None,
                movie: Some(movie.id),
            })
            .await
            .unwrap_err();
        let AppError::Validation(errors) = err else { panic!("expected validation error") };
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["email", "name", "text"]);

        let created = catalog
            .create_review(ReviewPayload {
                email: Some("ann@example.com".into()),
                name: Some("Ann".into()),
                text: Some("Great heist.".into()),
                parent: None,
                movie: Some(movie.id),
            })
            .await
            .unwrap();
        assert_eq!(created.movie, movie.id);
        assert_eq!(created.parent, None);

        let long_email = format!("{}@example.com", "a".repeat(EMAIL_MAX));
        let err = catalog
            .create_review(ReviewPayload {
                email: Some(long_email),
                name: Some("Ann".into()),
                text: Some("Again.".into()),
                parent: None,
                movie: Some(movie.id),
            })
            .await
            .unwrap_err();
        let AppError::Validation(errors) = err else { panic!("expected validation error") };
        assert!(errors["email"][0].starts_with("Ensure this field has no more than 254 characters"));
    }

    #[tokio::test]
    async fn reply_must_stay_on_the_same_movie() {
        let catalog = catalog().await;
        let heat = fixtures::movie(catalog.db(), "Heat", false).await;
        let alien = fixtures::movie(catalog.db(), "Alien", false).await;
        let on_heat = fixtures::review(catalog.db(), heat.id, None).await;

        let payload = |movie: i32| ReviewPayload {
            email: Some("bob@example.com".into()),
            name: Some("Bob".into()),
            text: Some("Agreed.".into()),
            parent: Some(on_heat.id),
            movie: Some(movie),
        };

        let err = catalog.create_review(payload(alien.id)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.contains_key("parent")));

        let reply = catalog.create_review(payload(heat.id)).await.unwrap();
        assert_eq!(reply.parent, Some(on_heat.id));
    }

    #[tokio::test]
    async fn deleting_a_movie_cascades_to_its_rows_only() {
        let catalog = catalog().await;
        let doomed = fixtures::movie(catalog.db(), "Doomed", false).await;
        let kept = fixtures::movie(catalog.db(), "Kept", false).await;
        for movie in [&doomed, &kept] {
            fixtures::shot(catalog.db(), movie.id).await;
            fixtures::rate(catalog.db(), "1.1.1.1", 5, movie.id).await;
            let root = fixtures::review(catalog.db(), movie.id, None).await;
            fixtures::review(catalog.db(), movie.id, Some(root.id)).await;
        }

        assert!(catalog.delete_movie(doomed.id).await.unwrap());

        let db = catalog.db();
        assert!(movie::Entity::find_by_id(doomed.id).one(db).await.unwrap().is_none());
        assert!(movie::Entity::find_by_id(kept.id).one(db).await.unwrap().is_some());
        for shot in movie_shot::Entity::find().all(db).await.unwrap() {
            assert_eq!(shot.movie_id, kept.id);
        }
        let ratings = rating::Entity::find().all(db).await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].movie_id, kept.id);
        let reviews = review::Entity::find().all(db).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert!(reviews.iter().all(|r| r.movie_id == kept.id));
    }

    #[tokio::test]
    async fn deleting_a_category_keeps_its_movies() {
        let catalog = catalog().await;
        let category = fixtures::category(catalog.db(), "Shorts").await;
        let movie = fixtures::movie_with_category(catalog.db(), "Tiny", Some(category.id)).await;

        assert!(catalog.delete_category(category.id).await.unwrap());

        let movie = movie::Entity::find_by_id(movie.id).one(catalog.db()).await.unwrap().unwrap();
        assert_eq!(movie.category_id, None);
    }

    #[tokio::test]
    async fn deleting_a_review_detaches_replies() {
        let catalog = catalog().await;
        let movie = fixtures::movie(catalog.db(), "Heat", false).await;
        let root = fixtures::review(catalog.db(), movie.id, None).await;
        let reply = fixtures::review(catalog.db(), movie.id, Some(root.id)).await;

        catalog.delete_review(root.id).await.unwrap();

        let reply = review::Entity::find_by_id(reply.id).one(catalog.db()).await.unwrap().unwrap();
        assert_eq!(reply.parent_id, None);
    }

    #[tokio::test]
    async fn set_draft_touches_exactly_the_selection() {
        let catalog = catalog().await;
        let a = fixtures::movie(catalog.db(), "A", false).await;
        let b = fixtures::movie(catalog.db(), "B", false).await;
        let c = fixtures::movie(catalog.db(), "C", false).await;

        assert_eq!(catalog.set_draft(&[a.id, c.id], true).await.unwrap(), 2);
        assert_eq!(catalog.set_draft(&[], true).await.unwrap(), 0);

        let drafts: Vec<i32> = movie::Entity::find()
            .filter(movie::Column::Draft.eq(true))
            .order_by_asc(movie::Column::Id)
            .all(catalog.db())
            .await
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(drafts, vec![a.id, c.id]);
        assert!(!drafts.contains(&b.id));
    }

    #[tokio::test]
    async fn actors_render_image_urls() {
        let catalog = catalog().await;
        let actor = fixtures::actor(catalog.db(), "Sigourney Weaver").await;

        let listed = catalog.list_actors().await.unwrap();
        assert_eq!(listed[0].image, "/media/actors/portrait.jpg");

        let detail = catalog.actor_detail(actor.id).await.unwrap();
        assert_eq!(detail.name, "Sigourney Weaver");
        assert!(matches!(catalog.actor_detail(actor.id + 1).await, Err(AppError::NotFound)));
    }
}
