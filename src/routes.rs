use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState, admin,
    error::{AppError, AppResult},
    extract::{ClientIp, FormatParam, suffixed_id},
    models::{
        ActorDetail, ActorListItem, MovieDetail, MovieFilter, MovieListItem, RatingCreated,
        RatingPayload, ReviewCreated, ReviewPayload,
    },
};

/// The JSON API, the admin and the media files behind one router. Every
/// API route also answers with a `.json` suffix.
pub fn router(state: Arc<AppState>) -> Router {
    let media = state.catalog.media().clone();

    Router::new()
        .route("/movie/", get(movie_list))
        .route("/movie.json", get(movie_list))
        .route("/movie/{id}/", get(movie_detail))
        .route("/movie/{id}", get(movie_detail))
        .route("/review/", post(review_create))
        .route("/review.json", post(review_create))
        .route("/rating/", post(rating_create))
        .route("/rating.json", post(rating_create))
        .route("/actor/", get(actor_list))
        .route("/actor.json", get(actor_list))
        .route("/actor/{id}/", get(actor_detail))
        .route("/actor/{id}", get(actor_detail))
        .merge(admin::router())
        .nest_service(media.mount_point(), media.service())
        .fallback(|| async { AppError::NotFound })
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn query<T>(query: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    query.map(|Query(q)| q).map_err(|rej| AppError::BadRequest(rej.body_text()))
}

fn body<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    body.map(|Json(b)| b).map_err(|rej| AppError::BadRequest(rej.body_text()))
}

pub async fn movie_list(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    format: Result<Query<FormatParam>, QueryRejection>,
    filter: Result<Query<MovieFilter>, QueryRejection>,
) -> AppResult<Json<Vec<MovieListItem>>> {
    query(format)?.ensure_supported()?;
    let filter = query(filter)?;
    Ok(Json(state.catalog.list_movies(&ip, &filter).await?))
}

pub async fn movie_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    format: Result<Query<FormatParam>, QueryRejection>,
) -> AppResult<Json<MovieDetail>> {
    query(format)?.ensure_supported()?;
    Ok(Json(state.catalog.movie_detail(suffixed_id(&id)?).await?))
}

pub async fn review_create(
    State(state): State<Arc<AppState>>,
    format: Result<Query<FormatParam>, QueryRejection>,
    payload: Result<Json<ReviewPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ReviewCreated>)> {
    query(format)?.ensure_supported()?;
    let created = state.catalog.create_review(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn rating_create(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    format: Result<Query<FormatParam>, QueryRejection>,
    payload: Result<Json<RatingPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RatingCreated>)> {
    query(format)?.ensure_supported()?;
    let created = state.catalog.rate_movie(&ip, body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn actor_list(
    State(state): State<Arc<AppState>>,
    format: Result<Query<FormatParam>, QueryRejection>,
) -> AppResult<Json<Vec<ActorListItem>>> {
    query(format)?.ensure_supported()?;
    Ok(Json(state.catalog.list_actors().await?))
}

pub async fn actor_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    format: Result<Query<FormatParam>, QueryRejection>,
) -> AppResult<Json<ActorDetail>> {
    query(format)?.ensure_supported()?;
    Ok(Json(state.catalog.actor_detail(suffixed_id(&id)?).await?))
}
