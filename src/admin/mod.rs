//! HTML back office over every entity.

pub mod choices;
pub mod forms;
pub mod movies;
pub mod people;
pub mod ratings;
pub mod reviews;
pub mod shots;
pub mod site;
pub mod taxonomy;

use std::sync::Arc;

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use cookie::{Cookie, SameSite};
use tracing::{info, warn};

use self::{
    forms::{FormData, total_key},
    site::{AdminSite, DELETE_SELECTED, Inline, ListQuery, ModelAdmin, rows_updated_message},
};
use crate::{
    AppState,
    error::{AppError, FieldErrors},
    templates,
};

const FLASH_COOKIE: &str = "admin_flash";
const NOTHING_SELECTED: &str =
    "Items must be selected in order to perform actions on them. No items have been changed.";

/// Every model in the order the index lists them.
pub fn site(title: impl Into<String>) -> AdminSite {
    AdminSite::new(title)
        .register(taxonomy::CategoryAdmin)
        .register(taxonomy::GenreAdmin)
        .register(movies::MovieAdmin)
        .register(shots::MovieShotAdmin)
        .register(people::ActorAdmin)
        .register(ratings::RatingAdmin)
        .register(ratings::RatingStarAdmin)
        .register(reviews::ReviewAdmin)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", get(|| async { Redirect::permanent("/admin/") }))
        .route("/admin/", get(index))
        .route("/admin/{model}/", get(change_list).post(change_list_submit))
        .route("/admin/{model}/add/", get(add_form).post(add_submit))
        .route("/admin/{model}/{id}/change/", get(change_form).post(change_submit))
        .route("/admin/{model}/{id}/delete/", get(delete_confirm).post(delete_submit))
}

/// [`AppError`] rendered as an admin HTML page.
pub struct AdminError(AppError);

impl<E: Into<AppError>> From<E> for AdminError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        self.0.log();
        let status = self.0.status();
        (status, Html(templates::error_page(status.as_u16(), &self.0.public_message()))).into_response()
    }
}

type AdminResult<T> = Result<T, AdminError>;

fn with_flash(jar: CookieJar, message: &str) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, message.to_string()))
            .path("/admin")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::minutes(5)),
    )
}

/// Reads the pending flash message and clears it.
fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    let Some(message) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, None);
    };
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/admin")), Some(message))
}

fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

fn list_url(admin: &dyn ModelAdmin) -> String {
    format!("/admin/{}/", admin.key())
}

async fn index(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flash) = take_flash(jar);
    let models: Vec<(&str, &str)> =
        state.admin.models().iter().map(|m| (m.key(), m.verbose_name_plural())).collect();
    (jar, Html(templates::index_page(&state.admin.title, &models, flash.as_deref())))
}

async fn change_list(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    jar: CookieJar,
) -> AdminResult<(CookieJar, Html<String>)> {
    let admin = state.admin.get(&model)?;

    let mut query = ListQuery::default();
    for (name, value) in params {
        if name == "q" {
            query.search = Some(value);
        } else if !value.is_empty() {
            query.filters.insert(name, value);
        }
    }

    let (rows, filters) =
        futures::try_join!(admin.rows(&state.catalog, &query), admin.filters(&state.catalog))?;
    let actions = state.admin.actions_for(admin.as_ref());
    let (jar, flash) = take_flash(jar);

    let html = templates::change_list(&templates::ChangeList {
        site_title: &state.admin.title,
        admin: admin.as_ref(),
        rows: &rows,
        filters: &filters,
        query: &query,
        actions: &actions,
        flash: flash.as_deref(),
    });
    Ok((jar, Html(html)))
}

/// Runs a bulk action or saves the list's editable column.
async fn change_list_submit(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
    jar: CookieJar,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AdminResult<(CookieJar, Redirect)> {
    let admin = state.admin.get(&model)?;
    let data = FormData::from_pairs(pairs);
    let back = Redirect::to(&list_url(admin.as_ref()));

    if data.has("_save") {
        let count = admin.save_list(&state.catalog, &data).await?;
        return Ok((with_flash(jar, &rows_updated_message(count)), back));
    }

    let action = data.get("action").unwrap_or_default();
    let ids = data.ids("_selected_action");
    if action.is_empty() {
        return Ok((with_flash(jar, "No action selected."), back));
    }
    if ids.is_empty() {
        return Ok((with_flash(jar, NOTHING_SELECTED), back));
    }

    let count = state.admin.run_action(admin.as_ref(), &state.catalog, action, &ids).await?;
    info!(model = admin.key(), action, selected = ids.len(), count, "admin action");

    let message = if action == DELETE_SELECTED.name {
        format!("Successfully deleted {count} {}.", admin.verbose_name_plural().to_lowercase())
    } else {
        rows_updated_message(count)
    };
    Ok((with_flash(jar, &message), back))
}

async fn add_form(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
) -> AdminResult<Html<String>> {
    let admin = state.admin.get(&model)?;
    let data = admin.defaults();
    render_form(&state, admin.as_ref(), None, &data, &FieldErrors::new(), None).await
}

async fn add_submit(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
    jar: CookieJar,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AdminResult<Response> {
    let admin = state.admin.get(&model)?;
    submit(&state, admin.as_ref(), None, FormData::from_pairs(pairs), jar).await
}

async fn change_form(
    State(state): State<Arc<AppState>>,
    Path((model, id)): Path<(String, String)>,
    jar: CookieJar,
) -> AdminResult<(CookieJar, Html<String>)> {
    let admin = state.admin.get(&model)?;
    let id = parse_id(&id)?;
    let data = admin.initial(&state.catalog, id).await?;
    let (jar, flash) = take_flash(jar);
    let html =
        render_form(&state, admin.as_ref(), Some(id), &data, &FieldErrors::new(), flash.as_deref())
            .await?;
    Ok((jar, html))
}

async fn change_submit(
    State(state): State<Arc<AppState>>,
    Path((model, id)): Path<(String, String)>,
    jar: CookieJar,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AdminResult<Response> {
    let admin = state.admin.get(&model)?;
    let id = parse_id(&id)?;
    submit(&state, admin.as_ref(), Some(id), FormData::from_pairs(pairs), jar).await
}

async fn submit(
    state: &AppState,
    admin: &dyn ModelAdmin,
    id: Option<i32>,
    mut data: FormData,
    jar: CookieJar,
) -> AdminResult<Response> {
    match admin.save(&state.catalog, id, &data).await {
        Ok(saved) => {
            let name = admin.describe(&state.catalog, saved).await?;
            let verb = if id.is_some() { "changed" } else { "added" };
            let message = format!(
                "The {} \"{name}\" was {verb} successfully.",
                admin.verbose_name().to_lowercase()
            );
            let target = if data.has("_continue") {
                format!("/admin/{}/{saved}/change/", admin.key())
            } else {
                list_url(admin)
            };
            Ok((with_flash(jar, &message), Redirect::to(&target)).into_response())
        }
        Err(AppError::Validation(errors)) => {
            warn!(model = admin.key(), fields = errors.len(), "admin form rejected");
            if let Some(id) = id {
                // Read-only values are not posted back; show the stored ones.
                data.fill_missing(&admin.initial(&state.catalog, id).await?);
            }
            Ok(render_form(state, admin, id, &data, &errors, None).await?.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

async fn render_form(
    state: &AppState,
    admin: &dyn ModelAdmin,
    id: Option<i32>,
    data: &FormData,
    errors: &FieldErrors,
    flash: Option<&str>,
) -> AdminResult<Html<String>> {
    let fields = admin.fields(&state.catalog).await?;
    let mut inlines = admin.inlines(&state.catalog, id).await?;
    if !errors.is_empty() {
        inlines = inlines.into_iter().map(|inline| resubmitted(inline, data)).collect();
    }

    Ok(Html(templates::change_form(&templates::ChangeForm {
        site_title: &state.admin.title,
        admin,
        id,
        fields: &fields,
        data,
        errors,
        inlines: &inlines,
        media: state.catalog.media(),
        flash,
    })))
}

/// Replaces an inline's stored rows with the ones just posted, so a
/// rejected form comes back as it was submitted.
fn resubmitted(mut inline: Inline, data: &FormData) -> Inline {
    let total: usize = data.get(&total_key(inline.prefix)).and_then(|t| t.parse().ok()).unwrap_or(0);
    let rows = (0..total)
        .map(|index| {
            let mut row = data.strip_prefix(&format!("{}-{index}", inline.prefix));
            let stored = row
                .get("id")
                .and_then(|id| inline.rows.iter().find(|r| r.get("id") == Some(id)));
            if let Some(stored) = stored {
                row.fill_missing(stored);
            }
            row
        })
        .collect();
    inline.rows = rows;
    inline.extra = 0;
    inline
}

async fn delete_confirm(
    State(state): State<Arc<AppState>>,
    Path((model, id)): Path<(String, String)>,
) -> AdminResult<Html<String>> {
    let admin = state.admin.get(&model)?;
    let id = parse_id(&id)?;
    let name = admin.describe(&state.catalog, id).await?;
    Ok(Html(templates::delete_confirm(&state.admin.title, admin.as_ref(), id, &name)))
}

async fn delete_submit(
    State(state): State<Arc<AppState>>,
    Path((model, id)): Path<(String, String)>,
    jar: CookieJar,
) -> AdminResult<(CookieJar, Redirect)> {
    let admin = state.admin.get(&model)?;
    let id = parse_id(&id)?;
    let name = admin.describe(&state.catalog, id).await?;
    if !admin.delete(&state.catalog, id).await? {
        return Err(AppError::NotFound.into());
    }

    info!(model = admin.key(), id, "admin delete");
    let message =
        format!("The {} \"{name}\" was deleted successfully.", admin.verbose_name().to_lowercase());
    Ok((with_flash(jar, &message), Redirect::to(&list_url(admin.as_ref()))))
}
