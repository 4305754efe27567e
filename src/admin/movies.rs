use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use tracing::info;

use super::{
    choices,
    forms::{self, Cleaned, FieldKind, FieldSpec, FormData, InlineSubmission},
    site::{BulkAction, Cell, Inline, ListFilter, ListQuery, ListRow, ModelAdmin},
};
use crate::{
    catalog::{Catalog, REVIEW_NAME_MAX, REVIEW_TEXT_MAX},
    entities::{category, movie, movie_actor, movie_director, movie_genre, movie_shot, review},
    error::{AppError, AppResult, Invalid},
    media::UploadTo,
};

pub const PUBLISH: BulkAction = BulkAction { name: "published", label: "Publish" };
pub const UNPUBLISH: BulkAction = BulkAction { name: "unpublished", label: "Unpublish" };

const SHOTS: &str = "shots";
const REVIEWS: &str = "reviews";
const DOLLARS: &str = "Write count in dollars";

pub struct MovieAdmin;

#[async_trait]
impl ModelAdmin for MovieAdmin {
    fn key(&self) -> &'static str {
        "movie"
    }

    fn verbose_name(&self) -> &'static str {
        "Movie"
    }

    fn verbose_name_plural(&self) -> &'static str {
        "Movies"
    }

    fn list_display(&self) -> &'static [&'static str] {
        &["Title", "Category", "Url", "Draft"]
    }

    fn search_help(&self) -> Option<&'static str> {
        Some("Title or category name")
    }

    fn actions(&self) -> Vec<BulkAction> {
        vec![PUBLISH, UNPUBLISH]
    }

    async fn filters(&self, catalog: &Catalog) -> AppResult<Vec<ListFilter>> {
        let categories = choices::categories(catalog.db()).await?;
        let years: Vec<i32> = movie::Entity::find()
            .select_only()
            .column(movie::Column::Year)
            .distinct()
            .order_by_desc(movie::Column::Year)
            .into_tuple()
            .all(catalog.db())
            .await?;

        Ok(vec![
            ListFilter {
                param: "category",
                label: "Category",
                choices: categories.into_iter().map(|(id, name)| (id.to_string(), name)).collect(),
            },
            ListFilter {
                param: "year",
                label: "Year",
                choices: years.into_iter().map(|y| (y.to_string(), y.to_string())).collect(),
            },
        ])
    }

    async fn rows(&self, catalog: &Catalog, query: &ListQuery) -> AppResult<Vec<ListRow>> {
        let mut select = movie::Entity::find().find_also_related(category::Entity);

        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(movie::Column::Title.contains(term))
                    .add(category::Column::Name.contains(term)),
            );
        }
        if let Some(category_id) = query.filter_id("category") {
            select = select.filter(movie::Column::CategoryId.eq(category_id));
        }
        if let Some(year) = query.filter_id("year") {
            select = select.filter(movie::Column::Year.eq(year));
        }

        let movies = select.order_by_desc(movie::Column::Id).all(catalog.db()).await?;
        Ok(movies
            .into_iter()
            .map(|(m, c)| ListRow {
                id: m.id,
                cells: vec![
                    Cell::Link(m.title),
                    Cell::Text(c.map_or_else(|| "-".to_string(), |c| c.name)),
                    Cell::Text(m.url),
                    Cell::EditableFlag { name: format!("draft-{}", m.id), value: m.draft },
                ],
            })
            .collect())
    }

    async fn fields(&self, catalog: &Catalog) -> AppResult<Vec<FieldSpec>> {
        let db = catalog.db();
        let people = choices::actors(db).await?;
        Ok(vec![
            FieldSpec::char("title", "Title", 100),
            FieldSpec::char("tagline", "Tagline", 100),
            FieldSpec::rich_text("description", "Description"),
            FieldSpec::image("poster", "Poster", UploadTo::Movies),
            FieldSpec::new("year", "Year", FieldKind::Number),
            FieldSpec::new("world_premiere", "World premiere", FieldKind::Date),
            FieldSpec::char("country", "Country", 30),
            FieldSpec::new("actors", "Actors", FieldKind::Choices(people.clone())),
            FieldSpec::new("directors", "Directors", FieldKind::Choices(people)),
            FieldSpec::new("genres", "Genres", FieldKind::Choices(choices::genres(db).await?)),
            FieldSpec::new("category", "Category", FieldKind::Choice(choices::categories(db).await?))
                .optional(),
            FieldSpec::new("budget", "Budget", FieldKind::Number).help(DOLLARS),
            FieldSpec::new("fees_in_usa", "Fees in USA", FieldKind::Number).help(DOLLARS),
            FieldSpec::new("fees_in_world", "Fees in world", FieldKind::Number).help(DOLLARS),
            FieldSpec::new("url", "Url", FieldKind::Slug { max: 130 }),
            FieldSpec::new("draft", "Draft", FieldKind::Flag),
        ])
    }

    fn defaults(&self) -> FormData {
        let today = jiff::Zoned::now().date();
        let mut data = FormData::default();
        data.set("year", today.year().to_string());
        data.set("world_premiere", today.to_string());
        for money in ["budget", "fees_in_usa", "fees_in_world"] {
            data.set(money, "0");
        }
        data
    }

    async fn initial(&self, catalog: &Catalog, id: i32) -> AppResult<FormData> {
        let db = catalog.db();
        let m = movie::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?;

        let actors = movie_actor::Entity::find().filter(movie_actor::Column::MovieId.eq(id)).all(db);
        let directors =
            movie_director::Entity::find().filter(movie_director::Column::MovieId.eq(id)).all(db);
        let genres = movie_genre::Entity::find().filter(movie_genre::Column::MovieId.eq(id)).all(db);
        let (actors, directors, genres) = futures::try_join!(actors, directors, genres)?;

        let mut data = FormData::default();
        data.set("title", m.title);
        data.set("tagline", m.tagline);
        data.set("description", m.description);
        data.set("poster", m.poster);
        data.set("year", m.year.to_string());
        data.set("world_premiere", m.world_premiere);
        data.set("country", m.country);
        for a in actors {
            data.push("actors", a.actor_id.to_string());
        }
        for d in directors {
            data.push("directors", d.actor_id.to_string());
        }
        for g in genres {
            data.push("genres", g.genre_id.to_string());
        }
        if let Some(category_id) = m.category_id {
            data.set("category", category_id.to_string());
        }
        data.set("budget", m.budget.to_string());
        data.set("fees_in_usa", m.fees_in_usa.to_string());
        data.set("fees_in_world", m.fees_in_world.to_string());
        data.set("url", m.url);
        if m.draft {
            data.set("draft", "on");
        }
        Ok(data)
    }

    async fn describe(&self, catalog: &Catalog, id: i32) -> AppResult<String> {
        let m = movie::Entity::find_by_id(id).one(catalog.db()).await?.ok_or(AppError::NotFound)?;
        Ok(m.title)
    }

    async fn save(&self, catalog: &Catalog, id: Option<i32>, data: &FormData) -> AppResult<i32> {
        let db = catalog.db();
        let existing = match id {
            Some(id) => Some(movie::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?),
            None => None,
        };

        let mut invalid = Invalid::default();
        let fields = self.fields(catalog).await?;
        let cleaned = forms::clean(&fields, data, id.is_some(), "", &mut invalid);

        if i32::try_from(cleaned.number("year")).is_err() {
            invalid.add("year", "Ensure this value is less than or equal to 2147483647.");
        }

        let url = cleaned.text("url");
        if !url.is_empty() {
            let clash = movie::Entity::find()
                .filter(movie::Column::Url.eq(&url))
                .filter(movie::Column::Id.ne(id.unwrap_or_default()))
                .one(db)
                .await?;
            if clash.is_some() {
                invalid.add("url", "Movie with this Url already exists.");
            }
        }

        let shots = clean_inline(&shot_fields(), data, SHOTS, &mut invalid);
        let reviews = clean_inline(&review_fields(catalog, id).await?, data, REVIEWS, &mut invalid);
        for (row, cleaned) in &reviews {
            if row.id.is_some() && row.id == cleaned.id("parent") {
                invalid.add(format!("{REVIEWS}-{}-parent", row.index), "A review cannot reply to itself.");
            }
        }
        invalid.finish()?;

        let txn = db.begin().await?;

        let mut active: movie::ActiveModel =
            existing.map(IntoActiveModel::into_active_model).unwrap_or_default();
        apply(&mut active, &cleaned);
        let saved = if id.is_some() { active.update(&txn).await? } else { active.insert(&txn).await? };

        replace_credits(&txn, saved.id, &cleaned).await?;
        save_shots(&txn, saved.id, &shots).await?;
        save_reviews(&txn, saved.id, &reviews).await?;

        txn.commit().await?;
        info!(movie_id = saved.id, url = %saved.url, "movie saved");
        Ok(saved.id)
    }

    async fn delete(&self, catalog: &Catalog, id: i32) -> AppResult<bool> {
        catalog.delete_movie(id).await
    }

    async fn inlines(&self, catalog: &Catalog, id: Option<i32>) -> AppResult<Vec<Inline>> {
        let db = catalog.db();
        let (shots, reviews) = match id {
            Some(id) => {
                let shots = movie_shot::Entity::find()
                    .filter(movie_shot::Column::MovieId.eq(id))
                    .order_by_asc(movie_shot::Column::Id)
                    .all(db)
                    .await?;
                let reviews = review::Entity::find()
                    .filter(review::Column::MovieId.eq(id))
                    .order_by_asc(review::Column::Id)
                    .all(db)
                    .await?;
                (shots, reviews)
            }
            None => (Vec::new(), Vec::new()),
        };

        let shot_rows = shots
            .into_iter()
            .map(|s| {
                let mut row = FormData::default();
                row.set("id", s.id.to_string());
                row.set("title", s.title);
                row.set("description", s.description);
                row.set("image", s.image);
                row
            })
            .collect();
        let review_rows = reviews
            .into_iter()
            .map(|r| {
                let mut row = FormData::default();
                row.set("id", r.id.to_string());
                row.set("name", r.name);
                row.set("email", r.email);
                row.set("text", r.text);
                if let Some(parent) = r.parent_id {
                    row.set("parent", parent.to_string());
                }
                row
            })
            .collect();

        Ok(vec![
            Inline {
                prefix: SHOTS,
                title: "Images from movie",
                fields: shot_fields(),
                rows: shot_rows,
                extra: 1,
            },
            Inline {
                prefix: REVIEWS,
                title: "Reviews",
                fields: review_fields(catalog, id).await?,
                rows: review_rows,
                extra: 1,
            },
        ])
    }

    async fn run_action(&self, catalog: &Catalog, action: &str, ids: &[i32]) -> AppResult<u64> {
        match action {
            a if a == PUBLISH.name => catalog.set_draft(ids, false).await,
            a if a == UNPUBLISH.name => catalog.set_draft(ids, true).await,
            other => Err(AppError::BadRequest(format!("Unknown action \"{other}\"."))),
        }
    }

    /// Saves the draft checkboxes of the rows shown on the page.
    async fn save_list(&self, catalog: &Catalog, data: &FormData) -> AppResult<u64> {
        let (drafts, published): (Vec<i32>, Vec<i32>) =
            data.ids("_row").into_iter().partition(|id| data.has(&format!("draft-{id}")));
        let changed = catalog.set_draft(&drafts, true).await? + catalog.set_draft(&published, false).await?;
        Ok(changed)
    }
}

fn shot_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::char("title", "Title", 100),
        FieldSpec::text("description", "Description"),
        FieldSpec::image("image", "Image", UploadTo::MovieShots),
    ]
}

async fn review_fields(catalog: &Catalog, movie_id: Option<i32>) -> AppResult<Vec<FieldSpec>> {
    let parents = match movie_id {
        Some(id) => choices::reviews(catalog.db(), Some(id)).await?,
        None => Vec::new(),
    };
    Ok(vec![
        FieldSpec::char("name", "Name", REVIEW_NAME_MAX).readonly_on_change(),
        FieldSpec::new("email", "Email", FieldKind::Email).readonly_on_change(),
        FieldSpec::new("text", "Text", FieldKind::Text { max: Some(REVIEW_TEXT_MAX), rich: false }),
        FieldSpec::new("parent", "Parent", FieldKind::Choice(parents)).optional(),
    ])
}

fn clean_inline(
    fields: &[FieldSpec],
    data: &FormData,
    prefix: &str,
    invalid: &mut Invalid,
) -> Vec<(InlineSubmission, Cleaned)> {
    forms::inline_rows(data, prefix)
        .into_iter()
        .map(|row| {
            let cleaned = if row.delete {
                Cleaned::default()
            } else {
                let key_prefix = format!("{prefix}-{}-", row.index);
                forms::clean(fields, &row.data, row.id.is_some(), &key_prefix, invalid)
            };
            (row, cleaned)
        })
        .collect()
}

fn apply(active: &mut movie::ActiveModel, c: &Cleaned) {
    active.title = Set(c.text("title"));
    active.tagline = Set(c.text("tagline"));
    active.description = Set(c.text("description"));
    active.poster = Set(c.text("poster"));
    active.year = Set(i32::try_from(c.number("year")).unwrap_or_default());
    active.world_premiere = Set(c.text("world_premiere"));
    active.country = Set(c.text("country"));
    active.budget = Set(c.number("budget"));
    active.fees_in_usa = Set(c.number("fees_in_usa"));
    active.fees_in_world = Set(c.number("fees_in_world"));
    active.category_id = Set(c.id("category"));
    active.url = Set(c.text("url"));
    active.draft = Set(c.flag("draft"));
}

async fn replace_credits(txn: &DatabaseTransaction, movie_id: i32, c: &Cleaned) -> AppResult<()> {
    movie_actor::Entity::delete_many()
        .filter(movie_actor::Column::MovieId.eq(movie_id))
        .exec(txn)
        .await?;
    movie_director::Entity::delete_many()
        .filter(movie_director::Column::MovieId.eq(movie_id))
        .exec(txn)
        .await?;
    movie_genre::Entity::delete_many()
        .filter(movie_genre::Column::MovieId.eq(movie_id))
        .exec(txn)
        .await?;

    let actors = c.ids("actors");
    if !actors.is_empty() {
        movie_actor::Entity::insert_many(actors.into_iter().map(|actor_id| movie_actor::ActiveModel {
            movie_id: Set(movie_id),
            actor_id: Set(actor_id),
        }))
        .exec_without_returning(txn)
        .await?;
    }
    let directors = c.ids("directors");
    if !directors.is_empty() {
        movie_director::Entity::insert_many(directors.into_iter().map(|actor_id| {
            movie_director::ActiveModel { movie_id: Set(movie_id), actor_id: Set(actor_id) }
        }))
        .exec_without_returning(txn)
        .await?;
    }
    let genres = c.ids("genres");
    if !genres.is_empty() {
        movie_genre::Entity::insert_many(genres.into_iter().map(|genre_id| movie_genre::ActiveModel {
            movie_id: Set(movie_id),
            genre_id: Set(genre_id),
        }))
        .exec_without_returning(txn)
        .await?;
    }
    Ok(())
}

async fn save_shots(
    txn: &DatabaseTransaction,
    movie_id: i32,
    rows: &[(InlineSubmission, Cleaned)],
) -> AppResult<()> {
    for (row, c) in rows {
        match row.id {
            Some(shot_id) if row.delete => {
                movie_shot::Entity::delete_many()
                    .filter(movie_shot::Column::Id.eq(shot_id))
                    .filter(movie_shot::Column::MovieId.eq(movie_id))
                    .exec(txn)
                    .await?;
            }
            Some(shot_id) => {
                let Some(shot) = movie_shot::Entity::find_by_id(shot_id)
                    .filter(movie_shot::Column::MovieId.eq(movie_id))
                    .one(txn)
                    .await?
                else {
                    continue;
                };
                let mut active = shot.into_active_model();
                active.title = Set(c.text("title"));
                active.description = Set(c.text("description"));
                active.image = Set(c.text("image"));
                active.update(txn).await?;
            }
            None => {
                movie_shot::ActiveModel {
                    id: Default::default(),
                    title: Set(c.text("title")),
                    description: Set(c.text("description")),
                    image: Set(c.text("image")),
                    movie_id: Set(movie_id),
                }
                .insert(txn)
                .await?;
            }
        }
    }
    Ok(())
}

async fn save_reviews(
    txn: &DatabaseTransaction,
    movie_id: i32,
    rows: &[(InlineSubmission, Cleaned)],
) -> AppResult<()> {
    for (row, c) in rows {
        match row.id {
            Some(review_id) if row.delete => {
                review::Entity::update_many()
                    .col_expr(review::Column::ParentId, Expr::val(None::<i32>).into())
                    .filter(review::Column::ParentId.eq(review_id))
                    .exec(txn)
                    .await?;
                review::Entity::delete_many()
                    .filter(review::Column::Id.eq(review_id))
                    .filter(review::Column::MovieId.eq(movie_id))
                    .exec(txn)
                    .await?;
            }
            Some(review_id) => {
                let Some(existing) = review::Entity::find_by_id(review_id)
                    .filter(review::Column::MovieId.eq(movie_id))
                    .one(txn)
                    .await?
                else {
                    continue;
                };
                let mut active = existing.into_active_model();
                active.text = Set(c.text("text"));
                active.parent_id = Set(c.id("parent"));
                active.update(txn).await?;
            }
            None => {
                review::ActiveModel {
                    id: Default::default(),
                    email: Set(c.text("email")),
                    name: Set(c.text("name")),
                    text: Set(c.text("text")),
                    parent_id: Set(c.id("parent")),
                    movie_id: Set(movie_id),
                }
                .insert(txn)
                .await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{admin::site::AdminSite, db, fixtures, media::Media};

    async fn catalog() -> Catalog {
        Catalog::new(db::memory().await, Media::new("media", "/media/"))
    }

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData::from_pairs(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    fn heat_form() -> FormData {
        form(&[
            ("title", "Heat"),
            ("tagline", "A Los Angeles crime saga"),
            ("description", "<p>Cops and robbers.</p>"),
            ("poster", "heat.jpg"),
            ("year", "1995"),
            ("world_premiere", "1995-12-15"),
            ("country", "USA"),
            ("budget", "60000000"),
            ("fees_in_usa", "67436818"),
            ("fees_in_world", "187436818"),
            ("url", "heat"),
        ])
    }

    #[tokio::test]
    async fn publish_and_unpublish_report_affected_rows() {
        let catalog = catalog().await;
        let site = AdminSite::new("test").register(MovieAdmin);
        let admin = site.get("movie").unwrap();
        let a = fixtures::movie(catalog.db(), "A", true).await;
        let b = fixtures::movie(catalog.db(), "B", true).await;
        let c = fixtures::movie(catalog.db(), "C", true).await;

        let published = site.run_action(admin.as_ref(), &catalog, "published", &[a.id, b.id]).await;
        assert_eq!(published.unwrap(), 2);

        let drafts: Vec<bool> = movie::Entity::find()
            .order_by_asc(movie::Column::Id)
            .all(catalog.db())
            .await
            .unwrap()
            .iter()
            .map(|m| m.draft)
            .collect();
        assert_eq!(drafts, vec![false, false, true]);

        let hidden = site.run_action(admin.as_ref(), &catalog, "unpublished", &[c.id, a.id]).await;
        assert_eq!(hidden.unwrap(), 2);
        let b = movie::Entity::find_by_id(b.id).one(catalog.db()).await.unwrap().unwrap();
        assert!(!b.draft);
    }

    #[tokio::test]
    async fn unknown_action_is_rejected() {
        let catalog = catalog().await;
        let err = MovieAdmin.run_action(&catalog, "explode", &[1]).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn delete_selected_counts_existing_rows() {
        let catalog = catalog().await;
        let site = AdminSite::new("test").register(MovieAdmin);
        let admin = site.get("movie").unwrap();
        let a = fixtures::movie(catalog.db(), "A", false).await;

        let ids = [a.id, 999];
        let deleted = site.run_action(admin.as_ref(), &catalog, "delete_selected", &ids).await;
        assert_eq!(deleted.unwrap(), 1);
    }

    #[tokio::test]
    async fn save_creates_movie_with_credits() {
        let catalog = catalog().await;
        let pacino = fixtures::actor(catalog.db(), "Al Pacino").await;
        let mann = fixtures::actor(catalog.db(), "Michael Mann").await;
        let crime = fixtures::genre(catalog.db(), "crime").await;

        let mut data = heat_form();
        data.push("actors", pacino.id.to_string());
        data.push("directors", mann.id.to_string());
        data.push("genres", crime.id.to_string());
        data.set("shots-TOTAL", "1");
        data.set("shots-0-title", "Diner");
        data.set("shots-0-description", "Coffee scene");
        data.set("shots-0-image", "diner.jpg");

        let id = MovieAdmin.save(&catalog, None, &data).await.unwrap();

        let detail = catalog.movie_detail(id).await.unwrap();
        assert_eq!(detail.actors, vec!["Al Pacino"]);
        assert_eq!(detail.directors, vec!["Michael Mann"]);
        assert_eq!(detail.genres, vec!["crime"]);
        assert_eq!(detail.poster, "/media/movies/heat.jpg");
        let shots = movie_shot::Entity::find().all(catalog.db()).await.unwrap();
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].image, "movies_shot/diner.jpg");
    }

    #[tokio::test]
    async fn save_rejects_duplicate_slug_and_bad_inline() {
        let catalog = catalog().await;
        fixtures::movie(catalog.db(), "Heat", false).await;

        let mut data = heat_form();
        data.set("shots-TOTAL", "1");
        data.set("shots-0-title", "No image");

        let err = MovieAdmin.save(&catalog, None, &data).await.unwrap_err();
        let AppError::Validation(errors) = err else { panic!("expected validation error") };
        assert!(errors.contains_key("url"));
        assert!(errors.contains_key("shots-0-image"));
        assert_eq!(movie::Entity::find().all(catalog.db()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn inline_review_edit_keeps_author() {
        let catalog = catalog().await;
        let movie = fixtures::movie(catalog.db(), "Heat", false).await;
        let root = fixtures::review(catalog.db(), movie.id, None).await;
        let reply = fixtures::review(catalog.db(), movie.id, None).await;

        let mut data = MovieAdmin.initial(&catalog, movie.id).await.unwrap();
        data.set("tagline", "A Los Angeles crime saga");
        data.set("reviews-TOTAL", "2");
        data.set("reviews-0-id", root.id.to_string());
        data.set("reviews-0-text", "Edited");
        data.set("reviews-1-id", reply.id.to_string());
        data.set("reviews-1-text", "Reply");
        data.set("reviews-1-parent", root.id.to_string());
        data.set("reviews-1-name", "Impostor");

        MovieAdmin.save(&catalog, Some(movie.id), &data).await.unwrap();

        let reply = review::Entity::find_by_id(reply.id).one(catalog.db()).await.unwrap().unwrap();
        assert_eq!(reply.parent_id, Some(root.id));
        assert_eq!(reply.name, "Reader");
        let root = review::Entity::find_by_id(root.id).one(catalog.db()).await.unwrap().unwrap();
        assert_eq!(root.text, "Edited");
    }

    #[tokio::test]
    async fn list_search_and_filters() {
        let catalog = catalog().await;
        let noir = fixtures::category(catalog.db(), "Noir").await;
        let heat = fixtures::movie_with_category(catalog.db(), "Heat", Some(noir.id)).await;
        fixtures::movie_in_year(catalog.db(), "Alien", 1979).await;

        let mut query = ListQuery { search: Some("noi".into()), ..Default::default() };
        let rows = MovieAdmin.rows(&catalog, &query).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![heat.id]);
        assert_eq!(rows[0].cells[1], Cell::Text("Noir".into()));

        query.search = None;
        query.filters.insert("year".into(), "1979".into());
        let rows = MovieAdmin.rows(&catalog, &query).await.unwrap();
        assert_eq!(rows[0].cells[0], Cell::Link("Alien".into()));
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn list_save_sets_draft_from_checkboxes() {
        let catalog = catalog().await;
        let a = fixtures::movie(catalog.db(), "A", false).await;
        let b = fixtures::movie(catalog.db(), "B", true).await;

        let data = form(&[
            ("_row", &a.id.to_string()),
            ("_row", &b.id.to_string()),
            (&format!("draft-{}", a.id), "on"),
        ]);
        assert_eq!(MovieAdmin.save_list(&catalog, &data).await.unwrap(), 2);

        let a = movie::Entity::find_by_id(a.id).one(catalog.db()).await.unwrap().unwrap();
        let b = movie::Entity::find_by_id(b.id).one(catalog.db()).await.unwrap().unwrap();
        assert!(a.draft);
        assert!(!b.draft);
    }
}
