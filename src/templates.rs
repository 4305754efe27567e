use std::collections::BTreeMap;

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::{
    admin::{
        forms::{FieldKind, FieldSpec, FormData, total_key},
        site::{BulkAction, Cell, Inline, ListFilter, ListQuery, ListRow, ModelAdmin},
    },
    error::FieldErrors,
    media::Media,
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";
const CKEDITOR_CDN: &str = "https://cdn.ckeditor.com/ckeditor5/41.4.2/classic/ckeditor.js";
const RICH_TEXT_INIT: &str =
    "document.querySelectorAll('textarea.rich-text').forEach(el => ClassicEditor.create(el));";

const INPUT: &str = "mt-1 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON: &str = "rounded-md bg-blue-600 px-4 py-2 text-sm font-semibold text-white hover:bg-blue-700";
const LINK: &str = "text-blue-600 hover:text-blue-800";

pub fn index_page(site_title: &str, models: &[(&str, &str)], flash: Option<&str>) -> String {
    page(
        site_title,
        site_title,
        flash,
        html! {
            div class="bg-white shadow rounded-lg" {
                h2 class="px-6 py-4 text-lg font-semibold text-gray-900 border-b" { "Movies" }
                ul class="divide-y" {
                    @for (key, plural) in models {
                        li class="flex items-center justify-between px-6 py-3" {
                            a class=(LINK) href=(list_url(key)) { (plural) }
                            a class="text-sm text-green-700 hover:text-green-900" href=(format!("/admin/{key}/add/")) { "+ Add" }
                        }
                    }
                }
            }
        },
    )
}

/// Everything a change list page shows.
pub struct ChangeList<'a> {
    pub site_title: &'a str,
    pub admin: &'a dyn ModelAdmin,
    pub rows: &'a [ListRow],
    pub filters: &'a [ListFilter],
    pub query: &'a ListQuery,
    pub actions: &'a [BulkAction],
    pub flash: Option<&'a str>,
}

pub fn change_list(view: &ChangeList<'_>) -> String {
    let key = view.admin.key();
    let editable = view.rows.iter().any(|r| r.cells.iter().any(|c| matches!(c, Cell::EditableFlag { .. })));

    page(
        view.site_title,
        view.admin.verbose_name_plural(),
        view.flash,
        html! {
            div class="flex items-center justify-between" {
                h2 class="text-2xl font-bold text-gray-900" { "Select " (view.admin.verbose_name().to_lowercase()) " to change" }
                a class=(BUTTON) href=(format!("/admin/{key}/add/")) { "Add " (view.admin.verbose_name().to_lowercase()) }
            }

            @if let Some(help) = view.admin.search_help() {
                form class="mt-6 flex gap-2" method="get" action=(list_url(key)) {
                    input class=(INPUT) type="search" name="q" placeholder=(help) value=[view.query.search.as_deref()];
                    @for (param, value) in &view.query.filters {
                        input type="hidden" name=(param) value=(value);
                    }
                    button class=(BUTTON) type="submit" { "Search" }
                }
            }

            div class="mt-6 flex gap-6" {
                form class="flex-1 bg-white shadow rounded-lg p-4" method="post" action=(list_url(key)) {
                    div class="flex items-center gap-2" {
                        label class="text-sm text-gray-700" for="action" { "Action:" }
                        select class="rounded-md border border-gray-300 px-2 py-1" name="action" id="action" {
                            option value="" { "---------" }
                            @for action in view.actions {
                                option value=(action.name) { (action.label) }
                            }
                        }
                        button class=(BUTTON) type="submit" name="index" value="0" { "Go" }
                        span class="ml-auto text-sm text-gray-500" { (view.rows.len()) " " (view.admin.verbose_name_plural().to_lowercase()) }
                    }

                    table class="mt-4 w-full text-left text-sm" {
                        thead class="border-b text-gray-500" {
                            tr {
                                th class="py-2 w-8" {}
                                @for column in view.admin.list_display() {
                                    th class="py-2 pr-4 font-medium" { (column) }
                                }
                            }
                        }
                        tbody class="divide-y" {
                            @for row in view.rows {
                                tr {
                                    td class="py-2" {
                                        input type="checkbox" name="_selected_action" value=(row.id);
                                        input type="hidden" name="_row" value=(row.id);
                                    }
                                    @for cell in &row.cells {
                                        td class="py-2 pr-4" { (cell_markup(key, row.id, cell)) }
                                    }
                                }
                            }
                        }
                    }

                    @if editable {
                        div class="mt-4 text-right" {
                            button class=(BUTTON) type="submit" name="_save" value="1" { "Save" }
                        }
                    }
                }

                @if !view.filters.is_empty() {
                    aside class="w-56 bg-white shadow rounded-lg p-4 text-sm" {
                        h3 class="font-semibold text-gray-900" { "Filter" }
                        @for filter in view.filters {
                            h4 class="mt-4 text-gray-700" { "By " (filter.label.to_lowercase()) }
                            ul class="mt-1 space-y-1" {
                                li { (filter_link(key, view.query, filter.param, None, "All")) }
                                @for (value, label) in &filter.choices {
                                    li { (filter_link(key, view.query, filter.param, Some(value), label)) }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

/// Everything an add or change page shows.
pub struct ChangeForm<'a> {
    pub site_title: &'a str,
    pub admin: &'a dyn ModelAdmin,
    pub id: Option<i32>,
    pub fields: &'a [FieldSpec],
    pub data: &'a FormData,
    pub errors: &'a FieldErrors,
    pub inlines: &'a [Inline],
    pub media: &'a Media,
    pub flash: Option<&'a str>,
}

pub fn change_form(view: &ChangeForm<'_>) -> String {
    let key = view.admin.key();
    let editing = view.id.is_some();
    let action = match view.id {
        Some(id) => format!("/admin/{key}/{id}/change/"),
        None => format!("/admin/{key}/add/"),
    };
    let heading = if editing { "Change" } else { "Add" };
    let rich = view.fields.iter().chain(view.inlines.iter().flat_map(|i| i.fields.iter())).any(
        |f| matches!(f.kind, FieldKind::Text { rich: true, .. }),
    );

    page(
        view.site_title,
        view.admin.verbose_name(),
        view.flash,
        html! {
            h2 class="text-2xl font-bold text-gray-900" { (heading) " " (view.admin.verbose_name().to_lowercase()) }

            @if !view.errors.is_empty() {
                div class="mt-4 rounded-md bg-red-50 p-4 text-sm text-red-700" {
                    "Please correct the errors below."
                    @for message in view.errors.get("__all__").into_iter().flatten() {
                        p class="mt-1" { (message) }
                    }
                }
            }

            form class="mt-6 space-y-6" method="post" action=(action) {
                div class="bg-white shadow rounded-lg p-6 space-y-4" {
                    @for field in view.fields {
                        (field_row(field, view.data, field.name, field.name, editing, view.errors, view.media))
                    }
                }

                @for inline in view.inlines {
                    (inline_markup(inline, view.errors, view.media))
                }

                div class="flex items-center justify-between" {
                    @if let Some(id) = view.id {
                        a class="text-red-600 hover:text-red-800" href=(format!("/admin/{key}/{id}/delete/")) { "Delete" }
                    } @else {
                        span {}
                    }
                    div class="flex gap-2" {
                        button class="rounded-md border border-gray-300 px-4 py-2 text-sm" type="submit" name="_continue" value="1" { "Save and continue editing" }
                        button class=(BUTTON) type="submit" { "Save" }
                    }
                }
            }

            @if rich {
                script src=(CKEDITOR_CDN) {}
                script { (PreEscaped(RICH_TEXT_INIT)) }
            }
        },
    )
}

pub fn delete_confirm(site_title: &str, admin: &dyn ModelAdmin, id: i32, name: &str) -> String {
    let key = admin.key();
    page(
        site_title,
        "Are you sure?",
        None,
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h2 class="text-2xl font-bold text-gray-900" { "Are you sure?" }
                p class="mt-4 text-gray-700" {
                    "Are you sure you want to delete the " (admin.verbose_name().to_lowercase()) " \"" (name) "\"? "
                    "All related objects will be deleted."
                }
                form class="mt-6 flex gap-4" method="post" action=(format!("/admin/{key}/{id}/delete/")) {
                    button class="rounded-md bg-red-600 px-4 py-2 text-sm font-semibold text-white hover:bg-red-700" type="submit" { "Yes, I'm sure" }
                    a class=(LINK) href=(format!("/admin/{key}/{id}/change/")) { "No, take me back" }
                }
            }
        },
    )
}

pub fn error_page(status: u16, message: &str) -> String {
    page(
        "Error",
        "Error",
        None,
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h2 class="text-2xl font-bold text-gray-900" { "Error " (status) }
                p class="mt-4 text-gray-700" { (message) }
                a class=(format!("mt-6 inline-block {LINK}")) href="/admin/" { "Back" }
            }
        },
    )
}

fn page(site_title: &str, title: &str, flash: Option<&str>, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | " (site_title) }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" {
                header class="bg-slate-800 px-6 py-4" {
                    a class="text-lg font-semibold text-white" href="/admin/" { (site_title) }
                }
                main class="max-w-6xl mx-auto px-6 py-8" {
                    @if let Some(message) = flash {
                        div class="mb-6 rounded-md bg-green-50 p-4 text-sm text-green-800" { (message) }
                    }
                    (body)
                }
            }
        }
    }
    .into_string()
}

fn list_url(key: &str) -> String {
    format!("/admin/{key}/")
}

fn cell_markup(key: &str, id: i32, cell: &Cell) -> Markup {
    html! {
        @match cell {
            Cell::Text(text) => { (text) }
            Cell::Link(text) => { a class=(LINK) href=(format!("/admin/{key}/{id}/change/")) { (text) } }
            Cell::EditableFlag { name, value } => { input type="checkbox" name=(name) checked[*value]; }
            Cell::Image { url, width, height } => { img src=(url) width=(width) height=(height) alt=""; }
        }
    }
}

fn filter_link(
    key: &str,
    query: &ListQuery,
    param: &str,
    value: Option<&str>,
    label: &str,
) -> Markup {
    let mut filters: BTreeMap<&str, &str> =
        query.filters.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    match value {
        Some(value) => filters.insert(param, value),
        None => filters.remove(param),
    };
    let mut pairs: Vec<String> =
        filters.iter().map(|(k, v)| format!("{k}={}", urlencoding::encode(v))).collect();
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        pairs.push(format!("q={}", urlencoding::encode(search)));
    }
    let href =
        if pairs.is_empty() { list_url(key) } else { format!("{}?{}", list_url(key), pairs.join("&")) };
    let active = query.filters.get(param).map(String::as_str) == value;

    html! {
        a class=(if active { "font-semibold text-gray-900" } else { LINK }) href=(href) { (label) }
    }
}

/// One labelled input. `source` is the key read from `data`, `input` the
/// submitted name, which differ for inline rows.
fn field_row(
    field: &FieldSpec,
    data: &FormData,
    source: &str,
    input: &str,
    editing: bool,
    errors: &FieldErrors,
    media: &Media,
) -> Markup {
    let value = data.get(source).unwrap_or_default();
    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for=(input) {
                (field.label)
                @if field.required && field.is_editable(editing) { span class="text-red-600" { " *" } }
            }
            @if field.is_editable(editing) {
                (widget(field, data, source, input, media))
            } @else {
                p class="mt-1 text-gray-900" { (value) }
            }
            @if let Some(help) = field.help {
                p class="mt-1 text-xs text-gray-500" { (help) }
            }
            @for message in errors.get(input).into_iter().flatten() {
                p class="mt-1 text-sm text-red-600" { (message) }
            }
        }
    }
}

fn widget(field: &FieldSpec, data: &FormData, source: &str, input: &str, media: &Media) -> Markup {
    let value = data.get(source).unwrap_or_default();
    html! {
        @match &field.kind {
            FieldKind::Char { max } | FieldKind::Slug { max } => {
                input class=(INPUT) type="text" id=(input) name=(input) value=(value) maxlength=(max);
            }
            FieldKind::Email => {
                input class=(INPUT) type="email" id=(input) name=(input) value=(value);
            }
            FieldKind::Text { max, rich } => {
                textarea class=(format!("{INPUT}{}", if *rich { " rich-text" } else { "" })) id=(input) name=(input) rows="6" maxlength=[max] { (value) }
            }
            FieldKind::Number => {
                input class=(INPUT) type="number" min="0" id=(input) name=(input) value=(value);
            }
            FieldKind::Date => {
                input class=(INPUT) type="date" id=(input) name=(input) value=(value);
            }
            FieldKind::Flag => {
                input class="mt-1" type="checkbox" id=(input) name=(input) checked[matches!(value, "on" | "true" | "1")];
            }
            FieldKind::Image { upload_to, preview } => {
                input class=(INPUT) type="text" id=(input) name=(input) value=(value) placeholder=(format!("{}file.jpg", upload_to.prefix()));
                @if !value.is_empty() {
                    img class="mt-2 rounded" src=(media.url(value)) width=(preview.0) height=(preview.1) alt="";
                }
            }
            FieldKind::Choice(choices) => {
                select class=(INPUT) id=(input) name=(input) {
                    option value="" { "---------" }
                    @for (id, label) in choices {
                        option value=(id) selected[value == id.to_string()] { (label) }
                    }
                }
            }
            FieldKind::Choices(choices) => {
                @let chosen = data.all(source).collect::<Vec<_>>();
                select class=(INPUT) id=(input) name=(input) multiple size="6" {
                    @for (id, label) in choices {
                        option value=(id) selected[chosen.contains(&id.to_string().as_str())] { (label) }
                    }
                }
            }
        }
    }
}

fn inline_markup(inline: &Inline, errors: &FieldErrors, media: &Media) -> Markup {
    let prefix = inline.prefix;
    let total = inline.rows.len() + inline.extra;
    let blank = FormData::default();

    html! {
        fieldset class="bg-white shadow rounded-lg p-6" {
            legend class="px-2 text-lg font-semibold text-gray-900" { (inline.title) }
            input type="hidden" name=(total_key(prefix)) value=(total);
            @for index in 0..total {
                @let row = inline.rows.get(index).unwrap_or(&blank);
                @let id = row.get("id").filter(|id| !id.is_empty());
                div class="mt-4 grid gap-4 border-t pt-4 md:grid-cols-2" {
                    input type="hidden" name=(format!("{prefix}-{index}-id")) value=[id];
                    @for field in &inline.fields {
                        (field_row(field, row, field.name, &format!("{prefix}-{index}-{}", field.name), id.is_some(), errors, media))
                    }
                    @if id.is_some() {
                        label class="text-sm text-red-600" {
                            input type="checkbox" name=(format!("{prefix}-{index}-DELETE"));
                            " Delete"
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_page_escapes_message() {
        let html = error_page(404, "<b>gone</b>");
        assert!(html.contains("Error 404"));
        assert!(html.contains("&lt;b&gt;gone&lt;/b&gt;"));
    }

    #[test]
    fn filter_links_keep_search_and_other_filters() {
        let mut query = ListQuery { search: Some("heat & co".into()), ..Default::default() };
        query.filters.insert("category".into(), "2".into());

        let html = filter_link("movie", &query, "year", Some("1995"), "1995").into_string();
        assert!(html.contains("/admin/movie/?category=2&amp;year=1995&amp;q=heat%20%26%20co"));

        let html = filter_link("movie", &query, "category", None, "All").into_string();
        assert!(html.contains("href=\"/admin/movie/?q=heat%20%26%20co\""));
    }

    #[test]
    fn readonly_fields_render_as_text_when_editing() {
        let field = FieldSpec::new("email", "Email", FieldKind::Email).readonly_on_change();
        let mut data = FormData::default();
        data.set("email", "a@b.co");
        let media = Media::new("media", "/media/");

        let editing = field_row(&field, &data, "email", "email", true, &FieldErrors::new(), &media);
        assert!(!editing.into_string().contains("<input"));
        let adding = field_row(&field, &data, "email", "email", false, &FieldErrors::new(), &media);
        assert!(adding.into_string().contains("type=\"email\""));
    }

    #[test]
    fn image_fields_preview_stored_path() {
        let field = FieldSpec::image("poster", "Poster", crate::media::UploadTo::Movies);
        let mut data = FormData::default();
        data.set("poster", "movies/heat.jpg");
        let html = widget(&field, &data, "poster", "poster", &Media::new("media", "/media/"));
        assert!(html.into_string().contains("src=\"/media/movies/heat.jpg\""));
    }
}
