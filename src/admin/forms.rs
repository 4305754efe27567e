//! Admin form fields: what each input is, and turning submitted strings
//! into typed values or per-field errors.

use std::collections::BTreeMap;

use jiff::civil::Date;

use crate::{
    catalog::EMAIL_MAX,
    error::Invalid,
    media::UploadTo,
    validate,
};

/// Submitted `application/x-www-form-urlencoded` pairs, order preserved so
/// multi-selects and checkbox lists keep every value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0.iter().filter(move |(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    /// Replaces every value of `name` with a single one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.0.retain(|(k, _)| *k != name);
        self.0.push((name, value.into()));
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Every value of `name` that parses as an id.
    pub fn ids(&self, name: &str) -> Vec<i32> {
        self.all(name).filter_map(|v| v.trim().parse().ok()).collect()
    }

    /// Copies the pairs of `other` whose key this form lacks.
    pub fn fill_missing(&mut self, other: &FormData) {
        for (k, v) in &other.0 {
            if !self.has(k) {
                self.0.push((k.clone(), v.clone()));
            }
        }
    }

    /// The pairs under `{prefix}-`, with the prefix removed.
    pub fn strip_prefix(&self, prefix: &str) -> FormData {
        let prefix = format!("{prefix}-");
        FormData(
            self.0
                .iter()
                .filter_map(|(k, v)| k.strip_prefix(&prefix).map(|k| (k.to_string(), v.clone())))
                .collect(),
        )
    }
}

#[derive(Clone, Debug)]
pub enum FieldKind {
    Char { max: usize },
    Text { max: Option<usize>, rich: bool },
    Email,
    Slug { max: usize },
    /// Non-negative whole number.
    Number,
    Date,
    Flag,
    Image { upload_to: UploadTo, preview: (u32, u32) },
    Choice(Vec<(i32, String)>),
    Choices(Vec<(i32, String)>),
}

#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub help: Option<&'static str>,
    /// Shown but not editable once the object exists.
    pub readonly_on_change: bool,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        let required = !matches!(kind, FieldKind::Flag | FieldKind::Choices(_));
        Self { name, label, kind, required, help: None, readonly_on_change: false }
    }

    pub fn char(name: &'static str, label: &'static str, max: usize) -> Self {
        Self::new(name, label, FieldKind::Char { max })
    }

    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text { max: None, rich: false })
    }

    pub fn rich_text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text { max: None, rich: true })
    }

    pub fn image(name: &'static str, label: &'static str, upload_to: UploadTo) -> Self {
        Self::new(name, label, FieldKind::Image { upload_to, preview: (120, 120) })
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    pub fn readonly_on_change(mut self) -> Self {
        self.readonly_on_change = true;
        self
    }

    pub fn preview(mut self, width: u32, height: u32) -> Self {
        if let FieldKind::Image { preview, .. } = &mut self.kind {
            *preview = (width, height);
        }
        self
    }

    pub fn is_editable(&self, editing: bool) -> bool {
        !(editing && self.readonly_on_change)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Clean {
    Text(String),
    Number(i64),
    Flag(bool),
    Id(Option<i32>),
    Ids(Vec<i32>),
}

/// Typed values of a form that passed validation. Fields left out because
/// they are read-only read as absent.
#[derive(Clone, Debug, Default)]
pub struct Cleaned(BTreeMap<&'static str, Clean>);

impl Cleaned {
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn text(&self, name: &str) -> String {
        match self.0.get(name) {
            Some(Clean::Text(s)) => s.clone(),
            _ => String::new(),
        }
    }

    pub fn number(&self, name: &str) -> i64 {
        match self.0.get(name) {
            Some(Clean::Number(n)) => *n,
            _ => 0,
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(Clean::Flag(true)))
    }

    pub fn id(&self, name: &str) -> Option<i32> {
        match self.0.get(name) {
            Some(Clean::Id(id)) => *id,
            _ => None,
        }
    }

    pub fn ids(&self, name: &str) -> Vec<i32> {
        match self.0.get(name) {
            Some(Clean::Ids(ids)) => ids.clone(),
            _ => Vec::new(),
        }
    }
}

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Validates `data` against `fields`, reporting errors under
/// `{prefix}{field}` so inline rows can share one error map.
pub fn clean(
    fields: &[FieldSpec],
    data: &FormData,
    editing: bool,
    prefix: &str,
    invalid: &mut Invalid,
) -> Cleaned {
    let mut cleaned = Cleaned::default();

    for field in fields.iter().filter(|f| f.is_editable(editing)) {
        let key = format!("{prefix}{}", field.name);
        let raw = data.get(field.name).unwrap_or_default().trim();

        if raw.is_empty() && field.required && !matches!(field.kind, FieldKind::Flag) {
            invalid.add(key, validate::REQUIRED);
            continue;
        }

        let value = match &field.kind {
            FieldKind::Char { max } | FieldKind::Slug { max } => {
                if let Some(msg) = validate::max_length(raw, *max) {
                    invalid.add(&key, msg);
                }
                if matches!(field.kind, FieldKind::Slug { .. }) {
                    if let Some(msg) = validate::slug(raw) {
                        invalid.add(&key, msg);
                    }
                }
                Clean::Text(raw.to_string())
            }
            FieldKind::Text { max, .. } => {
                if let Some(msg) = max.and_then(|max| validate::max_length(raw, max)) {
                    invalid.add(&key, msg);
                }
                Clean::Text(raw.to_string())
            }
            FieldKind::Email => {
                if !raw.is_empty() {
                    if let Some(msg) = validate::max_length(raw, EMAIL_MAX) {
                        invalid.add(&key, msg);
                    } else if let Some(msg) = validate::email(raw) {
                        invalid.add(&key, msg);
                    }
                }
                Clean::Text(raw.to_string())
            }
            FieldKind::Number => match raw.parse::<i64>() {
                _ if raw.is_empty() => Clean::Number(0),
                Ok(n) if n >= 0 => Clean::Number(n),
                Ok(_) => {
                    invalid.add(&key, "Ensure this value is greater than or equal to 0.");
                    continue;
                }
                Err(_) => {
                    invalid.add(&key, "Enter a whole number.");
                    continue;
                }
            },
            FieldKind::Date => match raw.parse::<Date>() {
                Ok(date) => Clean::Text(date.to_string()),
                Err(_) => {
                    invalid.add(&key, "Enter a valid date.");
                    continue;
                }
            },
            FieldKind::Flag => Clean::Flag(matches!(raw, "on" | "true" | "1")),
            FieldKind::Image { upload_to, .. } => match upload_to.normalize(raw) {
                Ok(path) => Clean::Text(path),
                Err(msg) => {
                    invalid.add(&key, msg);
                    continue;
                }
            },
            FieldKind::Choice(choices) => {
                if raw.is_empty() {
                    Clean::Id(None)
                } else {
                    match raw.parse::<i32>().ok().filter(|id| choices.iter().any(|(c, _)| c == id)) {
                        Some(id) => Clean::Id(Some(id)),
                        None => {
                            invalid.add(&key, INVALID_CHOICE);
                            continue;
                        }
                    }
                }
            }
            FieldKind::Choices(choices) => {
                let ids = data.ids(field.name);
                if ids.iter().any(|id| !choices.iter().any(|(c, _)| c == id)) {
                    invalid.add(&key, INVALID_CHOICE);
                    continue;
                }
                if ids.is_empty() && field.required {
                    invalid.add(&key, validate::REQUIRED);
                    continue;
                }
                Clean::Ids(ids)
            }
        };
        cleaned.0.insert(field.name, value);
    }

    cleaned
}

/// One submitted row of an inline formset.
#[derive(Clone, Debug)]
pub struct InlineSubmission {
    pub index: usize,
    pub id: Option<i32>,
    pub delete: bool,
    pub data: FormData,
}

/// Upper bound on rows read from one inline formset.
pub const MAX_NUM_FORMS: usize = 1000;

pub fn total_key(prefix: &str) -> String {
    format!("{prefix}-TOTAL")
}

/// Reads the rows of the `{prefix}` formset, dropping blank extra rows.
pub fn inline_rows(data: &FormData, prefix: &str) -> Vec<InlineSubmission> {
    let total = data
        .get(&total_key(prefix))
        .and_then(|t| t.parse::<usize>().ok())
        .unwrap_or(0)
        .min(MAX_NUM_FORMS);

    (0..total)
        .filter_map(|index| {
            let row = data.strip_prefix(&format!("{prefix}-{index}"));
            let id = row.get("id").and_then(|v| v.parse().ok());
            let delete = row.has("DELETE");
            let blank = row.0.iter().all(|(k, v)| k == "id" || v.trim().is_empty());
            if id.is_none() && (blank || delete) {
                return None;
            }
            Some(InlineSubmission { index, id, delete, data: row })
        })
        .collect()
}
