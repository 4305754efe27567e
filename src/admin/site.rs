use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;

use super::forms::{FieldSpec, FormData};
use crate::{
    catalog::Catalog,
    error::{AppError, AppResult},
};

/// One value in a change-list row.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    /// Rendered as a link to the row's change page.
    Link(String),
    /// Checkbox saved with the list's "Save" button.
    EditableFlag { name: String, value: bool },
    Image { url: String, width: u32, height: u32 },
}

#[derive(Clone, Debug)]
pub struct ListRow {
    pub id: i32,
    pub cells: Vec<Cell>,
}

/// Search text and active filters of a change list.
#[derive(Clone, Debug, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn filter_id(&self, name: &str) -> Option<i32> {
        self.filters.get(name).and_then(|v| v.parse().ok())
    }
}

#[derive(Clone, Debug)]
pub struct ListFilter {
    pub param: &'static str,
    pub label: &'static str,
    pub choices: Vec<(String, String)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BulkAction {
    pub name: &'static str,
    pub label: &'static str,
}

pub const DELETE_SELECTED: BulkAction =
    BulkAction { name: "delete_selected", label: "Delete selected" };

/// Related rows edited on their parent's change page.
#[derive(Clone, Debug)]
pub struct Inline {
    pub prefix: &'static str,
    pub title: &'static str,
    pub fields: Vec<FieldSpec>,
    /// Existing rows, each carrying its `id`.
    pub rows: Vec<FormData>,
    pub extra: usize,
}

/// How one entity is listed, edited and deleted in the admin.
#[async_trait]
pub trait ModelAdmin: Send + Sync {
    /// URL segment under `/admin/`.
    fn key(&self) -> &'static str;
    fn verbose_name(&self) -> &'static str;
    fn verbose_name_plural(&self) -> &'static str;
    fn list_display(&self) -> &'static [&'static str];

    /// Placeholder of the search box; `None` hides it.
    fn search_help(&self) -> Option<&'static str> {
        None
    }

    /// Bulk actions beyond "delete selected".
    fn actions(&self) -> Vec<BulkAction> {
        Vec::new()
    }

    async fn filters(&self, _catalog: &Catalog) -> AppResult<Vec<ListFilter>> {
        Ok(Vec::new())
    }

    async fn rows(&self, catalog: &Catalog, query: &ListQuery) -> AppResult<Vec<ListRow>>;

    async fn fields(&self, catalog: &Catalog) -> AppResult<Vec<FieldSpec>>;

    /// Values of a blank add form.
    fn defaults(&self) -> FormData {
        FormData::default()
    }

    /// Values of an existing object, `NotFound` if it is gone.
    async fn initial(&self, catalog: &Catalog, id: i32) -> AppResult<FormData>;

    /// Display name of an existing object.
    async fn describe(&self, catalog: &Catalog, id: i32) -> AppResult<String>;

    /// Creates (`id == None`) or updates an object, returning its id.
    /// Rejected input comes back as `AppError::Validation`.
    async fn save(&self, catalog: &Catalog, id: Option<i32>, data: &FormData) -> AppResult<i32>;

    async fn delete(&self, catalog: &Catalog, id: i32) -> AppResult<bool>;

    async fn inlines(&self, _catalog: &Catalog, _id: Option<i32>) -> AppResult<Vec<Inline>> {
        Ok(Vec::new())
    }

    /// Runs one of [`ModelAdmin::actions`], returning the affected row count.
    async fn run_action(&self, _catalog: &Catalog, action: &str, _ids: &[i32]) -> AppResult<u64> {
        Err(AppError::BadRequest(format!("Unknown action \"{action}\".")))
    }

    /// Saves the editable columns of the change list.
    async fn save_list(&self, _catalog: &Catalog, _data: &FormData) -> AppResult<u64> {
        Ok(0)
    }
}

/// Registry of every model exposed in the admin, in display order.
pub struct AdminSite {
    pub title: String,
    models: Vec<Arc<dyn ModelAdmin>>,
}

impl AdminSite {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), models: Vec::new() }
    }

    pub fn register(mut self, admin: impl ModelAdmin + 'static) -> Self {
        self.models.push(Arc::new(admin));
        self
    }

    pub fn models(&self) -> &[Arc<dyn ModelAdmin>] {
        &self.models
    }

    pub fn get(&self, key: &str) -> AppResult<Arc<dyn ModelAdmin>> {
        self.models.iter().find(|m| m.key() == key).cloned().ok_or(AppError::NotFound)
    }

    /// Every action a change list offers: the model's own, then delete.
    pub fn actions_for(&self, admin: &dyn ModelAdmin) -> Vec<BulkAction> {
        let mut actions = admin.actions();
        actions.push(DELETE_SELECTED);
        actions
    }

    /// Runs a bulk action over `ids`, returning the affected row count.
    pub async fn run_action(
        &self,
        admin: &dyn ModelAdmin,
        catalog: &Catalog,
        action: &str,
        ids: &[i32],
    ) -> AppResult<u64> {
        if action == DELETE_SELECTED.name {
            let mut deleted = 0;
            for id in ids {
                if admin.delete(catalog, *id).await? {
                    deleted += 1;
                }
            }
            return Ok(deleted);
        }
        admin.run_action(catalog, action, ids).await
    }
}

/// Django-style count message for bulk updates.
pub fn rows_updated_message(count: u64) -> String {
    if count == 1 {
        "1 record was updated.".to_string()
    } else {
        format!("{count} records were updated.")
    }
}
