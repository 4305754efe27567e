//! Field-level checks shared by the API payloads and the admin forms.

use std::sync::LazyLock;

use regex::Regex;

pub const REQUIRED: &str = "This field is required.";

pub fn max_length(value: &str, max: usize) -> Option<String> {
    let len = value.chars().count();
    (len > max).then(|| {
        format!("Ensure this field has no more than {max} characters (it has {len}).")
    })
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9._%+\-]+@(?:[a-zA-Z0-9](?:[a-zA-Z0-9\-]*[a-zA-Z0-9])?\.)+[a-zA-Z]{2,}$",
    )
    .expect("valid regex")
});

static SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9_\-]+$").expect("valid regex"));

/// A local part, then dot-separated domain labels that neither start nor end
/// with a hyphen, ending in an alphabetic top-level domain.
pub fn email(value: &str) -> Option<String> {
    (!EMAIL.is_match(value)).then(|| "Enter a valid email address.".to_string())
}

pub fn slug(value: &str) -> Option<String> {
    (!SLUG.is_match(value)).then(|| {
        "Enter a valid slug consisting of lowercase letters, numbers, underscores or hyphens."
            .to_string()
    })
}
