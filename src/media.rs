use std::path::{Component, Path, PathBuf};

use tower_http::services::ServeDir;

/// Directory below the media root that a kind of image lives in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UploadTo {
    Actors,
    Movies,
    MovieShots,
}

impl UploadTo {
    pub fn prefix(self) -> &'static str {
        match self {
            UploadTo::Actors => "actors/",
            UploadTo::Movies => "movies/",
            UploadTo::MovieShots => "movies_shot/",
        }
    }

    /// Turns admin input into a stored path inside this directory. A bare
    /// file name is placed into the directory; anything that would leave it
    /// is rejected.
    pub fn normalize(self, raw: &str) -> Result<String, String> {
        let raw = raw.trim().trim_start_matches('/');
        if raw.is_empty() {
            return Err(crate::validate::REQUIRED.to_string());
        }

        let relative = raw.strip_prefix(self.prefix()).unwrap_or(raw);
        let safe = Path::new(relative).components().all(|c| matches!(c, Component::Normal(_)));
        if !safe || relative.contains('\\') {
            return Err(format!("Image path must stay inside {}", self.prefix()));
        }

        Ok(format!("{}{}", self.prefix(), relative))
    }
}

/// Where stored image paths are served from.
#[derive(Clone, Debug)]
pub struct Media {
    root: PathBuf,
    url: String,
}

impl Media {
    pub fn new(root: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self { root: root.into(), url: url.into() }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.url, path.trim_start_matches('/'))
    }

    pub fn mount_point(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn service(&self) -> ServeDir {
        ServeDir::new(&self.root)
    }
}
