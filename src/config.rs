use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub media_root: PathBuf,
    pub media_url: String,
    pub admin_title: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://movies.db?mode=rwc".to_string());

        let media_root =
            std::env::var("MEDIA_ROOT").map(PathBuf::from).unwrap_or_else(|_| "media".into());

        let media_url = normalize_media_url(
            &std::env::var("MEDIA_URL").unwrap_or_else(|_| "/media/".to_string()),
        )
        .context("MEDIA_URL")?;

        let admin_title = std::env::var("ADMIN_TITLE")
            .unwrap_or_else(|_| "Movies administration".to_string());

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            media_root,
            media_url,
            admin_title,
        })
    }
}

/// Media URLs are mounted as a path prefix, so they must start and end with `/`.
fn normalize_media_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        anyhow::bail!("must name a path below the site root");
    }
    Ok(format!("/{trimmed}/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_url_gets_both_slashes() {
        assert_eq!(normalize_media_url("media").unwrap(), "/media/");
        assert_eq!(normalize_media_url("/static/media/").unwrap(), "/static/media/");
    }

    #[test]
    fn media_url_cannot_be_root() {
        assert!(normalize_media_url("/").is_err());
        assert!(normalize_media_url("  ").is_err());
    }
}
