mod admin;
mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod extract;
mod media;
mod models;
mod routes;
mod templates;
mod validate;

#[cfg(test)]
mod fixtures;

use std::{net::SocketAddr, sync::Arc};

use crate::{admin::site::AdminSite, catalog::Catalog, config::Config, media::Media};

pub struct AppState {
    pub catalog: Catalog,
    pub admin: Arc<AdminSite>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,movies=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let media = Media::new(config.media_root.clone(), config.media_url.clone());
    let catalog = Catalog::new(db, media);
    let admin = Arc::new(admin::site(config.admin_title.clone()));

    let state = Arc::new(AppState { catalog, admin });
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, media_root = %config.media_root.display(), "listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
