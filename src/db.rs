use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::error::AppResult;

const PRAGMAS: [&str; 4] = [
    "PRAGMA journal_mode=WAL",
    "PRAGMA synchronous=NORMAL",
    "PRAGMA cache_size=-64000",
    "PRAGMA foreign_keys=ON",
];

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);
    // Every pooled connection to `:memory:` would open its own empty database.
    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;

    for pragma in PRAGMAS {
        db.execute(Statement::from_string(db.get_database_backend(), pragma.to_string())).await?;
    }

    migration::Migrator::up(&db, None).await?;
    info!("database migrated");
    Ok(db)
}

#[cfg(test)]
pub async fn memory() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:").await.expect("in-memory database")
}

#[cfg(test)]
mod tests {
    use sea_orm::{EntityTrait, QueryOrder};

    use super::*;
    use crate::entities::rating_star;

    #[tokio::test]
    async fn migrations_seed_star_values() {
        let db = memory().await;
        let stars = rating_star::Entity::find()
            .order_by_desc(rating_star::Column::Value)
            .all(&db)
            .await
            .unwrap();
        let values: Vec<i16> = stars.iter().map(|s| s.value).collect();
        assert_eq!(values, (1..=10).rev().collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn migrating_twice_is_a_no_op() {
        let db = memory().await;
        migration::Migrator::up(&db, None).await.unwrap();
        assert_eq!(rating_star::Entity::find().all(&db).await.unwrap().len(), 10);
    }
}
