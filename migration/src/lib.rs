pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_catalog;
mod m20250301_000002_create_ratings_reviews;
mod m20250305_000001_seed_rating_stars;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_catalog::Migration),
            Box::new(m20250301_000002_create_ratings_reviews::Migration),
            Box::new(m20250305_000001_seed_rating_stars::Migration),
        ]
    }
}
