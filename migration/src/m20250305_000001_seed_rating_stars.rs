use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const STAR_VALUES: std::ops::RangeInclusive<i16> = 1..=10;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert.into_table(RatingStars::Table).columns([RatingStars::Value]);
        for value in STAR_VALUES {
            insert.values([value.into()]).map_err(|e| DbErr::Migration(e.to_string()))?;
        }

        manager.exec_stmt(insert).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(RatingStars::Table)
                    .and_where(Expr::col(RatingStars::Value).between(
                        *STAR_VALUES.start(),
                        *STAR_VALUES.end(),
                    ))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum RatingStars {
    Table,
    Value,
}
