//! Initial migration to create the document store schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_documents(manager).await?;
        self.create_document_index(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DocumentIndex::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    async fn create_documents(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Documents::Id).uuid().not_null().primary_key())
                    // Identity
                    .col(
                        ColumnDef::new(Documents::Collection)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Documents::NaturalKey).string().not_null())
                    // Content
                    .col(
                        ColumnDef::new(Documents::Body)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(
                        ColumnDef::new(Documents::Raw)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    // Tracking
                    .col(
                        ColumnDef::new(Documents::LastSynced)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Documents::LastAccessed)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique constraint on (collection, natural_key); upserts conflict on it
        manager
            .create_index(
                Index::create()
                    .name("idx_documents_collection_key")
                    .table(Documents::Table)
                    .col(Documents::Collection)
                    .col(Documents::NaturalKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Recency and staleness queries
        manager
            .create_index(
                Index::create()
                    .name("idx_documents_collection_synced")
                    .table(Documents::Table)
                    .col(Documents::Collection)
                    .col(Documents::LastSynced)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_document_index(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DocumentIndex::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentIndex::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DocumentIndex::Collection)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(DocumentIndex::NaturalKey).string().not_null())
                    .col(ColumnDef::new(DocumentIndex::Field).string_len(16).not_null())
                    .col(ColumnDef::new(DocumentIndex::Value).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_document_index_entry")
                    .table(DocumentIndex::Table)
                    .col(DocumentIndex::Collection)
                    .col(DocumentIndex::NaturalKey)
                    .col(DocumentIndex::Field)
                    .col(DocumentIndex::Value)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Lookup by (collection, field, value)
        manager
            .create_index(
                Index::create()
                    .name("idx_document_index_lookup")
                    .table(DocumentIndex::Table)
                    .col(DocumentIndex::Collection)
                    .col(DocumentIndex::Field)
                    .col(DocumentIndex::Value)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
#[sea_orm(iden = "documents")]
enum Documents {
    Table,
    Id,
    Collection,
    NaturalKey,
    Body,
    Raw,
    LastSynced,
    LastAccessed,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "document_index")]
enum DocumentIndex {
    Table,
    Id,
    Collection,
    NaturalKey,
    Field,
    Value,
}
