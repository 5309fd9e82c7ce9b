// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 记录表迁移
///
/// 每种记录类型一张表：自增主键、声明字段、插入时间，以及唯一性字段上的唯一索引
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WikipediaArticles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WikipediaArticles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WikipediaArticles::Pageid)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WikipediaArticles::Title).string_len(500))
                    .col(ColumnDef::new(WikipediaArticles::Summary).text())
                    .col(ColumnDef::new(WikipediaArticles::Url).string_len(1000))
                    .col(ColumnDef::new(WikipediaArticles::FullText).text())
                    .col(ColumnDef::new(WikipediaArticles::CreatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_wikipedia_articles_pageid")
                    .table(WikipediaArticles::Table)
                    .col(WikipediaArticles::Pageid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Quotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Quotes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Quotes::Text).text().not_null())
                    .col(ColumnDef::new(Quotes::Author).string_len(255))
                    .col(ColumnDef::new(Quotes::Tags).string_len(1000))
                    .col(ColumnDef::new(Quotes::CreatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_quotes_text")
                    .table(Quotes::Table)
                    .col(Quotes::Text)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DivarListings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DivarListings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DivarListings::Token).string_len(64).not_null())
                    .col(ColumnDef::new(DivarListings::Title).string_len(500))
                    .col(ColumnDef::new(DivarListings::Price).string_len(255))
                    .col(ColumnDef::new(DivarListings::Url).string_len(1000))
                    .col(ColumnDef::new(DivarListings::CreatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_divar_listings_token")
                    .table(DivarListings::Table)
                    .col(DivarListings::Token)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DivarListings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Quotes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WikipediaArticles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum WikipediaArticles {
    Table,
    Id,
    Pageid,
    Title,
    Summary,
    Url,
    FullText,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Quotes {
    Table,
    Id,
    Text,
    Author,
    Tags,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DivarListings {
    Table,
    Id,
    Token,
    Title,
    Price,
    Url,
    CreatedAt,
}
