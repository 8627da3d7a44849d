// src/db/item_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::catalog::{Item, ItemVariant};

#[derive(Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Item, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO item (org_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, org_id, name, description, created_at, deleted_at
            "#,
        )
        .bind(org_id)
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    pub async fn update_item_row<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Item, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Item>(
            r#"
            UPDATE item
            SET name = $3, description = $4
            WHERE id = $2 AND org_id = $1 AND deleted_at IS NULL
            RETURNING id, org_id, name, description, created_at, deleted_at
            "#,
        )
        .bind(org_id)
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Item"))
    }

    pub async fn insert_variant<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        item_id: Uuid,
        name: &str,
        article: Option<&str>,
        ean13: Option<i64>,
    ) -> Result<ItemVariant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let variant = sqlx::query_as::<_, ItemVariant>(
            r#"
            INSERT INTO item_variant (org_id, item_id, name, article, ean13)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, item_id, org_id, name, article, ean13, created_at, deleted_at
            "#,
        )
        .bind(org_id)
        .bind(item_id)
        .bind(name)
        .bind(article)
        .bind(ean13)
        .fetch_one(executor)
        .await?;

        Ok(variant)
    }

    /// Atualiza uma variante existente mantendo o id (semântica de
    /// reconciliação: variante presente com id casa com a existente).
    pub async fn update_variant<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        item_id: Uuid,
        id: Uuid,
        name: &str,
        article: Option<&str>,
        ean13: Option<i64>,
    ) -> Result<ItemVariant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ItemVariant>(
            r#"
            UPDATE item_variant
            SET name = $4, article = $5, ean13 = $6
            WHERE id = $3 AND item_id = $2 AND org_id = $1 AND deleted_at IS NULL
            RETURNING id, item_id, org_id, name, article, ean13, created_at, deleted_at
            "#,
        )
        .bind(org_id)
        .bind(item_id)
        .bind(id)
        .bind(name)
        .bind(article)
        .bind(ean13)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Variante de item"))
    }

    pub async fn delete_variant<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        item_id: Uuid,
        id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE item_variant
            SET deleted_at = now()
            WHERE id = $3 AND item_id = $2 AND org_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(org_id)
        .bind(item_id)
        .bind(id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn find_item(&self, org_id: Uuid, id: Uuid) -> Result<Option<Item>, AppError> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, org_id, name, description, created_at, deleted_at
            FROM item
            WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    pub async fn find_active_items(&self, org_id: Uuid) -> Result<Vec<Item>, AppError> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, org_id, name, description, created_at, deleted_at
            FROM item
            WHERE org_id = $1 AND deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn find_item_variants(
        &self,
        org_id: Uuid,
        item_id: Uuid,
    ) -> Result<Vec<ItemVariant>, AppError> {
        let variants = sqlx::query_as::<_, ItemVariant>(
            r#"
            SELECT id, item_id, org_id, name, article, ean13, created_at, deleted_at
            FROM item_variant
            WHERE item_id = $2 AND org_id = $1 AND deleted_at IS NULL
            ORDER BY created_at
            "#,
        )
        .bind(org_id)
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(variants)
    }

    pub async fn delete_item<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE item
            SET deleted_at = now()
            WHERE id = $2 AND org_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(org_id)
        .bind(id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item"));
        }
        Ok(())
    }
}
