// src/db/storage_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::{AppError, map_unique_violation};
use crate::models::storage::{Cell, CellsGroup, StorageGroup};

#[derive(Clone)]
pub struct StorageRepository {
    pool: PgPool,
}

impl StorageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Grupos de armazenamento
    // ---

    pub async fn create_storage_group<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        unit_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        alias: &str,
    ) -> Result<StorageGroup, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, StorageGroup>(
            r#"
            INSERT INTO storage_group (org_id, unit_id, parent_id, name, alias)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, org_id, unit_id, parent_id, name, alias, created_at, deleted_at
            "#,
        )
        .bind(org_id)
        .bind(unit_id)
        .bind(parent_id)
        .bind(name)
        .bind(alias)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Já existe um grupo com este alias na unidade."))
    }

    pub async fn find_storage_group(
        &self,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<Option<StorageGroup>, AppError> {
        let group = sqlx::query_as::<_, StorageGroup>(
            r#"
            SELECT id, org_id, unit_id, parent_id, name, alias, created_at, deleted_at
            FROM storage_group
            WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    pub async fn find_active_storage_groups(
        &self,
        org_id: Uuid,
    ) -> Result<Vec<StorageGroup>, AppError> {
        let groups = sqlx::query_as::<_, StorageGroup>(
            r#"
            SELECT id, org_id, unit_id, parent_id, name, alias, created_at, deleted_at
            FROM storage_group
            WHERE org_id = $1 AND deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    pub async fn update_storage_group<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        alias: &str,
    ) -> Result<StorageGroup, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, StorageGroup>(
            r#"
            UPDATE storage_group
            SET parent_id = $3, name = $4, alias = $5
            WHERE id = $2 AND org_id = $1 AND deleted_at IS NULL
            RETURNING id, org_id, unit_id, parent_id, name, alias, created_at, deleted_at
            "#,
        )
        .bind(org_id)
        .bind(id)
        .bind(parent_id)
        .bind(name)
        .bind(alias)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Já existe um grupo com este alias na unidade."))?
        .ok_or(AppError::NotFound("Grupo de armazenamento"))
    }

    /// Soft delete não-cascateante: os filhos do grupo continuam
    /// endereçáveis por id.
    pub async fn delete_storage_group<'e, E>(
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
            UPDATE storage_group
            SET deleted_at = now()
            WHERE id = $2 AND org_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(org_id)
        .bind(id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Grupo de armazenamento"));
        }
        Ok(())
    }

    pub async fn is_storage_group_exists(&self, org_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM storage_group
                WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL
            )
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    // ---
    // Grupos de células
    // ---

    pub async fn create_cells_group<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        storage_group_id: Uuid,
        name: &str,
        alias: &str,
    ) -> Result<CellsGroup, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CellsGroup>(
            r#"
            INSERT INTO cells_group (org_id, storage_group_id, name, alias)
            VALUES ($1, $2, $3, $4)
            RETURNING id, org_id, storage_group_id, name, alias, created_at, deleted_at
            "#,
        )
        .bind(org_id)
        .bind(storage_group_id)
        .bind(name)
        .bind(alias)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Já existe um grupo de células com este alias."))
    }

    pub async fn find_cells_group(
        &self,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<Option<CellsGroup>, AppError> {
        let group = sqlx::query_as::<_, CellsGroup>(
            r#"
            SELECT id, org_id, storage_group_id, name, alias, created_at, deleted_at
            FROM cells_group
            WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    pub async fn find_active_cells_groups(&self, org_id: Uuid) -> Result<Vec<CellsGroup>, AppError> {
        let groups = sqlx::query_as::<_, CellsGroup>(
            r#"
            SELECT id, org_id, storage_group_id, name, alias, created_at, deleted_at
            FROM cells_group
            WHERE org_id = $1 AND deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    pub async fn update_cells_group<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        id: Uuid,
        name: &str,
        alias: &str,
    ) -> Result<CellsGroup, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CellsGroup>(
            r#"
            UPDATE cells_group
            SET name = $3, alias = $4
            WHERE id = $2 AND org_id = $1 AND deleted_at IS NULL
            RETURNING id, org_id, storage_group_id, name, alias, created_at, deleted_at
            "#,
        )
        .bind(org_id)
        .bind(id)
        .bind(name)
        .bind(alias)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Já existe um grupo de células com este alias."))?
        .ok_or(AppError::NotFound("Grupo de células"))
    }

    pub async fn delete_cells_group<'e, E>(
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
            UPDATE cells_group
            SET deleted_at = now()
            WHERE id = $2 AND org_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(org_id)
        .bind(id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Grupo de células"));
        }
        Ok(())
    }

    pub async fn is_cells_group_exists(&self, org_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM cells_group
                WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL
            )
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    // ---
    // Células
    // ---

    pub async fn create_cell<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        cells_group_id: Uuid,
        alias: &str,
        row: i32,
        level: i32,
        position: i32,
    ) -> Result<Cell, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Cell>(
            r#"
            INSERT INTO cell (org_id, cells_group_id, alias, "row", level, position)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, org_id, cells_group_id, alias, "row", level, position, created_at, deleted_at
            "#,
        )
        .bind(org_id)
        .bind(cells_group_id)
        .bind(alias)
        .bind(row)
        .bind(level)
        .bind(position)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            map_unique_violation(e, "Já existe uma célula nesta posição (linha/nível/posição).")
        })
    }

    pub async fn find_cell(&self, org_id: Uuid, id: Uuid) -> Result<Option<Cell>, AppError> {
        let cell = sqlx::query_as::<_, Cell>(
            r#"
            SELECT id, org_id, cells_group_id, alias, "row", level, position, created_at, deleted_at
            FROM cell
            WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cell)
    }

    pub async fn find_cells_in_group(
        &self,
        org_id: Uuid,
        cells_group_id: Uuid,
    ) -> Result<Vec<Cell>, AppError> {
        let cells = sqlx::query_as::<_, Cell>(
            r#"
            SELECT id, org_id, cells_group_id, alias, "row", level, position, created_at, deleted_at
            FROM cell
            WHERE cells_group_id = $2 AND org_id = $1 AND deleted_at IS NULL
            ORDER BY "row", level, position
            "#,
        )
        .bind(org_id)
        .bind(cells_group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cells)
    }

    pub async fn update_cell<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        id: Uuid,
        alias: &str,
        row: i32,
        level: i32,
        position: i32,
    ) -> Result<Cell, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Cell>(
            r#"
            UPDATE cell
            SET alias = $3, "row" = $4, level = $5, position = $6
            WHERE id = $2 AND org_id = $1 AND deleted_at IS NULL
            RETURNING id, org_id, cells_group_id, alias, "row", level, position, created_at, deleted_at
            "#,
        )
        .bind(org_id)
        .bind(id)
        .bind(alias)
        .bind(row)
        .bind(level)
        .bind(position)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            map_unique_violation(e, "Já existe uma célula nesta posição (linha/nível/posição).")
        })?
        .ok_or(AppError::NotFound("Célula"))
    }

    pub async fn delete_cell<'e, E>(
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
            UPDATE cell
            SET deleted_at = now()
            WHERE id = $2 AND org_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(org_id)
        .bind(id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Célula"));
        }
        Ok(())
    }
}
