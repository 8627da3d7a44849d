// src/db/tenancy_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::{AppError, map_unique_violation};
use crate::models::tenancy::{Organization, OrganizationUnit};

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Organizações
    // ---

    pub async fn create_org<'e, E>(
        &self,
        executor: E,
        name: &str,
        subdomain: &str,
    ) -> Result<Organization, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO org (name, subdomain)
            VALUES ($1, $2)
            RETURNING id, name, subdomain, created_at, deleted_at
            "#,
        )
        .bind(name)
        .bind(subdomain)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Já existe uma organização com este subdomínio."))
    }

    /// Busca uma organização ativa. Soft-deletada conta como inexistente.
    pub async fn find_org(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            SELECT id, name, subdomain, created_at, deleted_at
            FROM org
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }

    /// Organizações ativas nas quais o usuário tem algum cargo.
    pub async fn find_orgs_for_user(&self, user_id: Uuid) -> Result<Vec<Organization>, AppError> {
        let orgs = sqlx::query_as::<_, Organization>(
            r#"
            SELECT DISTINCT o.id, o.name, o.subdomain, o.created_at, o.deleted_at
            FROM org o
            JOIN role_binding rb ON rb.org_id = o.id
            WHERE rb.user_id = $1 AND o.deleted_at IS NULL
            ORDER BY o.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orgs)
    }

    pub async fn update_org<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        subdomain: &str,
    ) -> Result<Organization, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Organization>(
            r#"
            UPDATE org
            SET name = $2, subdomain = $3
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, subdomain, created_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(subdomain)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Já existe uma organização com este subdomínio."))?
        .ok_or(AppError::NotFound("Organização"))
    }

    /// Soft delete: marca o timestamp sem tocar nos filhos (a política de
    /// exclusão é por entidade, nunca em cascata).
    pub async fn delete_org<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE org
            SET deleted_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Organização"));
        }
        Ok(())
    }

    pub async fn is_org_exists(&self, id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM org WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    // ---
    // Unidades
    // ---

    pub async fn create_unit<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        name: &str,
        alias: &str,
        address: Option<&str>,
    ) -> Result<OrganizationUnit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, OrganizationUnit>(
            r#"
            INSERT INTO org_unit (org_id, name, alias, address)
            VALUES ($1, $2, $3, $4)
            RETURNING id, org_id, name, alias, address, created_at, deleted_at
            "#,
        )
        .bind(org_id)
        .bind(name)
        .bind(alias)
        .bind(address)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Já existe uma unidade com este alias."))
    }

    pub async fn find_unit(
        &self,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<Option<OrganizationUnit>, AppError> {
        let unit = sqlx::query_as::<_, OrganizationUnit>(
            r#"
            SELECT id, org_id, name, alias, address, created_at, deleted_at
            FROM org_unit
            WHERE id = $1 AND org_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(unit)
    }

    pub async fn find_active_units(&self, org_id: Uuid) -> Result<Vec<OrganizationUnit>, AppError> {
        let units = sqlx::query_as::<_, OrganizationUnit>(
            r#"
            SELECT id, org_id, name, alias, address, created_at, deleted_at
            FROM org_unit
            WHERE org_id = $1 AND deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(units)
    }

    pub async fn update_unit<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        id: Uuid,
        name: &str,
        alias: &str,
        address: Option<&str>,
    ) -> Result<OrganizationUnit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, OrganizationUnit>(
            r#"
            UPDATE org_unit
            SET name = $3, alias = $4, address = $5
            WHERE id = $2 AND org_id = $1 AND deleted_at IS NULL
            RETURNING id, org_id, name, alias, address, created_at, deleted_at
            "#,
        )
        .bind(org_id)
        .bind(id)
        .bind(name)
        .bind(alias)
        .bind(address)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Já existe uma unidade com este alias."))?
        .ok_or(AppError::NotFound("Unidade"))
    }

    pub async fn delete_unit<'e, E>(
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
            UPDATE org_unit
            SET deleted_at = now()
            WHERE id = $2 AND org_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(org_id)
        .bind(id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Unidade"));
        }
        Ok(())
    }

    /// Checagem booleana de referência estrangeira vinda do chamador:
    /// nunca erra por "não encontrado".
    pub async fn is_unit_exists(&self, org_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM org_unit
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
}
