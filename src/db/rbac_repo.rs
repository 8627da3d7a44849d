// src/db/rbac_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::rbac::{Role, RoleBinding, RolePermission};

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_roles(&self) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, display_name
            FROM role
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    pub async fn find_role_permissions(&self) -> Result<Vec<RolePermission>, AppError> {
        let permissions = sqlx::query_as::<_, RolePermission>(
            r#"
            SELECT role_id, permission
            FROM role_permission
            ORDER BY role_id, permission
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }

    /// Todos os vínculos de cargo da organização.
    pub async fn find_bindings(&self, org_id: Uuid) -> Result<Vec<RoleBinding>, AppError> {
        let bindings = sqlx::query_as::<_, RoleBinding>(
            r#"
            SELECT id, org_id, user_id, role_id, created_at
            FROM role_binding
            WHERE org_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bindings)
    }

    /// União das permissões de todos os cargos do usuário na organização.
    /// Usuário sem vínculo nenhum recebe um conjunto vazio, não um erro.
    pub async fn user_permissions(
        &self,
        user_id: Uuid,
        org_id: Uuid,
    ) -> Result<Vec<String>, AppError> {
        let permissions = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT rp.permission
            FROM role_binding rb
            JOIN role_permission rp ON rp.role_id = rb.role_id
            WHERE rb.user_id = $1 AND rb.org_id = $2
            "#,
        )
        .bind(user_id)
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }

    /// Vincula um cargo ao usuário dentro da organização. Usado na criação
    /// da organização (cargo owner), dentro da mesma transação.
    pub async fn assign_role<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        user_id: Uuid,
        role_id: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO role_binding (org_id, user_id, role_id)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(org_id)
        .bind(user_id)
        .bind(role_id)
        .execute(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("Usuário ou cargo");
                }
            }
            e.into()
        })?;

        Ok(())
    }
}
