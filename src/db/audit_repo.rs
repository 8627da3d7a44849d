// src/db/audit_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::audit::{NewObjectChange, ObjectChange, ObjectType};

// Repositório append-only: inserir e consultar, nada de update/delete.
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insere um registro de mudança. Recebe um executor para participar
    /// da MESMA transação da mutação de negócio que ele descreve.
    pub async fn insert_object_change<'e, E>(
        &self,
        executor: E,
        change: &NewObjectChange,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO object_change
                (org_id, user_id, action, target_object_type, target_object_id,
                 prechange_state, postchange_state)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(change.org_id)
        .bind(change.user_id)
        .bind(change.action)
        .bind(change.target_object_type)
        .bind(change.target_object_id)
        .bind(&change.prechange_state)
        .bind(&change.postchange_state)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Todas as mudanças de um objeto, na ordem de commit (seq).
    pub async fn find_object_changes(
        &self,
        org_id: Uuid,
        target_object_type: ObjectType,
        target_object_id: Uuid,
    ) -> Result<Vec<ObjectChange>, AppError> {
        let changes = sqlx::query_as::<_, ObjectChange>(
            r#"
            SELECT id, seq, org_id, user_id, action, target_object_type,
                   target_object_id, prechange_state, postchange_state, created_at
            FROM object_change
            WHERE org_id = $1 AND target_object_type = $2 AND target_object_id = $3
            ORDER BY seq
            "#,
        )
        .bind(org_id)
        .bind(target_object_type)
        .bind(target_object_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(changes)
    }
}
