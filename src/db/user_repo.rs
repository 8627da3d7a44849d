// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::{AppError, map_unique_violation};
use crate::models::auth::{Session, User};

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, first_name, last_name, middle_name, yandex_id, created_at
            FROM app_user
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, first_name, last_name, middle_name, yandex_id, created_at
            FROM app_user
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        first_name: &str,
        last_name: &str,
        middle_name: Option<&str>,
        yandex_id: Option<&str>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO app_user (email, first_name, last_name, middle_name, yandex_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, first_name, last_name, middle_name, yandex_id, created_at
            "#,
        )
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(middle_name)
        .bind(yandex_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "Já existe um usuário com este e-mail."))
    }

    /// Cria uma sessão com um segredo opaco recém-gerado.
    pub async fn create_session(&self, user_id: Uuid) -> Result<Session, AppError> {
        let secret = Uuid::new_v4().to_string();

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO user_session (user_id, secret)
            VALUES ($1, $2)
            RETURNING id, user_id, secret, created_at, invalidated_at
            "#,
        )
        .bind(user_id)
        .bind(secret)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Resolve o dono de uma sessão ativa; sessões invalidadas não contam.
    pub async fn find_user_by_session_secret(
        &self,
        secret: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.first_name, u.last_name, u.middle_name, u.yandex_id, u.created_at
            FROM app_user u
            JOIN user_session s ON s.user_id = u.id
            WHERE s.secret = $1 AND s.invalidated_at IS NULL
            "#,
        )
        .bind(secret)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn invalidate_session(&self, secret: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE user_session
            SET invalidated_at = now()
            WHERE secret = $1 AND invalidated_at IS NULL
            "#,
        )
        .bind(secret)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
