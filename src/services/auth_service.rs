// src/services/auth_service.rs

use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Session, User},
};

const YANDEX_INFO_URL: &str = "https://login.yandex.ru/info";

/// Subconjunto do perfil retornado pelo endpoint de informações do
/// Yandex OAuth que este serviço consome.
#[derive(Debug, Deserialize)]
struct YandexProfile {
    id: String,
    default_email: String,
    first_name: String,
    last_name: String,
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    http: reqwest::Client,
}

impl AuthService {
    pub fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            http: reqwest::Client::new(),
        }
    }

    /// Troca um access token do Yandex por uma sessão local. Se o e-mail
    /// do perfil ainda não tem conta, uma é criada na hora.
    pub async fn login_with_yandex(&self, access_token: &str) -> Result<(User, Session), AppError> {
        let profile = self.fetch_yandex_profile(access_token).await?;

        let user = match self.user_repo.find_by_email(&profile.default_email).await? {
            Some(user) => user,
            None => {
                let user = self
                    .user_repo
                    .create_user(
                        self.user_repo.pool(),
                        &profile.default_email,
                        &profile.first_name,
                        &profile.last_name,
                        None,
                        Some(&profile.id),
                    )
                    .await?;
                tracing::info!(user_id = %user.id, "usuário criado a partir do perfil Yandex");
                user
            }
        };

        let session = self.user_repo.create_session(user.id).await?;
        Ok((user, session))
    }

    async fn fetch_yandex_profile(&self, access_token: &str) -> Result<YandexProfile, AppError> {
        let response = self
            .http
            .get(YANDEX_INFO_URL)
            .header("Authorization", format!("OAuth {access_token}"))
            .send()
            .await
            .map_err(|e| AppError::InternalServerError(anyhow::anyhow!(e)))?;

        // Token recusado pelo provedor conta como sessão inválida, não
        // como falha interna.
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Yandex recusou o access token");
            return Err(AppError::InvalidSession);
        }

        response
            .json::<YandexProfile>()
            .await
            .map_err(|e| AppError::InternalServerError(anyhow::anyhow!(e)))
    }

    pub async fn resolve_session(&self, secret: &str) -> Result<User, AppError> {
        self.user_repo
            .find_user_by_session_secret(secret)
            .await?
            .ok_or(AppError::InvalidSession)
    }

    pub async fn logout(&self, secret: &str) -> Result<(), AppError> {
        self.user_repo.invalidate_session(secret).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Usuário"))
    }
}
