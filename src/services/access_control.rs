// src/services/access_control.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrganizationRepository, RbacRepository},
    models::rbac::{
        ROLE_ADMIN, ROLE_MANAGER, ROLE_OWNER, ROLE_WORKER, Role, RoleBinding, RolePermission,
        permissions,
    },
};

// Funil único de autorização: toda entrada mutante dos serviços de
// hierarquia/catálogo passa por aqui antes de tocar na persistência.
// Um bug aqui é vazamento entre tenants.
#[derive(Clone)]
pub struct AccessControlService {
    rbac_repo: RbacRepository,
    org_repo: OrganizationRepository,
}

impl AccessControlService {
    pub fn new(rbac_repo: RbacRepository, org_repo: OrganizationRepository) -> Self {
        Self { rbac_repo, org_repo }
    }

    /// Autoriza `user_id` a executar uma ação que exige `required` dentro
    /// de `org_id`.
    ///
    /// - organização inexistente ou soft-deletada -> `NotFound`;
    /// - usuário sem vínculo na organização, ou cujos cargos não carregam
    ///   a permissão -> `NotAuthorized`.
    pub async fn authorize(
        &self,
        user_id: Uuid,
        org_id: Uuid,
        required: &str,
    ) -> Result<(), AppError> {
        if !self.org_repo.is_org_exists(org_id).await? {
            return Err(AppError::NotFound("Organização"));
        }

        let granted = self.rbac_repo.user_permissions(user_id, org_id).await?;
        if !is_capability_granted(&granted, required) {
            tracing::warn!(
                %user_id, %org_id, required,
                "acesso negado: permissão ausente"
            );
            return Err(AppError::NotAuthorized);
        }

        Ok(())
    }

    /// Exige apenas que o usuário seja membro da organização (qualquer
    /// cargo). Leituras de escopo organizacional usam esta forma.
    pub async fn require_membership(&self, user_id: Uuid, org_id: Uuid) -> Result<(), AppError> {
        if !self.org_repo.is_org_exists(org_id).await? {
            return Err(AppError::NotFound("Organização"));
        }

        let granted = self.rbac_repo.user_permissions(user_id, org_id).await?;
        if granted.is_empty() {
            return Err(AppError::NotAuthorized);
        }

        Ok(())
    }

    /// Vincula `member_id` a um cargo dentro da organização. Somente quem
    /// carrega `org:owner` pode mexer nos vínculos.
    pub async fn grant_role(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        member_id: Uuid,
        role_id: i32,
    ) -> Result<(), AppError> {
        self.authorize(actor_id, org_id, permissions::ORG_OWNER)
            .await?;

        if !is_seeded_role(role_id) {
            return Err(AppError::validation(
                "roleId",
                "unknown_role",
                "Cargo desconhecido.",
            ));
        }

        self.rbac_repo
            .assign_role(self.rbac_repo.pool(), org_id, member_id, role_id)
            .await?;

        tracing::info!(%org_id, %member_id, role_id, "cargo vinculado");
        Ok(())
    }

    /// Vínculos de cargo da organização (visíveis a qualquer membro).
    pub async fn list_bindings(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
    ) -> Result<Vec<RoleBinding>, AppError> {
        self.require_membership(actor_id, org_id).await?;
        self.rbac_repo.find_bindings(org_id).await
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        self.rbac_repo.find_roles().await
    }

    pub async fn list_role_permissions(&self) -> Result<Vec<RolePermission>, AppError> {
        self.rbac_repo.find_role_permissions().await
    }
}

/// Os cargos são fixos e semeados pela migração inicial.
pub fn is_seeded_role(role_id: i32) -> bool {
    matches!(role_id, ROLE_OWNER | ROLE_ADMIN | ROLE_MANAGER | ROLE_WORKER)
}

/// Decisão pura sobre o conjunto de permissões já resolvido: o slug pedido
/// precisa estar na união, ou o usuário carrega `org:owner`, que implica
/// todas as demais.
pub fn is_capability_granted(granted: &[String], required: &str) -> bool {
    granted
        .iter()
        .any(|p| p == required || p == permissions::ORG_OWNER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms(slugs: &[&str]) -> Vec<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn grants_when_slug_is_present() {
        let granted = perms(&["storage:read", "storage:write"]);
        assert!(is_capability_granted(&granted, "storage:write"));
    }

    #[test]
    fn owner_implies_everything() {
        let granted = perms(&["org:owner"]);
        assert!(is_capability_granted(&granted, "storage:write"));
        assert!(is_capability_granted(&granted, "catalog:write"));
        assert!(is_capability_granted(&granted, "audit:read"));
    }

    #[test]
    fn denies_when_union_lacks_slug() {
        let granted = perms(&["storage:read", "catalog:read"]);
        assert!(!is_capability_granted(&granted, "storage:write"));
    }

    #[test]
    fn seeded_roles_are_the_only_grantable_ones() {
        assert!(is_seeded_role(ROLE_OWNER));
        assert!(is_seeded_role(ROLE_WORKER));
        assert!(!is_seeded_role(0));
        assert!(!is_seeded_role(5));
    }

    #[test]
    fn denies_empty_set() {
        // Usuário sem vínculo nenhum na organização: conjunto vazio.
        // É assim que o isolamento entre tenants se materializa; um
        // "owner" de outra organização chega aqui com as mãos vazias.
        assert!(!is_capability_granted(&[], "storage:write"));
    }

    // O teste abaixo exige um Postgres apontado por DATABASE_URL e é
    // ignorado quando a variável não está definida.

    use crate::common::test_support;

    #[tokio::test]
    async fn worker_writes_catalog_but_not_storage() {
        let Some(backend) = test_support::try_backend().await else {
            return;
        };
        let owner = test_support::seed_user(&backend).await;
        let worker = test_support::seed_user(&backend).await;
        let org = backend
            .orgs
            .create_organization(owner.id, "Acme", &test_support::unique_slug("rbac"))
            .await
            .unwrap();

        backend
            .access
            .grant_role(owner.id, org.id, worker.id, ROLE_WORKER)
            .await
            .unwrap();

        // O operador cadastra itens, mas não mexe na hierarquia física.
        assert!(
            backend
                .access
                .authorize(worker.id, org.id, permissions::CATALOG_WRITE)
                .await
                .is_ok()
        );
        assert!(
            backend
                .access
                .authorize(worker.id, org.id, permissions::STORAGE_READ)
                .await
                .is_ok()
        );
        let err = backend
            .access
            .authorize(worker.id, org.id, permissions::STORAGE_WRITE)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAuthorized));
    }
}
