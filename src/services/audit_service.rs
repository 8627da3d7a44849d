// src/services/audit_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AuditRepository,
    models::audit::{NewObjectChange, ObjectChange, ObjectChangeAction, ObjectType},
    services::access_control::AccessControlService,
};

#[derive(Clone)]
pub struct AuditService {
    audit_repo: AuditRepository,
    access: AccessControlService,
}

impl AuditService {
    pub fn new(audit_repo: AuditRepository, access: AccessControlService) -> Self {
        Self { audit_repo, access }
    }

    /// Grava um registro de mudança dentro da transação do chamador.
    /// Mutação gravada sem sua linha de auditoria (ou o contrário) é bug
    /// de corretude; o executor compartilhado é obrigatório.
    pub async fn record<'e, E>(&self, executor: E, change: NewObjectChange) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.audit_repo.insert_object_change(executor, &change).await
    }

    /// Histórico completo de um objeto, em ordem de inserção.
    pub async fn get_object_changes(
        &self,
        user_id: Uuid,
        org_id: Uuid,
        target_object_type: ObjectType,
        target_object_id: Uuid,
    ) -> Result<Vec<ObjectChange>, AppError> {
        self.access
            .authorize(user_id, org_id, crate::models::rbac::permissions::AUDIT_READ)
            .await?;

        self.audit_repo
            .find_object_changes(org_id, target_object_type, target_object_id)
            .await
    }
}

/// Monta o rascunho de auditoria serializando os snapshots pre/post.
pub fn build_change<T: serde::Serialize>(
    org_id: Uuid,
    user_id: Uuid,
    action: ObjectChangeAction,
    target_object_type: ObjectType,
    target_object_id: Uuid,
    prechange: Option<&T>,
    postchange: Option<&T>,
) -> Result<NewObjectChange, AppError> {
    let prechange_state = prechange.map(serde_json::to_value).transpose()?;
    let postchange_state = postchange.map(serde_json::to_value).transpose()?;

    Ok(NewObjectChange {
        org_id,
        user_id,
        action,
        target_object_type,
        target_object_id,
        prechange_state,
        postchange_state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tenancy::Organization;
    use chrono::Utc;

    #[test]
    fn build_change_snapshots_both_sides() {
        let org = Organization {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            subdomain: "acme".into(),
            created_at: Utc::now(),
            deleted_at: None,
        };
        let actor = Uuid::new_v4();

        let change = build_change(
            org.id,
            actor,
            ObjectChangeAction::Update,
            ObjectType::Organization,
            org.id,
            Some(&org),
            Some(&org),
        )
        .unwrap();

        let pre = change.prechange_state.expect("prechange presente");
        let post = change.postchange_state.expect("postchange presente");
        assert_eq!(pre, post);
        assert_eq!(pre.get("name").unwrap(), "Acme");
    }

    #[test]
    fn build_change_create_has_no_prechange() {
        let org_id = Uuid::new_v4();
        let change = build_change::<Organization>(
            org_id,
            Uuid::new_v4(),
            ObjectChangeAction::Create,
            ObjectType::Organization,
            org_id,
            None,
            None,
        )
        .unwrap();

        assert!(change.prechange_state.is_none());
        assert!(change.postchange_state.is_none());
    }

    // Os testes abaixo exigem um Postgres apontado por DATABASE_URL e são
    // ignorados quando a variável não está definida.

    use crate::common::test_support;
    use crate::models::tenancy::OrganizationPatch;

    #[tokio::test]
    async fn organization_history_comes_back_in_commit_order() {
        let Some(backend) = test_support::try_backend().await else {
            return;
        };
        let owner = test_support::seed_user(&backend).await;
        let org = backend
            .orgs
            .create_organization(owner.id, "Acme", &test_support::unique_slug("aud"))
            .await
            .unwrap();

        let patch = OrganizationPatch {
            name: Some("Acme Logística".into()),
            subdomain: None,
        };
        backend
            .orgs
            .patch_organization(owner.id, org.id, &patch)
            .await
            .unwrap();

        let changes = backend
            .audit
            .get_object_changes(owner.id, org.id, ObjectType::Organization, org.id)
            .await
            .unwrap();

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].action, ObjectChangeAction::Create);
        assert_eq!(changes[1].action, ObjectChangeAction::Update);
        assert!(changes[0].seq < changes[1].seq);

        // O create não tem estado anterior; o update guarda os dois lados.
        assert!(changes[0].prechange_state.is_none());
        let pre = changes[1].prechange_state.as_ref().unwrap();
        let post = changes[1].postchange_state.as_ref().unwrap();
        assert_eq!(pre.get("name").unwrap(), "Acme");
        assert_eq!(post.get("name").unwrap(), "Acme Logística");
    }

    #[tokio::test]
    async fn unit_delete_is_recorded_with_its_final_snapshot() {
        let Some(backend) = test_support::try_backend().await else {
            return;
        };
        let owner = test_support::seed_user(&backend).await;
        let org = backend
            .orgs
            .create_organization(owner.id, "Acme", &test_support::unique_slug("aud"))
            .await
            .unwrap();
        let unit = backend
            .orgs
            .create_unit(owner.id, org.id, "Galpão 1", "galpao-1", None)
            .await
            .unwrap();

        backend.orgs.delete_unit(owner.id, org.id, unit.id).await.unwrap();

        let changes = backend
            .audit
            .get_object_changes(owner.id, org.id, ObjectType::Unit, unit.id)
            .await
            .unwrap();

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].action, ObjectChangeAction::Create);
        assert_eq!(changes[1].action, ObjectChangeAction::Delete);
        assert!(changes[0].seq < changes[1].seq);

        let pre = changes[1].prechange_state.as_ref().unwrap();
        assert_eq!(pre.get("alias").unwrap(), "galpao-1");
        assert!(changes[1].postchange_state.is_none());
    }
}
