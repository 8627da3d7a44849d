// src/services/tenancy_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrganizationRepository, RbacRepository},
    models::{
        audit::{ObjectChangeAction, ObjectType},
        rbac::{ROLE_OWNER, permissions},
        tenancy::{Organization, OrganizationPatch, OrganizationUnit, OrganizationUnitPatch},
    },
    services::{
        access_control::AccessControlService,
        audit_service::{AuditService, build_change},
        validation::{validate_alias, validate_name, validate_subdomain},
    },
};

#[derive(Clone)]
pub struct OrganizationService {
    org_repo: OrganizationRepository,
    rbac_repo: RbacRepository,
    access: AccessControlService,
    audit: AuditService,
    pool: PgPool, // Usamos a pool para iniciar transações
}

impl OrganizationService {
    pub fn new(
        org_repo: OrganizationRepository,
        rbac_repo: RbacRepository,
        access: AccessControlService,
        audit: AuditService,
        pool: PgPool,
    ) -> Self {
        Self {
            org_repo,
            rbac_repo,
            access,
            audit,
            pool,
        }
    }

    // ---
    // Organizações
    // ---

    /// Cria a organização e, atomicamente, vincula o criador ao cargo de
    /// dono e grava a linha de auditoria.
    pub async fn create_organization(
        &self,
        actor_id: Uuid,
        name: &str,
        subdomain: &str,
    ) -> Result<Organization, AppError> {
        validate_name(name)?;
        validate_subdomain(subdomain)?;

        let mut tx = self.pool.begin().await?;

        let org = self.org_repo.create_org(&mut *tx, name, subdomain).await?;

        self.rbac_repo
            .assign_role(&mut *tx, org.id, actor_id, ROLE_OWNER)
            .await?;

        let change = build_change(
            org.id,
            actor_id,
            ObjectChangeAction::Create,
            ObjectType::Organization,
            org.id,
            None,
            Some(&org),
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;

        tracing::info!(org_id = %org.id, subdomain, "organização criada");
        Ok(org)
    }

    pub async fn get_organization(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
    ) -> Result<Organization, AppError> {
        self.access.require_membership(actor_id, org_id).await?;

        self.org_repo
            .find_org(org_id)
            .await?
            .ok_or(AppError::NotFound("Organização"))
    }

    pub async fn list_user_organizations(
        &self,
        actor_id: Uuid,
    ) -> Result<Vec<Organization>, AppError> {
        self.org_repo.find_orgs_for_user(actor_id).await
    }

    /// Atualização parcial tipada: só os campos presentes no patch são
    /// aplicados; o resultado inteiro passa pela validação de novo.
    pub async fn patch_organization(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        patch: &OrganizationPatch,
    ) -> Result<Organization, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::ORG_OWNER)
            .await?;

        let current = self
            .org_repo
            .find_org(org_id)
            .await?
            .ok_or(AppError::NotFound("Organização"))?;

        let edited = current.clone().apply_patch(patch);
        validate_name(&edited.name)?;
        validate_subdomain(&edited.subdomain)?;

        let mut tx = self.pool.begin().await?;

        let updated = self
            .org_repo
            .update_org(&mut *tx, org_id, &edited.name, &edited.subdomain)
            .await?;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Update,
            ObjectType::Organization,
            org_id,
            Some(&current),
            Some(&updated),
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Soft delete. Os filhos (unidades, grupos...) continuam acessíveis
    /// por id; a exclusão nunca cascateia.
    pub async fn delete_organization(&self, actor_id: Uuid, org_id: Uuid) -> Result<(), AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::ORG_OWNER)
            .await?;

        let current = self
            .org_repo
            .find_org(org_id)
            .await?
            .ok_or(AppError::NotFound("Organização"))?;

        let mut tx = self.pool.begin().await?;

        self.org_repo.delete_org(&mut *tx, org_id).await?;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Delete,
            ObjectType::Organization,
            org_id,
            Some(&current),
            None,
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;

        tracing::info!(%org_id, "organização removida (soft delete)");
        Ok(())
    }

    // ---
    // Unidades
    // ---

    pub async fn create_unit(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        name: &str,
        alias: &str,
        address: Option<&str>,
    ) -> Result<OrganizationUnit, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_WRITE)
            .await?;

        validate_name(name)?;
        validate_alias(alias)?;

        let mut tx = self.pool.begin().await?;

        let unit = self
            .org_repo
            .create_unit(&mut *tx, org_id, name, alias, address)
            .await?;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Create,
            ObjectType::Unit,
            unit.id,
            None,
            Some(&unit),
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;
        Ok(unit)
    }

    pub async fn get_unit(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        unit_id: Uuid,
    ) -> Result<OrganizationUnit, AppError> {
        self.access.require_membership(actor_id, org_id).await?;

        self.org_repo
            .find_unit(org_id, unit_id)
            .await?
            .ok_or(AppError::NotFound("Unidade"))
    }

    pub async fn list_units(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
    ) -> Result<Vec<OrganizationUnit>, AppError> {
        self.access.require_membership(actor_id, org_id).await?;

        self.org_repo.find_active_units(org_id).await
    }

    pub async fn patch_unit(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        unit_id: Uuid,
        patch: &OrganizationUnitPatch,
    ) -> Result<OrganizationUnit, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_WRITE)
            .await?;

        let current = self
            .org_repo
            .find_unit(org_id, unit_id)
            .await?
            .ok_or(AppError::NotFound("Unidade"))?;

        let edited = current.clone().apply_patch(patch);
        validate_name(&edited.name)?;
        validate_alias(&edited.alias)?;

        let mut tx = self.pool.begin().await?;

        let updated = self
            .org_repo
            .update_unit(
                &mut *tx,
                org_id,
                unit_id,
                &edited.name,
                &edited.alias,
                edited.address.as_deref(),
            )
            .await?;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Update,
            ObjectType::Unit,
            unit_id,
            Some(&current),
            Some(&updated),
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_unit(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        unit_id: Uuid,
    ) -> Result<(), AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_WRITE)
            .await?;

        let current = self
            .org_repo
            .find_unit(org_id, unit_id)
            .await?
            .ok_or(AppError::NotFound("Unidade"))?;

        let mut tx = self.pool.begin().await?;

        self.org_repo.delete_unit(&mut *tx, org_id, unit_id).await?;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Delete,
            ObjectType::Unit,
            unit_id,
            Some(&current),
            None,
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn unit() -> OrganizationUnit {
        OrganizationUnit {
            id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            name: "Galpão Central".into(),
            alias: "galpao-central".into(),
            address: Some("Rua A, 10".into()),
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn unit_patch_applies_only_present_fields() {
        let current = unit();
        let patch = OrganizationUnitPatch {
            name: Some("Galpão Norte".into()),
            alias: None,
            address: None,
        };

        let edited = current.clone().apply_patch(&patch);
        assert_eq!(edited.name, "Galpão Norte");
        assert_eq!(edited.alias, current.alias);
        assert_eq!(edited.address, current.address);
    }

    #[test]
    fn unit_patch_can_clear_address() {
        let current = unit();
        let patch = OrganizationUnitPatch {
            name: None,
            alias: None,
            // JSON `"address": null` -> Some(None): limpa o campo.
            address: Some(None),
        };

        let edited = current.apply_patch(&patch);
        assert_eq!(edited.address, None);
    }

    #[test]
    fn organization_patch_keeps_identity_fields() {
        let org = Organization {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            subdomain: "acme".into(),
            created_at: Utc::now(),
            deleted_at: None,
        };
        let patch = OrganizationPatch {
            name: Some("Acme Log".into()),
            subdomain: None,
        };

        let edited = org.clone().apply_patch(&patch);
        assert_eq!(edited.id, org.id);
        assert_eq!(edited.name, "Acme Log");
        assert_eq!(edited.subdomain, "acme");
    }
}
