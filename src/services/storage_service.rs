// src/services/storage_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrganizationRepository, StorageRepository},
    models::{
        audit::{ObjectChangeAction, ObjectType},
        rbac::permissions,
        storage::{Cell, CellPatch, CellsGroup, CellsGroupPatch, StorageGroup, StorageGroupPatch},
    },
    services::{
        access_control::AccessControlService,
        audit_service::{AuditService, build_change},
        validation::{validate_alias, validate_name},
    },
};

// Profundidade máxima aceita ao subir a cadeia de ancestrais. Protege a
// checagem de ciclo contra dados já corrompidos no banco.
const MAX_TREE_DEPTH: usize = 100;

#[derive(Clone)]
pub struct StorageService {
    storage_repo: StorageRepository,
    org_repo: OrganizationRepository,
    access: AccessControlService,
    audit: AuditService,
    pool: PgPool,
}

impl StorageService {
    pub fn new(
        storage_repo: StorageRepository,
        org_repo: OrganizationRepository,
        access: AccessControlService,
        audit: AuditService,
        pool: PgPool,
    ) -> Self {
        Self {
            storage_repo,
            org_repo,
            access,
            audit,
            pool,
        }
    }

    // ---
    // Grupos de armazenamento
    // ---

    pub async fn create_storage_group(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        unit_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        alias: &str,
    ) -> Result<StorageGroup, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_WRITE)
            .await?;

        validate_name(name)?;
        validate_alias(alias)?;

        // A unidade vem do chamador: checagem booleana antes da escrita.
        if !self.org_repo.is_unit_exists(org_id, unit_id).await? {
            return Err(AppError::NotFound("Unidade"));
        }

        if let Some(parent_id) = parent_id {
            let parent = self
                .storage_repo
                .find_storage_group(org_id, parent_id)
                .await?
                .ok_or(AppError::NotFound("Grupo de armazenamento pai"))?;

            if parent.unit_id != unit_id {
                return Err(AppError::validation(
                    "parentId",
                    "parent_scope",
                    "O grupo pai precisa pertencer à mesma unidade.",
                ));
            }
        }

        let mut tx = self.pool.begin().await?;

        let group = self
            .storage_repo
            .create_storage_group(&mut *tx, org_id, unit_id, parent_id, name, alias)
            .await?;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Create,
            ObjectType::StorageGroup,
            group.id,
            None,
            Some(&group),
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;
        Ok(group)
    }

    pub async fn get_storage_group(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<StorageGroup, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_READ)
            .await?;

        self.storage_repo
            .find_storage_group(org_id, id)
            .await?
            .ok_or(AppError::NotFound("Grupo de armazenamento"))
    }

    pub async fn list_storage_groups(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
    ) -> Result<Vec<StorageGroup>, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_READ)
            .await?;

        self.storage_repo.find_active_storage_groups(org_id).await
    }

    pub async fn patch_storage_group(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        id: Uuid,
        patch: &StorageGroupPatch,
    ) -> Result<StorageGroup, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_WRITE)
            .await?;

        let current = self
            .storage_repo
            .find_storage_group(org_id, id)
            .await?
            .ok_or(AppError::NotFound("Grupo de armazenamento"))?;

        let edited = current.clone().apply_patch(patch);
        validate_name(&edited.name)?;
        validate_alias(&edited.alias)?;

        // Reparentamento: o novo pai precisa existir, estar na mesma
        // unidade e não pode ser o próprio grupo nem um descendente dele.
        if edited.parent_id != current.parent_id {
            if let Some(new_parent_id) = edited.parent_id {
                self.ensure_valid_parent(org_id, &current, new_parent_id)
                    .await?;
            }
        }

        let mut tx = self.pool.begin().await?;

        let updated = self
            .storage_repo
            .update_storage_group(
                &mut *tx,
                org_id,
                id,
                edited.parent_id,
                &edited.name,
                &edited.alias,
            )
            .await?;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Update,
            ObjectType::StorageGroup,
            id,
            Some(&current),
            Some(&updated),
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Soft delete não-cascateante: filhos do grupo continuam acessíveis
    /// por lookup direto até serem removidos individualmente.
    pub async fn delete_storage_group(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<(), AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_WRITE)
            .await?;

        let current = self
            .storage_repo
            .find_storage_group(org_id, id)
            .await?
            .ok_or(AppError::NotFound("Grupo de armazenamento"))?;

        let mut tx = self.pool.begin().await?;

        self.storage_repo
            .delete_storage_group(&mut *tx, org_id, id)
            .await?;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Delete,
            ObjectType::StorageGroup,
            id,
            Some(&current),
            None,
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn ensure_valid_parent(
        &self,
        org_id: Uuid,
        group: &StorageGroup,
        new_parent_id: Uuid,
    ) -> Result<(), AppError> {
        if new_parent_id == group.id {
            return Err(AppError::validation(
                "parentId",
                "parent_cycle",
                "Um grupo não pode ser pai de si mesmo.",
            ));
        }

        let parent = self
            .storage_repo
            .find_storage_group(org_id, new_parent_id)
            .await?
            .ok_or(AppError::NotFound("Grupo de armazenamento pai"))?;

        if parent.unit_id != group.unit_id {
            return Err(AppError::validation(
                "parentId",
                "parent_scope",
                "O grupo pai precisa pertencer à mesma unidade.",
            ));
        }

        // Sobe a cadeia de ancestrais do novo pai; se chegar no próprio
        // grupo, o reparentamento criaria um ciclo.
        let mut cursor = parent.parent_id;
        let mut depth = 0usize;
        while let Some(ancestor_id) = cursor {
            if ancestor_id == group.id {
                return Err(AppError::validation(
                    "parentId",
                    "parent_cycle",
                    "O novo pai é um descendente deste grupo.",
                ));
            }
            depth += 1;
            if depth > MAX_TREE_DEPTH {
                return Err(AppError::InternalServerError(anyhow::anyhow!(
                    "cadeia de ancestrais excedeu {MAX_TREE_DEPTH} níveis"
                )));
            }
            cursor = match self.storage_repo.find_storage_group(org_id, ancestor_id).await? {
                Some(ancestor) => ancestor.parent_id,
                // Ancestral soft-deletado encerra a caminhada.
                None => None,
            };
        }

        Ok(())
    }

    // ---
    // Grupos de células
    // ---

    pub async fn create_cells_group(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        storage_group_id: Uuid,
        name: &str,
        alias: &str,
    ) -> Result<CellsGroup, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_WRITE)
            .await?;

        validate_name(name)?;
        validate_alias(alias)?;

        if !self
            .storage_repo
            .is_storage_group_exists(org_id, storage_group_id)
            .await?
        {
            return Err(AppError::NotFound("Grupo de armazenamento"));
        }

        let mut tx = self.pool.begin().await?;

        let group = self
            .storage_repo
            .create_cells_group(&mut *tx, org_id, storage_group_id, name, alias)
            .await?;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Create,
            ObjectType::CellsGroup,
            group.id,
            None,
            Some(&group),
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;
        Ok(group)
    }

    pub async fn get_cells_group(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<CellsGroup, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_READ)
            .await?;

        self.storage_repo
            .find_cells_group(org_id, id)
            .await?
            .ok_or(AppError::NotFound("Grupo de células"))
    }

    pub async fn list_cells_groups(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
    ) -> Result<Vec<CellsGroup>, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_READ)
            .await?;

        self.storage_repo.find_active_cells_groups(org_id).await
    }

    pub async fn patch_cells_group(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        id: Uuid,
        patch: &CellsGroupPatch,
    ) -> Result<CellsGroup, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_WRITE)
            .await?;

        let current = self
            .storage_repo
            .find_cells_group(org_id, id)
            .await?
            .ok_or(AppError::NotFound("Grupo de células"))?;

        let edited = current.clone().apply_patch(patch);
        validate_name(&edited.name)?;
        validate_alias(&edited.alias)?;

        let mut tx = self.pool.begin().await?;

        let updated = self
            .storage_repo
            .update_cells_group(&mut *tx, org_id, id, &edited.name, &edited.alias)
            .await?;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Update,
            ObjectType::CellsGroup,
            id,
            Some(&current),
            Some(&updated),
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_cells_group(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<(), AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_WRITE)
            .await?;

        let current = self
            .storage_repo
            .find_cells_group(org_id, id)
            .await?
            .ok_or(AppError::NotFound("Grupo de células"))?;

        let mut tx = self.pool.begin().await?;

        self.storage_repo
            .delete_cells_group(&mut *tx, org_id, id)
            .await?;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Delete,
            ObjectType::CellsGroup,
            id,
            Some(&current),
            None,
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;
        Ok(())
    }

    // ---
    // Células
    // ---

    pub async fn create_cell(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        cells_group_id: Uuid,
        alias: &str,
        row: i32,
        level: i32,
        position: i32,
    ) -> Result<Cell, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_WRITE)
            .await?;

        validate_alias(alias)?;

        if !self
            .storage_repo
            .is_cells_group_exists(org_id, cells_group_id)
            .await?
        {
            return Err(AppError::NotFound("Grupo de células"));
        }

        let mut tx = self.pool.begin().await?;

        // A unicidade da tripla (linha, nível, posição) fica com a
        // constraint do banco; violação vira AlreadyExists no repo.
        let cell = self
            .storage_repo
            .create_cell(&mut *tx, org_id, cells_group_id, alias, row, level, position)
            .await?;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Create,
            ObjectType::Cell,
            cell.id,
            None,
            Some(&cell),
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;
        Ok(cell)
    }

    pub async fn get_cell(&self, actor_id: Uuid, org_id: Uuid, id: Uuid) -> Result<Cell, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_READ)
            .await?;

        self.storage_repo
            .find_cell(org_id, id)
            .await?
            .ok_or(AppError::NotFound("Célula"))
    }

    pub async fn list_cells(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        cells_group_id: Uuid,
    ) -> Result<Vec<Cell>, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_READ)
            .await?;

        self.storage_repo
            .find_cells_in_group(org_id, cells_group_id)
            .await
    }

    pub async fn patch_cell(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        id: Uuid,
        patch: &CellPatch,
    ) -> Result<Cell, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_WRITE)
            .await?;

        let current = self
            .storage_repo
            .find_cell(org_id, id)
            .await?
            .ok_or(AppError::NotFound("Célula"))?;

        let edited = current.clone().apply_patch(patch);
        validate_alias(&edited.alias)?;

        let mut tx = self.pool.begin().await?;

        let updated = self
            .storage_repo
            .update_cell(
                &mut *tx,
                org_id,
                id,
                &edited.alias,
                edited.row,
                edited.level,
                edited.position,
            )
            .await?;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Update,
            ObjectType::Cell,
            id,
            Some(&current),
            Some(&updated),
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_cell(&self, actor_id: Uuid, org_id: Uuid, id: Uuid) -> Result<(), AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::STORAGE_WRITE)
            .await?;

        let current = self
            .storage_repo
            .find_cell(org_id, id)
            .await?
            .ok_or(AppError::NotFound("Célula"))?;

        let mut tx = self.pool.begin().await?;

        self.storage_repo.delete_cell(&mut *tx, org_id, id).await?;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Delete,
            ObjectType::Cell,
            id,
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

    fn group(unit_id: Uuid, parent_id: Option<Uuid>) -> StorageGroup {
        StorageGroup {
            id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            unit_id,
            parent_id,
            name: "Setor".into(),
            alias: "setor".into(),
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn storage_group_patch_can_reparent_to_root() {
        let unit_id = Uuid::new_v4();
        let current = group(unit_id, Some(Uuid::new_v4()));

        let patch = StorageGroupPatch {
            name: None,
            alias: None,
            // `"parentId": null` -> vira raiz da unidade.
            parent_id: Some(None),
        };

        let edited = current.apply_patch(&patch);
        assert_eq!(edited.parent_id, None);
    }

    #[test]
    fn storage_group_patch_without_parent_keeps_current() {
        let unit_id = Uuid::new_v4();
        let parent = Uuid::new_v4();
        let current = group(unit_id, Some(parent));

        let patch = StorageGroupPatch {
            name: Some("Setor B".into()),
            alias: None,
            parent_id: None,
        };

        let edited = current.apply_patch(&patch);
        assert_eq!(edited.parent_id, Some(parent));
        assert_eq!(edited.name, "Setor B");
    }

    #[test]
    fn cell_patch_overwrites_coordinates() {
        let cell = Cell {
            id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            cells_group_id: Uuid::new_v4(),
            alias: "a-1-1".into(),
            row: 1,
            level: 1,
            position: 1,
            created_at: Utc::now(),
            deleted_at: None,
        };

        let patch = CellPatch {
            alias: None,
            row: Some(2),
            level: None,
            position: Some(7),
        };

        let edited = cell.apply_patch(&patch);
        assert_eq!((edited.row, edited.level, edited.position), (2, 1, 7));
    }

    // Os testes abaixo exigem um Postgres apontado por DATABASE_URL e são
    // ignorados quando a variável não está definida.

    use crate::common::test_support;

    #[tokio::test]
    async fn group_soft_delete_does_not_cascade_to_cells_groups() {
        let Some(backend) = test_support::try_backend().await else {
            return;
        };
        let owner = test_support::seed_user(&backend).await;
        let org = backend
            .orgs
            .create_organization(owner.id, "Armazém", &test_support::unique_slug("tree"))
            .await
            .unwrap();
        let unit = backend
            .orgs
            .create_unit(owner.id, org.id, "Galpão", "galpao", None)
            .await
            .unwrap();
        let group = backend
            .storage
            .create_storage_group(owner.id, org.id, unit.id, None, "Setor A", "setor-a")
            .await
            .unwrap();
        let shelves = backend
            .storage
            .create_cells_group(owner.id, org.id, group.id, "Prateleiras", "prateleiras")
            .await
            .unwrap();

        backend
            .storage
            .delete_storage_group(owner.id, org.id, group.id)
            .await
            .unwrap();

        // O grupo apagado some das leituras ativas...
        let err = backend
            .storage
            .get_storage_group(owner.id, org.id, group.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // ...mas o filho continua endereçável por id.
        let alive = backend
            .storage
            .get_cells_group(owner.id, org.id, shelves.id)
            .await
            .unwrap();
        assert_eq!(alive.id, shelves.id);
    }

    #[tokio::test]
    async fn unit_soft_delete_keeps_groups_reachable() {
        let Some(backend) = test_support::try_backend().await else {
            return;
        };
        let owner = test_support::seed_user(&backend).await;
        let org = backend
            .orgs
            .create_organization(owner.id, "Armazém", &test_support::unique_slug("tree"))
            .await
            .unwrap();
        let unit = backend
            .orgs
            .create_unit(owner.id, org.id, "Galpão", "galpao", None)
            .await
            .unwrap();
        let group = backend
            .storage
            .create_storage_group(owner.id, org.id, unit.id, None, "Setor B", "setor-b")
            .await
            .unwrap();

        backend.orgs.delete_unit(owner.id, org.id, unit.id).await.unwrap();

        let err = backend
            .orgs
            .get_unit(owner.id, org.id, unit.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let alive = backend
            .storage
            .get_storage_group(owner.id, org.id, group.id)
            .await
            .unwrap();
        assert_eq!(alive.id, group.id);
    }
}
