// src/services/catalog_service.rs

use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ItemRepository,
    models::{
        audit::{ObjectChangeAction, ObjectType},
        catalog::{Item, ItemVariant, ItemVariantInput},
        rbac::permissions,
    },
    services::{
        access_control::AccessControlService,
        audit_service::{AuditService, build_change},
        validation::validate_name,
    },
};

/// Plano de reconciliação entre as variantes persistidas e a lista
/// enviada pelo cliente. A lista do cliente é a verdade: variante sem id
/// é criada, com id é atualizada, ausente é removida (soft delete).
#[derive(Debug, Default)]
pub struct VariantPlan {
    pub to_insert: Vec<ItemVariantInput>,
    pub to_update: Vec<(Uuid, ItemVariantInput)>,
    pub to_delete: Vec<Uuid>,
}

pub fn reconcile_variants(
    existing: &[ItemVariant],
    desired: &[ItemVariantInput],
) -> Result<VariantPlan, AppError> {
    let known: HashSet<Uuid> = existing.iter().map(|v| v.id).collect();
    let mut plan = VariantPlan::default();
    let mut seen: HashSet<Uuid> = HashSet::new();

    for input in desired {
        match input.id {
            Some(id) => {
                if !known.contains(&id) {
                    return Err(AppError::NotFound("Variante de item"));
                }
                if !seen.insert(id) {
                    return Err(AppError::validation(
                        "variants",
                        "duplicate_variant",
                        "A mesma variante aparece mais de uma vez.",
                    ));
                }
                plan.to_update.push((id, input.clone()));
            }
            None => plan.to_insert.push(input.clone()),
        }
    }

    for variant in existing {
        if !seen.contains(&variant.id) {
            plan.to_delete.push(variant.id);
        }
    }

    Ok(plan)
}

#[derive(Clone)]
pub struct ItemService {
    item_repo: ItemRepository,
    access: AccessControlService,
    audit: AuditService,
    pool: PgPool,
}

impl ItemService {
    pub fn new(
        item_repo: ItemRepository,
        access: AccessControlService,
        audit: AuditService,
        pool: PgPool,
    ) -> Self {
        Self {
            item_repo,
            access,
            audit,
            pool,
        }
    }

    pub async fn create_item(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        name: &str,
        description: Option<&str>,
        variants: &[ItemVariantInput],
    ) -> Result<Item, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::CATALOG_WRITE)
            .await?;

        validate_name(name)?;
        for variant in variants {
            validate_name(&variant.name)?;
            if variant.id.is_some() {
                return Err(AppError::validation(
                    "variants",
                    "unknown_variant",
                    "Variantes de um item novo não podem ter id.",
                ));
            }
        }

        let mut tx = self.pool.begin().await?;

        let mut item = self
            .item_repo
            .insert_item(&mut *tx, org_id, name, description)
            .await?;

        let mut created = Vec::with_capacity(variants.len());
        for variant in variants {
            let row = self
                .item_repo
                .insert_variant(
                    &mut *tx,
                    org_id,
                    item.id,
                    &variant.name,
                    variant.article.as_deref(),
                    variant.ean13,
                )
                .await?;
            created.push(row);
        }
        item.variants = created;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Create,
            ObjectType::Item,
            item.id,
            None,
            Some(&item),
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;

        tracing::info!(item_id = %item.id, "item criado com {} variante(s)", item.variants.len());
        Ok(item)
    }

    pub async fn get_item(&self, actor_id: Uuid, org_id: Uuid, id: Uuid) -> Result<Item, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::CATALOG_READ)
            .await?;

        let mut item = self
            .item_repo
            .find_item(org_id, id)
            .await?
            .ok_or(AppError::NotFound("Item"))?;

        item.variants = self.item_repo.find_item_variants(org_id, id).await?;
        Ok(item)
    }

    pub async fn list_items(&self, actor_id: Uuid, org_id: Uuid) -> Result<Vec<Item>, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::CATALOG_READ)
            .await?;

        let mut items = self.item_repo.find_active_items(org_id).await?;
        for item in &mut items {
            item.variants = self.item_repo.find_item_variants(org_id, item.id).await?;
        }
        Ok(items)
    }

    /// Substituição integral: nome, descrição e a lista de variantes do
    /// payload passam a ser o estado do item. Tudo em uma transação só,
    /// com os estados pré e pós completos no registro de auditoria.
    pub async fn update_item(
        &self,
        actor_id: Uuid,
        org_id: Uuid,
        id: Uuid,
        name: &str,
        description: Option<&str>,
        variants: &[ItemVariantInput],
    ) -> Result<Item, AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::CATALOG_WRITE)
            .await?;

        validate_name(name)?;
        for variant in variants {
            validate_name(&variant.name)?;
        }

        let mut before = self
            .item_repo
            .find_item(org_id, id)
            .await?
            .ok_or(AppError::NotFound("Item"))?;
        before.variants = self.item_repo.find_item_variants(org_id, id).await?;

        let plan = reconcile_variants(&before.variants, variants)?;

        let mut tx = self.pool.begin().await?;

        let mut item = self
            .item_repo
            .update_item_row(&mut *tx, org_id, id, name, description)
            .await?;

        for variant_id in &plan.to_delete {
            self.item_repo
                .delete_variant(&mut *tx, org_id, id, *variant_id)
                .await?;
        }
        let mut alive = Vec::new();
        for (variant_id, input) in &plan.to_update {
            let row = self
                .item_repo
                .update_variant(
                    &mut *tx,
                    org_id,
                    id,
                    *variant_id,
                    &input.name,
                    input.article.as_deref(),
                    input.ean13,
                )
                .await?;
            alive.push(row);
        }
        for input in &plan.to_insert {
            let row = self
                .item_repo
                .insert_variant(
                    &mut *tx,
                    org_id,
                    id,
                    &input.name,
                    input.article.as_deref(),
                    input.ean13,
                )
                .await?;
            alive.push(row);
        }
        item.variants = alive;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Update,
            ObjectType::Item,
            id,
            Some(&before),
            Some(&item),
        )?;
        self.audit.record(&mut *tx, change).await?;

        tx.commit().await?;
        Ok(item)
    }

    pub async fn delete_item(&self, actor_id: Uuid, org_id: Uuid, id: Uuid) -> Result<(), AppError> {
        self.access
            .authorize(actor_id, org_id, permissions::CATALOG_WRITE)
            .await?;

        let mut before = self
            .item_repo
            .find_item(org_id, id)
            .await?
            .ok_or(AppError::NotFound("Item"))?;
        before.variants = self.item_repo.find_item_variants(org_id, id).await?;

        let mut tx = self.pool.begin().await?;

        // Soft delete do item apenas; as variantes seguem a vida do item
        // nas leituras, que sempre filtram pelo item ativo.
        self.item_repo.delete_item(&mut *tx, org_id, id).await?;

        let change = build_change(
            org_id,
            actor_id,
            ObjectChangeAction::Delete,
            ObjectType::Item,
            id,
            Some(&before),
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

    fn variant(name: &str) -> ItemVariant {
        ItemVariant {
            id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            name: name.into(),
            article: None,
            ean13: None,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn keep(v: &ItemVariant, name: &str) -> ItemVariantInput {
        ItemVariantInput {
            id: Some(v.id),
            name: name.into(),
            article: None,
            ean13: None,
        }
    }

    fn fresh(name: &str) -> ItemVariantInput {
        ItemVariantInput {
            id: None,
            name: name.into(),
            article: None,
            ean13: None,
        }
    }

    #[test]
    fn reconcile_splits_insert_update_delete() {
        let a = variant("A");
        let b = variant("B");
        let c = variant("C");
        let existing = vec![a.clone(), b.clone(), c.clone()];

        // {A, B, C} -> {A, C, D}: remove B, mantém A e C, cria D.
        let desired = vec![keep(&a, "A"), keep(&c, "C renomeada"), fresh("D")];

        let plan = reconcile_variants(&existing, &desired).unwrap();

        assert_eq!(plan.to_delete, vec![b.id]);
        assert_eq!(plan.to_insert.len(), 1);
        assert_eq!(plan.to_insert[0].name, "D");
        assert_eq!(plan.to_update.len(), 2);
        assert!(plan.to_update.iter().any(|(id, _)| *id == a.id));
        assert!(
            plan.to_update
                .iter()
                .any(|(id, input)| *id == c.id && input.name == "C renomeada")
        );
    }

    #[test]
    fn reconcile_empty_desired_deletes_everything() {
        let a = variant("A");
        let b = variant("B");
        let existing = vec![a.clone(), b.clone()];

        let plan = reconcile_variants(&existing, &[]).unwrap();

        assert!(plan.to_insert.is_empty());
        assert!(plan.to_update.is_empty());
        assert_eq!(plan.to_delete, vec![a.id, b.id]);
    }

    #[test]
    fn reconcile_rejects_unknown_variant_id() {
        let existing = vec![variant("A")];
        let desired = vec![ItemVariantInput {
            id: Some(Uuid::new_v4()),
            name: "fantasma".into(),
            article: None,
            ean13: None,
        }];

        let err = reconcile_variants(&existing, &desired).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn reconcile_rejects_duplicated_id() {
        let a = variant("A");
        let existing = vec![a.clone()];
        let desired = vec![keep(&a, "A"), keep(&a, "A de novo")];

        let err = reconcile_variants(&existing, &desired).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    // Os testes abaixo exigem um Postgres apontado por DATABASE_URL e são
    // ignorados quando a variável não está definida.

    use crate::common::test_support;

    #[tokio::test]
    async fn failed_variant_insert_rolls_back_the_item() {
        let Some(backend) = test_support::try_backend().await else {
            return;
        };
        let owner = test_support::seed_user(&backend).await;
        let org = backend
            .orgs
            .create_organization(owner.id, "Loja", &test_support::unique_slug("cat"))
            .await
            .unwrap();

        let mut tx = backend.pool.begin().await.unwrap();
        let item = backend
            .item_repo
            .insert_item(&mut *tx, org.id, "Caixa plástica", None)
            .await
            .unwrap();
        // A segunda escrita falha no meio da transação (item inexistente).
        let result = backend
            .item_repo
            .insert_variant(&mut *tx, org.id, Uuid::new_v4(), "30L", None, None)
            .await;
        assert!(result.is_err());
        drop(tx);

        // Nada da transação sobreviveu ao rollback.
        let found = backend.item_repo.find_item(org.id, item.id).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn failed_update_leaves_item_and_variants_untouched() {
        let Some(backend) = test_support::try_backend().await else {
            return;
        };
        let owner = test_support::seed_user(&backend).await;
        let org = backend
            .orgs
            .create_organization(owner.id, "Loja", &test_support::unique_slug("cat"))
            .await
            .unwrap();

        let created = backend
            .items
            .create_item(owner.id, org.id, "Caixa", None, &[fresh("10L")])
            .await
            .unwrap();

        // Id de variante desconhecido: o update inteiro é recusado.
        let err = backend
            .items
            .update_item(
                owner.id,
                org.id,
                created.id,
                "Caixa grande",
                None,
                &[ItemVariantInput {
                    id: Some(Uuid::new_v4()),
                    name: "40L".into(),
                    article: None,
                    ean13: None,
                }],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let current = backend.items.get_item(owner.id, org.id, created.id).await.unwrap();
        assert_eq!(current.name, "Caixa");
        assert_eq!(current.variants.len(), 1);
        assert_eq!(current.variants[0].name, "10L");
    }
}
