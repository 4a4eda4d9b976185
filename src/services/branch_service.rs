// src/services/branch_service.rs

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, text},
    db::{keys, load_json, save_json, StateStore},
    models::{
        admin::Admin,
        branch::{default_branches, is_default_branch, Branch, BranchDraft, BranchPatch},
        session::{BranchAccess, SessionRecord},
    },
};

// =========================================================================
//  1. REGISTRO DE FILIAIS (único escritor de `salon.branches`)
// =========================================================================

pub struct BranchRegistry {
    store: Arc<dyn StateStore>,
    branches: RwLock<Vec<Branch>>,
}

impl BranchRegistry {
    /// Coleção ausente ou ilegível: usa as filiais padrão.
    pub async fn init(store: Arc<dyn StateStore>) -> Self {
        let branches = match load_json::<Vec<Branch>>(store.as_ref(), keys::BRANCHES).await {
            Ok(Some(branches)) if !branches.is_empty() => branches,
            Ok(_) => {
                tracing::info!("No stored branches, using the built-in set");
                default_branches()
            }
            Err(e) => {
                tracing::error!("Stored branches unreadable, using the built-in set: {}", e);
                default_branches()
            }
        };

        Self {
            store,
            branches: RwLock::new(branches),
        }
    }

    pub async fn all(&self) -> Vec<Branch> {
        self.branches.read().await.clone()
    }

    pub async fn ids(&self) -> Vec<String> {
        self.branches.read().await.iter().map(|b| b.id.clone()).collect()
    }

    pub async fn get(&self, id: &str) -> Option<Branch> {
        self.branches.read().await.iter().find(|b| b.id == id).cloned()
    }

    pub async fn active(&self) -> Vec<Branch> {
        self.branches
            .read()
            .await
            .iter()
            .filter(|b| b.is_active())
            .cloned()
            .collect()
    }

    /// Grava a coleção inteira. Se falhar, a cópia em memória volta para as filiais padrão.
    async fn persist(&self, branches: &mut Vec<Branch>) -> Result<(), AppError> {
        if let Err(e) = save_json(self.store.as_ref(), keys::BRANCHES, branches.as_slice()).await {
            tracing::error!("Failed to persist branches, reverting to defaults: {}", e);
            *branches = default_branches();
            return Err(AppError::StorageError(e.to_string()));
        }
        Ok(())
    }

    /// O id é o slug do nome; slug repetido é conflito.
    pub async fn add_branch(&self, draft: BranchDraft) -> Result<Branch, AppError> {
        draft.validate()?;

        let id = text::slugify(&draft.name);
        if id.is_empty() {
            return Err(AppError::field(
                "name",
                "invalid_name",
                "Branch name needs at least one letter or digit.",
            ));
        }

        let mut branches = self.branches.write().await;
        if branches.iter().any(|b| b.id == id) {
            return Err(AppError::Conflict(format!("A branch with id '{id}' already exists.")));
        }

        let branch = Branch::from_draft(id, draft, Utc::now());
        branches.push(branch.clone());
        self.persist(&mut branches).await?;

        tracing::info!("🏪 Branch '{}' added", branch.id);
        Ok(branch)
    }

    /// `None` quando o id não existe (nada é gravado).
    pub async fn update_branch(&self, id: &str, patch: BranchPatch) -> Result<Option<Branch>, AppError> {
        let mut branches = self.branches.write().await;
        let Some(branch) = branches.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };

        branch.merge(patch, Utc::now());
        let updated = branch.clone();
        self.persist(&mut branches).await?;
        Ok(Some(updated))
    }

    /// Filiais padrão nunca são removidas. Retorna se alguma filial foi apagada.
    pub async fn delete_branch(&self, id: &str) -> Result<bool, AppError> {
        if is_default_branch(id) {
            tracing::warn!("Refusing to delete default branch '{}'", id);
            return Ok(false);
        }

        let mut branches = self.branches.write().await;
        let before = branches.len();
        branches.retain(|b| b.id != id);
        if branches.len() == before {
            return Ok(false);
        }

        self.persist(&mut branches).await?;
        tracing::info!("🗑️ Branch '{}' deleted", id);
        Ok(true)
    }
}

// =========================================================================
//  2. SESSÕES (registro da sessão + filial atual de cada admin)
// =========================================================================

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn StateStore>,
    registry: Arc<BranchRegistry>,
}

impl SessionService {
    pub fn new(store: Arc<dyn StateStore>, registry: Arc<BranchRegistry>) -> Self {
        Self { store, registry }
    }

    /// Super admin vê o registro inteiro; os demais só as filiais concedidas que ainda existem.
    async fn permitted_branches(&self, admin: &Admin) -> Vec<String> {
        let registered = self.registry.ids().await;
        if admin.is_super_admin() {
            return registered;
        }
        registered
            .into_iter()
            .filter(|id| admin.branches.contains(id))
            .collect()
    }

    async fn access_for(&self, admin: &Admin) -> Result<BranchAccess, AppError> {
        let preferred: Option<String> =
            load_json(self.store.as_ref(), &keys::current_branch(admin.id)).await?;
        let permitted = self.permitted_branches(admin).await;
        Ok(BranchAccess::new(admin.id, admin.role, permitted, preferred))
    }

    pub async fn start(&self, admin: &Admin) -> Result<BranchAccess, AppError> {
        let access = self.access_for(admin).await?;

        let record = SessionRecord {
            admin_id: admin.id,
            username: admin.username.clone(),
            started_at: Utc::now(),
        };
        save_json(self.store.as_ref(), &keys::session(admin.id), &record).await?;
        if let Some(current) = &access.current_branch {
            save_json(self.store.as_ref(), &keys::current_branch(admin.id), current).await?;
        }

        tracing::info!(
            "🔑 Session started for '{}' on branch {:?}",
            admin.username,
            access.current_branch
        );
        Ok(access)
    }

    /// `None` depois do logout.
    pub async fn resume(&self, admin: &Admin) -> Result<Option<BranchAccess>, AppError> {
        let record: Option<SessionRecord> =
            load_json(self.store.as_ref(), &keys::session(admin.id)).await?;
        if record.is_none() {
            return Ok(None);
        }
        self.access_for(admin).await.map(Some)
    }

    /// Filial fora do acesso: nada muda e retorna `false`.
    pub async fn switch_branch(&self, access: &mut BranchAccess, branch_id: &str) -> Result<bool, AppError> {
        if !access.switch_to(branch_id) {
            tracing::warn!(
                "Admin {} tried to switch to branch '{}' outside their access",
                access.admin_id,
                branch_id
            );
            return Ok(false);
        }

        save_json(
            self.store.as_ref(),
            &keys::current_branch(access.admin_id),
            &branch_id,
        )
        .await?;
        Ok(true)
    }

    pub async fn end(&self, admin_id: Uuid) -> Result<(), AppError> {
        self.store.remove(&keys::session(admin_id)).await?;
        self.store.remove(&keys::current_branch(admin_id)).await?;
        tracing::info!("👋 Session ended for admin {}", admin_id);
        Ok(())
    }
}
