// src/services/admin_service.rs

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::{keys, load_json, save_json, StateStore},
    models::{
        admin::{Admin, AdminDraft, AdminProfile, AdminRole},
        branch::{is_default_branch, Branch, BranchDraft},
        session::BranchAccess,
    },
    services::{auth::hash_password, branch_service::BranchRegistry},
};

pub const SEED_ADMIN_USERNAME: &str = "admin";

/// Único escritor de `salon.admins`. Toda operação exige um super admin.
/// Criar e remover filiais também passa por aqui, para as permissões acompanharem o registro.
pub struct AdminDirectory {
    store: Arc<dyn StateStore>,
    registry: Arc<BranchRegistry>,
    admins: RwLock<Vec<Admin>>,
}

fn require_super_admin(actor: &BranchAccess) -> Result<(), AppError> {
    actor.require_super_admin("manage admin accounts")
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("No admin with id {id}"))
}

/// Super admin recebe todas as filiais registradas; os demais ficam só com as que ainda existem.
fn reconcile_grants(mut admins: Vec<Admin>, registered: &[String]) -> (Vec<Admin>, bool) {
    let mut changed = false;
    for admin in admins.iter_mut() {
        let grants: Vec<String> = if admin.is_super_admin() {
            registered.to_vec()
        } else {
            admin
                .branches
                .iter()
                .filter(|b| registered.contains(*b))
                .cloned()
                .collect()
        };
        if grants != admin.branches {
            admin.branches = grants;
            changed = true;
        }
    }
    (admins, changed)
}

impl AdminDirectory {
    /// Na primeira vez (coleção inexistente) cria o super admin inicial.
    pub async fn init(
        store: Arc<dyn StateStore>,
        registry: Arc<BranchRegistry>,
        seed_password: Option<String>,
    ) -> Result<Self, AppError> {
        let admins = match load_json::<Vec<Admin>>(store.as_ref(), keys::ADMINS).await {
            Ok(Some(admins)) => admins,
            Ok(None) => {
                let seed = Self::seed_admin(&registry, seed_password.as_deref()).await?;
                save_json(store.as_ref(), keys::ADMINS, std::slice::from_ref(&seed)).await?;
                tracing::info!("🌱 Seeded super admin '{}'", seed.username);
                vec![seed]
            }
            Err(e) => {
                // Não mexe no que está gravado; o admin inicial fica só em memória
                tracing::error!("Stored admins unreadable, serving the seed account: {}", e);
                vec![Self::seed_admin(&registry, seed_password.as_deref()).await?]
            }
        };

        let registered = registry.ids().await;
        let (admins, changed) = reconcile_grants(admins, &registered);
        if changed {
            tracing::warn!("Admin branch grants were out of step with the registry; corrected in memory");
        }

        Ok(Self {
            store,
            registry,
            admins: RwLock::new(admins),
        })
    }

    async fn seed_admin(registry: &BranchRegistry, password: Option<&str>) -> Result<Admin, AppError> {
        let password_hash = match password.filter(|p| !p.is_empty()) {
            Some(p) => Some(hash_password(p).await?),
            None => {
                tracing::warn!("SEED_ADMIN_PASSWORD not set; the seeded admin can only log in in demo mode");
                None
            }
        };

        let now = Utc::now();
        Ok(Admin {
            id: Uuid::now_v7(),
            username: SEED_ADMIN_USERNAME.to_string(),
            email: "admin@salon.example".to_string(),
            password_hash,
            role: AdminRole::SuperAdmin,
            branches: registry.ids().await,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Grava `next` e só depois troca a lista viva. Se a gravação falhar, `live` fica como estava.
    async fn commit(&self, live: &mut Vec<Admin>, next: Vec<Admin>) -> Result<(), AppError> {
        save_json(self.store.as_ref(), keys::ADMINS, next.as_slice())
            .await
            .map_err(|e| {
                tracing::error!("Failed to persist admins, keeping the previous list: {}", e);
                AppError::StorageError(e.to_string())
            })?;
        *live = next;
        Ok(())
    }

    // --- BUSCAS SEM AUTENTICAÇÃO (login e auth guard) ---

    pub async fn find_by_identifier(&self, identifier: &str) -> Option<Admin> {
        self.admins
            .read()
            .await
            .iter()
            .find(|a| a.matches_identifier(identifier))
            .cloned()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<Admin> {
        self.admins.read().await.iter().find(|a| a.id == id).cloned()
    }

    // --- OPERAÇÕES DO DIRETÓRIO ---

    async fn check_draft(&self, draft: &AdminDraft, creating: bool) -> Result<(), AppError> {
        let mut errors = match draft.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if creating && draft.password.as_deref().is_none_or(|p| p.trim().is_empty()) {
            let mut error = ValidationError::new("required");
            error.message = Some("Password is required.".into());
            errors.add("password", error);
        }

        let known = self.registry.ids().await;
        if draft.branches.iter().any(|b| !known.contains(b)) {
            let mut error = ValidationError::new("unknown_branch");
            error.message = Some("One or more selected branches do not exist.".into());
            errors.add("branches", error);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }

    /// Super admin sempre tem todas as filiais registradas.
    async fn normalize_branches(&self, role: AdminRole, branches: Vec<String>) -> Vec<String> {
        match role {
            AdminRole::SuperAdmin => self.registry.ids().await,
            AdminRole::Admin => {
                let mut unique = Vec::with_capacity(branches.len());
                for branch in branches {
                    if !unique.contains(&branch) {
                        unique.push(branch);
                    }
                }
                unique
            }
        }
    }

    fn ensure_unique(admins: &[Admin], draft: &AdminDraft, except: Option<Uuid>) -> Result<(), AppError> {
        let clash = admins.iter().filter(|a| Some(a.id) != except).any(|a| {
            a.username.eq_ignore_ascii_case(draft.username.trim())
                || a.email.eq_ignore_ascii_case(draft.email.trim())
        });
        if clash {
            return Err(AppError::Conflict(
                "An admin with that username or email already exists.".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn list(&self, actor: &BranchAccess) -> Result<Vec<AdminProfile>, AppError> {
        require_super_admin(actor)?;
        Ok(self.admins.read().await.iter().map(Admin::profile).collect())
    }

    pub async fn get(&self, actor: &BranchAccess, id: Uuid) -> Result<AdminProfile, AppError> {
        require_super_admin(actor)?;
        self.find_by_id(id)
            .await
            .map(|a| a.profile())
            .ok_or_else(|| not_found(id))
    }

    pub async fn add_admin(&self, actor: &BranchAccess, draft: AdminDraft) -> Result<AdminProfile, AppError> {
        // 1. Permissão e validação
        require_super_admin(actor)?;
        self.check_draft(&draft, true).await?;

        // 2. Hash fora do lock
        let password_hash = match draft.password.as_deref() {
            Some(p) => Some(hash_password(p).await?),
            None => None,
        };
        let branches = self.normalize_branches(draft.role, draft.branches.clone()).await;

        // 3. Username e email únicos
        let mut admins = self.admins.write().await;
        Self::ensure_unique(&admins, &draft, None)?;

        let now = Utc::now();
        let admin = Admin {
            id: Uuid::now_v7(),
            username: draft.username.trim().to_string(),
            email: draft.email.trim().to_string(),
            password_hash,
            role: draft.role,
            branches,
            is_active: draft.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        // 4. Grava a cópia; a lista viva só muda se der certo
        let mut next = admins.clone();
        next.push(admin.clone());
        self.commit(&mut admins, next).await?;

        tracing::info!("👤 Admin '{}' created ({:?})", admin.username, admin.role);
        Ok(admin.profile())
    }

    /// A senha só é trocada quando vem preenchida.
    pub async fn edit_admin(
        &self,
        actor: &BranchAccess,
        id: Uuid,
        draft: AdminDraft,
    ) -> Result<AdminProfile, AppError> {
        require_super_admin(actor)?;
        self.check_draft(&draft, false).await?;

        let password_hash = match draft.password.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(p) => Some(hash_password(p).await?),
            None => None,
        };
        let branches = self.normalize_branches(draft.role, draft.branches.clone()).await;

        let mut admins = self.admins.write().await;
        Self::ensure_unique(&admins, &draft, Some(id))?;

        let remaining_super_admins = admins
            .iter()
            .filter(|a| a.id != id && a.is_super_admin())
            .count();
        let mut next = admins.clone();
        let admin = next.iter_mut().find(|a| a.id == id).ok_or_else(|| not_found(id))?;
        if admin.is_super_admin() && draft.role != AdminRole::SuperAdmin && remaining_super_admins == 0 {
            return Err(AppError::Conflict(
                "At least one super admin account must remain.".to_string(),
            ));
        }

        admin.username = draft.username.trim().to_string();
        admin.email = draft.email.trim().to_string();
        admin.role = draft.role;
        admin.branches = branches;
        if let Some(is_active) = draft.is_active {
            admin.is_active = is_active;
        }
        if password_hash.is_some() {
            admin.password_hash = password_hash;
        }
        admin.updated_at = Utc::now();

        let profile = admin.profile();
        self.commit(&mut admins, next).await?;
        Ok(profile)
    }

    /// Contas de super admin nunca são apagadas.
    pub async fn delete_admin(&self, actor: &BranchAccess, id: Uuid) -> Result<AdminProfile, AppError> {
        require_super_admin(actor)?;

        let mut admins = self.admins.write().await;
        let position = admins.iter().position(|a| a.id == id).ok_or_else(|| not_found(id))?;
        if admins[position].is_super_admin() {
            return Err(AppError::access_denied("super admin accounts cannot be deleted"));
        }

        let mut next = admins.clone();
        let removed = next.remove(position);
        self.commit(&mut admins, next).await?;

        tracing::info!("🗑️ Admin '{}' deleted", removed.username);
        Ok(removed.profile())
    }

    /// Inverte `isActive`. Sessões já abertas não são afetadas.
    pub async fn toggle_status(&self, actor: &BranchAccess, id: Uuid) -> Result<AdminProfile, AppError> {
        require_super_admin(actor)?;
        if actor.admin_id == id {
            return Err(AppError::BadRequest(
                "You cannot disable your own account.".to_string(),
            ));
        }

        let mut admins = self.admins.write().await;
        let mut next = admins.clone();
        let admin = next.iter_mut().find(|a| a.id == id).ok_or_else(|| not_found(id))?;
        admin.is_active = !admin.is_active;
        admin.updated_at = Utc::now();

        let profile = admin.profile();
        self.commit(&mut admins, next).await?;

        tracing::info!("Admin '{}' is_active={}", profile.username, profile.is_active);
        Ok(profile)
    }

    // --- CICLO DE VIDA DAS FILIAIS ---

    /// Registra a filial e concede a todos os super admins.
    pub async fn add_branch(&self, draft: BranchDraft) -> Result<Branch, AppError> {
        let mut admins = self.admins.write().await;
        let branch = self.registry.add_branch(draft).await?;

        let registered = self.registry.ids().await;
        let (next, changed) = reconcile_grants(admins.clone(), &registered);
        if changed {
            // A filial já foi registrada; o `init` corrige as permissões no próximo start
            if let Err(e) = self.commit(&mut admins, next).await {
                tracing::warn!("Branch '{}' added but admin grants were not updated: {}", branch.id, e);
            }
        }
        Ok(branch)
    }

    /// Recusa (409) se `id` é a única filial restante de algum admin; depois remove `id` de todas as permissões.
    /// Retorna se alguma filial foi apagada.
    pub async fn delete_branch(&self, id: &str) -> Result<bool, AppError> {
        if is_default_branch(id) {
            return self.registry.delete_branch(id).await;
        }

        // 1. Ninguém pode ficar sem filial
        let mut admins = self.admins.write().await;
        let remaining: Vec<String> = self
            .registry
            .ids()
            .await
            .into_iter()
            .filter(|b| b != id)
            .collect();
        let stranded: Vec<&str> = admins
            .iter()
            .filter(|a| !a.is_super_admin() && a.branches.iter().any(|b| b == id))
            .filter(|a| !a.branches.iter().any(|b| remaining.contains(b)))
            .map(|a| a.username.as_str())
            .collect();
        if !stranded.is_empty() {
            return Err(AppError::Conflict(format!(
                "'{id}' is the only branch of {}. Grant them another branch first.",
                stranded.join(", ")
            )));
        }

        // 2. Remove do registro
        if !self.registry.delete_branch(id).await? {
            return Ok(false);
        }

        // 3. Limpa as permissões que apontavam para ela
        let registered = self.registry.ids().await;
        let (next, changed) = reconcile_grants(admins.clone(), &registered);
        if changed {
            if let Err(e) = self.commit(&mut admins, next).await {
                tracing::warn!("Branch '{}' deleted but admin grants were not pruned: {}", id, e);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStateStore;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Aceita gravações até `fail` ser ligado.
    #[derive(Default)]
    struct SwitchableStore {
        inner: MemoryStateStore,
        fail: AtomicBool,
    }

    #[async_trait]
    impl StateStore for SwitchableStore {
        async fn load(&self, key: &str) -> Result<Option<Value>, AppError> {
            self.inner.load(key).await
        }
        async fn save(&self, key: &str, value: Value) -> Result<(), AppError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::StorageError("disk full".into()));
            }
            self.inner.save(key, value).await
        }
        async fn remove(&self, key: &str) -> Result<(), AppError> {
            self.inner.remove(key).await
        }
    }

    struct Fixture {
        store: Arc<dyn StateStore>,
        registry: Arc<BranchRegistry>,
        directory: AdminDirectory,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
        let registry = Arc::new(BranchRegistry::init(store.clone()).await);
        let directory = AdminDirectory::init(store.clone(), registry.clone(), None)
            .await
            .unwrap();
        Fixture {
            store,
            registry,
            directory,
        }
    }

    fn actor(role: AdminRole) -> BranchAccess {
        BranchAccess::new(Uuid::now_v7(), role, vec!["powai".into()], None)
    }

    fn branch_draft(name: &str) -> BranchDraft {
        BranchDraft {
            name: name.into(),
            location: "Mumbai".into(),
            address: String::new(),
            phone: String::new(),
            whatsapp: String::new(),
            manager: String::new(),
            email: None,
            status: Default::default(),
            color: None,
            icon: None,
        }
    }

    fn draft(username: &str, role: AdminRole, branches: &[&str]) -> AdminDraft {
        AdminDraft {
            username: username.into(),
            email: format!("{username}@salon.example"),
            password: Some("pw".into()),
            role,
            branches: branches.iter().map(|b| b.to_string()).collect(),
            is_active: None,
        }
    }

    #[tokio::test]
    async fn non_super_admin_is_denied_everything() {
        let f = fixture().await;
        let desk = actor(AdminRole::Admin);

        assert!(matches!(f.directory.list(&desk).await, Err(AppError::AccessDenied(_))));
        assert!(matches!(
            f.directory.add_admin(&desk, draft("x", AdminRole::Admin, &["powai"])).await,
            Err(AppError::AccessDenied(_))
        ));
    }

    #[tokio::test]
    async fn create_requires_password_and_branches() {
        let f = fixture().await;
        let mut bad = draft("", AdminRole::Admin, &[]);
        bad.password = None;

        let Err(AppError::ValidationError(errors)) =
            f.directory.add_admin(&actor(AdminRole::SuperAdmin), bad).await
        else {
            panic!("expected validation errors");
        };
        let fields = errors.field_errors();
        for field in ["username", "password", "branches"] {
            assert!(fields.keys().any(|k| *k == field), "missing {field}");
        }
        assert_eq!(f.directory.list(&actor(AdminRole::SuperAdmin)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_branch_is_rejected() {
        let f = fixture().await;
        let result = f
            .directory
            .add_admin(&actor(AdminRole::SuperAdmin), draft("desk", AdminRole::Admin, &["atlantis"]))
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn super_admin_branches_are_normalized() {
        let f = fixture().await;
        let created = f
            .directory
            .add_admin(&actor(AdminRole::SuperAdmin), draft("owner2", AdminRole::SuperAdmin, &["powai"]))
            .await
            .unwrap();
        assert_eq!(created.branches, f.registry.ids().await);
    }

    #[tokio::test]
    async fn super_admins_cannot_be_deleted() {
        let f = fixture().await;
        let root = actor(AdminRole::SuperAdmin);
        let seeded = f.directory.find_by_identifier(SEED_ADMIN_USERNAME).await.unwrap();

        let result = f.directory.delete_admin(&root, seeded.id).await;
        assert!(matches!(result, Err(AppError::AccessDenied(_))));

        let desk = f
            .directory
            .add_admin(&root, draft("desk", AdminRole::Admin, &["thane"]))
            .await
            .unwrap();
        f.directory.delete_admin(&root, desk.id).await.unwrap();
        assert!(f.directory.find_by_id(desk.id).await.is_none());
    }

    #[tokio::test]
    async fn toggle_flips_and_persists() {
        let f = fixture().await;
        let root = actor(AdminRole::SuperAdmin);
        let desk = f
            .directory
            .add_admin(&root, draft("desk", AdminRole::Admin, &["thane"]))
            .await
            .unwrap();

        let toggled = f.directory.toggle_status(&root, desk.id).await.unwrap();
        assert!(!toggled.is_active);

        let reloaded = AdminDirectory::init(f.store.clone(), f.registry.clone(), None)
            .await
            .unwrap();
        assert!(!reloaded.find_by_id(desk.id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let f = fixture().await;
        let result = f
            .directory
            .add_admin(&actor(AdminRole::SuperAdmin), draft("ADMIN", AdminRole::Admin, &["powai"]))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn last_super_admin_cannot_be_demoted() {
        let f = fixture().await;
        let seeded = f.directory.find_by_identifier(SEED_ADMIN_USERNAME).await.unwrap();
        let mut demote = draft("admin", AdminRole::Admin, &["powai"]);
        demote.email = seeded.email.clone();

        let result = f
            .directory
            .edit_admin(&actor(AdminRole::SuperAdmin), seeded.id, demote)
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn failed_writes_leave_the_directory_unchanged() {
        let store = Arc::new(SwitchableStore::default());
        let registry = Arc::new(BranchRegistry::init(store.clone()).await);
        let directory = AdminDirectory::init(store.clone(), registry, None).await.unwrap();
        let root = actor(AdminRole::SuperAdmin);
        let desk = directory
            .add_admin(&root, draft("desk", AdminRole::Admin, &["thane"]))
            .await
            .unwrap();

        store.fail.store(true, Ordering::SeqCst);

        let added = directory
            .add_admin(&root, draft("ghost", AdminRole::Admin, &["powai"]))
            .await;
        assert!(matches!(added, Err(AppError::StorageError(_))));
        assert!(directory.find_by_identifier("ghost").await.is_none());

        let mut rename = draft("front-desk", AdminRole::Admin, &["vashi"]);
        rename.password = None;
        let edited = directory.edit_admin(&root, desk.id, rename).await;
        assert!(matches!(edited, Err(AppError::StorageError(_))));

        let toggled = directory.toggle_status(&root, desk.id).await;
        assert!(matches!(toggled, Err(AppError::StorageError(_))));

        let deleted = directory.delete_admin(&root, desk.id).await;
        assert!(matches!(deleted, Err(AppError::StorageError(_))));

        let current = directory.find_by_id(desk.id).await.unwrap();
        assert_eq!(current.username, "desk");
        assert_eq!(current.branches, vec!["thane".to_string()]);
        assert!(current.is_active);
        assert_eq!(directory.list(&root).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn new_branch_is_granted_to_super_admins() {
        let f = fixture().await;
        f.directory.add_branch(branch_draft("Bandra")).await.unwrap();

        let seeded = f.directory.find_by_identifier(SEED_ADMIN_USERNAME).await.unwrap();
        assert!(seeded.branches.contains(&"bandra".to_string()));
        assert_eq!(seeded.branches, f.registry.ids().await);

        let reloaded = AdminDirectory::init(f.store.clone(), f.registry.clone(), None)
            .await
            .unwrap();
        let stored = reloaded.find_by_id(seeded.id).await.unwrap();
        assert_eq!(stored.branches, f.registry.ids().await);
    }

    #[tokio::test]
    async fn deleting_a_branch_prunes_grants_and_never_strands_an_admin() {
        let f = fixture().await;
        let root = actor(AdminRole::SuperAdmin);
        f.directory.add_branch(branch_draft("Bandra")).await.unwrap();

        let shared = f
            .directory
            .add_admin(&root, draft("shared", AdminRole::Admin, &["bandra", "thane"]))
            .await
            .unwrap();
        let solo = f
            .directory
            .add_admin(&root, draft("solo", AdminRole::Admin, &["bandra"]))
            .await
            .unwrap();

        let refused = f.directory.delete_branch("bandra").await;
        assert!(matches!(refused, Err(AppError::Conflict(ref m)) if m.contains("solo")));
        assert!(f.registry.get("bandra").await.is_some());

        f.directory.delete_admin(&root, solo.id).await.unwrap();
        assert!(f.directory.delete_branch("bandra").await.unwrap());
        assert!(f.registry.get("bandra").await.is_none());

        let pruned = f.directory.find_by_id(shared.id).await.unwrap();
        assert_eq!(pruned.branches, vec!["thane".to_string()]);
        let seeded = f.directory.find_by_identifier(SEED_ADMIN_USERNAME).await.unwrap();
        assert_eq!(seeded.branches, f.registry.ids().await);

        let reloaded = AdminDirectory::init(f.store.clone(), f.registry.clone(), None)
            .await
            .unwrap();
        assert_eq!(reloaded.find_by_id(shared.id).await.unwrap().branches, vec!["thane".to_string()]);
    }

    #[tokio::test]
    async fn default_branch_delete_is_refused_through_the_directory() {
        let f = fixture().await;
        assert!(!f.directory.delete_branch("powai").await.unwrap());
        assert!(f.registry.get("powai").await.is_some());
    }
}
