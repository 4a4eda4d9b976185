// src/services/record_store.rs

use std::{marker::PhantomData, sync::Arc};

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{keys, load_json, save_json, StateStore},
    models::{record::DomainRecord, session::BranchAccess},
};

/// Único escritor de uma coleção do domínio, particionada por filial.
///
/// Toda alteração carrega a coleção da filial, muda e grava ela inteira de volta.
pub struct RecordStore<T> {
    store: Arc<dyn StateStore>,
    write_lock: Arc<Mutex<()>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for RecordStore<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            write_lock: self.write_lock.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: DomainRecord> RecordStore<T> {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
            _record: PhantomData,
        }
    }

    fn key(branch_id: &str) -> String {
        keys::collection(T::COLLECTION, branch_id)
    }

    async fn read(&self, branch_id: &str) -> Result<Option<Vec<T>>, AppError> {
        load_json::<Vec<T>>(self.store.as_ref(), &Self::key(branch_id)).await
    }

    async fn write(&self, branch_id: &str, records: &[T]) -> Result<(), AppError> {
        save_json(self.store.as_ref(), &Self::key(branch_id), records).await
    }

    /// Carrega a coleção; se a chave não existe, grava os dados iniciais.
    /// Quem chama precisa estar com o lock de escrita.
    async fn load_locked(&self, branch_id: &str) -> Result<Vec<T>, AppError> {
        if let Some(records) = self.read(branch_id).await? {
            return Ok(records);
        }

        let now = Utc::now();
        let seeded: Vec<T> = T::defaults(branch_id)
            .into_iter()
            .map(|draft| T::create(Uuid::now_v7(), branch_id, draft, now))
            .collect();

        if !seeded.is_empty() {
            self.write(branch_id, &seeded).await?;
            tracing::info!(
                "🌱 Seeded {} default {} record(s) for branch '{}'",
                seeded.len(),
                T::LABEL,
                branch_id
            );
        }
        Ok(seeded)
    }

    pub async fn list(&self, branch_id: &str) -> Result<Vec<T>, AppError> {
        if let Some(records) = self.read(branch_id).await? {
            return Ok(records);
        }
        let _guard = self.write_lock.lock().await;
        self.load_locked(branch_id).await
    }

    pub async fn get(&self, branch_id: &str, id: Uuid) -> Result<T, AppError> {
        self.list(branch_id)
            .await?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| not_found::<T>(id))
    }

    /// Gera um id novo ordenado no tempo e a data de criação.
    pub async fn add(&self, branch_id: &str, draft: T::Draft) -> Result<T, AppError> {
        self.add_checked(branch_id, draft, |_| Ok(())).await
    }

    /// Igual ao `add`, mas antes o `check` vê a coleção atual sob o lock de escrita
    /// e pode recusar a inclusão.
    pub async fn add_checked<F>(&self, branch_id: &str, draft: T::Draft, check: F) -> Result<T, AppError>
    where
        F: FnOnce(&[T]) -> Result<(), AppError> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_locked(branch_id).await?;
        check(&records)?;

        let record = T::create(Uuid::now_v7(), branch_id, draft, Utc::now());
        records.push(record.clone());
        self.write(branch_id, &records).await?;

        tracing::debug!("{} {} added to branch '{}'", T::LABEL, record.id(), branch_id);
        Ok(record)
    }

    pub async fn edit(&self, branch_id: &str, id: Uuid, patch: T::Patch) -> Result<T, AppError> {
        let (record, ()) = self
            .update_with(branch_id, id, move |record| {
                record.merge(patch, Utc::now());
                Ok(())
            })
            .await?;
        Ok(record)
    }

    /// Roda `change` em um registro e grava a coleção se der certo.
    pub async fn update_with<R, F>(&self, branch_id: &str, id: Uuid, change: F) -> Result<(T, R), AppError>
    where
        F: FnOnce(&mut T) -> Result<R, AppError> + Send,
        R: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_locked(branch_id).await?;

        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| not_found::<T>(id))?;
        let outcome = change(record)?;
        let updated = record.clone();

        self.write(branch_id, &records).await?;
        Ok((updated, outcome))
    }

    /// Remove o registro. Coleções com `DELETE_REQUIRES_SUPER_ADMIN` recusam quem não é super admin.
    pub async fn delete(&self, actor: &BranchAccess, branch_id: &str, id: Uuid) -> Result<T, AppError> {
        if T::DELETE_REQUIRES_SUPER_ADMIN && !actor.is_super_admin() {
            return Err(AppError::access_denied(format!(
                "only a super admin may delete a {}",
                T::LABEL
            )));
        }

        let _guard = self.write_lock.lock().await;
        let mut records = self.load_locked(branch_id).await?;

        let position = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| not_found::<T>(id))?;
        let removed = records.remove(position);
        self.write(branch_id, &records).await?;

        tracing::info!("🗑️ {} {} deleted from branch '{}'", T::LABEL, id, branch_id);
        Ok(removed)
    }
}

fn not_found<T: DomainRecord>(id: Uuid) -> AppError {
    AppError::NotFound(format!("No {} with id {}", T::LABEL, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryStateStore,
        models::{
            admin::AdminRole,
            catalog::Stylist,
            client::{Client, ClientDraft, ClientPatch},
            product::{Product, ProductDraft},
        },
    };
    use rust_decimal::Decimal;

    fn store() -> Arc<dyn StateStore> {
        Arc::new(MemoryStateStore::new())
    }

    fn actor(role: AdminRole) -> BranchAccess {
        BranchAccess::new(Uuid::nil(), role, vec!["powai".into()], None)
    }

    fn client_draft(name: &str) -> ClientDraft {
        ClientDraft {
            name: name.into(),
            phone: Some("9876543210".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn add_edit_delete_cycle() {
        let clients: RecordStore<Client> = RecordStore::new(store());

        let created = clients.add("powai", client_draft("Jane")).await.unwrap();
        assert!(created.updated_at.is_none());

        let edited = clients
            .edit(
                "powai",
                created.id,
                ClientPatch {
                    notes: Some("prefers mornings".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.name, "Jane");
        assert_eq!(edited.notes, "prefers mornings");
        assert!(edited.updated_at.is_some());

        clients
            .delete(&actor(AdminRole::Admin), "powai", created.id)
            .await
            .unwrap();
        assert!(clients.list("powai").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn collections_are_partitioned_by_branch() {
        let clients: RecordStore<Client> = RecordStore::new(store());
        clients.add("powai", client_draft("Jane")).await.unwrap();

        assert_eq!(clients.list("powai").await.unwrap().len(), 1);
        assert!(clients.list("thane").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn gated_delete_requires_super_admin() {
        let products: RecordStore<Product> = RecordStore::new(store());
        let product = products
            .add(
                "powai",
                ProductDraft {
                    name: "Argan Oil".into(),
                    category: "Hair Care".into(),
                    brand: String::new(),
                    description: String::new(),
                    price: Decimal::from(900),
                    stock: 3,
                    low_stock_threshold: None,
                },
            )
            .await
            .unwrap();

        let denied = products
            .delete(&actor(AdminRole::Admin), "powai", product.id)
            .await;
        assert!(matches!(denied, Err(AppError::AccessDenied(_))));
        assert_eq!(products.list("powai").await.unwrap().len(), 1);

        products
            .delete(&actor(AdminRole::SuperAdmin), "powai", product.id)
            .await
            .unwrap();
        assert!(products.list("powai").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let clients: RecordStore<Client> = RecordStore::new(store());
        let result = clients.edit("powai", Uuid::now_v7(), ClientPatch::default()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn defaults_are_seeded_once() {
        let shared = store();
        let stylists: RecordStore<Stylist> = RecordStore::new(shared.clone());

        let first = stylists.list("powai").await.unwrap();
        assert!(!first.is_empty());

        let again: RecordStore<Stylist> = RecordStore::new(shared);
        let second = again.list("powai").await.unwrap();
        let ids: Vec<Uuid> = second.iter().map(|s| s.id).collect();
        assert_eq!(ids, first.iter().map(|s| s.id).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn corrupt_collection_is_reported() {
        let shared = store();
        shared
            .save(&keys::collection("clients", "powai"), serde_json::json!({"not": "a list"}))
            .await
            .unwrap();

        let clients: RecordStore<Client> = RecordStore::new(shared);
        assert!(clients.list("powai").await.is_err());
    }
}
