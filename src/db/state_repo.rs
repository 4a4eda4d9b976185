// src/db/state_repo.rs

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::{types::Json, PgPool};
use tokio::sync::RwLock;

use crate::common::error::AppError;

/// Chaves com namespace. Cada chave guarda um documento JSON independente.
pub mod keys {
    use uuid::Uuid;

    pub const BRANCHES: &str = "salon.branches";
    pub const ADMINS: &str = "salon.admins";

    pub fn session(admin_id: Uuid) -> String {
        format!("salon.session.{admin_id}")
    }

    pub fn current_branch(admin_id: Uuid) -> String {
        format!("salon.current_branch.{admin_id}")
    }

    pub fn collection(name: &str, branch_id: &str) -> String {
        format!("salon.{name}.{branch_id}")
    }
}

/// Armazenamento chave/valor durável de documentos JSON inteiros.
///
/// Gravar substitui o documento anterior (vale a última escrita); não há checagem de versão.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<Value>, AppError>;
    async fn save(&self, key: &str, value: Value) -> Result<(), AppError>;
    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

pub async fn load_json<T: DeserializeOwned>(
    store: &dyn StateStore,
    key: &str,
) -> Result<Option<T>, AppError> {
    match store.load(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn StateStore,
    key: &str,
    value: &T,
) -> Result<(), AppError> {
    let value = serde_json::to_value(value)?;
    store.save(key, value).await
}

// =========================================================================
//  POSTGRES
// =========================================================================

#[derive(Clone)]
pub struct PgStateStore {
    pool: PgPool,
}

impl PgStateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StateStore for PgStateStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, AppError> {
        let row: Option<(Json<Value>,)> =
            sqlx::query_as("SELECT value FROM app_state WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(Json(value),)| value))
    }

    async fn save(&self, key: &str, value: Value) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO app_state (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(Json(value))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM app_state WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =========================================================================
//  EM MEMÓRIA (dev sem DATABASE_URL e testes)
// =========================================================================

#[derive(Default)]
pub struct MemoryStateStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, AppError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: Value) -> Result<(), AppError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Note {
        text: String,
    }

    #[tokio::test]
    async fn json_round_trip_through_memory_store() {
        let store = MemoryStateStore::new();
        let note = Note { text: "hello".into() };

        save_json(&store, "salon.notes", &note).await.unwrap();
        let loaded: Option<Note> = load_json(&store, "salon.notes").await.unwrap();

        assert_eq!(loaded, Some(note));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let store = MemoryStateStore::new();
        let loaded: Option<Note> = load_json(&store, "salon.absent").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn malformed_document_is_a_serialization_error() {
        let store = MemoryStateStore::new();
        store
            .save("salon.notes", serde_json::json!({ "unexpected": 1 }))
            .await
            .unwrap();

        let result: Result<Option<Note>, _> = load_json(&store, "salon.notes").await;
        assert!(matches!(result, Err(AppError::Serialization(_))));
    }

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(keys::collection("appointments", "powai"), "salon.appointments.powai");
        assert!(keys::session(uuid::Uuid::nil()).starts_with("salon.session."));
    }
}
