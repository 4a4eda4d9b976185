// src/models/record.rs

use chrono::{DateTime, Utc};
use serde::{
    de::{DeserializeOwned, IntoDeserializer},
    Deserialize, Deserializer, Serialize,
};
use uuid::Uuid;

/// Formato comum às coleções por filial (agendamentos, clientes, produtos,
/// galeria, serviços, profissionais).
pub trait DomainRecord: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Draft: Send;
    type Patch: Send;

    /// Nome da coleção no namespace do state store.
    const COLLECTION: &'static str;
    /// Rótulo usado nas mensagens ("appointment", "product", ...).
    const LABEL: &'static str;
    const DELETE_REQUIRES_SUPER_ADMIN: bool = false;

    fn id(&self) -> Uuid;
    fn create(id: Uuid, branch_id: &str, draft: Self::Draft, now: DateTime<Utc>) -> Self;
    /// Aplica os campos enviados e atualiza `updatedAt`.
    fn merge(&mut self, patch: Self::Patch, now: DateTime<Utc>);

    /// Dados iniciais, usados na primeira leitura da coleção da filial.
    fn defaults(_branch_id: &str) -> Vec<Self::Draft> {
        Vec::new()
    }
}

/// Filtro por categoria; `"all"` (ou vazio) casa com tudo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(expected) => expected == value,
        }
    }
}

impl<T> Filter<T> {
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Filter::All => None,
            Filter::Only(value) => Some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Filter<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            return Ok(Filter::All);
        }
        let inner: serde::de::value::StringDeserializer<D::Error> =
            raw.to_string().into_deserializer();
        T::deserialize(inner).map(Filter::Only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum Colour {
        Red,
        Blue,
    }

    #[derive(Debug, Deserialize)]
    struct Query {
        #[serde(default)]
        colour: Filter<Colour>,
    }

    #[test]
    fn all_and_missing_values_match_everything() {
        let q: Query = serde_json::from_str(r#"{"colour":"all"}"#).unwrap();
        assert_eq!(q.colour, Filter::All);
        let q: Query = serde_json::from_str("{}").unwrap();
        assert_eq!(q.colour, Filter::All);
        assert!(q.colour.matches(&Colour::Red));
    }

    #[test]
    fn concrete_value_matches_exactly() {
        let q: Query = serde_json::from_str(r#"{"colour":"blue"}"#).unwrap();
        assert_eq!(q.colour, Filter::Only(Colour::Blue));
        assert!(q.colour.matches(&Colour::Blue));
        assert!(!q.colour.matches(&Colour::Red));
    }

    #[test]
    fn unknown_value_is_rejected() {
        let q: Result<Query, _> = serde_json::from_str(r#"{"colour":"green"}"#);
        assert!(q.is_err());
    }
}
