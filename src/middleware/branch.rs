// src/middleware/branch.rs

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, models::session::AdminSession};

const BRANCH_ID_HEADER: &str = "x-branch-id";

/// Filial em que a request de gestão atua: o header `x-branch-id` quando vem,
/// senão a filial atual da sessão. Nos dois casos o admin precisa ter acesso a ela.
#[derive(Debug, Clone)]
pub struct BranchScope(pub String);

impl<S> FromRequestParts<S> for BranchScope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<AdminSession>()
            .ok_or(AppError::InvalidToken)?;

        let requested = match parts.headers.get(BRANCH_ID_HEADER) {
            Some(value) => {
                let value = value
                    .to_str()
                    .map_err(|_| AppError::BadRequest("The x-branch-id header contains invalid characters.".into()))?
                    .trim();
                Some(value.to_string()).filter(|v| !v.is_empty())
            }
            None => None,
        };

        let branch_id = requested
            .or_else(|| session.access.current_branch.clone())
            .ok_or_else(|| AppError::BadRequest("No branch selected for this request.".into()))?;

        if !session.access.can_access_branch(&branch_id) {
            return Err(AppError::access_denied(format!(
                "'{}' may not act on branch '{}'",
                session.admin.username, branch_id
            )));
        }
        Ok(BranchScope(branch_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        admin::{Admin, AdminRole},
        session::BranchAccess,
    };
    use axum::http::Request;
    use uuid::Uuid;

    fn parts(header: Option<&str>, branches: &[&str]) -> Parts {
        let mut builder = Request::builder().uri("/api/clients");
        if let Some(value) = header {
            builder = builder.header(BRANCH_ID_HEADER, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();

        let now = chrono::Utc::now();
        let admin = Admin {
            id: Uuid::nil(),
            username: "ria".into(),
            email: "ria@salon.example".into(),
            password_hash: None,
            role: AdminRole::Admin,
            branches: branches.iter().map(|b| b.to_string()).collect(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let access = BranchAccess::new(
            admin.id,
            AdminRole::Admin,
            branches.iter().map(|b| b.to_string()).collect(),
            None,
        );
        parts.extensions.insert(AdminSession { admin, access });
        parts
    }

    #[tokio::test]
    async fn falls_back_to_current_branch() {
        let mut parts = parts(None, &["powai", "thane"]);
        let scope = BranchScope::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(scope.0, "powai");
    }

    #[tokio::test]
    async fn header_selects_a_permitted_branch() {
        let mut parts = parts(Some("thane"), &["powai", "thane"]);
        let scope = BranchScope::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(scope.0, "thane");
    }

    #[tokio::test]
    async fn foreign_branch_is_denied() {
        let mut parts = parts(Some("vashi"), &["powai"]);
        let result = BranchScope::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::AccessDenied(_))));
    }
}
