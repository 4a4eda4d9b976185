// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        admin::{Admin, Claims, LoginPayload},
        session::{AdminSession, LoginResponse},
    },
    services::{
        admin_service::AdminDirectory,
        branch_service::{BranchRegistry, SessionService},
    },
};

pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;
    Ok(valid)
}

#[derive(Clone)]
pub struct AuthService {
    admins: Arc<AdminDirectory>,
    registry: Arc<BranchRegistry>,
    sessions: SessionService,
    jwt_secret: String,
    token_ttl: Duration,
    demo_mode: bool,
}

impl AuthService {
    pub fn new(
        admins: Arc<AdminDirectory>,
        registry: Arc<BranchRegistry>,
        sessions: SessionService,
        jwt_secret: String,
        token_ttl: Duration,
        demo_mode: bool,
    ) -> Self {
        Self {
            admins,
            registry,
            sessions,
            jwt_secret,
            token_ttl,
            demo_mode,
        }
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    async fn check_password(&self, admin: &Admin, password: &str) -> Result<(), AppError> {
        match &admin.password_hash {
            Some(password_hash) => {
                if verify_password(password, password_hash).await? {
                    Ok(())
                } else {
                    Err(AppError::InvalidCredentials)
                }
            }
            None if self.demo_mode => {
                tracing::warn!(
                    "Demo mode: '{}' logged in without a stored password",
                    admin.username
                );
                Ok(())
            }
            None => Err(AppError::InvalidCredentials),
        }
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<LoginResponse, AppError> {
        // 1. Busca por username ou email
        let admin = self
            .admins
            .find_by_identifier(&payload.identifier)
            .await
            .ok_or(AppError::InvalidCredentials)?;

        // 2. Conta desativada não entra
        if !admin.is_active {
            tracing::warn!("Login refused for disabled admin '{}'", admin.username);
            return Err(AppError::AdminInactive);
        }
        // 3. Confere a senha (bcrypt em thread separada)
        self.check_password(&admin, &payload.password).await?;

        // 4. Token + sessão com a filial atual
        let token = self.create_token(&admin)?;
        let access = self.sessions.start(&admin).await?;
        let branches = access.branches_for_select(&self.registry.all().await);

        Ok(LoginResponse {
            success: true,
            token,
            user: admin.profile(),
            current_branch: access.current_branch,
            branches,
        })
    }

    pub async fn logout(&self, admin_id: Uuid) -> Result<(), AppError> {
        self.sessions.end(admin_id).await
    }

    /// Token -> admin -> sessão ativa -> acesso às filiais.
    pub async fn authenticate(&self, token: &str) -> Result<AdminSession, AppError> {
        let claims = self.decode_token(token)?;

        let admin = self
            .admins
            .find_by_id(claims.sub)
            .await
            .ok_or(AppError::InvalidToken)?;
        let access = self
            .sessions
            .resume(&admin)
            .await?
            .ok_or(AppError::InvalidToken)?;

        Ok(AdminSession { admin, access })
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    fn create_token(&self, admin: &Admin) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: admin.id,
            role: admin.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::MemoryStateStore, db::StateStore, models::admin::AdminRole};

    async fn auth(seed_password: Option<&str>, demo_mode: bool) -> AuthService {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
        let registry = Arc::new(BranchRegistry::init(store.clone()).await);
        let admins = Arc::new(
            AdminDirectory::init(store.clone(), registry.clone(), seed_password.map(String::from))
                .await
                .unwrap(),
        );
        let sessions = SessionService::new(store, registry.clone());
        AuthService::new(
            admins,
            registry,
            sessions,
            "test-secret".into(),
            Duration::hours(1),
            demo_mode,
        )
    }

    fn login(identifier: &str, password: &str) -> LoginPayload {
        LoginPayload {
            identifier: identifier.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn seeded_super_admin_can_log_in() {
        let auth = auth(Some("s3cret"), false).await;
        let response = auth.login(login("ADMIN", "s3cret")).await.unwrap();

        assert!(response.success);
        assert_eq!(response.user.role, AdminRole::SuperAdmin);
        assert_eq!(response.branches.len(), 3);

        let session = auth.authenticate(&response.token).await.unwrap();
        assert!(session.access.is_super_admin());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = auth(Some("s3cret"), false).await;
        let result = auth.login(login("admin", "guess")).await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn hashless_admin_needs_demo_mode() {
        let strict = auth(None, false).await;
        assert!(matches!(
            strict.login(login("admin", "")).await,
            Err(AppError::InvalidCredentials)
        ));

        let demo = auth(None, true).await;
        assert!(demo.login(login("admin", "anything")).await.is_ok());
    }

    #[tokio::test]
    async fn logout_invalidates_the_token() {
        let auth = auth(Some("s3cret"), false).await;
        let response = auth.login(login("admin", "s3cret")).await.unwrap();
        let session = auth.authenticate(&response.token).await.unwrap();

        auth.logout(session.admin.id).await.unwrap();
        assert!(matches!(
            auth.authenticate(&response.token).await,
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn garbage_token_is_invalid() {
        let auth = auth(Some("s3cret"), false).await;
        assert!(matches!(auth.authenticate("not.a.jwt").await, Err(AppError::InvalidToken)));
    }
}
