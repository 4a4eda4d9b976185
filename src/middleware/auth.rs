// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{common::error::AppError, config::AppState, models::session::AdminSession};

// Token Bearer -> sessão do admin, guardada nas extensions da request
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>() else {
        return Err(AppError::InvalidToken);
    };

    let session = app_state.auth.authenticate(bearer.token()).await?;
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Admin logado e o acesso às filiais. Só existe atrás do `auth_guard`.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub AdminSession);

impl<S> FromRequestParts<S> for CurrentAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminSession>()
            .cloned()
            .map(CurrentAdmin)
            .ok_or(AppError::InvalidToken)
    }
}
