//! Axum용 인증 추출기.
//!
//! 요청 인증 레이어([`crate::middleware::authenticate`])가 request extensions에
//! 넣어 둔 [`AuthenticatedSession`]을 핸들러로 꺼내옵니다.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::resolver::AuthError;
use super::session::{AuthenticatedSession, Authentication};
use crate::error::ApiErrorResponse;

/// 인증 거부 사유.
#[derive(Debug, thiserror::Error)]
pub enum JwtAuthError {
    #[error("인증이 필요합니다")]
    AuthenticationRequired,
    #[error("등록되지 않은 사용자의 토큰입니다")]
    UnknownSubject(String),
    #[error("사용자 저장소를 사용할 수 없습니다")]
    IdentityStoreUnavailable,
    #[error("권한이 부족합니다: {0}")]
    InsufficientAuthority(String),
}

impl JwtAuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            JwtAuthError::AuthenticationRequired
            | JwtAuthError::UnknownSubject(_) => StatusCode::UNAUTHORIZED,
            JwtAuthError::IdentityStoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            JwtAuthError::InsufficientAuthority(_) => StatusCode::FORBIDDEN,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            JwtAuthError::AuthenticationRequired => "AUTH_REQUIRED",
            JwtAuthError::UnknownSubject(_) => "UNKNOWN_SUBJECT",
            JwtAuthError::IdentityStoreUnavailable => "IDENTITY_STORE_UNAVAILABLE",
            JwtAuthError::InsufficientAuthority(_) => "INSUFFICIENT_AUTHORITY",
        }
    }
}

/// 토큰 자체의 문제(형식, 서명, 만료)는 익명 요청과 같이 `AUTH_REQUIRED`로 응답합니다.
impl From<AuthError> for JwtAuthError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Token(_) => JwtAuthError::AuthenticationRequired,
            AuthError::UnknownSubject(subject) => JwtAuthError::UnknownSubject(subject),
            AuthError::Store(_) => JwtAuthError::IdentityStoreUnavailable,
        }
    }
}

impl IntoResponse for JwtAuthError {
    fn into_response(self) -> Response {
        let body = ApiErrorResponse::new(self.code(), self.to_string());
        (self.status(), Json(body)).into_response()
    }
}

/// 인증된 세션을 요구하는 추출기.
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(session): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", session.name())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedSession);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = JwtAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedSession>()
            .cloned()
            .map(RequireAuth)
            .ok_or(JwtAuthError::AuthenticationRequired)
    }
}

/// 세션이 있으면 가져오고 없으면 `None` (익명 요청).
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthenticatedSession>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(
            parts.extensions.get::<AuthenticatedSession>().cloned(),
        ))
    }
}

/// 세션이 특정 권한을 가지고 있는지 확인합니다.
pub fn require_authority(
    session: &impl Authentication,
    authority: &str,
) -> Result<(), JwtAuthError> {
    if session.has_authority(authority) {
        Ok(())
    } else {
        Err(JwtAuthError::InsufficientAuthority(authority.to_string()))
    }
}
