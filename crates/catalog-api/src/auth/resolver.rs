//! 토큰 subject → 인증 세션 변환.

use std::sync::Arc;

use tracing::{debug, warn};

use super::jwt::{TokenCodec, TokenError, VerifiedToken};
use super::session::AuthenticatedSession;
use crate::repository::{IdentityStore, IdentityStoreError};

/// 인증 해석 에러.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("등록되지 않은 사용자입니다: {0}")]
    UnknownSubject(String),
    #[error("사용자 저장소 조회 실패: {0}")]
    Store(#[source] IdentityStoreError),
}

impl From<IdentityStoreError> for AuthError {
    fn from(err: IdentityStoreError) -> Self {
        match err {
            IdentityStoreError::NotFound(subject) => AuthError::UnknownSubject(subject),
            other => AuthError::Store(other),
        }
    }
}

/// 토큰을 사용자 저장소의 주체와 연결합니다.
///
/// 존재하지 않는 subject는 익명 세션으로 대체하지 않고 항상
/// [`AuthError::UnknownSubject`]로 실패합니다.
#[derive(Clone)]
pub struct AuthenticationResolver {
    codec: TokenCodec,
    store: Arc<dyn IdentityStore>,
}

impl AuthenticationResolver {
    pub fn new(codec: TokenCodec, store: Arc<dyn IdentityStore>) -> Self {
        Self { codec, store }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn store(&self) -> &Arc<dyn IdentityStore> {
        &self.store
    }

    /// 토큰의 subject로 세션을 만듭니다.
    ///
    /// 서명만 확인하며 만료는 다시 검사하지 않습니다. 만료 검사가 필요한
    /// 경로는 [`TokenCodec::verify`] 후 [`Self::resolve_verified`]를 사용합니다.
    pub async fn resolve(&self, token: &str) -> Result<AuthenticatedSession, AuthError> {
        let subject = self.codec.decode_subject(token)?;
        self.load_session(&subject).await
    }

    /// 검증을 마친 토큰으로 세션을 만듭니다.
    pub async fn resolve_verified(
        &self,
        token: &VerifiedToken,
    ) -> Result<AuthenticatedSession, AuthError> {
        self.load_session(token.subject()).await
    }

    async fn load_session(&self, subject: &str) -> Result<AuthenticatedSession, AuthError> {
        let principal = self
            .store
            .load_principal_by_subject(subject)
            .await
            .map_err(|e| {
                match &e {
                    IdentityStoreError::NotFound(_) => debug!(subject, "Unknown token subject"),
                    other => warn!(subject, error = %other, "Identity store lookup failed"),
                }
                AuthError::from(e)
            })?;

        Ok(AuthenticatedSession::new(principal))
    }
}

impl std::fmt::Debug for AuthenticationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationResolver")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}
