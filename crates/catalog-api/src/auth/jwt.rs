//! JWT 토큰 처리.
//!
//! HS256으로 서명된 `header.payload.signature` 형식의 토큰을 발급하고 검증합니다.
//!
//! 검증 경로는 두 가지입니다:
//! - [`TokenCodec::verify`]: 서명과 만료를 함께 확인하고 [`VerifiedToken`]을 반환합니다.
//!   요청 인증 미들웨어는 이 경로만 사용합니다.
//! - [`TokenCodec::validate`] / [`TokenCodec::decode_subject`]: 불리언 게이트와
//!   subject 추출을 분리한 형태입니다. `decode_subject`는 만료를 확인하지 않으므로
//!   `validate`를 먼저 통과한 토큰에만 사용해야 합니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::keys::SigningKey;

/// 토큰 페이로드.
///
/// 와이어 형식: `{"sub": ..., "roles": [...], "iat": ..., "exp": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - 사용자 식별자 (uid)
    pub sub: String,
    /// 역할 목록 (순서 유지, 비어 있을 수 있음)
    #[serde(default)]
    pub roles: Vec<String>,
    /// Issued At (Unix timestamp, 초)
    pub iat: i64,
    /// Expiration (Unix timestamp, 초)
    pub exp: i64,
}

impl TokenClaims {
    /// 발급 시각과 유효 기간으로 Claims를 생성합니다.
    pub fn new(
        subject: impl Into<String>,
        roles: Vec<String>,
        issued_at: DateTime<Utc>,
        validity_secs: i64,
    ) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: subject.into(),
            roles,
            iat,
            exp: iat.saturating_add(validity_secs),
        }
    }

    /// `now` 기준 만료 여부. `exp == now`는 아직 유효합니다.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp < now.timestamp()
    }
}

/// 토큰 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
    #[error("잘못된 토큰 형식")]
    Malformed,
    #[error("토큰 서명이 유효하지 않습니다")]
    InvalidSignature,
    #[error("토큰이 만료되었습니다")]
    Expired,
}

impl TokenError {
    /// 구조 또는 서명 검증 실패인지 확인합니다.
    pub fn is_verification_failure(&self) -> bool {
        matches!(self, TokenError::Malformed | TokenError::InvalidSignature)
    }

    /// 메트릭 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            TokenError::Encoding(_) => "encoding",
            TokenError::Malformed => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired => "expired",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidSignature
            }
            _ => TokenError::Malformed,
        }
    }
}

/// 서명과 만료 검증을 모두 통과한 토큰.
///
/// [`TokenCodec::verify`]로만 만들 수 있습니다.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    claims: TokenClaims,
}

impl VerifiedToken {
    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    pub fn roles(&self) -> &[String] {
        &self.claims.roles
    }
}

/// 토큰 발급/검증기.
///
/// 서명 키는 `Arc`로 공유되는 읽기 전용 값이므로 요청 간 복제 비용이 작습니다.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    key: Arc<SigningKey>,
    validity_secs: i64,
    validation: Validation,
}

impl TokenCodec {
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    /// 새 코덱 생성.
    ///
    /// # Arguments
    ///
    /// * `key` - 서명 키
    /// * `validity_secs` - 발급 토큰의 유효 기간 (초)
    pub fn new(key: SigningKey, validity_secs: i64) -> Self {
        let mut validation = Validation::new(Self::ALGORITHM);
        // 만료는 호출자가 넘긴 `now`로 직접 비교
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            key: Arc::new(key),
            validity_secs,
            validation,
        }
    }

    /// 발급 토큰 유효 기간 (초).
    pub fn validity_secs(&self) -> i64 {
        self.validity_secs
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.key
    }

    /// 토큰 발급.
    ///
    /// `iat = now`, `exp = now + validity`로 Claims를 만들고 서명합니다.
    /// 같은 입력과 `now`에 대해 항상 같은 문자열을 반환합니다.
    pub fn issue(
        &self,
        subject: &str,
        roles: &[String],
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims::new(subject, roles.to_vec(), now, self.validity_secs);

        encode(
            &Header::new(Self::ALGORITHM),
            &claims,
            self.key.encoding_key(),
        )
        .map_err(TokenError::Encoding)
    }

    /// 구조와 서명만 검증하고 Claims를 반환합니다.
    fn decode_claims(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, self.key.decoding_key(), &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::from)
    }

    /// 토큰의 subject를 반환합니다.
    ///
    /// 서명은 검증하지만 **만료는 확인하지 않습니다.**
    pub fn decode_subject(&self, token: &str) -> Result<String, TokenError> {
        self.decode_claims(token).map(|claims| claims.sub)
    }

    /// 서명과 만료를 함께 검증합니다.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedToken, TokenError> {
        let claims = self.decode_claims(token)?;

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(VerifiedToken { claims })
    }

    /// 토큰 유효성 게이트.
    ///
    /// 형식, 서명, 만료 중 하나라도 실패하면 `false`를 반환하며 에러를 올리지 않습니다.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> bool {
        match self.verify(token, now) {
            Ok(_) => true,
            Err(e) => {
                debug!(reason = e.label(), "Token validation failed");
                false
            }
        }
    }
}
