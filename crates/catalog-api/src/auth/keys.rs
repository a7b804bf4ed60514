//! 토큰 서명 키.
//!
//! 설정된 패스프레이즈를 base64로 인코딩해 보관하고, 이 인코딩을 되돌린
//! 원본 바이트를 HMAC 키로 사용합니다. base64 시크릿을 받는 다른 JWT
//! 라이브러리와 같은 키가 됩니다. 해시가 아니므로 같은 패스프레이즈는 항상
//! 같은 키를 만듭니다.

use base64::{engine::general_purpose::STANDARD, Engine};
use jsonwebtoken::{DecodingKey, EncodingKey};
use tracing::{info, warn};

/// 패스프레이즈가 설정되지 않았을 때 사용하는 기본값.
///
/// **안전하지 않습니다.** 공개된 값이므로 누구나 유효한 토큰을 만들 수 있습니다.
/// 운영 환경에서는 반드시 `CATALOG__AUTH__SECRET`으로 덮어써야 합니다.
pub const INSECURE_DEFAULT_PASSPHRASE: &str = "secretKey";

/// 대칭 서명 키.
///
/// 기동 시 한 번 만들어진 뒤 변경되지 않으며, [`TokenCodec`](super::TokenCodec)이
/// `Arc`로 공유합니다.
#[derive(Clone)]
pub struct SigningKey {
    encoded: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
    insecure_default: bool,
}

impl SigningKey {
    /// 패스프레이즈로부터 서명 키를 초기화합니다.
    ///
    /// `None`이거나 빈 문자열이면 [`INSECURE_DEFAULT_PASSPHRASE`]를 사용하고
    /// 경고를 남깁니다. 실패하지 않습니다.
    pub fn initialize(passphrase: Option<&str>) -> Self {
        info!("Initializing token signing key");

        let (passphrase, insecure_default) = match passphrase.filter(|p| !p.is_empty()) {
            Some(p) => (p, false),
            None => {
                warn!("No signing passphrase configured, using the built-in default (INSECURE, development only)");
                (INSECURE_DEFAULT_PASSPHRASE, true)
            }
        };

        let encoded = STANDARD.encode(passphrase.as_bytes());

        // base64 디코딩 결과 == 원본 바이트
        let key = Self {
            encoding: EncodingKey::from_secret(passphrase.as_bytes()),
            decoding: DecodingKey::from_secret(passphrase.as_bytes()),
            encoded,
            insecure_default,
        };

        info!(insecure_default, "Token signing key initialized");
        key
    }

    /// base64로 인코딩된 키 표현.
    pub fn as_base64(&self) -> &str {
        &self.encoded
    }

    /// 내장 기본 패스프레이즈로 만들어진 키인지 여부.
    pub fn is_insecure_default(&self) -> bool {
        self.insecure_default
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("insecure_default", &self.insecure_default)
            .finish_non_exhaustive()
    }
}
