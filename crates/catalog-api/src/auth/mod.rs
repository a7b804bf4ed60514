//! 인증 및 권한 부여.
//!
//! `X-AUTH-TOKEN` 헤더의 HS256 토큰을 검증하고, 토큰 subject를 사용자 저장소의
//! 주체와 연결해 요청 단위 세션을 만듭니다.
//!
//! # 구성 요소
//!
//! - [`SigningKey`]: 기동 시 한 번 만들어지는 서명 키
//! - [`TokenCodec`]: 토큰 발급/검증
//! - [`extract`]: 요청 헤더에서 토큰 추출
//! - [`AuthenticationResolver`]: subject → [`AuthenticatedSession`]
//! - [`RequireAuth`] / [`OptionalAuth`]: 핸들러용 추출기
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(RequireAuth(session): RequireAuth) -> impl IntoResponse {
//!     require_authority(&session, "ROLE_ADMIN")?;
//!     Ok::<_, JwtAuthError>(format!("Hello, {}!", session.name()))
//! }
//! ```

mod extractor;
mod jwt;
mod keys;
mod middleware;
mod password;
mod principal;
mod resolver;
mod session;

pub use extractor::{extract, AUTH_TOKEN_HEADER};
pub use jwt::{TokenClaims, TokenCodec, TokenError, VerifiedToken};
pub use keys::{SigningKey, INSECURE_DEFAULT_PASSPHRASE};
pub use middleware::{require_authority, JwtAuthError, OptionalAuth, RequireAuth};
pub use password::{check_credentials, hash_password, verify_password, PasswordError};
pub use principal::{Authority, Principal, UserDetails};
pub use resolver::{AuthError, AuthenticationResolver};
pub use session::{AuthenticatedSession, Authentication};
