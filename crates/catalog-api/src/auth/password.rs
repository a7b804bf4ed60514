//! 비밀번호 해싱.
//!
//! 로그인 시 저장소의 Argon2id PHC 해시와 입력 비밀번호를 비교합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

/// 존재하지 않는 사용자의 로그인 시도에 비교 대상으로 쓰는 해시.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("catalog-unknown-user-placeholder").ok());

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 비밀번호를 Argon2id로 해싱합니다. 솔트는 매번 새로 생성됩니다.
///
/// ```rust,ignore
/// let hash = hash_password("my_secure_password")?;
/// // "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::HashingFailed)
}

/// 저장된 해시와 비밀번호 일치 여부.
///
/// 불일치는 `Ok(false)`이고, 해시 자체를 읽을 수 없을 때만 에러입니다.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// 로그인 자격 확인.
///
/// `stored_hash`가 `None`(존재하지 않는 사용자)이어도 더미 해시로 같은 비용의
/// Argon2 검증을 수행한 뒤 `Ok(false)`를 반환합니다. 응답 시간으로 uid 존재
/// 여부를 구분할 수 없어야 합니다.
pub fn check_credentials(
    password: &str,
    stored_hash: Option<&str>,
) -> Result<bool, PasswordError> {
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            Ok(false)
        }
    }
}
