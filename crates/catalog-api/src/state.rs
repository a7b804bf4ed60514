//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! `Arc<AppState>`로 래핑되어 라우터와 인증 미들웨어가 함께 사용합니다.

use std::sync::Arc;

use crate::auth::{AuthenticationResolver, TokenCodec};
use crate::repository::IdentityStore;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 토큰 → 세션 변환기 (토큰 코덱과 사용자 저장소 보유)
    pub resolver: AuthenticationResolver,

    /// 데이터베이스 연결 풀. 인메모리 저장소로 동작할 때는 `None`
    pub db_pool: Option<sqlx::PgPool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    pub fn new(codec: TokenCodec, store: Arc<dyn IdentityStore>) -> Self {
        Self {
            resolver: AuthenticationResolver::new(codec, store),
            db_pool: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 데이터베이스 연결 풀 설정 (헬스 체크용).
    pub fn with_db_pool(mut self, pool: sqlx::PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    pub fn codec(&self) -> &TokenCodec {
        self.resolver.codec()
    }

    pub fn identity_store(&self) -> &Arc<dyn IdentityStore> {
        self.resolver.store()
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        if let Some(pool) = &self.db_pool {
            sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
        } else {
            false
        }
    }
}

/// 테스트용 AppState 생성.
///
/// `user123` (`ROLE_USER`)과 `admin` (`ROLE_USER`, `ROLE_ADMIN`) 두 사용자가
/// 인메모리 저장소에 등록되어 있으며 비밀번호는 모두 `password`입니다.
#[cfg(test)]
pub fn create_test_state() -> AppState {
    use crate::auth::{hash_password, SigningKey};
    use crate::repository::{InMemoryIdentityStore, NewUser};

    let hash = hash_password("password").expect("hash test password");
    let user = |uid: &str, roles: &[&str]| NewUser {
        uid: uid.to_string(),
        name: format!("{} name", uid),
        password_hash: hash.clone(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
    };

    let store = InMemoryIdentityStore::with_users([
        user("user123", &["ROLE_USER"]),
        user("admin", &["ROLE_USER", "ROLE_ADMIN"]),
    ]);
    let codec = TokenCodec::new(SigningKey::initialize(Some("test-signing-secret")), 3600);

    AppState::new(codec, Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_without_database() {
        let state = create_test_state();

        assert!(state.db_pool.is_none());
        assert!(!state.is_db_healthy().await);
        assert!(state.uptime_secs() >= 0);
        assert_eq!(state.codec().validity_secs(), 3600);
        assert!(state
            .identity_store()
            .load_principal_by_subject("user123")
            .await
            .is_ok());
    }
}
