//! User Repository
//!
//! 토큰 subject(uid)로 인증 주체를 조회하는 사용자 저장소입니다.
//!
//! - [`PgIdentityStore`]: `users` / `user_roles` 테이블 (PostgreSQL)
//! - [`InMemoryIdentityStore`]: 데이터베이스 없이 동작하는 저장소 (개발/테스트)

use std::collections::HashMap;

use async_trait::async_trait;
use catalog_core::UserSeedConfig;
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::auth::{hash_password, PasswordError, Principal};

// ================================================================================================
// Types
// ================================================================================================

/// 사용자 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum IdentityStoreError {
    #[error("사용자를 찾을 수 없습니다: {0}")]
    NotFound(String),
    #[error("이미 등록된 사용자입니다: {0}")]
    AlreadyExists(String),
    #[error("데이터베이스 에러: {0}")]
    Database(#[from] sqlx::Error),
}

/// 새 사용자 입력 (비밀번호는 이미 해싱된 값)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub uid: String,
    pub name: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

impl NewUser {
    /// 설정의 초기 사용자 항목을 비밀번호를 해싱해 변환합니다.
    pub fn from_seed(seed: &UserSeedConfig) -> Result<Self, PasswordError> {
        Ok(Self {
            uid: seed.uid.clone(),
            name: seed.name.clone(),
            password_hash: hash_password(seed.password())?,
            roles: seed.roles.clone(),
        })
    }
}

/// 사용자 + 역할 조인 결과
#[derive(Debug, Clone, FromRow)]
struct PrincipalRow {
    id: i64,
    uid: String,
    name: String,
    roles: Vec<String>,
}

impl From<PrincipalRow> for Principal {
    fn from(row: PrincipalRow) -> Self {
        Principal::new(row.id, row.uid, row.name, row.roles)
    }
}

// ================================================================================================
// Trait
// ================================================================================================

/// 인증 주체 조회 능력.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// uid로 인증 주체를 조회합니다. 없으면 [`IdentityStoreError::NotFound`].
    async fn load_principal_by_subject(&self, subject: &str)
        -> Result<Principal, IdentityStoreError>;

    /// 로그인 검증용 비밀번호 해시를 조회합니다.
    async fn load_password_hash(&self, subject: &str) -> Result<String, IdentityStoreError>;

    /// 사용자를 등록합니다. 같은 uid가 있으면 [`IdentityStoreError::AlreadyExists`].
    async fn create_user(&self, user: NewUser) -> Result<Principal, IdentityStoreError>;
}

/// 초기 사용자 등록.
///
/// 이미 있는 uid는 건너뜁니다 (비밀번호와 역할도 그대로 둠).
/// 새로 등록한 사용자 수를 반환합니다.
pub async fn seed_users(
    store: &dyn IdentityStore,
    users: impl IntoIterator<Item = NewUser>,
) -> Result<usize, IdentityStoreError> {
    let mut created = 0;

    for user in users {
        let uid = user.uid.clone();
        match store.create_user(user).await {
            Ok(principal) => {
                info!(uid = %principal.uid, roles = ?principal.roles, "Seeded user");
                created += 1;
            }
            Err(IdentityStoreError::AlreadyExists(_)) => {
                debug!(uid = %uid, "Seed user already registered, skipping");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(created)
}

// ================================================================================================
// PostgreSQL
// ================================================================================================

/// PostgreSQL 사용자 저장소
#[derive(Debug, Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 테이블이 없으면 생성합니다.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id       BIGSERIAL PRIMARY KEY,
                uid      VARCHAR(255) NOT NULL UNIQUE,
                password VARCHAR(255) NOT NULL,
                name     VARCHAR(255) NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_roles (
                user_id  BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                position INT NOT NULL,
                roles    VARCHAR(255) NOT NULL,
                PRIMARY KEY (user_id, position)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn insert_error(err: sqlx::Error, uid: &str) -> IdentityStoreError {
    if err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation())
    {
        IdentityStoreError::AlreadyExists(uid.to_string())
    } else {
        IdentityStoreError::Database(err)
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn load_principal_by_subject(
        &self,
        subject: &str,
    ) -> Result<Principal, IdentityStoreError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT
                u.id, u.uid, u.name,
                COALESCE(
                    ARRAY_AGG(r.roles ORDER BY r.position) FILTER (WHERE r.roles IS NOT NULL),
                    '{}'
                ) AS roles
            FROM users u
            LEFT JOIN user_roles r ON r.user_id = u.id
            WHERE u.uid = $1
            GROUP BY u.id
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Principal::from)
            .ok_or_else(|| IdentityStoreError::NotFound(subject.to_string()))
    }

    async fn load_password_hash(&self, subject: &str) -> Result<String, IdentityStoreError> {
        let hash: Option<String> = sqlx::query_scalar("SELECT password FROM users WHERE uid = $1")
            .bind(subject)
            .fetch_optional(&self.pool)
            .await?;

        hash.ok_or_else(|| IdentityStoreError::NotFound(subject.to_string()))
    }

    /// 역할은 목록 순서대로 `position`을 부여해 저장합니다.
    async fn create_user(&self, user: NewUser) -> Result<Principal, IdentityStoreError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (uid, password, name)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&user.uid)
        .bind(&user.password_hash)
        .bind(&user.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| insert_error(e, &user.uid))?;

        for (position, role) in user.roles.iter().enumerate() {
            sqlx::query("INSERT INTO user_roles (user_id, position, roles) VALUES ($1, $2, $3)")
                .bind(id)
                .bind(position as i32)
                .bind(role)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(Principal::new(id, user.uid, user.name, user.roles))
    }
}

// ================================================================================================
// In-memory
// ================================================================================================

#[derive(Debug, Clone)]
struct StoredUser {
    principal: Principal,
    password_hash: String,
}

/// 인메모리 사용자 저장소
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    users: RwLock<HashMap<String, StoredUser>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 초기 사용자 목록으로 생성합니다. ID는 1부터 순서대로 부여됩니다.
    pub fn with_users(users: impl IntoIterator<Item = NewUser>) -> Self {
        let map = users
            .into_iter()
            .enumerate()
            .map(|(idx, user)| {
                let stored = StoredUser {
                    principal: Principal::new(idx as i64 + 1, user.uid.clone(), user.name, user.roles),
                    password_hash: user.password_hash,
                };
                (user.uid, stored)
            })
            .collect();

        Self {
            users: RwLock::new(map),
        }
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn load_principal_by_subject(
        &self,
        subject: &str,
    ) -> Result<Principal, IdentityStoreError> {
        self.users
            .read()
            .await
            .get(subject)
            .map(|user| user.principal.clone())
            .ok_or_else(|| IdentityStoreError::NotFound(subject.to_string()))
    }

    async fn load_password_hash(&self, subject: &str) -> Result<String, IdentityStoreError> {
        self.users
            .read()
            .await
            .get(subject)
            .map(|user| user.password_hash.clone())
            .ok_or_else(|| IdentityStoreError::NotFound(subject.to_string()))
    }

    async fn create_user(&self, user: NewUser) -> Result<Principal, IdentityStoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.uid) {
            return Err(IdentityStoreError::AlreadyExists(user.uid));
        }

        let id = users.len() as i64 + 1;
        let principal = Principal::new(id, user.uid.clone(), user.name, user.roles);
        users.insert(
            user.uid,
            StoredUser {
                principal: principal.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(principal)
    }
}
