//! 인증 주체와 권한.
//!
//! 사용자 저장소가 돌려주는 [`Principal`]과, 세션이 의존하는 최소 능력 집합인
//! [`UserDetails`]를 정의합니다.

use serde::{Deserialize, Serialize};

/// 부여된 권한 (예: `ROLE_USER`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Authority {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Authority {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for Authority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 세션이 주체에게 요구하는 능력.
pub trait UserDetails {
    /// 토큰 subject와 대응하는 사용자 식별자.
    fn username(&self) -> &str;

    /// 부여된 권한 목록.
    fn authorities(&self) -> Vec<Authority>;
}

/// 사용자 저장소에서 조회한 인증 주체.
///
/// 비밀번호 해시는 포함하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// 내부 ID
    pub id: i64,
    /// 사용자 ID (토큰 subject)
    pub uid: String,
    /// 표시 이름
    pub name: String,
    /// 역할 목록
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(id: i64, uid: impl Into<String>, name: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            id,
            uid: uid.into(),
            name: name.into(),
            roles,
        }
    }
}

impl UserDetails for Principal {
    fn username(&self) -> &str {
        &self.uid
    }

    fn authorities(&self) -> Vec<Authority> {
        self.roles.iter().cloned().map(Authority::from).collect()
    }
}
