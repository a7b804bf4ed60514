//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 기본값 → 설정 파일 → `CATALOG__*` 환경 변수 순으로 덮어씁니다.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CatalogError, CatalogResult};

/// 기본 토큰 유효 기간 (초).
pub const DEFAULT_TOKEN_VALIDITY_SECS: i64 = 3600;

/// 애플리케이션 설정.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 인증 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// 기동 시 등록할 초기 사용자 (`[[users]]`)
    #[serde(default)]
    pub users: Vec<UserSeedConfig>,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 연결 URL (미설정 시 인메모리 사용자 저장소 사용)
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connection_timeout_secs: 10,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 인증 설정.
///
/// `secret`은 토큰 서명 키의 원본 패스프레이즈입니다. 로그에 노출되지 않도록
/// [`SecretString`]으로 보관합니다.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// 서명 키 패스프레이즈
    #[serde(default)]
    pub secret: Option<SecretString>,
    /// 발급 토큰 유효 기간 (초)
    #[serde(default = "default_token_validity")]
    pub token_validity_secs: i64,
    /// 패스프레이즈 미설정 시 안전하지 않은 기본 키로 기동 허용 여부
    #[serde(default)]
    pub allow_insecure_default_secret: bool,
}

fn default_token_validity() -> i64 {
    DEFAULT_TOKEN_VALIDITY_SECS
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            token_validity_secs: DEFAULT_TOKEN_VALIDITY_SECS,
            allow_insecure_default_secret: false,
        }
    }
}

impl AuthConfig {
    /// 설정된 패스프레이즈. 비어 있으면 `None`.
    pub fn passphrase(&self) -> Option<&str> {
        self.secret
            .as_ref()
            .map(|s| s.expose_secret())
            .filter(|s| !s.is_empty())
    }

    /// 기동 전 인증 설정 검증.
    pub fn validate(&self) -> CatalogResult<()> {
        if self.token_validity_secs <= 0 {
            return Err(CatalogError::Config(format!(
                "auth.token_validity_secs must be positive, got {}",
                self.token_validity_secs
            )));
        }

        if self.passphrase().is_none() && !self.allow_insecure_default_secret {
            return Err(CatalogError::Config(
                "auth.secret is not set; set CATALOG__AUTH__SECRET or explicitly allow the insecure default"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

/// 초기 사용자 항목.
///
/// 기동 시 사용자 저장소에 없으면 등록됩니다. 비밀번호는 평문으로 받아 등록 직전에
/// 해싱하며, 설정 출력에 노출되지 않도록 [`SecretString`]으로 보관합니다.
#[derive(Debug, Deserialize)]
pub struct UserSeedConfig {
    pub uid: String,
    pub name: String,
    pub password: SecretString,
    /// 역할 목록 (순서 유지)
    #[serde(default)]
    pub roles: Vec<String>,
}

impl UserSeedConfig {
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    fn validate(&self) -> CatalogResult<()> {
        if self.uid.trim().is_empty() {
            return Err(CatalogError::Config("users[].uid must not be empty".to_string()));
        }
        if self.password().is_empty() {
            return Err(CatalogError::Config(format!(
                "users[].password for '{}' must not be empty",
                self.uid
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("auth.token_validity_secs", DEFAULT_TOKEN_VALIDITY_SECS)?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("CATALOG")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> CatalogResult<Self> {
        Self::load("config/default.toml")
    }

    /// 전체 설정 검증.
    pub fn validate(&self) -> CatalogResult<()> {
        self.auth.validate()?;
        self.users.iter().try_for_each(UserSeedConfig::validate)
    }
}
