//! 카탈로그 서비스의 공통 에러 타입.

use thiserror::Error;

/// 서비스 공통 에러.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// 설정 에러. 기동 시 발생하면 서버를 시작하지 않습니다.
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 서비스 작업을 위한 Result 타입.
pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<config::ConfigError> for CatalogError {
    fn from(err: config::ConfigError) -> Self {
        CatalogError::Config(err.to_string())
    }
}
