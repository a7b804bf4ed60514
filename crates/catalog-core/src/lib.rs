//! # Catalog Core
//!
//! 카탈로그 서비스 전반에서 공유되는 기반 타입을 제공합니다.
//!
//! - 설정 관리 (`config` 크레이트 기반, 파일 + 환경 변수)
//! - 공통 에러 타입
//! - 로깅 인프라 (`tracing-subscriber`)

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
pub use logging::{init_logging, LogConfig, LogFormat};
