//! API 서버용 HTTP middleware.
//!
//! 요청 처리 파이프라인에 적용되는 middleware 모듈.

mod auth;
mod metrics;

pub use auth::authenticate;
pub use metrics::metrics_layer;
