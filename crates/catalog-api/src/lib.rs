//! 토큰 인증 API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - HS256 토큰 발급/검증과 요청 인증
//! - 사용자 저장소 (PostgreSQL / 인메모리)
//! - Axum 기반 REST API (로그인, 헬스 체크)
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`auth`]: 서명 키, 토큰 코덱, 헤더 추출, 세션 해석
//! - [`repository`]: 사용자 저장소
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`middleware`]: 인증 및 메트릭 미들웨어
//! - [`metrics`]: Prometheus 메트릭 수집

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod state;

pub use auth::{
    AuthError, AuthenticatedSession, AuthenticationResolver, JwtAuthError, SigningKey,
    TokenCodec, TokenError,
};
pub use error::{ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use routes::create_api_router;
pub use state::AppState;
