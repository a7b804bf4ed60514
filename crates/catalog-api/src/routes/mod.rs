//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/sign` - 로그인, 현재 세션 조회
//!
//! `/metrics`는 Prometheus 핸들이 필요하므로 바이너리에서 따로 붙입니다.

pub mod health;
pub mod sign;

pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use sign::{sign_router, MeResponse, SignInRequest, SignInResponse};

use axum::{middleware, Router};
use std::sync::Arc;

use crate::middleware::{authenticate, metrics_layer};
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 라우트에 인증 레이어와 HTTP 메트릭 레이어가 적용됩니다.
pub fn create_api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1/sign", sign_router())
        .layer(middleware::from_fn_with_state(state, authenticate))
        .route_layer(middleware::from_fn(metrics_layer))
}
