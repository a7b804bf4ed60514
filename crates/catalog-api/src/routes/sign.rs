//! 로그인 endpoint.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/sign/sign-in` - 비밀번호 확인 후 토큰 발급
//! - `GET /api/v1/sign/me` - 현재 세션의 주체와 권한

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::auth::{check_credentials, Authentication, Authority, Principal, RequireAuth};
use crate::error::{ApiErrorResponse, ApiResult};
use crate::metrics::record_sign_in;
use crate::repository::IdentityStoreError;
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

/// 로그인 요청.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub uid: String,
    pub password: String,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignInResponse {
    /// 발급된 토큰 (`X-AUTH-TOKEN` 헤더로 전달)
    pub token: String,
    /// 토큰 형식
    pub token_type: String,
    /// 유효 기간 (초)
    pub expires_in: i64,
}

/// 현재 세션 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub principal: Principal,
    pub authorities: Vec<Authority>,
}

// ==================== Handler ====================

fn sign_in_failed() -> (StatusCode, Json<ApiErrorResponse>) {
    record_sign_in(false);
    ApiErrorResponse::new("SIGN_IN_FAILED", "아이디 또는 비밀번호가 올바르지 않습니다")
        .with_status(StatusCode::UNAUTHORIZED)
}

fn store_error(err: IdentityStoreError) -> (StatusCode, Json<ApiErrorResponse>) {
    error!(error = %err, "Identity store error during sign-in");
    ApiErrorResponse::new("DB_ERROR", "사용자 저장소 조회에 실패했습니다")
        .with_status(StatusCode::SERVICE_UNAVAILABLE)
}

/// 로그인.
///
/// POST /api/v1/sign/sign-in
///
/// 존재하지 않는 uid와 틀린 비밀번호는 같은 응답(401 `SIGN_IN_FAILED`)을 반환합니다.
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<Json<SignInResponse>> {
    if request.uid.trim().is_empty() || request.password.is_empty() {
        return Err(
            ApiErrorResponse::new("INVALID_INPUT", "uid와 password는 필수입니다")
                .with_status(StatusCode::BAD_REQUEST),
        );
    }

    let store = state.identity_store();

    let stored_hash = match store.load_password_hash(&request.uid).await {
        Ok(hash) => Some(hash),
        Err(IdentityStoreError::NotFound(_)) => None,
        Err(e) => return Err(store_error(e)),
    };

    // 존재하지 않는 uid도 더미 해시로 같은 검증 비용을 치른다
    match check_credentials(&request.password, stored_hash.as_deref()) {
        Ok(true) => {}
        Ok(false) => {
            if stored_hash.is_none() {
                warn!(uid = %request.uid, "Sign-in failed: unknown uid");
            } else {
                warn!(uid = %request.uid, "Sign-in failed: wrong password");
            }
            return Err(sign_in_failed());
        }
        Err(e) => {
            error!(uid = %request.uid, error = %e, "Stored password hash is unreadable");
            return Err(
                ApiErrorResponse::new("INTERNAL_ERROR", "로그인 처리 중 오류가 발생했습니다")
                    .with_status(StatusCode::INTERNAL_SERVER_ERROR),
            );
        }
    }

    let principal = store
        .load_principal_by_subject(&request.uid)
        .await
        .map_err(|e| match e {
            IdentityStoreError::NotFound(_) => sign_in_failed(),
            other => store_error(other),
        })?;

    let codec = state.codec();
    let token = codec
        .issue(&principal.uid, &principal.roles, chrono::Utc::now())
        .map_err(|e| {
            error!(error = %e, "Failed to issue token");
            ApiErrorResponse::new("TOKEN_ISSUE_FAILED", "토큰 발급에 실패했습니다")
                .with_status(StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    record_sign_in(true);
    info!(uid = %principal.uid, roles = ?principal.roles, "Signed in");

    Ok(Json(SignInResponse {
        token,
        token_type: "JWT".to_string(),
        expires_in: codec.validity_secs(),
    }))
}

/// 현재 세션 조회.
///
/// GET /api/v1/sign/me
pub async fn me(RequireAuth(session): RequireAuth) -> Json<MeResponse> {
    let authorities = session.authorities().to_vec();
    Json(MeResponse {
        principal: session.into_principal(),
        authorities,
    })
}

/// 로그인 라우터 생성.
pub fn sign_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sign-in", post(sign_in))
        .route("/me", get(me))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::authenticate;
    use crate::state::create_test_state;
    use axum::{body::Body, http::Request, middleware};
    use std::time::Instant;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = Arc::new(create_test_state());
        Router::new()
            .nest("/api/v1/sign", sign_router())
            .layer(middleware::from_fn_with_state(state.clone(), authenticate))
            .with_state(state)
    }

    async fn sign_in_request(app: Router, uid: &str, password: &str) -> axum::response::Response {
        let body = serde_json::json!({ "uid": uid, "password": password }).to_string();
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/sign/sign-in")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let response = sign_in_request(app(), "user123", "password").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: SignInResponse = body_json(response).await;
        assert_eq!(body.token.split('.').count(), 3);
        assert_eq!(body.token_type, "JWT");
        assert_eq!(body.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password() {
        let response = sign_in_request(app(), "user123", "wrong").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: ApiErrorResponse = body_json(response).await;
        assert_eq!(body.code, "SIGN_IN_FAILED");
    }

    #[tokio::test]
    async fn test_sign_in_unknown_uid_same_response() {
        let response = sign_in_request(app(), "ghost", "password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: ApiErrorResponse = body_json(response).await;
        assert_eq!(body.code, "SIGN_IN_FAILED");
    }

    #[tokio::test]
    async fn test_sign_in_unknown_uid_pays_hash_cost() {
        let app = app();

        let started = Instant::now();
        let response = sign_in_request(app.clone(), "user123", "wrong").await;
        let known = started.elapsed();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let started = Instant::now();
        let response = sign_in_request(app, "ghost", "wrong").await;
        let unknown = started.elapsed();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // 둘 다 Argon2 검증 한 번이므로 같은 규모여야 한다
        assert!(
            unknown * 4 >= known,
            "unknown uid answered in {unknown:?}, known uid in {known:?}"
        );
    }

    #[tokio::test]
    async fn test_sign_in_empty_fields() {
        let response = sign_in_request(app(), "", "").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_me_with_token() {
        let app = app();
        let signed: SignInResponse =
            body_json(sign_in_request(app.clone(), "admin", "password").await).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/sign/me")
                    .header("X-AUTH-TOKEN", &signed.token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let me: MeResponse = body_json(response).await;
        assert_eq!(me.principal.uid, "admin");
        assert_eq!(
            me.authorities,
            vec![Authority::from("ROLE_USER"), Authority::from("ROLE_ADMIN")]
        );
    }

    #[tokio::test]
    async fn test_me_without_token() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/sign/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: ApiErrorResponse = body_json(response).await;
        assert_eq!(body.code, "AUTH_REQUIRED");
    }
}
