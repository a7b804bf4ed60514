//! 요청 인증 middleware.
//!
//! 모든 요청에서 `X-AUTH-TOKEN`을 확인해 세션을 request extensions에 넣습니다.
//!
//! | 상황 | 처리 |
//! |------|------|
//! | 헤더 없음 | 익명으로 통과 |
//! | 형식/서명 오류, 만료 | 익명으로 통과 (debug 로그) |
//! | 서명은 유효하지만 등록되지 않은 subject | 401 `UNKNOWN_SUBJECT` |
//! | 사용자 저장소 오류 | 503 |
//! | 성공 | [`AuthenticatedSession`](crate::auth::AuthenticatedSession) 첨부 |

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, Instrument};

use crate::auth::{self, AuthError, JwtAuthError};
use crate::metrics::record_token_verification;
use crate::state::AppState;

/// 인증 레이어. `middleware::from_fn_with_state`로 등록합니다.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = auth::extract(request.headers()) else {
        return next.run(request).await;
    };

    let verified = match state.codec().verify(token, chrono::Utc::now()) {
        Ok(verified) => verified,
        Err(e) => {
            debug!(reason = e.label(), "Ignoring invalid auth token");
            record_token_verification(e.label());
            return next.run(request).await;
        }
    };

    let span = catalog_core::auth_span!("resolve_session", verified.subject());
    match state.resolver.resolve_verified(&verified).instrument(span).await {
        Ok(session) => {
            record_token_verification("ok");
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(e) => {
            if matches!(e, AuthError::UnknownSubject(_)) {
                record_token_verification("unknown_subject");
            }
            JwtAuthError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{OptionalAuth, RequireAuth};
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn whoami(OptionalAuth(session): OptionalAuth) -> String {
        use crate::auth::Authentication;
        session
            .map(|s| s.name().to_string())
            .unwrap_or_else(|| "anonymous".to_string())
    }

    async fn protected(RequireAuth(_): RequireAuth) -> &'static str {
        "secret"
    }

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route("/protected", get(protected))
            .layer(middleware::from_fn_with_state(state.clone(), authenticate))
            .with_state(state)
    }

    async fn call(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("X-AUTH-TOKEN", token);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&body).to_string())
    }

    fn token_for(state: &AppState, subject: &str) -> String {
        state
            .codec()
            .issue(subject, &["ROLE_USER".to_string()], chrono::Utc::now())
            .unwrap()
    }

    #[tokio::test]
    async fn test_no_header_is_anonymous() {
        let state = Arc::new(create_test_state());

        let (status, body) = call(app(state.clone()), "/whoami", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");

        let (status, _) = call(app(state), "/protected", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_attaches_session() {
        let state = Arc::new(create_test_state());
        let token = token_for(&state, "user123");

        let (status, body) = call(app(state.clone()), "/whoami", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "user123");

        let (status, body) = call(app(state), "/protected", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "secret");
    }

    #[tokio::test]
    async fn test_invalid_token_is_anonymous() {
        let state = Arc::new(create_test_state());

        let (status, body) = call(app(state), "/whoami", Some("abc")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_unknown_subject_rejected() {
        let state = Arc::new(create_test_state());
        let token = token_for(&state, "ghost");

        let (status, body) = call(app(state), "/whoami", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("UNKNOWN_SUBJECT"));
    }
}
