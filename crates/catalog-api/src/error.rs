//! API 에러 응답 타입.
//!
//! 모든 엔드포인트와 인증 거부 응답이 같은 JSON 형식을 사용합니다.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// API 에러 응답 본문.
///
/// ```json
/// {
///   "code": "SIGN_IN_FAILED",
///   "message": "아이디 또는 비밀번호가 올바르지 않습니다",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "AUTH_REQUIRED", "UNKNOWN_SUBJECT")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 발생 시각 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상태 코드와 묶어 핸들러 에러로 변환합니다.
    pub fn with_status(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
///
/// ```ignore
/// async fn me(RequireAuth(session): RequireAuth) -> ApiResult<Json<MeResponse>> {
///     Ok(Json(MeResponse::from(session)))
/// }
/// ```
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;
