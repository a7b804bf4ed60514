//! 요청 헤더에서 인증 토큰 추출.

use axum::http::{HeaderMap, HeaderName};

/// 토큰을 전달하는 요청 헤더 (`X-AUTH-TOKEN`).
pub static AUTH_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-auth-token");

/// `X-AUTH-TOKEN` 헤더 값을 반환합니다.
///
/// 헤더가 없거나 비어 있으면 `None`입니다. 토큰 자체는 검증하지 않습니다.
/// HTTP 헤더 이름은 대소문자를 구분하지 않습니다.
pub fn extract(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(&AUTH_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_present() {
        let mut headers = HeaderMap::new();
        let name = HeaderName::from_bytes(b"X-AUTH-TOKEN").unwrap();
        headers.insert(name, HeaderValue::from_static("abc"));
        assert_eq!(extract(&headers), Some("abc"));
    }

    #[test]
    fn test_extract_absent() {
        assert_eq!(extract(&HeaderMap::new()), None);
    }

    #[test]
    fn test_extract_ignores_other_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        assert_eq!(extract(&headers), None);
    }

    #[test]
    fn test_extract_empty_value() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_TOKEN_HEADER.clone(), HeaderValue::from_static(""));
        assert_eq!(extract(&headers), None);
    }
}
