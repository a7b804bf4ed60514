//! 요청 단위 인증 세션.

use serde::Serialize;

use super::principal::{Authority, Principal, UserDetails};

/// 인증된 요청이 제공하는 능력.
pub trait Authentication {
    /// 주체 이름 (사용자 ID).
    fn name(&self) -> &str;

    /// 부여된 권한.
    fn authorities(&self) -> &[Authority];

    /// 자격 증명 자리 표시자. 비밀번호는 담지 않습니다.
    fn credentials(&self) -> &str;

    /// 특정 권한 보유 여부.
    fn has_authority(&self, authority: &str) -> bool {
        self.authorities().iter().any(|a| a.as_str() == authority)
    }
}

/// 인증된 세션.
///
/// 유효한 토큰을 가진 요청마다 새로 만들어지고 요청이 끝나면 버려집니다.
/// 저장되지 않습니다.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedSession<P = Principal> {
    principal: P,
    credentials: String,
    authorities: Vec<Authority>,
}

impl<P: UserDetails> AuthenticatedSession<P> {
    /// 주체의 권한으로 세션을 만듭니다. 자격 증명은 항상 빈 문자열입니다.
    pub fn new(principal: P) -> Self {
        let authorities = principal.authorities();
        Self {
            principal,
            credentials: String::new(),
            authorities,
        }
    }

    pub fn principal(&self) -> &P {
        &self.principal
    }

    pub fn into_principal(self) -> P {
        self.principal
    }
}

impl<P: UserDetails> Authentication for AuthenticatedSession<P> {
    fn name(&self) -> &str {
        self.principal.username()
    }

    fn authorities(&self) -> &[Authority] {
        &self.authorities
    }

    fn credentials(&self) -> &str {
        &self.credentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ServiceAccount;

    impl UserDetails for ServiceAccount {
        fn username(&self) -> &str {
            "batch-job"
        }

        fn authorities(&self) -> Vec<Authority> {
            vec![Authority::from("ROLE_SYSTEM")]
        }
    }

    #[test]
    fn test_session_from_principal() {
        let principal = Principal::new(7, "user123", "Kim", vec!["ROLE_USER".to_string()]);
        let session = AuthenticatedSession::new(principal.clone());

        assert_eq!(session.name(), "user123");
        assert_eq!(session.credentials(), "");
        assert!(session.has_authority("ROLE_USER"));
        assert!(!session.has_authority("ROLE_ADMIN"));
        assert_eq!(session.principal(), &principal);
    }

    #[test]
    fn test_session_over_custom_identity() {
        let session = AuthenticatedSession::new(ServiceAccount);
        assert_eq!(session.name(), "batch-job");
        assert!(session.has_authority("ROLE_SYSTEM"));
    }
}
