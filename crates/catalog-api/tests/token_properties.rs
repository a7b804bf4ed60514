//! 토큰 코덱 속성 테스트.
//!
//! 임의의 subject, 역할, 발급 시각에 대해 다음을 확인합니다:
//! - 발급한 토큰의 subject를 그대로 복원
//! - 유효 기간 경계 (`exp`까지 유효, 1초 뒤 만료)
//! - 다른 키로 서명된 토큰 거부
//! - 서명 변조 거부

use catalog_api::auth::{SigningKey, TokenCodec, TokenError};
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

const VALIDITY: i64 = 3600;

fn codec(passphrase: &str) -> TokenCodec {
    TokenCodec::new(SigningKey::initialize(Some(passphrase)), VALIDITY)
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn subject_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_@.\\-]{1,40}"
}

fn roles_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("ROLE_[A-Z]{1,12}", 0..5)
}

proptest! {
    #[test]
    fn props_decode_subject_round_trip(
        subject in subject_strategy(),
        roles in roles_strategy(),
        issued_at in 0i64..4_000_000_000,
    ) {
        let codec = codec("property-secret");
        let token = codec.issue(&subject, &roles, at(issued_at)).unwrap();

        prop_assert_eq!(codec.decode_subject(&token).unwrap(), subject.clone());

        let verified = codec.verify(&token, at(issued_at)).unwrap();
        prop_assert_eq!(verified.subject(), subject.as_str());
        prop_assert_eq!(verified.roles(), roles.as_slice());
        prop_assert_eq!(verified.claims().exp - verified.claims().iat, VALIDITY);
    }

    #[test]
    fn props_expiry_boundary(
        subject in subject_strategy(),
        issued_at in 0i64..4_000_000_000,
    ) {
        let codec = codec("property-secret");
        let token = codec.issue(&subject, &[], at(issued_at)).unwrap();

        prop_assert!(codec.validate(&token, at(issued_at + VALIDITY)));
        prop_assert!(!codec.validate(&token, at(issued_at + VALIDITY + 1)));
        prop_assert!(matches!(
            codec.verify(&token, at(issued_at + VALIDITY + 1)),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn props_other_key_rejected(
        subject in subject_strategy(),
        key_a in "[a-z0-9]{8,32}",
        key_b in "[a-z0-9]{8,32}",
    ) {
        prop_assume!(key_a != key_b);

        let now = Utc::now();
        let token = codec(&key_a).issue(&subject, &[], now).unwrap();
        let other = codec(&key_b);

        prop_assert!(!other.validate(&token, now));
        prop_assert!(matches!(
            other.decode_subject(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn props_signature_tamper_rejected(
        subject in subject_strategy(),
        position in 0usize..43,
    ) {
        let codec = codec("property-secret");
        let now = Utc::now();
        let token = codec.issue(&subject, &[], now).unwrap();

        // HS256 서명은 43자 (base64url, 패딩 없음). 마지막 문자의 하위 비트는 채움 비트
        let sig_start = token.rfind('.').unwrap() + 1;
        prop_assert_eq!(token.len() - sig_start, 43);
        let idx = sig_start + position;
        let mut bytes = token.into_bytes();
        bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        prop_assert!(!codec.validate(&tampered, now));
        prop_assert!(codec.decode_subject(&tampered).unwrap_err().is_verification_failure());
    }
}
