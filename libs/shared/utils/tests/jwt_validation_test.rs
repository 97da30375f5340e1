use shared_utils::jwt::validate_token;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

#[test]
fn accepts_a_well_signed_token() {
    let config = TestConfig::default();
    let user = TestUser::admin("admin@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);

    let validated = validate_token(&token, &config.jwt_secret).unwrap();

    assert_eq!(validated.id, user.id);
    assert_eq!(validated.email.as_deref(), Some("admin@example.com"));
    assert_eq!(validated.role.as_deref(), Some("admin"));
}

#[test]
fn rejects_expired_token() {
    let config = TestConfig::default();
    let user = TestUser::secretary("sec@example.com");
    let token = JwtTestUtils::create_expired_token(&user, &config.jwt_secret);

    let err = validate_token(&token, &config.jwt_secret).unwrap_err();
    assert_eq!(err, "Token expired");
}

#[test]
fn rejects_wrong_signature() {
    let config = TestConfig::default();
    let user = TestUser::doctor("doc@example.com");
    let token = JwtTestUtils::create_invalid_signature_token(&user);

    let err = validate_token(&token, &config.jwt_secret).unwrap_err();
    assert_eq!(err, "Invalid token signature");
}

#[test]
fn rejects_malformed_token() {
    let config = TestConfig::default();
    let token = JwtTestUtils::create_malformed_token();

    assert!(validate_token(&token, &config.jwt_secret).is_err());
}

#[test]
fn rejects_when_secret_missing() {
    let user = TestUser::default();
    let token = JwtTestUtils::create_test_token(&user, "whatever", None);

    let err = validate_token(&token, "").unwrap_err();
    assert_eq!(err, "JWT secret is not set");
}
