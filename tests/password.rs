use proptest::prelude::*;
use saltedkey::{
    Credential, EntropyError, EntropySource, Error, HashPrimitive, HasherConfig, PasswordHasher,
    SaltRecord,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

fn is_salt_token(token: &str) -> bool {
    let Some((iterations, salt)) = token.split_once('.') else {
        return false;
    };
    let salt_body = salt.trim_end_matches('=');
    !iterations.is_empty()
        && iterations.bytes().all(|b| b.is_ascii_digit())
        && !salt_body.is_empty()
        && salt_body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}

fn fast_hasher() -> PasswordHasher {
    PasswordHasher::new(HasherConfig::default().with_iterations(50)).unwrap()
}

struct Exhausted;

impl EntropySource for Exhausted {
    fn fill(&self, _buf: &mut [u8]) -> Result<(), EntropyError> {
        Err(EntropyError::new("simulated failure"))
    }
}

#[test]
fn default_scenario_hash_and_verify() {
    let config = HasherConfig::new(64, 64, 15000, HashPrimitive::Sha1).unwrap();
    let hasher = PasswordHasher::new(config).unwrap();

    let (key, record) = hasher.hash("correct horse battery staple", None).unwrap();
    let salt_token = record.encode();
    let hash_token = key.to_base64();

    assert!(is_salt_token(&salt_token), "bad salt token: {salt_token}");
    assert!(salt_token.starts_with("15000."));
    assert_eq!(record.salt().len(), 64);
    assert_eq!(key.len(), 64);

    assert!(hasher.verify_password("correct horse battery staple", &hash_token, &salt_token));
    assert!(!hasher.verify_password("wrong password", &hash_token, &salt_token));
}

#[test]
fn verification_tolerates_storage_whitespace() {
    let hasher = fast_hasher();
    let credential = hasher.hash_credential("pw").unwrap();

    let padded = format!("  {}   ", credential.hash_token);
    assert!(hasher.verify_password("pw", &padded, &credential.salt_token));
}

#[test]
fn verification_fails_closed_on_corrupt_salt() {
    let hasher = fast_hasher();
    let credential = hasher.hash_credential("pw").unwrap();

    assert!(!hasher.verify_password("pw", &credential.hash_token, "not-a-valid-token"));
    assert!(!hasher.verify_password("anything", "anything", "not-a-valid-token"));
    assert!(!hasher.verify_password("pw", &credential.hash_token, "15000.%%%"));
}

#[test]
fn try_verify_reports_malformed_token() {
    let hasher = fast_hasher();

    match hasher.try_verify_password("pw", "AAAA", "abc.AQID") {
        Err(Error::MalformedSaltToken(_)) => {}
        other => panic!("expected MalformedSaltToken, got: {other:?}"),
    }
    let credential = hasher.hash_credential("pw").unwrap();
    assert!(!hasher
        .try_verify_password("nope", &credential.hash_token, &credential.salt_token)
        .unwrap());
}

#[test]
fn verify_uses_iterations_from_token() {
    let creator = PasswordHasher::new(HasherConfig::default().with_iterations(7)).unwrap();
    let credential = creator.hash_credential("pw").unwrap();

    let verifier = PasswordHasher::new(HasherConfig::default().with_iterations(999)).unwrap();
    assert!(verifier.verify_credential("pw", &credential));
}

#[test]
fn hash_with_explicit_record_is_deterministic() {
    let hasher = fast_hasher();
    let record = SaltRecord::new(25, vec![3u8; 32]).unwrap();

    let (k1, r1) = hasher.hash("pw", Some(&record)).unwrap();
    let (k2, r2) = hasher.hash("pw", Some(&record)).unwrap();

    assert_eq!(k1, k2);
    assert_eq!(r1, record);
    assert_eq!(r2, record);
    assert_eq!(
        hasher.hash_with_token("pw", &record.encode()).unwrap(),
        k1.to_base64()
    );
}

#[test]
fn consecutive_hashes_use_different_salts() {
    let hasher = fast_hasher();

    let (k1, r1) = hasher.hash("same", None).unwrap();
    let (k2, r2) = hasher.hash("same", None).unwrap();

    assert_ne!(r1.salt(), r2.salt());
    assert_ne!(k1, k2);
}

#[test]
fn concurrent_hashes_never_share_a_salt() {
    let hasher = Arc::new(fast_hasher());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let hasher = Arc::clone(&hasher);
            thread::spawn(move || {
                (0..10)
                    .map(|_| hasher.hash("pw", None).unwrap().1.encode())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for token in handle.join().unwrap() {
            assert!(seen.insert(token), "salt reused across hash calls");
        }
    }
    assert_eq!(seen.len(), 80);
}

#[test]
fn exhausted_entropy_is_surfaced() {
    let hasher = PasswordHasher::with_entropy(HasherConfig::default(), Exhausted).unwrap();

    assert!(matches!(
        hasher.generate_salt(),
        Err(Error::EntropyUnavailable(_))
    ));
    assert!(matches!(
        hasher.generate_random_password(10),
        Err(Error::EntropyUnavailable(_))
    ));
    assert!(matches!(
        hasher.hash("pw", None),
        Err(Error::EntropyUnavailable(_))
    ));
}

#[test]
fn explicit_record_needs_no_entropy() {
    let hasher = PasswordHasher::with_entropy(
        HasherConfig::default().with_iterations(10),
        Exhausted,
    )
    .unwrap();
    let record = SaltRecord::new(10, vec![1u8; 16]).unwrap();

    assert!(hasher.hash("pw", Some(&record)).is_ok());
}

#[test]
fn random_password_roundtrip() {
    let hasher = fast_hasher();
    let generated = hasher.generate_default_random_password().unwrap();

    assert_eq!(generated.plaintext().len(), 10);
    assert!(
        generated
            .plaintext()
            .chars()
            .all(|c| saltedkey::PASSWORD_CHARSET.contains(c))
    );
    assert!(is_salt_token(generated.salt_token()));
    assert!(hasher.verify_password(
        generated.plaintext(),
        generated.hash_token(),
        generated.salt_token()
    ));

    let (plaintext, credential) = generated.into_parts();
    assert!(hasher.verify_credential(&plaintext, &credential));
}

#[test]
fn credential_serializes_as_two_fields() {
    let hasher = fast_hasher();
    let credential = hasher.hash_credential("pw").unwrap();

    let json = serde_json::to_value(&credential).unwrap();
    assert_eq!(json["salt_token"], credential.salt_token.as_str());
    assert_eq!(json["hash_token"], credential.hash_token.as_str());

    let back: Credential = serde_json::from_value(json).unwrap();
    assert!(hasher.verify_credential("pw", &back));
}

#[test]
fn other_primitives_verify() {
    for primitive in [HashPrimitive::Sha256, HashPrimitive::Sha512] {
        let hasher = PasswordHasher::new(
            HasherConfig::default()
                .with_iterations(20)
                .with_key_length(32)
                .with_primitive(primitive),
        )
        .unwrap();
        let credential = hasher.hash_credential("pw").unwrap();

        assert!(hasher.verify_credential("pw", &credential));
        assert!(!fast_hasher().verify_credential("pw", &credential));
    }
}

#[test]
fn config_file_drives_hasher() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hasher.json");
    std::fs::write(
        &path,
        r#"{ "iterations": 12, "salt_size": 16, "key_length": 32, "primitive": "sha256" }"#,
    )
    .unwrap();

    let config = HasherConfig::load(&path).unwrap();
    let hasher = PasswordHasher::new(config).unwrap();
    let (key, record) = hasher.hash("pw", None).unwrap();

    assert_eq!(record.iterations(), 12);
    assert_eq!(record.salt().len(), 16);
    assert_eq!(key.len(), 32);
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(HasherConfig::load(dir.path().join("absent.json")).is_err());
}

proptest! {
    #[test]
    fn salt_token_roundtrips(iterations in 1u32.., salt in prop::collection::vec(any::<u8>(), 1..128)) {
        let record = SaltRecord::new(iterations, salt).unwrap();
        let parsed = SaltRecord::decode(&record.encode()).unwrap();
        prop_assert_eq!(parsed, record);
    }

    #[test]
    fn decode_never_panics(token in "\\PC*") {
        let _ = SaltRecord::decode(&token);
    }

    #[test]
    fn only_the_right_password_verifies(pw in "[ -~]{1,24}", other in "[ -~]{1,24}") {
        let hasher = PasswordHasher::new(HasherConfig::default().with_iterations(2)).unwrap();
        let credential = hasher.hash_credential(&pw).unwrap();

        prop_assert!(hasher.verify_credential(&pw, &credential));
        if pw != other {
            prop_assert!(!hasher.verify_credential(&other, &credential));
        }
    }
}
