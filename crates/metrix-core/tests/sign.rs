#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use metrix_core::protocol::sign::{sign, verify_signature, SigningKey};
use metrix_core::MetrixError;

const BODY: &[u8] = br#"[{"id":"PollCount","type":"counter","delta":1}]"#;

#[test]
fn known_digest() {
    // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
    let digest = sign(b"The quick brown fox jumps over the lazy dog", b"key").unwrap();
    assert_eq!(
        digest,
        "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
    );
}

#[test]
fn signature_verifies() {
    let digest = sign(BODY, b"secret").unwrap();
    verify_signature(BODY, b"secret", &digest).unwrap();
    verify_signature(BODY, b"secret", &digest.to_uppercase()).unwrap();
}

#[test]
fn any_single_byte_mutation_fails() {
    let key = SigningKey::new(b"secret").unwrap();
    let digest = key.sign(BODY);
    for i in 0..BODY.len() {
        let mut mutated = BODY.to_vec();
        mutated[i] ^= 0x01;
        let err = key.verify(&mutated, &digest).unwrap_err();
        assert!(matches!(err, MetrixError::SignatureMismatch), "byte {i}");
    }
}

#[test]
fn wrong_key_or_garbage_digest_fails() {
    let digest = sign(BODY, b"secret").unwrap();
    assert!(matches!(
        verify_signature(BODY, b"other", &digest),
        Err(MetrixError::SignatureMismatch)
    ));
    assert!(matches!(
        verify_signature(BODY, b"secret", "not-hex"),
        Err(MetrixError::SignatureMismatch)
    ));
    assert!(matches!(
        verify_signature(BODY, b"secret", ""),
        Err(MetrixError::SignatureMismatch)
    ));
}

#[test]
fn empty_key_disables_signing() {
    assert!(SigningKey::from_config("").unwrap().is_none());
    assert!(SigningKey::from_config("k").unwrap().is_some());
    assert!(matches!(
        SigningKey::new(b""),
        Err(MetrixError::InvalidConfig(_))
    ));
}
