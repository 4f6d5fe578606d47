//! Credential handling tests
//!
//! The login flow only verifies bcrypt-shaped hashes and answers every
//! failure with the same generic message; these tests pin the hash shape
//! and the round trip through the bcrypt crate.

use bcrypt::{hash, verify};
use proptest::prelude::*;

/// Mirrors the login gate: only bcrypt output is worth verifying
fn hash_verificable(stored: &str) -> bool {
    stored.starts_with("$2")
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn hash_generado_tiene_prefijo_bcrypt() {
    let generado = hash("secreto123", 4).unwrap();
    assert!(hash_verificable(&generado));
}

#[test]
fn hash_redondea_la_contrasena_original() {
    let generado = hash("secreto123", 4).unwrap();
    assert!(verify("secreto123", &generado).unwrap());
    assert!(!verify("otra-clave", &generado).unwrap());
}

#[test]
fn valores_planos_no_son_verificables() {
    assert!(!hash_verificable("secreto123"));
    assert!(!hash_verificable(""));
    assert!(!hash_verificable("$1$hash-md5"));
    assert!(!hash_verificable("sha256:abcdef"));
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Every generated hash is verifiable and matches only its own password
    #[test]
    fn prop_hash_solo_acepta_su_contrasena(password in "[a-zA-Z0-9]{6,16}") {
        // Minimum cost keeps the property run fast
        let generado = hash(&password, 4).unwrap();
        prop_assert!(hash_verificable(&generado));
        prop_assert!(verify(&password, &generado).unwrap());

        let distinta = format!("{password}x");
        prop_assert!(!verify(&distinta, &generado).unwrap());
    }
}
