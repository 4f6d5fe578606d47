//! Purchase tax math tests
//!
//! Covers the IVA applied on top of a purchase subtotal and the header
//! total derived from it.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::types::{iva_de, IVA_PORCENTAJE};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn iva_de_cien_es_dieciseis() {
    assert_eq!(iva_de(dec("100.00")), dec("16.00"));
}

#[test]
fn iva_redondea_a_centavos() {
    // 99.99 * 0.16 = 15.9984
    assert_eq!(iva_de(dec("99.99")), dec("16.00"));
    // 0.01 * 0.16 = 0.0016
    assert_eq!(iva_de(dec("0.01")), dec("0.00"));
}

#[test]
fn iva_de_cero_es_cero() {
    assert_eq!(iva_de(Decimal::ZERO), Decimal::ZERO);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// The IVA stays within a cent of the nominal percentage
    #[test]
    fn prop_iva_cerca_del_porcentaje(centavos in 0i64..100_000_000) {
        let subtotal = Decimal::new(centavos, 2);
        let iva = iva_de(subtotal);

        let nominal = subtotal * Decimal::new(IVA_PORCENTAJE, 2);
        let diferencia = (iva - nominal).abs();

        prop_assert!(diferencia <= dec("0.005"));
    }

    /// The header total always equals subtotal plus its IVA
    #[test]
    fn prop_total_es_subtotal_mas_iva(centavos in 0i64..100_000_000) {
        let subtotal = Decimal::new(centavos, 2);
        let iva = iva_de(subtotal);
        let total = subtotal + iva;

        prop_assert!(iva >= Decimal::ZERO);
        prop_assert_eq!(total - iva, subtotal);
    }
}
