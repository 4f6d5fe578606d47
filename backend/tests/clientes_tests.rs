//! Client and loyalty rule tests
//!
//! Covers RFC validation, optional field cleanup and the discount
//! thresholds derived from accumulated points.

use proptest::prelude::*;
use shared::types::{descuento_disponible, descuentos_disponibles, PUNTOS_POR_DESCUENTO};
use shared::validation::{limpiar_opcional, validar_rfc};

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn rfc_de_trece_caracteres_es_valido() {
    assert!(validar_rfc("XAXX010101000").is_ok());
    assert!(validar_rfc("GODE561231GR8").is_ok());
}

#[test]
fn rfc_con_longitud_incorrecta_es_rechazado() {
    assert!(validar_rfc("").is_err());
    assert!(validar_rfc("XAXX0101010").is_err());
    assert!(validar_rfc("XAXX0101010001").is_err());
}

#[test]
fn campos_opcionales_vacios_se_normalizan_a_none() {
    assert_eq!(limpiar_opcional(Some(String::new())), None);
    assert_eq!(limpiar_opcional(Some("   ".to_string())), None);
    assert_eq!(limpiar_opcional(None), None);
    assert_eq!(
        limpiar_opcional(Some("Av. Reforma 1".to_string())),
        Some("Av. Reforma 1".to_string())
    );
}

#[test]
fn descuentos_en_los_puntos_de_corte() {
    let casos = [
        (0, 0, false),
        (49, 0, false),
        (50, 1, true),
        (99, 1, true),
        (100, 2, true),
    ];
    for (puntos, unidades, elegible) in casos {
        assert_eq!(descuentos_disponibles(puntos), unidades, "puntos={puntos}");
        assert_eq!(descuento_disponible(puntos), elegible, "puntos={puntos}");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// The client is eligible exactly when at least one full unit accrued
    #[test]
    fn prop_elegibilidad_coincide_con_unidades(puntos in 0i32..2_000_000) {
        prop_assert_eq!(descuento_disponible(puntos), descuentos_disponibles(puntos) >= 1);
    }

    /// Earning points never lowers the available discount units
    #[test]
    fn prop_unidades_monotonas(puntos in 0i32..1_000_000, extra in 0i32..10_000) {
        prop_assert!(descuentos_disponibles(puntos + extra) >= descuentos_disponibles(puntos));
    }

    /// Spending one unit removes exactly PUNTOS_POR_DESCUENTO points worth
    #[test]
    fn prop_unidad_equivale_a_cincuenta_puntos(unidades in 1i32..10_000) {
        let puntos = unidades * PUNTOS_POR_DESCUENTO;
        prop_assert_eq!(descuentos_disponibles(puntos), unidades);
        prop_assert_eq!(descuentos_disponibles(puntos - 1), unidades - 1);
    }

    /// Only strings of exactly 13 characters pass RFC validation
    #[test]
    fn prop_rfc_longitud_exacta(rfc in "[A-Z0-9]{0,20}") {
        prop_assert_eq!(validar_rfc(&rfc).is_ok(), rfc.len() == 13);
    }
}
