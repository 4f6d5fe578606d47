//! Warehouse logic tests
//!
//! Covers stock level classification and inventory adjustment:
//! every accepted adjustment lands exactly and never below zero,
//! and classification is total over the threshold space.

use proptest::prelude::*;
use shared::{ajustar_cantidad, AjusteError, EstadoStock};
use shared::validation::stock_bounds_validos;

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn clasificacion_en_umbrales_exactos() {
    // At the minimum the state is already BAJO
    assert_eq!(EstadoStock::classify(10, 10, 100), EstadoStock::Bajo);
    // At the maximum the state is already EXCESO
    assert_eq!(EstadoStock::classify(100, 10, 100), EstadoStock::Exceso);
    // Strictly inside the band is OK
    assert_eq!(EstadoStock::classify(55, 10, 100), EstadoStock::Ok);
}

#[test]
fn bajo_gana_con_umbrales_invertidos() {
    assert_eq!(EstadoStock::classify(7, 10, 5), EstadoStock::Bajo);
    assert_eq!(EstadoStock::classify(0, 0, 0), EstadoStock::Bajo);
}

#[test]
fn ajuste_exacto_a_cero_es_valido() {
    assert_eq!(ajustar_cantidad(25, -25), Ok(0));
}

#[test]
fn ajuste_cero_rechazado_antes_que_negativo() {
    assert_eq!(ajustar_cantidad(0, 0), Err(AjusteError::AjusteCero));
}

#[test]
fn limites_de_stock_solo_se_comparan_cuando_ambos_presentes() {
    assert!(stock_bounds_validos(Some(10), Some(10)));
    assert!(stock_bounds_validos(Some(10), Some(100)));
    assert!(!stock_bounds_validos(Some(100), Some(10)));
    assert!(stock_bounds_validos(None, Some(5)));
    assert!(stock_bounds_validos(Some(500), None));
    assert!(stock_bounds_validos(None, None));
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Classification always yields exactly one of the three states,
    /// consistent with the ordering of the thresholds
    #[test]
    fn prop_clasificacion_total_y_ordenada(
        cantidad in 0i32..50_000,
        minimo in 0i32..50_000,
        maximo in 0i32..50_000,
    ) {
        let estado = EstadoStock::classify(cantidad, minimo, maximo);
        match estado {
            EstadoStock::Bajo => prop_assert!(cantidad <= minimo),
            EstadoStock::Exceso => prop_assert!(cantidad > minimo && cantidad >= maximo),
            EstadoStock::Ok => prop_assert!(cantidad > minimo && cantidad < maximo),
        }
    }

    /// An adjustment either lands at actual + delta >= 0 or is rejected
    /// with the quantity untouched
    #[test]
    fn prop_ajuste_atomico(actual in 0i32..1_000_000, delta in -1_000_000i32..1_000_000) {
        match ajustar_cantidad(actual, delta) {
            Ok(nueva) => {
                prop_assert_eq!(nueva, actual + delta);
                prop_assert!(nueva >= 0);
            }
            Err(AjusteError::AjusteCero) => prop_assert_eq!(delta, 0),
            Err(AjusteError::ExistenciaNegativa) => prop_assert!(actual + delta < 0),
        }
    }

    /// A pair of opposite adjustments restores the original quantity
    #[test]
    fn prop_ajuste_reversible(actual in 0i32..100_000, delta in 1i32..100_000) {
        let subida = ajustar_cantidad(actual, delta);
        prop_assert_eq!(subida, Ok(actual + delta));
        if let Ok(nueva) = subida {
            prop_assert_eq!(ajustar_cantidad(nueva, -delta), Ok(actual));
        }
    }

    /// Parsing the stored state string is the inverse of rendering it
    #[test]
    fn prop_estado_round_trip(cantidad in 0i32..1000, minimo in 0i32..1000, maximo in 0i32..1000) {
        let estado = EstadoStock::classify(cantidad, minimo, maximo);
        prop_assert_eq!(estado.as_str().parse::<EstadoStock>().unwrap(), estado);
    }
}
