//! Sales and purchase math tests
//!
//! Covers header total accumulation over lines and the loyalty points
//! earned by a completed sale.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::types::{puntos_por_total, MONTO_POR_PUNTO};

/// Header total as the services compute it: sum of cantidad * precio
fn total_de_lineas(lineas: &[(i32, Decimal)]) -> Decimal {
    lineas
        .iter()
        .map(|(cantidad, precio)| Decimal::from(*cantidad) * *precio)
        .sum()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn total_suma_subtotales_de_linea() {
    let lineas = [(2, dec("10.50")), (1, dec("99.99")), (3, dec("0.50"))];
    assert_eq!(total_de_lineas(&lineas), dec("122.49"));
}

#[test]
fn puntos_son_piso_del_total_entre_cien() {
    assert_eq!(puntos_por_total(dec("0")), 0);
    assert_eq!(puntos_por_total(dec("99.99")), 0);
    assert_eq!(puntos_por_total(dec("100.00")), 1);
    assert_eq!(puntos_por_total(dec("199.99")), 1);
    assert_eq!(puntos_por_total(dec("250.50")), 2);
}

#[test]
fn total_negativo_no_gana_puntos() {
    assert_eq!(puntos_por_total(dec("-100")), 0);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// The total is linear in the lines: appending a line adds its subtotal
    #[test]
    fn prop_total_lineal(
        mut lineas in prop::collection::vec((1i32..100, 1i64..100_000), 0..8),
        cantidad in 1i32..100,
        centavos in 1i64..100_000,
    ) {
        let mut lineas: Vec<(i32, Decimal)> = lineas
            .drain(..)
            .map(|(c, p)| (c, Decimal::new(p, 2)))
            .collect();
        let antes = total_de_lineas(&lineas);

        let precio = Decimal::new(centavos, 2);
        lineas.push((cantidad, precio));

        prop_assert_eq!(total_de_lineas(&lineas), antes + Decimal::from(cantidad) * precio);
    }

    /// Points never exceed total / MONTO_POR_PUNTO and grow monotonically
    #[test]
    fn prop_puntos_piso_y_monotonos(centavos in 0i64..100_000_000, extra in 0i64..1_000_000) {
        let total = Decimal::new(centavos, 2);
        let puntos = puntos_por_total(total);

        let esperado = (centavos / 100) / MONTO_POR_PUNTO;
        prop_assert_eq!(i64::from(puntos), esperado);

        let mayor = Decimal::new(centavos + extra, 2);
        prop_assert!(puntos_por_total(mayor) >= puntos);
    }

    /// A cancelled sale revokes exactly the points it earned
    #[test]
    fn prop_cancelacion_simetrica(centavos in 0i64..10_000_000, acumulado in 0i32..100_000) {
        let total = Decimal::new(centavos, 2);
        let ganados = puntos_por_total(total);

        let tras_venta = acumulado + ganados;
        let tras_cancelacion = (tras_venta - ganados).max(0);

        prop_assert_eq!(tras_cancelacion, acumulado);
    }
}
