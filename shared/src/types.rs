//! Core domain types: stock classification, inventory adjustment and loyalty math

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Points needed for one discount unit
pub const PUNTOS_POR_DESCUENTO: i32 = 50;

/// Sale amount that earns one loyalty point
pub const MONTO_POR_PUNTO: i64 = 100;

/// IVA rate applied to purchase subtotals, in percent
pub const IVA_PORCENTAJE: i64 = 16;

/// Stock level classification for a warehouse row
///
/// BAJO takes precedence when the thresholds bracket the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EstadoStock {
    Bajo,
    Ok,
    Exceso,
}

impl EstadoStock {
    /// Classify a quantity against its minimum/maximum thresholds
    pub fn classify(cantidad: i32, stock_minimo: i32, stock_maximo: i32) -> Self {
        if cantidad <= stock_minimo {
            EstadoStock::Bajo
        } else if cantidad >= stock_maximo {
            EstadoStock::Exceso
        } else {
            EstadoStock::Ok
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoStock::Bajo => "BAJO",
            EstadoStock::Ok => "OK",
            EstadoStock::Exceso => "EXCESO",
        }
    }
}

impl fmt::Display for EstadoStock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored estado value is not one of BAJO/OK/EXCESO
#[derive(Debug, thiserror::Error)]
#[error("estado de stock desconocido")]
pub struct EstadoStockDesconocido;

impl FromStr for EstadoStock {
    type Err = EstadoStockDesconocido;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BAJO" => Ok(EstadoStock::Bajo),
            "OK" => Ok(EstadoStock::Ok),
            "EXCESO" => Ok(EstadoStock::Exceso),
            _ => Err(EstadoStockDesconocido),
        }
    }
}

/// Why an inventory adjustment was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AjusteError {
    #[error("El ajuste no puede ser 0")]
    AjusteCero,
    #[error("El ajuste dejaría la existencia en negativo")]
    ExistenciaNegativa,
}

/// Apply an adjustment to a stock quantity
///
/// Rejects a zero delta and any delta that would drive the quantity below
/// zero; otherwise returns the exact resulting quantity.
pub fn ajustar_cantidad(actual: i32, delta: i32) -> Result<i32, AjusteError> {
    if delta == 0 {
        return Err(AjusteError::AjusteCero);
    }
    let nueva = actual + delta;
    if nueva < 0 {
        return Err(AjusteError::ExistenciaNegativa);
    }
    Ok(nueva)
}

/// Discount units earned so far: one unit per 50 accumulated points
pub fn descuentos_disponibles(puntos: i32) -> i32 {
    if puntos <= 0 {
        0
    } else {
        puntos / PUNTOS_POR_DESCUENTO
    }
}

/// Whether the client can redeem at least one discount
pub fn descuento_disponible(puntos: i32) -> bool {
    puntos >= PUNTOS_POR_DESCUENTO
}

/// Loyalty points earned by a completed sale: one point per 100 of total
pub fn puntos_por_total(total: rust_decimal::Decimal) -> i32 {
    use rust_decimal::prelude::ToPrimitive;

    if total.is_sign_negative() {
        return 0;
    }
    let puntos = (total / rust_decimal::Decimal::from(MONTO_POR_PUNTO)).floor();
    puntos.to_i32().unwrap_or(i32::MAX)
}

/// IVA owed on a purchase subtotal, rounded to cents
pub fn iva_de(subtotal: rust_decimal::Decimal) -> rust_decimal::Decimal {
    let tasa = rust_decimal::Decimal::new(IVA_PORCENTAJE, 2);
    (subtotal * tasa).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn classify_bajo_at_and_below_minimum() {
        assert_eq!(EstadoStock::classify(10, 10, 100), EstadoStock::Bajo);
        assert_eq!(EstadoStock::classify(0, 10, 100), EstadoStock::Bajo);
        assert_eq!(EstadoStock::classify(9, 10, 100), EstadoStock::Bajo);
    }

    #[test]
    fn classify_exceso_at_and_above_maximum() {
        assert_eq!(EstadoStock::classify(100, 10, 100), EstadoStock::Exceso);
        assert_eq!(EstadoStock::classify(150, 10, 100), EstadoStock::Exceso);
    }

    #[test]
    fn classify_ok_between_thresholds() {
        assert_eq!(EstadoStock::classify(11, 10, 100), EstadoStock::Ok);
        assert_eq!(EstadoStock::classify(99, 10, 100), EstadoStock::Ok);
    }

    #[test]
    fn bajo_wins_when_thresholds_bracket_same_value() {
        // cantidad <= minimo and cantidad >= maximo at the same time
        assert_eq!(EstadoStock::classify(5, 5, 5), EstadoStock::Bajo);
        assert_eq!(EstadoStock::classify(7, 10, 5), EstadoStock::Bajo);
    }

    #[test]
    fn estado_round_trips_through_str() {
        for estado in [EstadoStock::Bajo, EstadoStock::Ok, EstadoStock::Exceso] {
            assert_eq!(estado.as_str().parse::<EstadoStock>().unwrap(), estado);
        }
        assert!("MEDIO".parse::<EstadoStock>().is_err());
    }

    #[test]
    fn ajuste_rechaza_cero() {
        assert_eq!(ajustar_cantidad(10, 0), Err(AjusteError::AjusteCero));
    }

    #[test]
    fn ajuste_rechaza_resultado_negativo() {
        assert_eq!(ajustar_cantidad(3, -5), Err(AjusteError::ExistenciaNegativa));
        assert_eq!(ajustar_cantidad(0, -1), Err(AjusteError::ExistenciaNegativa));
    }

    #[test]
    fn ajuste_aplica_delta_exacto() {
        assert_eq!(ajustar_cantidad(10, -5), Ok(5));
        assert_eq!(ajustar_cantidad(10, 5), Ok(15));
        assert_eq!(ajustar_cantidad(5, -5), Ok(0));
    }

    #[test]
    fn puntos_por_total_es_piso_por_centena() {
        use rust_decimal::Decimal;

        assert_eq!(puntos_por_total(Decimal::ZERO), 0);
        assert_eq!(puntos_por_total(Decimal::new(9999, 2)), 0);
        assert_eq!(puntos_por_total(Decimal::new(10000, 2)), 1);
        assert_eq!(puntos_por_total(Decimal::new(25050, 2)), 2);
        assert_eq!(puntos_por_total(Decimal::new(-500, 0)), 0);
    }

    #[test]
    fn iva_redondeado_a_centavos() {
        use rust_decimal::Decimal;

        assert_eq!(iva_de(Decimal::new(10000, 2)), Decimal::new(1600, 2));
        assert_eq!(iva_de(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(iva_de(Decimal::new(1, 2)), Decimal::ZERO);
        assert_eq!(iva_de(Decimal::new(1050, 2)), Decimal::new(168, 2));
    }

    #[test]
    fn descuentos_en_puntos_de_corte() {
        let casos = [(0, 0, false), (49, 0, false), (50, 1, true), (99, 1, true), (100, 2, true)];
        for (puntos, unidades, elegible) in casos {
            assert_eq!(descuentos_disponibles(puntos), unidades, "puntos={puntos}");
            assert_eq!(descuento_disponible(puntos), elegible, "puntos={puntos}");
        }
    }

    proptest! {
        /// Classification is total and consistent with the ordering rule
        #[test]
        fn prop_classify_follows_rule(
            cantidad in 0i32..10_000,
            minimo in 0i32..10_000,
            maximo in 0i32..10_000,
        ) {
            let estado = EstadoStock::classify(cantidad, minimo, maximo);
            if cantidad <= minimo {
                prop_assert_eq!(estado, EstadoStock::Bajo);
            } else if cantidad >= maximo {
                prop_assert_eq!(estado, EstadoStock::Exceso);
            } else {
                prop_assert_eq!(estado, EstadoStock::Ok);
            }
        }

        /// An accepted adjustment never leaves a negative quantity
        #[test]
        fn prop_ajuste_nunca_negativo(actual in 0i32..100_000, delta in -100_000i32..100_000) {
            match ajustar_cantidad(actual, delta) {
                Ok(nueva) => {
                    prop_assert!(nueva >= 0);
                    prop_assert_eq!(nueva, actual + delta);
                }
                Err(AjusteError::AjusteCero) => prop_assert_eq!(delta, 0),
                Err(AjusteError::ExistenciaNegativa) => prop_assert!(actual + delta < 0),
            }
        }

        /// Every 50 points is exactly one discount unit
        #[test]
        fn prop_descuentos_floor(puntos in 0i32..1_000_000) {
            prop_assert_eq!(descuentos_disponibles(puntos), puntos / 50);
            prop_assert_eq!(descuento_disponible(puntos), puntos >= 50);
        }
    }
}
