//! Field validators shared by the backend request schemas
//!
//! The `validar_*` functions plug into `validator`'s `custom` attribute; the
//! plain helpers cover rules the derive cannot express on its own.

use rust_decimal::Decimal;
use validator::ValidationError;

/// Length of a Mexican RFC tax identifier
pub const RFC_LEN: usize = 13;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut e = ValidationError::new(code);
    e.message = Some(message.into());
    e
}

/// RFC must be exactly 13 characters when supplied
pub fn validar_rfc(rfc: &str) -> Result<(), ValidationError> {
    if rfc.chars().count() != RFC_LEN {
        return Err(error("rfc", "El RFC debe tener 13 caracteres"));
    }
    Ok(())
}

/// Prices must be strictly positive
pub fn validar_precio(precio: &Decimal) -> Result<(), ValidationError> {
    if *precio <= Decimal::ZERO {
        return Err(error("precio", "El precio debe ser positivo"));
    }
    Ok(())
}

/// Costs and discounts must be zero or greater
pub fn validar_monto_no_negativo(monto: &Decimal) -> Result<(), ValidationError> {
    if *monto < Decimal::ZERO {
        return Err(error("monto", "El monto debe ser mayor o igual a 0"));
    }
    Ok(())
}

/// Quantities on sale/purchase lines must be strictly positive
pub fn validar_cantidad_positiva(cantidad: i32) -> Result<(), ValidationError> {
    if cantidad <= 0 {
        return Err(error("cantidad", "La cantidad debe ser mayor a 0"));
    }
    Ok(())
}

/// An inventory adjustment of zero is meaningless
pub fn validar_ajuste_no_cero(cantidad: i32) -> Result<(), ValidationError> {
    if cantidad == 0 {
        return Err(error("cantidad", "El ajuste no puede ser 0"));
    }
    Ok(())
}

/// Cross-field rule for warehouse rows: maximum must not undercut minimum
///
/// Only enforced when both bounds are present, matching the create/update
/// schemas where either may be omitted.
pub fn stock_bounds_validos(stock_minimo: Option<i32>, stock_maximo: Option<i32>) -> bool {
    match (stock_minimo, stock_maximo) {
        (Some(minimo), Some(maximo)) => maximo >= minimo,
        _ => true,
    }
}

/// Normalize an optional text field: empty strings become None
pub fn limpiar_opcional(valor: Option<String>) -> Option<String> {
    valor.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc_exige_13_caracteres() {
        assert!(validar_rfc("XAXX010101000").is_ok());
        assert!(validar_rfc("XAXX01010100").is_err());
        assert!(validar_rfc("XAXX0101010001").is_err());
        assert!(validar_rfc("").is_err());
    }

    #[test]
    fn precio_debe_ser_positivo() {
        assert!(validar_precio(&Decimal::new(1, 2)).is_ok());
        assert!(validar_precio(&Decimal::ZERO).is_err());
        assert!(validar_precio(&Decimal::new(-100, 2)).is_err());
    }

    #[test]
    fn monto_acepta_cero() {
        assert!(validar_monto_no_negativo(&Decimal::ZERO).is_ok());
        assert!(validar_monto_no_negativo(&Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn cantidad_de_linea_positiva() {
        assert!(validar_cantidad_positiva(1).is_ok());
        assert!(validar_cantidad_positiva(0).is_err());
        assert!(validar_cantidad_positiva(-3).is_err());
    }

    #[test]
    fn ajuste_cero_se_rechaza() {
        assert!(validar_ajuste_no_cero(0).is_err());
        assert!(validar_ajuste_no_cero(-5).is_ok());
        assert!(validar_ajuste_no_cero(5).is_ok());
    }

    #[test]
    fn stock_bounds_solo_con_ambos_presentes() {
        assert!(stock_bounds_validos(Some(10), Some(100)));
        assert!(stock_bounds_validos(Some(10), Some(10)));
        assert!(!stock_bounds_validos(Some(100), Some(10)));
        assert!(stock_bounds_validos(None, Some(10)));
        assert!(stock_bounds_validos(Some(100), None));
        assert!(stock_bounds_validos(None, None));
    }

    #[test]
    fn limpiar_opcional_descarta_vacios() {
        assert_eq!(limpiar_opcional(Some("".into())), None);
        assert_eq!(limpiar_opcional(Some("   ".into())), None);
        assert_eq!(limpiar_opcional(Some("dato".into())), Some("dato".to_string()));
        assert_eq!(limpiar_opcional(None), None);
    }
}
