//! Shared domain logic for the Inventario Comercial platform
//!
//! Pure types and rules with no I/O: stock-state classification, loyalty
//! arithmetic and field validators used by the backend services.

pub mod types;
pub mod validation;

pub use types::{ajustar_cantidad, AjusteError, EstadoStock};
