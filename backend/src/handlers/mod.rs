//! HTTP handlers, one module per resource

pub mod almacen;
pub mod articulos;
pub mod auth;
pub mod clientes;
pub mod compras;
pub mod health;
pub mod proveedores;
pub mod users;
pub mod ventas;

use serde::Deserialize;

/// Listing filter shared by the catalog resources
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactivos: bool,
}
