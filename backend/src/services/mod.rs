//! Business logic services, one per resource

pub mod almacen;
pub mod articulo;
pub mod auth;
pub mod cliente;
pub mod compra;
pub mod proveedor;
pub mod user;
pub mod venta;

pub use almacen::AlmacenService;
pub use articulo::ArticuloService;
pub use auth::AuthService;
pub use cliente::ClienteService;
pub use compra::CompraService;
pub use proveedor::ProveedorService;
pub use user::UserService;
pub use venta::VentaService;
