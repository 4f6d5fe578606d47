//! API route definitions

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers;
use crate::AppState;

/// Build the /api router
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/clientes", cliente_routes())
        .nest("/articulos", articulo_routes())
        .nest("/proveedores", proveedor_routes())
        .nest("/almacen", almacen_routes())
        .nest("/ventas", venta_routes())
        .nest("/compras", compra_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(handlers::auth::login))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::users::list).post(handlers::users::create))
        .route(
            "/:id",
            get(handlers::users::get_by_id)
                .put(handlers::users::update)
                .delete(handlers::users::delete),
        )
}

fn cliente_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::clientes::list).post(handlers::clientes::create),
        )
        .route("/:id/puntos", get(handlers::clientes::puntos))
        .route(
            "/:id",
            get(handlers::clientes::get_by_id)
                .put(handlers::clientes::update)
                .delete(handlers::clientes::delete),
        )
}

fn articulo_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::articulos::list).post(handlers::articulos::create),
        )
        .route("/inventario", get(handlers::articulos::list_con_inventario))
        .route("/categorias", get(handlers::articulos::categorias))
        .route("/buscar", get(handlers::articulos::buscar))
        .route(
            "/:codigo",
            get(handlers::articulos::get_by_codigo)
                .put(handlers::articulos::update)
                .delete(handlers::articulos::delete),
        )
}

fn proveedor_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::proveedores::list).post(handlers::proveedores::create),
        )
        .route(
            "/:id",
            get(handlers::proveedores::get_by_id)
                .put(handlers::proveedores::update)
                .delete(handlers::proveedores::delete),
        )
}

fn almacen_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::almacen::list).post(handlers::almacen::create),
        )
        .route("/alertas", get(handlers::almacen::alertas))
        .route("/ajustar", post(handlers::almacen::ajustar))
        .route(
            "/:codigoArticulo",
            get(handlers::almacen::get_by_codigo)
                .put(handlers::almacen::update)
                .delete(handlers::almacen::delete),
        )
}

fn venta_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::ventas::list).post(handlers::ventas::create),
        )
        .route(
            "/:folio",
            get(handlers::ventas::get_by_folio)
                .put(handlers::ventas::update)
                .delete(handlers::ventas::cancelar),
        )
}

fn compra_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::compras::list).post(handlers::compras::create),
        )
        .route(
            "/:folio",
            get(handlers::compras::get_by_folio)
                .put(handlers::compras::update)
                .delete(handlers::compras::cancelar),
        )
        .route("/:folio/detalles", post(handlers::compras::agregar_detalle))
        .route(
            "/:folio/detalles/:folioDetalle",
            delete(handlers::compras::eliminar_detalle),
        )
}
