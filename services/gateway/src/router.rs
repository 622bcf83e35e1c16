use crate::handlers::{accounts, contracts, orders, prices};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/orders", post(orders::create_order).get(orders::list_orders))
        .route("/orders/:id", delete(orders::cancel_order))
        .route("/trades/:base/:quote", get(orders::list_trades))
        .route("/book/:base/:quote", get(orders::book_depth))
        .route(
            "/contracts",
            post(contracts::create_contract).get(contracts::list_contracts),
        )
        .route("/balances/:owner/:asset", get(accounts::get_balance))
        .route("/deposits", post(accounts::deposit))
        .route("/withdrawals", post(accounts::request_withdrawal))
        .route("/withdrawals/approve", post(accounts::approve_withdrawal))
        .route("/withdrawals/reject", post(accounts::reject_withdrawal))
        .route(
            "/prices/:symbol",
            put(prices::set_price).get(prices::get_price),
        )
        .route("/health", get(|| async { "ok" }));

    Router::new()
        .nest("/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
