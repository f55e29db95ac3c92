use axum::http::HeaderName;
use axum::middleware::map_response_with_state;
use axum::{routing::get, routing::post, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer, Config, SecurityHeaders};
use crate::handlers::{accounts, events, health_check, tickets};
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route("/accounts/details", get(accounts::list_account_details))
        .route(
            "/accounts/:id",
            get(accounts::get_account)
                .put(accounts::update_account)
                .delete(accounts::delete_account),
        )
        .route("/accounts/:id/tickets", get(accounts::account_tickets))
        .route("/accounts/:id/details", get(accounts::account_details))
        .route("/events", get(events::list_events).post(events::create_event))
        .route("/events/details", get(events::list_events_with_tickets))
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/events/:id/accounts/:account_id",
            post(events::link_account).delete(events::unlink_account),
        )
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/tickets/:id",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(map_response_with_state(
            SecurityHeaders::new(config.production),
            apply_security_headers,
        ))
        .layer(create_cors_layer(&config.allowed_origins))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}
