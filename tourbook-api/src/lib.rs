use axum::Router;
use tower_http::trace::TraceLayer;

pub mod confirmation;
pub mod error;
pub mod state;
pub mod view;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(confirmation::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
