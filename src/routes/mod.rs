use axum::Router;

use crate::state::SharedState;

pub mod competitions;
pub mod docs;
pub mod extract;
pub mod health;
pub mod teams;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = Router::new().nest(
        "/api",
        competitions::router().merge(teams::router()),
    );

    health::router()
        .merge(api_router)
        .merge(docs::router())
        .with_state(state)
}
