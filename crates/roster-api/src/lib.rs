//! roster-api — REST API for the candidate store.
//!
//! Provides axum route handlers over `CandidateStore`.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/v1/candidates` | List candidates (`?q=` substring search) |
//! | POST | `/api/v1/candidates` | Add a candidate |
//! | PUT | `/api/v1/candidates/{email}` | Rewrite a candidate's fields |
//! | DELETE | `/api/v1/candidates/{email}` | Remove a candidate |

pub mod handlers;

use axum::Router;
use axum::routing::{get, put};
use roster_store::CandidateStore;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: CandidateStore,
}

/// Build the complete API router.
pub fn build_router(store: CandidateStore) -> Router {
    let state = ApiState { store };

    let api_routes = Router::new()
        .route(
            "/candidates",
            get(handlers::list_candidates).post(handlers::add_candidate),
        )
        .route(
            "/candidates/{email}",
            put(handlers::update_candidate).delete(handlers::remove_candidate),
        )
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}
