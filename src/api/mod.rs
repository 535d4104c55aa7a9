pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use extract::AppJson;
pub use routes::create_router;
pub use state::AppState;
