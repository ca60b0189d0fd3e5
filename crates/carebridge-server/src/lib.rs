pub mod config;
pub mod error;
pub mod handlers;
pub mod state;
pub mod telemetry;

pub use config::CarebridgeConfig;
pub use error::ApiError;
pub use handlers::router;
pub use state::AppState;
