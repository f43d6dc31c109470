//! HTTP surface: streamed plan generation and a health check

mod routes;
mod server;

pub use routes::{AppState, HealthResponse, PlanRequest, generate_plan, health_check};
pub use server::{ApiServer, ApiServerConfig, cors_layer};
