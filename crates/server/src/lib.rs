pub mod config;
pub mod db;
pub mod error;
pub mod limiter;
pub mod models;
pub mod presence;
pub mod routes;
pub mod store;
pub mod sync;
pub mod ws;

use config::Config;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub store: store::MessageStore,
    pub limiter: limiter::RateLimiter,
    pub presence: presence::PresenceTracker,
    pub gateway: Arc<ws::gateway::GatewayState>,
}
