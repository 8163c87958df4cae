pub mod handlers;
pub mod models;
mod routes;

pub use routes::create_router;

use crate::config::Config;
use crate::upstream::SharedSource;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub source: SharedSource,
    pub config: Arc<Config>,
}
