pub mod app;
pub mod config;
pub mod errors;
pub mod feed;
pub mod handlers;
pub mod history;
pub mod models;
pub mod poller;
pub mod state;
pub mod ui;
pub mod views;

pub use app::router;
pub use config::{DashboardConfig, PollerConfig};
pub use feed::FeedClient;
pub use poller::Poller;
pub use state::AppState;
