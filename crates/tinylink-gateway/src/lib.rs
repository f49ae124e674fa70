//! HTTP front end of the tinylink URL shortener.
//!
//! Validates incoming URLs, hands them to the allocator, composes public
//! short URLs, and turns allocator and redirector results into HTTP
//! responses.

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::AppState;
