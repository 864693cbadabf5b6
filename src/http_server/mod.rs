//! # HTTP Server Module
//!
//! Exposes the browse service over JSON.
//!
//! # Endpoints
//!
//! - `/health`, `/` - Health check and banner
//! - `/browse/page`, `/browse/count` - Stateless fetch and count
//! - `/browse/sessions/*` - Cursor sessions with previous/next navigation
//! - `/query/execute` - Ad-hoc statements from the query box

pub mod browse_routes;
pub mod extract;
pub mod health_routes;
pub mod server;

pub use extract::BrowseJson;
pub use server::HttpServer;
