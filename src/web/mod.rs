//! Web surface: site pages, the Live Demo API, and the HTTP server.

pub mod demo_api;
pub mod pages;
pub mod registry;
pub mod server;

pub use demo_api::{ApiError, DemoApiState, status_for};
pub use pages::{Page, html_escape, render_page};
pub use registry::SessionRegistry;
pub use server::{WebServer, build_router};
