//! Polling Kubernetes resource lists with derived health states, served as render-ready views.

pub mod config;
pub mod error;
pub mod handlers;
pub mod list;
pub mod models;
pub mod namespaces;
pub mod notifications;
pub mod resources;
pub mod utils;
