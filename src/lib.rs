//! Food menu dashboard: keeps a local collection of dishes in sync with a REST
//! resource, plus the small HTTP stack and development server it runs against.

pub mod api;
pub mod cli;
pub mod dashboard;
pub mod database;
pub mod endpoints;
pub mod errors;
pub mod http;
pub mod routes;
pub mod service;
pub mod session;
pub mod store;
pub mod threadpool;
