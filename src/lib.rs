pub mod config;
pub mod domain;
pub mod error;
pub mod repository;
pub mod routes;
pub mod service;

pub use config::Config;
pub use error::Error;
pub use routes::Api;
