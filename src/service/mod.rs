pub mod auth;
pub mod game;
pub mod notify;
