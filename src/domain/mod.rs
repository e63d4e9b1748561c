pub mod amount;
pub mod auth;
pub mod dice;
pub mod game;
pub mod round;
pub mod state;
pub mod user;
