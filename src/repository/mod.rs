pub mod games;
pub mod sessions;
pub mod store;
