//! Application services layer.

pub mod error;
pub mod notify;
pub mod posts;
pub mod repos;
