//! API endpoint handlers.

pub mod health;
pub mod info;
pub mod predict;
