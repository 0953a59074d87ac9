//! Infrastructure layer: storage adapters for the auth boundary.

pub mod principal_store;
