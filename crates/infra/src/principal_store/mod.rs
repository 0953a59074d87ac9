//! Principal repository adapters.
//!
//! The authentication core only depends on `declarant_auth::PrincipalRepository`;
//! adapters here provide concrete storage for it.

pub mod in_memory;

pub use in_memory::InMemoryPrincipalStore;
