//! The engine which applies repochain transactions to account, repository, push key and ticket
//! state.
//!
//! Each transaction type is handled by a native system contract. Contracts only touch state
//! through the [`keepers`] traits, so the same engine runs against any store.

#![doc(test(attr(forbid(warnings))))]
#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_qualifications
)]

mod engine;
pub mod engine_config;
mod error;
pub mod keepers;
pub mod logging;
pub mod system;

pub use engine::ExecutionEngine;
pub use engine_config::EngineConfig;
pub use error::Error;
