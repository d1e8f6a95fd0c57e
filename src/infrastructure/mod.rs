//! Infrastructure layer: rules engine adapter and DI container
//!
//! This layer implements the domain's boundary traits and wires up services.

pub mod chess;
pub mod di;
pub mod error;

pub use chess::ShakmatyRules;
pub use di::ServiceContainer;
pub use error::{InfraError, InfraResult};
