//! Application layer: the analysis session a host drives
//!
//! This layer orchestrates domain logic and owns the mutable cursor slot.

pub mod error;
pub mod script;
pub mod session;

pub use error::{ApplicationError, ApplicationResult};
pub use script::{parse_script, ScriptCommand};
pub use session::{AnalysisSession, Annotation, ImportPolicy, ImportReport, SkippedToken};
