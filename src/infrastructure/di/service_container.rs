//! Service container for dependency injection
//!
//! Wires the rules engine to the loaded settings.

use std::sync::Arc;

use crate::application::{AnalysisSession, ApplicationResult};
use crate::config::Settings;
use crate::domain::{Position, RulesEngine};
use crate::infrastructure::chess::ShakmatyRules;

/// Container holding settings and the rules engine shared by all sessions.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Rules engine
    pub rules: Arc<dyn RulesEngine>,
}

impl ServiceContainer {
    /// Create a new service container with the shakmaty rules engine.
    pub fn new(settings: Settings) -> Self {
        let rules = Arc::new(ShakmatyRules::new(settings.rules.sloppy));
        Self::with_deps(settings, rules)
    }

    /// Create a service container with a custom rules engine (for testing).
    pub fn with_deps(settings: Settings, rules: Arc<dyn RulesEngine>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, rules }
    }

    /// Starting position: explicit FEN, else configured `start_fen`, else the standard start.
    pub fn start_position(&self, fen: Option<&str>) -> ApplicationResult<Position> {
        match fen.or(self.settings.start_fen.as_deref()) {
            Some(fen) => Ok(self.rules.validate(fen)?),
            None => Ok(self.rules.starting_position()),
        }
    }

    /// Open an empty session at the starting position.
    pub fn session(&self, fen: Option<&str>) -> ApplicationResult<AnalysisSession> {
        let start = self.start_position(fen)?;
        Ok(AnalysisSession::new(Arc::clone(&self.rules), start))
    }
}
