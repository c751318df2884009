//! Per-context engine configuration.

use rewind_tables::SymbolId;

/// Knobs fixed when a [`PdaRun`](crate::PdaRun) is created.
///
/// Built with the `with_*` methods:
///
/// ```
/// use rewind_pda::EngineConfig;
///
/// let config = EngineConfig::new().with_revert_on(true);
/// assert!(config.revert_on);
/// assert!(config.ctx_dep_parsing);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Keep reverse code across commit points instead of discarding it.
    pub revert_on: bool,
    /// Suspend for semantic actions (reductions, generation, pre-EOF).
    /// When off, actions are skipped and never reject.
    pub ctx_dep_parsing: bool,
    /// Stop as soon as the stack holds exactly one node of this symbol.
    pub stop_target: Option<SymbolId>,
}

impl EngineConfig {
    pub const fn new() -> Self {
        EngineConfig {
            revert_on: false,
            ctx_dep_parsing: true,
            stop_target: None,
        }
    }

    #[must_use]
    pub const fn with_revert_on(mut self, revert_on: bool) -> Self {
        self.revert_on = revert_on;
        self
    }

    #[must_use]
    pub const fn with_ctx_dep_parsing(mut self, on: bool) -> Self {
        self.ctx_dep_parsing = on;
        self
    }

    #[must_use]
    pub const fn with_stop_target(mut self, target: SymbolId) -> Self {
        self.stop_target = Some(target);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
