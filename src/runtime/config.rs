//! Runtime configuration.

use crate::hooks::ContextScoping;

/// Configuration for a [`crate::runtime::Runtime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// How `use_context` finds provided values.
    pub context_scoping: ContextScoping,
    /// Upper bound on flush passes in one `run_until_idle` call.
    pub max_flush_passes: usize,
    /// Name of the root path segment; the mount counter is appended.
    pub mount_prefix: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            context_scoping: ContextScoping::Scoped,
            max_flush_passes: 64,
            mount_prefix: "Mount".to_owned(),
        }
    }
}

impl RuntimeConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the context lookup discipline (builder).
    pub fn with_context_scoping(mut self, scoping: ContextScoping) -> Self {
        self.context_scoping = scoping;
        self
    }

    /// Set the flush bound for `run_until_idle` (builder). Clamped to at least 1.
    pub fn with_max_flush_passes(mut self, passes: usize) -> Self {
        self.max_flush_passes = passes.max(1);
        self
    }

    /// Set the root segment prefix (builder).
    pub fn with_mount_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.mount_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RuntimeConfig::new();
        assert_eq!(config.context_scoping, ContextScoping::Scoped);
        assert_eq!(config.max_flush_passes, 64);
        assert_eq!(config.mount_prefix, "Mount");
    }

    #[test]
    fn builder_chain() {
        let config = RuntimeConfig::new()
            .with_context_scoping(ContextScoping::Global)
            .with_max_flush_passes(0)
            .with_mount_prefix("Root");
        assert_eq!(config.context_scoping, ContextScoping::Global);
        assert_eq!(config.max_flush_passes, 1);
        assert_eq!(config.mount_prefix, "Root");
    }
}
