//! Error taxonomy for render passes.
//!
//! Fatal problems abort the current pass and surface as [`RenderError`].
//! Non-fatal observations (identity collisions) are reported as
//! [`Diagnostic`]s and logged; they never stop a pass.

use crate::identity::IdentityPath;

/// Errors that abort a render pass.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid element at {path}: {reason}")]
    InvalidElement { path: String, reason: String },
    #[error("host node missing at {path} (child index {index})")]
    MissingHostNode { path: String, index: usize },
    #[error("container is not mounted")]
    NotMounted,
    #[error("render queue did not settle after {passes} flush passes")]
    Unsettled { passes: usize },
}

impl RenderError {
    pub(crate) fn invalid(path: &IdentityPath, reason: impl Into<String>) -> Self {
        Self::InvalidElement {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the runtime.
pub type Result<T, E = RenderError> = std::result::Result<T, E>;

/// Non-fatal observations collected during render passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Two siblings resolved to the same identity path and now share one instance.
    IdentityCollision { path: IdentityPath },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Key;

    #[test]
    fn invalid_element_message_includes_path() {
        let path = IdentityPath::root("Mount0").child("div", Key::Index(0));
        let err = RenderError::invalid(&path, "empty tag name");
        assert_eq!(
            err.to_string(),
            "invalid element at /Mount0/div:0: empty tag name"
        );
    }

    #[test]
    fn unsettled_message() {
        let err = RenderError::Unsettled { passes: 3 };
        assert_eq!(
            err.to_string(),
            "render queue did not settle after 3 flush passes"
        );
    }
}
