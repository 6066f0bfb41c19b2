// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for scene-graph construction.

use crate::keys::NodeKey;

/// Result alias for scene operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building or editing a scene.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The referenced node does not exist (stale or foreign key).
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = Error::NodeNotFound(NodeKey::default());
        assert!(err.to_string().starts_with("node not found"));

        let err = Error::InvalidColor("#zz".to_string());
        assert_eq!(err.to_string(), "invalid color: #zz");
    }
}
