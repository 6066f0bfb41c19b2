// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the viewer core.
//!
//! Most viewer operations fail soft (no-ops, empty sets, logged aborts)
//! rather than returning errors; the variants here cover the places where
//! a caller hands us data that can be wrong on arrival.

/// Result alias for viewer-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the viewer core.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A string did not have the shape of a domain element id.
    #[error("not a well-formed element id: {0:?}")]
    InvalidElementId(String),

    /// A view-preset name could not be parsed.
    #[error("unknown view preset: {0:?}")]
    UnknownPreset(String),
}
