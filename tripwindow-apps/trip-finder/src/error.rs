//!  Tripwindow Trip Finder
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Errors
//!
//! Error taxonomy shared by the search engine and its collaborators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TripError {
    /// Rejected input, raised before any work is done. Never retried.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unknown airport or city.
    #[error("not found: {0}")]
    NotFound(String),

    /// A flight or hotel provider failed. The lookup is not retried by the engine.
    #[error("lookup failed: {0:#}")]
    LookupFailed(#[source] anyhow::Error),

    /// Loading or saving a local store failed.
    #[error("storage error: {0:#}")]
    Storage(#[source] anyhow::Error),
}

impl TripError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Classify a collaborator error: a `TripError` carried inside the
    /// `anyhow::Error` keeps its kind, anything else is a failed lookup.
    pub fn from_lookup(err: anyhow::Error) -> Self {
        match err.downcast::<TripError>() {
            Ok(err) => err,
            Err(err) => Self::LookupFailed(err),
        }
    }
}

pub type Result<T, E = TripError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn lookup_errors_keep_their_kind() {
        let err = TripError::from_lookup(anyhow::Error::new(TripError::NotFound("Atlantis".into())));
        assert!(matches!(err, TripError::NotFound(city) if city == "Atlantis"));

        let err = TripError::from_lookup(anyhow!("HTTP error 503"));
        assert!(matches!(err, TripError::LookupFailed(_)));
    }
}
