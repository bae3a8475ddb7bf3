use thiserror::Error;

use crate::store::StoreError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("a gate named `{0}` already exists")]
    DuplicateName(String),
    #[error("gate name must not be empty")]
    InvalidName,
    #[error("no gate named `{0}`")]
    UnknownGate(String),
    #[error("destination name must not be empty")]
    InvalidDestination,
    #[error("a route needs at least 2 points, got {0}")]
    InsufficientPoints(usize),
    #[error("gate `{gate}` already has a route to `{destination}`")]
    DuplicateRoute { gate: String, destination: String },
    #[error("{0} not found")]
    NotFound(String),
    #[error("image dimensions are not known yet")]
    MeasurementUnavailable,
    #[error("no route is being drawn")]
    NoActiveSession,
    #[error("already drawing a route from gate `{0}`; cancel it first")]
    SessionBusy(String),
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
    #[error("stored value under `{key}` is malformed: {source}")]
    Decode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
