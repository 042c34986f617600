use log::{error, warn};
use mongodb::error::Error as DbError;
use rocket::{http::Status, response::Responder, Request};
use thiserror::Error;

use crate::logging::RequestId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Invalid fixtures: {0}")]
    Fixture(String),
    #[error("{0}: {1}")]
    Status(Status, String),
}

impl Error {
    /// A `404 Not Found` for the described resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::Status(Status::NotFound, format!("{} not found", what.into()))
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> Status {
        match self {
            Self::Db(_) | Self::Fixture(_) => Status::InternalServerError,
            Self::Status(status, _) => *status,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let id = RequestId::of(req);
        let status = self.status();
        if status.code >= 500 {
            error!("  req{id} failed: {self}");
        } else {
            warn!("  req{id} rejected: {self}");
        }
        Err(status)
    }
}
