//! Error handlers
//!
//! Maps depot errors onto protocol reply codes.

use crate::error::types::{DepotError, RepositoryError, ValidationError};
use log::{error, warn};

pub const FILE_UNAVAILABLE: u16 = 550;
pub const PARSE_FAILED: u16 = 551;
pub const TOO_LARGE: u16 = 552;
pub const NAME_NOT_ALLOWED: u16 = 553;
pub const TYPE_NOT_ALLOWED: u16 = 554;
pub const LOCAL_ERROR: u16 = 451;
pub const SERVICE_UNAVAILABLE: u16 = 421;

/// Log an error at a level matching who caused it
pub fn handle_error(err: &DepotError) {
    match err {
        DepotError::Validation(_)
        | DepotError::Parse(_)
        | DepotError::Repository(RepositoryError::InvalidName(_))
        | DepotError::Repository(RepositoryError::NotFound(_)) => warn!("Request failed: {}", err),
        _ => error!("Depot error: {}", err),
    }
}

/// Convert an error to its reply code
pub fn reply_code(err: &DepotError) -> u16 {
    match err {
        DepotError::Repository(RepositoryError::InvalidName(_)) => NAME_NOT_ALLOWED,
        DepotError::Repository(RepositoryError::NotFound(_)) => FILE_UNAVAILABLE,
        DepotError::Repository(_) => LOCAL_ERROR,
        DepotError::Validation(ValidationError::TooLarge { .. }) => TOO_LARGE,
        DepotError::Validation(ValidationError::InvalidType { .. }) => TYPE_NOT_ALLOWED,
        DepotError::Parse(_) => PARSE_FAILED,
        DepotError::NetworkError(_) => SERVICE_UNAVAILABLE,
    }
}
