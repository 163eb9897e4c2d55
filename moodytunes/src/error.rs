use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

pub const DEFAULT_ERROR_MESSAGE: &str = "Error!";

const HTTP_STATUS_ERROR_MAP: [(u16, &str); 5] = [
    (400, "Invalid request parameters"),
    (403, "Request forbidden"),
    (404, "Resource not found"),
    (500, "Server returned an error"),
    (502, "Could not connect to API"),
];

/// User-facing message for a failed response status.
pub fn status_message(status: u16) -> &'static str {
    HTTP_STATUS_ERROR_MAP
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, message)| *message)
        .unwrap_or(DEFAULT_ERROR_MESSAGE)
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed with status {status}")]
    Status { status: u16, errors: Vec<String> },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Builds a status error, keeping any validation errors the body carries.
    pub fn from_response(status: u16, body: &str) -> Self {
        ApiError::Status {
            status,
            errors: validation_errors(body),
        }
    }

    /// The string shown to the user in the error modal.
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::Status { status, .. } => status_message(*status),
            ApiError::Transport(_) => status_message(502),
            ApiError::Decode(_) | ApiError::Encode(_) | ApiError::InvalidUrl(_) => {
                DEFAULT_ERROR_MESSAGE
            }
        }
    }

    pub fn validation_errors(&self) -> &[String] {
        match self {
            ApiError::Status { errors, .. } => errors,
            _ => &[],
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorList {
    Flat(Vec<String>),
    Fields(BTreeMap<String, Vec<String>>),
    Single(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    errors: ErrorList,
}

fn validation_errors(body: &str) -> Vec<String> {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { errors }) => match errors {
            ErrorList::Flat(errors) => errors,
            ErrorList::Fields(fields) => fields
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors
                        .into_iter()
                        .map(move |error| format!("{}: {}", field, error))
                })
                .collect(),
            ErrorList::Single(error) => vec![error],
        },
        Err(_) => Vec::new(),
    }
}
