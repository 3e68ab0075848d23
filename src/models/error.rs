use rocket::http::Status;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryError {
    Validation(String),
    InvalidAction(String),
    NotFound,
    Unauthorized,
    Forbidden,
    Conflict(String),
    StoreUnavailable,
}

impl fmt::Display for GalleryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GalleryError::Validation(msg) => write!(f, "Validation error: {}", msg),
            GalleryError::InvalidAction(action) => {
                write!(f, "Invalid action '{}'. Must be \"like\" or \"dislike\"", action)
            }
            GalleryError::NotFound => write!(f, "Comic not found"),
            GalleryError::Unauthorized => write!(f, "Authentication required"),
            GalleryError::Forbidden => write!(f, "Not authorized to perform this action"),
            GalleryError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            GalleryError::StoreUnavailable => write!(f, "Store unavailable"),
        }
    }
}

impl std::error::Error for GalleryError {}

impl GalleryError {
    /// HTTP status the route layer should answer with.
    pub fn status(&self) -> Status {
        match self {
            GalleryError::Validation(_) => Status::BadRequest,
            GalleryError::InvalidAction(_) => Status::BadRequest,
            GalleryError::NotFound => Status::NotFound,
            GalleryError::Unauthorized => Status::Unauthorized,
            GalleryError::Forbidden => Status::Forbidden,
            GalleryError::Conflict(_) => Status::Conflict,
            GalleryError::StoreUnavailable => Status::ServiceUnavailable,
        }
    }
}
