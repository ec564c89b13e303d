use thiserror::Error;

use crate::path::VirtualPath;
use crate::permission::Access;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("permission denied: {access} on {path}")]
    PermissionDenied { access: Access, path: VirtualPath },

    #[error("backend error during {op} on {path}: {source}")]
    Backend {
        op: &'static str,
        path: VirtualPath,
        source: std::io::Error,
    },

    #[error("not found: {0}")]
    NotFound(VirtualPath),

    #[error("cache error: {0}")]
    Cache(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn backend(op: &'static str, path: &VirtualPath, source: std::io::Error) -> Self {
        Self::Backend {
            op,
            path: path.clone(),
            source,
        }
    }

    /// User-facing status for this error. Backend/cache internals are never
    /// exposed through the status text.
    pub fn status(&self) -> Status {
        match self {
            Self::PermissionDenied { .. } => Status::forbidden(),
            Self::Validation(msg) | Self::InvalidConfig(msg) => Status {
                code: 422,
                status: msg.clone(),
            },
            Self::NotFound(_) => Status {
                code: 404,
                status: "Not Found".to_string(),
            },
            Self::Io(_) | Self::Json(_) | Self::Backend { .. } | Self::Cache(_) => Status {
                code: 500,
                status: "Operation failed".to_string(),
            },
        }
    }
}

/// Structured status returned to callers at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Status {
    pub code: u16,
    pub status: String,
}

impl Status {
    pub fn done() -> Self {
        Self {
            code: 200,
            status: "Done".to_string(),
        }
    }

    pub fn forbidden() -> Self {
        Self {
            code: 403,
            status: "Forbidden".to_string(),
        }
    }
}
