use thiserror::Error;

/// Slack error codes that mean the token is not allowed to make the call.
const PERMISSION_CODES: &[&str] = &[
    "missing_scope",
    "not_allowed_token_type",
    "no_permission",
    "access_denied",
    "ekm_access_denied",
    "not_authed",
    "invalid_auth",
    "token_revoked",
    "token_expired",
    "account_inactive",
    "team_access_not_granted",
];

const NOT_FOUND_CODES: &[&str] = &["channel_not_found", "user_not_found"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{method} was rejected ({code}){}", scope_detail(.needed, .provided))]
    Permission {
        method: String,
        code: String,
        needed: Option<String>,
        provided: Option<String>,
    },

    #[error("{method} failed: {code}")]
    Remote { method: String, code: String },

    #[error("{method} returned HTTP {status}")]
    Http { method: String, status: u16 },

    #[error("Failed to reach Slack for {method}: {message}")]
    Transport { method: String, message: String },

    #[error("Failed to parse {method} response: {message}")]
    Decode { method: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ApiError {
    /// Classify an `ok: false` reply from the Web API.
    pub fn from_slack(
        method: impl Into<String>,
        code: impl Into<String>,
        needed: Option<String>,
        provided: Option<String>,
    ) -> Self {
        let method = method.into();
        let code = code.into();
        if PERMISSION_CODES.contains(&code.as_str()) {
            ApiError::Permission {
                method,
                code,
                needed,
                provided,
            }
        } else {
            ApiError::Remote { method, code }
        }
    }

    pub fn is_permission(&self) -> bool {
        matches!(self, ApiError::Permission { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Remote { code, .. } if NOT_FOUND_CODES.contains(&code.as_str()))
    }

    /// Machine-readable Slack error code, when the failure came from Slack itself.
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Permission { code, .. } | ApiError::Remote { code, .. } => Some(code),
            _ => None,
        }
    }

    pub(crate) fn transport(method: &str, err: reqwest::Error) -> Self {
        ApiError::Transport {
            method: method.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn decode(method: &str, err: impl std::fmt::Display) -> Self {
        ApiError::Decode {
            method: method.to_string(),
            message: err.to_string(),
        }
    }
}

fn scope_detail(needed: &Option<String>, provided: &Option<String>) -> String {
    match (needed, provided) {
        (None, None) => String::new(),
        (Some(needed), None) => format!(": needs {}", needed),
        (None, Some(provided)) => format!(": token has {}", provided),
        (Some(needed), Some(provided)) => format!(": needs {}, token has {}", needed, provided),
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
