use thiserror::Error;

pub const INVALID_MODULE_MESSAGE: &str = "Invalid module specified.";
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Authorization header is required.";
pub const UPSTREAM_FAILURE_MESSAGE: &str = "An error occurred while processing the request.";

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid module: {module:?}")]
    InvalidModule { module: Option<String> },

    #[error("Authorization header is missing")]
    MissingCredentials,

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Upstream returned status {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("Upstream payload error: {message}")]
    UpstreamPayload { message: String },

    #[error("Detail fetch failed for id {id}: {source}")]
    DetailFetch {
        id: String,
        #[source]
        source: Box<RelayError>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

impl RelayError {
    /// 對外回應的 HTTP 狀態碼
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::InvalidModule { .. } => 400,
            RelayError::MissingCredentials => 401,
            _ => 500,
        }
    }

    /// 對外回應的訊息，不洩漏上游細節
    pub fn public_message(&self) -> &'static str {
        match self {
            RelayError::InvalidModule { .. } => INVALID_MODULE_MESSAGE,
            RelayError::MissingCredentials => MISSING_CREDENTIALS_MESSAGE,
            _ => UPSTREAM_FAILURE_MESSAGE,
        }
    }

    /// 是否為上游呼叫 (網路、狀態碼、內容) 失敗
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            RelayError::ApiError(_)
                | RelayError::UpstreamStatus { .. }
                | RelayError::UpstreamPayload { .. }
                | RelayError::DetailFetch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
