use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(String),
}

impl Error {
    /// The API answers 403 once the daily quota is spent.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Error::Status { status: 403, .. })
    }
}

impl From<yup_oauth2::Error> for Error {
    fn from(err: yup_oauth2::Error) -> Self {
        Error::Auth(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
