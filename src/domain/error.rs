use thiserror::Error;

#[derive(Error, Debug)]
pub enum QiitaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Qiita API error! status: {status} {status_text}")]
    RemoteApi { status: u16, status_text: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Broad classification of a failed fetch, as stored in a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    RemoteApi { status: u16 },
    Decode,
    Transport,
}

/// Cloneable error snapshot shared by every consumer of a cache entry.
///
/// `QiitaError` owns non-cloneable sources (`reqwest::Error`, `io::Error`),
/// so the cache keeps this flattened form instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&QiitaError> for ErrorInfo {
    fn from(err: &QiitaError) -> Self {
        let kind = match err {
            QiitaError::Config(_) => ErrorKind::Configuration,
            QiitaError::RemoteApi { status, .. } => ErrorKind::RemoteApi { status: *status },
            QiitaError::Decode(_) => ErrorKind::Decode,
            QiitaError::Http(e) if e.is_decode() => ErrorKind::Decode,
            QiitaError::Http(_) | QiitaError::Url(_) | QiitaError::Io(_) | QiitaError::Toml(_) => {
                ErrorKind::Transport
            }
        };
        Self::new(kind, err.to_string())
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
