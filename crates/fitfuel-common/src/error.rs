use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Only admin users are allowed to log in.")]
    NotAdmin,

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Record {row} does not match the table schema (missing: {missing:?}, unexpected: {unexpected:?})")]
    SchemaMismatch {
        row: usize,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid value '{value}' for {field} (allowed: {allowed})")]
    InvalidChoice {
        field: String,
        value: String,
        allowed: String,
    },

    #[error("A login request is already in flight")]
    LoginInProgress,

    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConsoleError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_choice(
        field: impl Into<String>,
        value: impl Into<String>,
        allowed: &[&str],
    ) -> Self {
        Self::InvalidChoice {
            field: field.into(),
            value: value.into(),
            allowed: allowed.join(", "),
        }
    }

    pub fn unknown_route(path: impl Into<String>) -> Self {
        Self::UnknownRoute(path.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
