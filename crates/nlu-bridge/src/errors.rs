use thiserror::Error;

/// Marker the engine puts in language lookup failures. Message text is the
/// only discriminator the error channel carries.
pub const UNKNOWN_LANGUAGE_MARKER: &str = "unknown language";

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Nonzero status from an engine entry point, with the engine's message.
    #[error("{0}")]
    Engine(String),

    /// Engine output disagrees with the wire contract this host was built for.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("engine load error: {0}")]
    Load(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl BridgeError {
    pub(crate) fn unknown_code(what: &str, code: i32) -> Self {
        BridgeError::SchemaMismatch(format!("unknown {what} code {code}"))
    }

    pub(crate) fn null_field(field: &str) -> Self {
        BridgeError::SchemaMismatch(format!("null pointer in required field `{field}`"))
    }

    pub fn is_unknown_language(&self) -> bool {
        match self {
            BridgeError::Engine(msg) => msg
                .to_ascii_lowercase()
                .contains(UNKNOWN_LANGUAGE_MARKER),
            _ => false,
        }
    }

    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, BridgeError::SchemaMismatch(_))
    }
}

impl From<anyhow::Error> for BridgeError {
    fn from(e: anyhow::Error) -> Self {
        BridgeError::Load(format!("{e:#}"))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
