use thiserror::Error;

#[derive(Error, Debug)]
pub enum BiTreeError {
    #[error("Missing required field `{field}` in object ending at line {line} column {column}")]
    MissingField {
        field: String,
        line: usize,
        column: usize,
    },

    #[error("Duplicate {kind} concept: {technical_name}")]
    DuplicateConcept {
        kind: &'static str,
        technical_name: String,
    },

    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BiTreeError {
    /// Map a record parse failure onto the error taxonomy. Serde reports an
    /// absent required field as "missing field `name`"; those become
    /// `MissingField` with the position of the object that lacks it,
    /// everything else stays a JSON error.
    pub fn from_parse(err: serde_json::Error) -> Self {
        let msg = err.to_string();
        if let Some(rest) = msg.strip_prefix("missing field `") {
            if let Some(end) = rest.find('`') {
                return BiTreeError::MissingField {
                    field: rest[..end].to_string(),
                    line: err.line(),
                    column: err.column(),
                };
            }
        }
        BiTreeError::Json(err)
    }
}

pub type Result<T> = std::result::Result<T, BiTreeError>;
