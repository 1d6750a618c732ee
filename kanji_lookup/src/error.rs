use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Invalid direction token '{token}' on line {line}: {text}")]
    InvalidDirectionToken {
        line: usize,
        token: char,
        text: String,
    },

    #[error("Malformed filter expression '{expr}' on line {line}: {text}")]
    MalformedFilterExpression {
        line: usize,
        expr: String,
        text: String,
    },

    #[error("Malformed character code '{code}' on line {line}: {text}")]
    MalformedCode {
        line: usize,
        code: String,
        text: String,
    },

    #[error("Invalid pattern set for {stroke_count} strokes, candidate {candidate}: {reason}")]
    InvalidPatternSet {
        stroke_count: usize,
        candidate: usize,
        reason: String,
    },

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot Error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Lookup cancelled")]
    Cancelled,
}

pub type LookupResult<T> = Result<T, LookupError>;
