use copydesk_parser::ParseError;
use thiserror::Error;

pub type PatchResult<T> = Result<T, PatchError>;

#[derive(Error, Debug)]
pub enum PatchError {
    /// Zero candidate nodes matched; the locator never creates a node
    #[error("Target not found: {0}")]
    TargetNotFound(String),

    /// More than one candidate matched; the locator never guesses
    #[error("Ambiguous target: {count} nodes match ({detail})")]
    AmbiguousTarget { count: usize, detail: String },

    /// Inline markup is only valid when replacing JSX text
    #[error("Replacement contains markup, which is not allowed for this target")]
    MarkupNotAllowed,

    /// The spliced source no longer parses; the original is kept
    #[error("Replacement would corrupt the source: {0}")]
    InvalidReplacement(ParseError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
