use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("No renderer registered for block type: {0}")]
    UnknownBlock(String),

    #[error("Block '{block_type}' is missing required prop: {prop}")]
    MissingProp { block_type: String, prop: String },

    #[error("Invalid block descriptor: {0}")]
    InvalidDescriptor(String),
}
