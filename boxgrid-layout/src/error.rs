use crate::node::NodeId;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("fixed sizes of {node:?} need {required} cells but only {available} are available")]
    SizeOverflow {
        node: NodeId,
        required: i64,
        available: i64,
    },

    #[error("invalid flex weight {weight} on {node:?}: weights must be positive")]
    InvalidSizeSpec { node: NodeId, weight: f64 },

    #[error("unknown node type: {0:?}")]
    UnknownNodeKind(String),

    #[error("layout geometry is stale: compute the layout for the current viewport first")]
    StaleGeometry,

    #[error("invalid alignment specifier: {0:?}")]
    InvalidAlignment(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("layout document error: {0}")]
    Document(#[from] serde_json::Error),

    #[error("surface error: {0}")]
    Surface(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
