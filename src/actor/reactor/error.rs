use thiserror::Error;

use crate::model::bubble::BubbleId;

#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("No bubble with id {0:?}")]
    UnknownBubble(BubbleId),
    #[error("Recording I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed recording entry: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Recording does not start with a header line")]
    MissingHeader,
}
