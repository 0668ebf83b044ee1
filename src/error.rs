use crate::proto::ProtoError;
use crate::store::StoreError;

/// Failure of a complete download run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Proto(#[from] ProtoError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}
