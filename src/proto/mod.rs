pub mod codec;
pub mod command;
pub mod response;

#[cfg(test)]
pub(crate) mod fake;

use self::response::Response;

pub type Result<T> = std::result::Result<T, ProtoError>;

#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Protocol error: {0}")]
    Protocol(&'static str),
    #[error("Connection to device closed")]
    Abort,
    #[error("Unexpected response: {0:?}")]
    Unexpected(Response),
}

impl From<Response> for ProtoError {
    fn from(value: Response) -> Self {
        Self::Unexpected(value)
    }
}
