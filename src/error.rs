use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The stream behind a serialization callback failed.
    #[error("Serialization stream failed: {0}")]
    Io(#[from] io::Error),

    /// The engine could not rebuild a collision from the stream.
    #[error("The engine returned no collision from the serialized stream")]
    Deserialize,

    /// A mesh operation was cancelled by its progress callback, or produced no mesh.
    #[error("Mesh operation `{0}` was cancelled or produced no mesh")]
    Mesh(&'static str),
}
