use std::io;

use thiserror::Error;

use crate::label::EncodingLabel;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The detection sample could not be read
    #[error("Failed to read detection sample: {0}")]
    Read(#[source] io::Error),
    /// The source position could not be captured or restored; the source
    /// must not be reused
    #[error("Failed to reposition source after sampling: {0}")]
    Seek(#[source] io::Error),
    #[error("No encoding candidate for a {sample_len} byte sample")]
    Detection { sample_len: usize },
    /// Detected, but no decoder is wired for it
    #[error("{0} not supported")]
    UnsupportedEncoding(EncodingLabel),
}
