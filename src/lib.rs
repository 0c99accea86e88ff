//! # emx-transcode
//!
//! Detects the character encoding of a seekable byte stream and exposes a
//! lazy reader producing UTF-8.
//!
//! ```no_run
//! use std::io::Read;
//!
//! let file = std::fs::File::open("legacy.txt")?;
//! let mut text = String::new();
//! emx_transcode::new_transformer(file)?.read_to_string(&mut text)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Pipeline
//!
//! 1. **Sample**: read up to [`SAMPLE_SIZE`] bytes, then seek the source back
//!    to where it started.
//! 2. **Detect**: ask a [`Detect`] implementation for its single best guess.
//! 3. **Resolve**: map the [`EncodingLabel`] onto a [`DecodingStrategy`].
//! 4. **Stream**: wrap the source in a [`Transformer`] that decodes as it is read.
//!
//! ## Resolution Rules
//!
//! - `GB-18030`, `BIG`, `ISO-2022-JP`, `EUC-KR`, `EUC-JP`, `Shift_JIS`,
//!   `ISO-8859-1`, `UTF-16LE/BE`, `UTF-32LE/BE` → decoded
//! - `ISO-2022-CN`, `ISO-2022-KR` → [`Error::UnsupportedEncoding`]
//! - Anything else → passed through untouched, assumed to be UTF-8 already
//!
//! The detector and the decoders are both pluggable, see
//! [`Resolver::with_detector`] and [`Resolver::with_decoders`].

pub mod decoder;
pub mod detector;
pub mod error;
pub mod label;
pub mod reader;
pub mod resolver;

pub use decoder::{
    BuiltinDecoders, Decode, DecodeStep, DecoderFactory, DecodingStrategy, Endian, Status,
};
pub use detector::{
    sample_and_detect, Candidate, ChardetDetector, Detect, MAX_SAMPLE_SIZE, SAMPLE_SIZE,
};
pub use error::{Error, Result};
pub use label::{EncodingLabel, Resolution};
pub use reader::{
    TranscodingReader, Transformer, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE,
};
pub use resolver::{new_transformer, Resolver, ResolverConfig};
