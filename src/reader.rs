//! Lazy transcoding readers

use std::io::{self, Read};

use crate::decoder::{Decode, DecodingStrategy, Status};
use crate::label::EncodingLabel;

/// Default size of the raw and decoded buffers
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;
/// Smallest buffer size; leaves room for several UTF-8 sequences so a
/// decoder can always make progress
pub const MIN_BUFFER_SIZE: usize = 64;
/// Largest buffer size
pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Pull-based reader that decodes `source` into UTF-8 as it is read.
///
/// Only one raw and one decoded buffer are held; the source is never read
/// ahead of what the caller asks for by more than one buffer.
pub struct TranscodingReader<R> {
    source: R,
    decoder: Box<dyn Decode>,
    strategy: DecodingStrategy,
    input: Box<[u8]>,
    in_start: usize,
    in_end: usize,
    output: Box<[u8]>,
    out_start: usize,
    out_end: usize,
    eof: bool,
    done: bool,
}

impl<R: Read> TranscodingReader<R> {
    pub fn new(source: R, strategy: DecodingStrategy, decoder: Box<dyn Decode>) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, source, strategy, decoder)
    }

    pub fn with_capacity(
        capacity: usize,
        source: R,
        strategy: DecodingStrategy,
        decoder: Box<dyn Decode>,
    ) -> Self {
        let capacity = capacity.clamp(MIN_BUFFER_SIZE, MAX_BUFFER_SIZE);
        Self {
            source,
            decoder,
            strategy,
            input: vec![0; capacity].into_boxed_slice(),
            in_start: 0,
            in_end: 0,
            output: vec![0; capacity].into_boxed_slice(),
            out_start: 0,
            out_end: 0,
            eof: false,
            done: false,
        }
    }

    pub fn strategy(&self) -> DecodingStrategy {
        self.strategy
    }

    /// Give back the source; buffered but unread data is lost
    pub fn into_inner(self) -> R {
        self.source
    }

    fn fill_input(&mut self) -> io::Result<()> {
        loop {
            match self.source.read(&mut self.input) {
                Ok(0) => {
                    self.eof = true;
                    self.in_start = 0;
                    self.in_end = 0;
                    return Ok(());
                }
                Ok(n) => {
                    self.in_start = 0;
                    self.in_end = n;
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> Read for TranscodingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if self.out_start < self.out_end {
                let n = buf.len().min(self.out_end - self.out_start);
                buf[..n].copy_from_slice(&self.output[self.out_start..self.out_start + n]);
                self.out_start += n;
                return Ok(n);
            }
            if self.done {
                return Ok(0);
            }

            if self.in_start == self.in_end && !self.eof {
                self.fill_input()?;
            }

            let last = self.eof;
            let step = self.decoder.decode(
                &self.input[self.in_start..self.in_end],
                &mut self.output,
                last,
            );
            self.in_start += step.read;
            self.out_start = 0;
            self.out_end = step.written;

            if last && step.status == Status::InputEmpty {
                self.done = true;
            }
        }
    }
}

enum Inner<R> {
    Decoding(TranscodingReader<R>),
    PassThrough(R),
}

/// Stream returned by the resolver: decoded UTF-8, or the untouched source
/// when the detected label has no decoder and is assumed to be UTF-8 already
pub struct Transformer<R> {
    label: EncodingLabel,
    inner: Inner<R>,
}

impl<R: Read> Transformer<R> {
    pub(crate) fn decoding(label: EncodingLabel, reader: TranscodingReader<R>) -> Self {
        Self { label, inner: Inner::Decoding(reader) }
    }

    pub(crate) fn pass_through(label: EncodingLabel, source: R) -> Self {
        Self { label, inner: Inner::PassThrough(source) }
    }

    /// Label the stream was resolved from
    pub fn label(&self) -> &EncodingLabel {
        &self.label
    }

    /// Decoder family in use, `None` for pass-through
    pub fn strategy(&self) -> Option<DecodingStrategy> {
        match &self.inner {
            Inner::Decoding(reader) => Some(reader.strategy()),
            Inner::PassThrough(_) => None,
        }
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self.inner, Inner::PassThrough(_))
    }

    pub fn into_inner(self) -> R {
        match self.inner {
            Inner::Decoding(reader) => reader.into_inner(),
            Inner::PassThrough(source) => source,
        }
    }
}

impl<R: Read> Read for Transformer<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            Inner::Decoding(reader) => reader.read(buf),
            Inner::PassThrough(source) => source.read(buf),
        }
    }
}

impl<R> std::fmt::Debug for Transformer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match &self.inner {
            Inner::Decoding(reader) => reader.strategy.name(),
            Inner::PassThrough(_) => "pass-through",
        };
        f.debug_struct("Transformer")
            .field("label", &self.label)
            .field("mode", &mode)
            .finish()
    }
}
