//! Label resolution and stream construction

use std::io::{Read, Seek};

use crate::decoder::{BuiltinDecoders, DecoderFactory};
use crate::detector::{sample_and_detect, Candidate, ChardetDetector, Detect, MAX_SAMPLE_SIZE, SAMPLE_SIZE};
use crate::error::{Error, Result};
use crate::label::{EncodingLabel, Resolution};
use crate::reader::{TranscodingReader, Transformer, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE};

/// Configuration for sampling and transcoding
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Bytes read from the source for detection
    pub sample_size: usize,
    /// Size of the raw and decoded buffers of a transcoding stream
    pub buffer_size: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            sample_size: SAMPLE_SIZE,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Detects the encoding of a source and wraps it in a UTF-8 stream
pub struct Resolver<D = ChardetDetector, F = BuiltinDecoders> {
    detector: D,
    decoders: F,
    config: ResolverConfig,
}

impl Resolver {
    /// Resolver with the default detector and decoders
    pub fn new() -> Self {
        Self::with_config(ResolverConfig::default())
    }

    /// Out-of-range sizes are clamped, as with the `with_*` methods
    pub fn with_config(config: ResolverConfig) -> Self {
        Self {
            detector: ChardetDetector,
            decoders: BuiltinDecoders,
            config: ResolverConfig::default(),
        }
        .with_sample_size(config.sample_size)
        .with_buffer_size(config.buffer_size)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Detect, F: DecoderFactory> Resolver<D, F> {
    /// Swap in another detector
    pub fn with_detector<D2: Detect>(self, detector: D2) -> Resolver<D2, F> {
        Resolver {
            detector,
            decoders: self.decoders,
            config: self.config,
        }
    }

    /// Swap in another decoder factory
    pub fn with_decoders<F2: DecoderFactory>(self, decoders: F2) -> Resolver<D, F2> {
        Resolver {
            detector: self.detector,
            decoders,
            config: self.config,
        }
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.config.sample_size = sample_size.clamp(1, MAX_SAMPLE_SIZE);
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.config.buffer_size = buffer_size.clamp(MIN_BUFFER_SIZE, MAX_BUFFER_SIZE);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Best guess for `source`; its position is left where it was
    pub fn detect<R: Read + Seek + ?Sized>(&self, source: &mut R) -> Result<Candidate> {
        sample_and_detect(source, &self.detector, self.config.sample_size)
    }

    /// Detect the encoding of `source` and wrap it in a UTF-8 stream
    pub fn resolve<R: Read + Seek>(&self, mut source: R) -> Result<Transformer<R>> {
        let candidate = self.detect(&mut source)?;
        self.transform(source, candidate.label)
    }

    /// Wrap `source` for an already known label
    pub fn transform<R: Read>(&self, source: R, label: EncodingLabel) -> Result<Transformer<R>> {
        match label.resolution() {
            Resolution::Decode(strategy) => {
                log::debug!("decoding {} with {}", label, strategy.name());
                let reader = TranscodingReader::with_capacity(
                    self.config.buffer_size,
                    source,
                    strategy,
                    self.decoders.new_decoder(strategy),
                );
                Ok(Transformer::decoding(label, reader))
            }
            Resolution::Unsupported => Err(Error::UnsupportedEncoding(label)),
            Resolution::PassThrough => {
                if label.is_utf8_compatible() {
                    log::debug!("{} passed through unchanged", label);
                } else {
                    log::warn!("no decoder for {}, passing bytes through unchanged", label);
                }
                Ok(Transformer::pass_through(label, source))
            }
        }
    }
}

/// Detect the encoding of `source` with the defaults and return a reader
/// producing UTF-8
pub fn new_transformer<R: Read + Seek>(source: R) -> Result<Transformer<R>> {
    Resolver::new().resolve(source)
}
