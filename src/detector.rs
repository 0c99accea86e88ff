//! Sampling and encoding detection
//!
//! The sampler takes a bounded prefix of a seekable source, puts the source
//! back where it was, and asks a [`Detect`] implementation for its single
//! best guess. [`ChardetDetector`] is the default detector: BOM and
//! zero-byte sniffing for the UTF-16/UTF-32 family, then `chardetng`.

use std::io::{self, Read, Seek, SeekFrom};

use chardetng::EncodingDetector;
use encoding_rs::Encoding;

use crate::error::{Error, Result};
use crate::label::EncodingLabel;

/// Number of bytes sampled for detection by default
pub const SAMPLE_SIZE: usize = 128;
/// Largest sample the sampler will allocate
pub const MAX_SAMPLE_SIZE: usize = 64 * 1024;

/// Best guess of a detector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub label: EncodingLabel,
    /// 0-100
    pub confidence: u8,
}

impl Candidate {
    pub fn new(label: impl Into<EncodingLabel>, confidence: u8) -> Self {
        Self {
            label: label.into(),
            confidence: confidence.min(100),
        }
    }
}

/// Detection capability: top-ranked candidate for a sample, or `None` if the
/// detector cannot classify it at all
pub trait Detect {
    fn detect_best(&self, sample: &[u8]) -> Option<Candidate>;
}

impl<F> Detect for F
where
    F: Fn(&[u8]) -> Option<Candidate>,
{
    fn detect_best(&self, sample: &[u8]) -> Option<Candidate> {
        self(sample)
    }
}

/// Sample `source`, restore its position and run `detector` on the sample.
///
/// At most `sample_size` bytes are read, with `sample_size` kept within
/// `1..=MAX_SAMPLE_SIZE`. A short source is sampled as-is; an empty one is a
/// read error.
pub fn sample_and_detect<R, D>(source: &mut R, detector: &D, sample_size: usize) -> Result<Candidate>
where
    R: Read + Seek + ?Sized,
    D: Detect + ?Sized,
{
    let start = source.stream_position().map_err(Error::Seek)?;

    let mut sample = vec![0u8; sample_size.clamp(1, MAX_SAMPLE_SIZE)];
    let len = read_sample(source, &mut sample).map_err(Error::Read)?;

    source.seek(SeekFrom::Start(start)).map_err(Error::Seek)?;
    log::debug!("sampled {} bytes, source restored to offset {}", len, start);

    if len == 0 {
        return Err(Error::Read(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "source is empty",
        )));
    }

    let sample = &sample[..len];
    let candidate = detector
        .detect_best(sample)
        .ok_or(Error::Detection { sample_len: len })?;
    log::debug!("detected {} (confidence {})", candidate.label, candidate.confidence);

    Ok(candidate)
}

/// Fill `buf` from `source` until it is full or the source is exhausted
fn read_sample<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// Confidence levels reported by ChardetDetector
const CONFIDENCE_CERTAIN: u8 = 100;
const CONFIDENCE_STATISTICAL: u8 = 50;
// Minimum share (percent) of 2-byte units shaped like UTF-16
const UTF16_THRESHOLD: usize = 60;

const ESCAPE: u8 = 0x1B;
const C1_CONTROLS: std::ops::RangeInclusive<u8> = 0x80..=0x9F;

/// Default detector reporting labels in the resolver's vocabulary
#[derive(Debug, Clone, Copy, Default)]
pub struct ChardetDetector;

impl Detect for ChardetDetector {
    fn detect_best(&self, sample: &[u8]) -> Option<Candidate> {
        if sample.is_empty() {
            return None;
        }

        if let Some(candidate) = sniff_bom(sample) {
            return Some(candidate);
        }

        if let Some(candidate) = sniff_utf32(sample).or_else(|| sniff_utf16(sample)) {
            return Some(candidate);
        }

        // The sample is a prefix: a character cut at its end is not an error
        let sample = trim_partial_utf8(sample);

        // ISO-2022 escapes are 7-bit too; leave those to chardetng
        if sample.is_ascii() && !sample.contains(&ESCAPE) {
            return Some(Candidate::new("UTF-8", CONFIDENCE_CERTAIN));
        }

        let mut detector = EncodingDetector::new();
        detector.feed(sample, true);
        let encoding = detector.guess(None, true);

        Some(Candidate {
            label: label_for(encoding, sample),
            confidence: CONFIDENCE_STATISTICAL,
        })
    }
}

/// Drop a trailing incomplete UTF-8 sequence if everything before it is
/// valid UTF-8
fn trim_partial_utf8(sample: &[u8]) -> &[u8] {
    match std::str::from_utf8(sample) {
        Err(e) if e.error_len().is_none() && e.valid_up_to() > 0 => &sample[..e.valid_up_to()],
        _ => sample,
    }
}

fn sniff_bom(sample: &[u8]) -> Option<Candidate> {
    let label = if sample.starts_with(&[0xEF, 0xBB, 0xBF]) {
        EncodingLabel::Other("UTF-8".to_string())
    } else if sample.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        EncodingLabel::Utf32Le
    } else if sample.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        EncodingLabel::Utf32Be
    } else if sample.starts_with(&[0xFF, 0xFE]) {
        EncodingLabel::Utf16Le
    } else if sample.starts_with(&[0xFE, 0xFF]) {
        EncodingLabel::Utf16Be
    } else {
        return None;
    };
    Some(Candidate { label, confidence: CONFIDENCE_CERTAIN })
}

/// Every complete 4-byte unit has two zero high bytes in one byte order
fn sniff_utf32(sample: &[u8]) -> Option<Candidate> {
    let units: Vec<[u8; 4]> = sample
        .chunks_exact(4)
        .map(|unit| [unit[0], unit[1], unit[2], unit[3]])
        .collect();
    if units.is_empty() || units.iter().all(|unit| *unit == [0; 4]) {
        return None;
    }

    let is_scalar = |value: u32| char::from_u32(value).is_some();
    if units
        .iter()
        .all(|unit| unit[2..] == [0, 0] && is_scalar(u32::from_le_bytes(*unit)))
    {
        return Some(Candidate { label: EncodingLabel::Utf32Le, confidence: CONFIDENCE_CERTAIN });
    }
    if units
        .iter()
        .all(|unit| unit[..2] == [0, 0] && is_scalar(u32::from_be_bytes(*unit)))
    {
        return Some(Candidate { label: EncodingLabel::Utf32Be, confidence: CONFIDENCE_CERTAIN });
    }
    None
}

/// Most 2-byte units carry a zero on the same side, and none on the other
fn sniff_utf16(sample: &[u8]) -> Option<Candidate> {
    let pairs = sample.len() / 2;
    if pairs == 0 {
        return None;
    }

    let mut little = 0;
    let mut big = 0;
    for pair in sample.chunks_exact(2) {
        match (pair[0], pair[1]) {
            (0, 0) => {}
            (_, 0) => little += 1,
            (0, _) => big += 1,
            _ => {}
        }
    }

    let (label, hits) = match (little, big) {
        (hits, 0) if hits > 0 => (EncodingLabel::Utf16Le, hits),
        (0, hits) if hits > 0 => (EncodingLabel::Utf16Be, hits),
        _ => return None,
    };

    let share = hits * 100 / pairs;
    if share < UTF16_THRESHOLD {
        return None;
    }
    Some(Candidate { label, confidence: share as u8 })
}

/// Translate a `chardetng` guess into the detector vocabulary
fn label_for(encoding: &'static Encoding, sample: &[u8]) -> EncodingLabel {
    if encoding == encoding_rs::GB18030 || encoding == encoding_rs::GBK {
        EncodingLabel::Gb18030
    } else if encoding == encoding_rs::WINDOWS_1252 {
        // Without C1 bytes the text is plain ISO-8859-1
        if sample.iter().any(|b| C1_CONTROLS.contains(b)) {
            EncodingLabel::Other(encoding.name().to_string())
        } else {
            EncodingLabel::Iso8859_1
        }
    } else if encoding == encoding_rs::ISO_2022_JP {
        EncodingLabel::Iso2022Jp
    } else if encoding == encoding_rs::EUC_JP {
        EncodingLabel::EucJp
    } else if encoding == encoding_rs::SHIFT_JIS {
        EncodingLabel::ShiftJis
    } else if encoding == encoding_rs::EUC_KR {
        EncodingLabel::EucKr
    } else {
        EncodingLabel::Other(encoding.name().to_string())
    }
}
