//! Encoding labels and the label → strategy table

use std::fmt;

use crate::decoder::{DecodingStrategy, Endian};

// Detector vocabulary
pub const GB_18030: &str = "GB-18030";
pub const BIG: &str = "BIG";
pub const ISO_2022_CN: &str = "ISO-2022-CN";
pub const ISO_2022_JP: &str = "ISO-2022-JP";
pub const ISO_2022_KR: &str = "ISO-2022-KR";
pub const EUC_KR: &str = "EUC-KR";
pub const EUC_JP: &str = "EUC-JP";
pub const SHIFT_JIS: &str = "Shift_JIS";
pub const ISO_8859_1: &str = "ISO-8859-1";
pub const UTF_16LE: &str = "UTF-16LE";
pub const UTF_16BE: &str = "UTF-16BE";
pub const UTF_32LE: &str = "UTF-32LE";
pub const UTF_32BE: &str = "UTF-32BE";

/// Encoding family reported by a detector.
///
/// Labels are matched exactly as the detector spells them; anything outside
/// the known set is kept verbatim in [`EncodingLabel::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EncodingLabel {
    Gb18030,
    Big,
    Iso2022Cn,
    Iso2022Jp,
    Iso2022Kr,
    EucKr,
    EucJp,
    ShiftJis,
    Iso8859_1,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
    /// Unrecognized label, resolved by pass-through
    Other(String),
}

/// What the resolver does with a label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Wrap the source in a decoder of this family
    Decode(DecodingStrategy),
    /// Known encoding with no decoder wired
    Unsupported,
    /// Hand the source back untouched
    PassThrough,
}

impl EncodingLabel {
    /// Parse a detector label (case-sensitive)
    pub fn parse(label: &str) -> Self {
        match label {
            GB_18030 => Self::Gb18030,
            BIG => Self::Big,
            ISO_2022_CN => Self::Iso2022Cn,
            ISO_2022_JP => Self::Iso2022Jp,
            ISO_2022_KR => Self::Iso2022Kr,
            EUC_KR => Self::EucKr,
            EUC_JP => Self::EucJp,
            SHIFT_JIS => Self::ShiftJis,
            ISO_8859_1 => Self::Iso8859_1,
            UTF_16LE => Self::Utf16Le,
            UTF_16BE => Self::Utf16Be,
            UTF_32LE => Self::Utf32Le,
            UTF_32BE => Self::Utf32Be,
            other => Self::Other(other.to_string()),
        }
    }

    /// The label as the detector spells it
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gb18030 => GB_18030,
            Self::Big => BIG,
            Self::Iso2022Cn => ISO_2022_CN,
            Self::Iso2022Jp => ISO_2022_JP,
            Self::Iso2022Kr => ISO_2022_KR,
            Self::EucKr => EUC_KR,
            Self::EucJp => EUC_JP,
            Self::ShiftJis => SHIFT_JIS,
            Self::Iso8859_1 => ISO_8859_1,
            Self::Utf16Le => UTF_16LE,
            Self::Utf16Be => UTF_16BE,
            Self::Utf32Le => UTF_32LE,
            Self::Utf32Be => UTF_32BE,
            Self::Other(name) => name,
        }
    }

    /// Map the label onto a decoding strategy.
    ///
    /// GB-18030 and BIG share the simplified Chinese decoder family.
    /// ISO-2022-CN and ISO-2022-KR are recognized but have no decoder.
    pub fn resolution(&self) -> Resolution {
        match self {
            Self::Gb18030 => Resolution::Decode(DecodingStrategy::Gb18030),
            Self::Big => Resolution::Decode(DecodingStrategy::Gbk),
            Self::Iso2022Cn => Resolution::Unsupported,
            Self::Iso2022Jp => Resolution::Decode(DecodingStrategy::Iso2022Jp),
            Self::Iso2022Kr => Resolution::Unsupported,
            Self::EucKr => Resolution::Decode(DecodingStrategy::EucKr),
            Self::EucJp => Resolution::Decode(DecodingStrategy::EucJp),
            Self::ShiftJis => Resolution::Decode(DecodingStrategy::ShiftJis),
            Self::Iso8859_1 => Resolution::Decode(DecodingStrategy::Latin1),
            Self::Utf16Le => Resolution::Decode(DecodingStrategy::Utf16(Endian::Little)),
            Self::Utf16Be => Resolution::Decode(DecodingStrategy::Utf16(Endian::Big)),
            Self::Utf32Le => Resolution::Decode(DecodingStrategy::Utf32(Endian::Little)),
            Self::Utf32Be => Resolution::Decode(DecodingStrategy::Utf32(Endian::Big)),
            Self::Other(_) => Resolution::PassThrough,
        }
    }

    /// Whether a pass-through of this label is expected to already be UTF-8
    pub(crate) fn is_utf8_compatible(&self) -> bool {
        match self {
            Self::Other(name) => {
                name.eq_ignore_ascii_case("UTF-8") || name.eq_ignore_ascii_case("US-ASCII")
            }
            _ => false,
        }
    }
}

impl fmt::Display for EncodingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EncodingLabel {
    fn from(label: &str) -> Self {
        Self::parse(label)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Decode(strategy) => f.write_str(strategy.name()),
            Resolution::Unsupported => f.write_str("unsupported"),
            Resolution::PassThrough => f.write_str("pass-through"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [&str; 13] = [
        GB_18030, BIG, ISO_2022_CN, ISO_2022_JP, ISO_2022_KR, EUC_KR, EUC_JP,
        SHIFT_JIS, ISO_8859_1, UTF_16LE, UTF_16BE, UTF_32LE, UTF_32BE,
    ];

    #[test]
    fn test_parse_known_labels() {
        for name in KNOWN {
            let label = EncodingLabel::parse(name);
            assert!(!matches!(label, EncodingLabel::Other(_)), "{} parsed as Other", name);
            assert_eq!(label.as_str(), name);
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(EncodingLabel::parse("shift_jis"), EncodingLabel::Other("shift_jis".to_string()));
        assert_eq!(EncodingLabel::parse("Big5"), EncodingLabel::Other("Big5".to_string()));
    }

    #[test]
    fn test_unsupported_labels() {
        assert_eq!(EncodingLabel::Iso2022Cn.resolution(), Resolution::Unsupported);
        assert_eq!(EncodingLabel::Iso2022Kr.resolution(), Resolution::Unsupported);
    }

    #[test]
    fn test_unknown_label_passes_through() {
        assert_eq!(EncodingLabel::parse("UTF-8").resolution(), Resolution::PassThrough);
        assert_eq!(EncodingLabel::parse("").resolution(), Resolution::PassThrough);
        assert_eq!(EncodingLabel::parse("KOI8-R").resolution(), Resolution::PassThrough);
    }

    #[test]
    fn test_chinese_labels_share_decoder_family() {
        assert_eq!(EncodingLabel::Gb18030.resolution(), Resolution::Decode(DecodingStrategy::Gb18030));
        assert_eq!(EncodingLabel::Big.resolution(), Resolution::Decode(DecodingStrategy::Gbk));
    }

    #[test]
    fn test_every_known_label_resolves() {
        let decodable = KNOWN
            .iter()
            .filter(|name| matches!(EncodingLabel::parse(name).resolution(), Resolution::Decode(_)))
            .count();
        assert_eq!(decodable, 11);
    }

    #[test]
    fn test_utf8_compatible() {
        assert!(EncodingLabel::parse("UTF-8").is_utf8_compatible());
        assert!(!EncodingLabel::parse("windows-1251").is_utf8_compatible());
        assert!(!EncodingLabel::Iso8859_1.is_utf8_compatible());
    }

    #[test]
    fn test_resolution_display() {
        assert_eq!(EncodingLabel::ShiftJis.resolution().to_string(), "Shift_JIS");
        assert_eq!(EncodingLabel::Iso2022Kr.resolution().to_string(), "unsupported");
        assert_eq!(EncodingLabel::parse("UTF-8").resolution().to_string(), "pass-through");
    }
}
