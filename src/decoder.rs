//! Decoding strategies
//!
//! A [`DecodingStrategy`] names a decoder family; a [`DecoderFactory`] turns it
//! into a fresh stateful [`Decode`] instance for one stream. The built-in
//! factory is backed by `encoding_rs`, except for true ISO-8859-1 and UTF-32,
//! which `encoding_rs` does not provide as decoders.

use encoding_rs::CoderResult;

/// Byte order of a wide Unicode encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

/// Decoder family selected for a detected label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodingStrategy {
    Gb18030,
    Gbk,
    Iso2022Jp,
    EucKr,
    EucJp,
    ShiftJis,
    /// ISO-8859-1 proper: every byte is the code point of the same value
    Latin1,
    /// UTF-16 with a fixed byte order
    Utf16(Endian),
    /// UTF-32 with a fixed byte order
    Utf32(Endian),
}

impl DecodingStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gb18030 => "GB18030",
            Self::Gbk => "GBK",
            Self::Iso2022Jp => "ISO-2022-JP",
            Self::EucKr => "EUC-KR",
            Self::EucJp => "EUC-JP",
            Self::ShiftJis => "Shift_JIS",
            Self::Latin1 => "ISO-8859-1",
            Self::Utf16(Endian::Little) => "UTF-16LE",
            Self::Utf16(Endian::Big) => "UTF-16BE",
            Self::Utf32(Endian::Little) => "UTF-32LE",
            Self::Utf32(Endian::Big) => "UTF-32BE",
        }
    }
}

/// Why a decode call returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// All of `src` was consumed; feed more input
    InputEmpty,
    /// `dst` has no room for the next character; drain it and call again
    OutputFull,
}

/// Outcome of a single [`Decode::decode`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStep {
    pub read: usize,
    pub written: usize,
    pub status: Status,
}

/// Incremental decoder producing UTF-8.
///
/// Malformed input is replaced with U+FFFD rather than reported. When `last`
/// is set and the call returns [`Status::InputEmpty`], the decoder has
/// flushed everything it was holding.
pub trait Decode {
    fn decode(&mut self, src: &[u8], dst: &mut [u8], last: bool) -> DecodeStep;
}

/// Creates decoders for a strategy
pub trait DecoderFactory {
    fn new_decoder(&self, strategy: DecodingStrategy) -> Box<dyn Decode>;
}

/// Decoders shipped with the crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDecoders;

impl DecoderFactory for BuiltinDecoders {
    fn new_decoder(&self, strategy: DecodingStrategy) -> Box<dyn Decode> {
        let decoder = match strategy {
            DecodingStrategy::Latin1 => return Box::new(Latin1Decoder),
            DecodingStrategy::Utf32(endian) => return Box::new(Utf32Decoder::new(endian)),
            // Byte order stays fixed; only a BOM of that order is dropped
            DecodingStrategy::Utf16(Endian::Little) => encoding_rs::UTF_16LE.new_decoder_with_bom_removal(),
            DecodingStrategy::Utf16(Endian::Big) => encoding_rs::UTF_16BE.new_decoder_with_bom_removal(),
            DecodingStrategy::Gb18030 => encoding_rs::GB18030.new_decoder_without_bom_handling(),
            DecodingStrategy::Gbk => encoding_rs::GBK.new_decoder_without_bom_handling(),
            DecodingStrategy::Iso2022Jp => encoding_rs::ISO_2022_JP.new_decoder_without_bom_handling(),
            DecodingStrategy::EucKr => encoding_rs::EUC_KR.new_decoder_without_bom_handling(),
            DecodingStrategy::EucJp => encoding_rs::EUC_JP.new_decoder_without_bom_handling(),
            DecodingStrategy::ShiftJis => encoding_rs::SHIFT_JIS.new_decoder_without_bom_handling(),
        };
        Box::new(EncodingRsDecoder(decoder))
    }
}

/// Adapter over an `encoding_rs` decoder
struct EncodingRsDecoder(encoding_rs::Decoder);

impl Decode for EncodingRsDecoder {
    fn decode(&mut self, src: &[u8], dst: &mut [u8], last: bool) -> DecodeStep {
        let (result, read, written, _) = self.0.decode_to_utf8(src, dst, last);
        let status = match result {
            CoderResult::InputEmpty => Status::InputEmpty,
            CoderResult::OutputFull => Status::OutputFull,
        };
        DecodeStep { read, written, status }
    }
}

/// ISO-8859-1 decoder (stateless)
struct Latin1Decoder;

impl Decode for Latin1Decoder {
    fn decode(&mut self, src: &[u8], dst: &mut [u8], _last: bool) -> DecodeStep {
        let (read, written) = encoding_rs::mem::convert_latin1_to_utf8_partial(src, dst);
        let status = if read == src.len() { Status::InputEmpty } else { Status::OutputFull };
        DecodeStep { read, written, status }
    }
}

const BYTE_ORDER_MARK: u32 = 0xFEFF;
const UTF32_UNIT: usize = 4;

/// UTF-32 decoder with a fixed byte order
struct Utf32Decoder {
    endian: Endian,
    pending: [u8; UTF32_UNIT],
    pending_len: usize,
    started: bool,
}

impl Utf32Decoder {
    fn new(endian: Endian) -> Self {
        Self {
            endian,
            pending: [0; UTF32_UNIT],
            pending_len: 0,
            started: false,
        }
    }

    fn unit(&self) -> u32 {
        match self.endian {
            Endian::Little => u32::from_le_bytes(self.pending),
            Endian::Big => u32::from_be_bytes(self.pending),
        }
    }
}

impl Decode for Utf32Decoder {
    fn decode(&mut self, src: &[u8], dst: &mut [u8], last: bool) -> DecodeStep {
        let mut read = 0;
        let mut written = 0;

        loop {
            while self.pending_len < UTF32_UNIT && read < src.len() {
                self.pending[self.pending_len] = src[read];
                self.pending_len += 1;
                read += 1;
            }

            if self.pending_len < UTF32_UNIT {
                // Truncated trailing unit
                if last && self.pending_len > 0 {
                    let len = char::REPLACEMENT_CHARACTER.len_utf8();
                    if dst.len() - written < len {
                        return DecodeStep { read, written, status: Status::OutputFull };
                    }
                    char::REPLACEMENT_CHARACTER.encode_utf8(&mut dst[written..]);
                    written += len;
                    self.pending_len = 0;
                }
                return DecodeStep { read, written, status: Status::InputEmpty };
            }

            let unit = self.unit();
            if !self.started {
                self.started = true;
                if unit == BYTE_ORDER_MARK {
                    self.pending_len = 0;
                    continue;
                }
            }

            let ch = char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER);
            let len = ch.len_utf8();
            if dst.len() - written < len {
                return DecodeStep { read, written, status: Status::OutputFull };
            }
            ch.encode_utf8(&mut dst[written..]);
            written += len;
            self.pending_len = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run a fresh decoder over `input`, feeding `chunk` bytes at a time
    /// into an output window of `window` bytes
    fn decode_with(strategy: DecodingStrategy, input: &[u8], chunk: usize, window: usize) -> String {
        let mut decoder = BuiltinDecoders.new_decoder(strategy);
        let mut out = Vec::new();
        let mut dst = vec![0u8; window];
        let chunks: Vec<&[u8]> = input.chunks(chunk).collect();

        for (i, piece) in chunks.iter().enumerate() {
            let last = i + 1 == chunks.len();
            let mut offset = 0;
            loop {
                let step = decoder.decode(&piece[offset..], &mut dst, last);
                offset += step.read;
                out.extend_from_slice(&dst[..step.written]);
                if step.status == Status::InputEmpty {
                    break;
                }
            }
        }
        if chunks.is_empty() {
            let step = decoder.decode(&[], &mut dst, true);
            out.extend_from_slice(&dst[..step.written]);
        }

        String::from_utf8(out).unwrap()
    }

    fn decode_all(strategy: DecodingStrategy, input: &[u8]) -> String {
        decode_with(strategy, input, input.len().max(1), 1024)
    }

    #[test]
    fn test_decode_shift_jis() {
        let data = [0x93, 0xFA, 0x96, 0x7B, 0x8C, 0xEA];
        assert_eq!(decode_all(DecodingStrategy::ShiftJis, &data), "日本語");
    }

    #[test]
    fn test_decode_euc_jp() {
        let data = [0xC6, 0xFC, 0xCB, 0xDC, 0xB8, 0xEC];
        assert_eq!(decode_all(DecodingStrategy::EucJp, &data), "日本語");
    }

    #[test]
    fn test_decode_iso_2022_jp() {
        let data = [
            0x1B, 0x24, 0x42, 0x46, 0x7C, 0x4B, 0x5C, 0x38, 0x6C, 0x1B, 0x28, 0x42,
        ];
        assert_eq!(decode_all(DecodingStrategy::Iso2022Jp, &data), "日本語");
    }

    #[test]
    fn test_decode_euc_kr() {
        let data = [0xC7, 0xD1, 0xB1, 0xB9, 0xBE, 0xEE];
        assert_eq!(decode_all(DecodingStrategy::EucKr, &data), "한국어");
    }

    #[test]
    fn test_decode_gb18030_and_gbk() {
        let data = [0xD6, 0xD0, 0xCE, 0xC4];
        assert_eq!(decode_all(DecodingStrategy::Gb18030, &data), "中文");
        assert_eq!(decode_all(DecodingStrategy::Gbk, &data), "中文");
    }

    #[test]
    fn test_decode_latin1_is_not_windows_1252() {
        let data = [b'c', b'a', b'f', 0xE9, 0x80];
        assert_eq!(decode_all(DecodingStrategy::Latin1, &data), "caf\u{e9}\u{80}");
    }

    #[test]
    fn test_decode_utf16_strips_matching_bom() {
        let data = [0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
        assert_eq!(decode_all(DecodingStrategy::Utf16(Endian::Little), &data), "hi");

        let data = [0xFE, 0xFF, 0x00, b'h', 0x00, b'i'];
        assert_eq!(decode_all(DecodingStrategy::Utf16(Endian::Big), &data), "hi");
    }

    #[test]
    fn test_decode_utf16_ignores_bom_for_byte_order() {
        // A big-endian BOM does not flip a little-endian decoder
        let data = [0xFE, 0xFF, b'h', 0x00];
        assert_eq!(decode_all(DecodingStrategy::Utf16(Endian::Little), &data), "\u{fffe}h");
    }

    #[test]
    fn test_decode_utf32_le_and_be() {
        let le = [0x41, 0x00, 0x00, 0x00, 0x00, 0xF6, 0x01, 0x00];
        assert_eq!(decode_all(DecodingStrategy::Utf32(Endian::Little), &le), "A😀");

        let be = [0x00, 0x00, 0x00, 0x41, 0x00, 0x01, 0xF6, 0x00];
        assert_eq!(decode_all(DecodingStrategy::Utf32(Endian::Big), &be), "A😀");
    }

    #[test]
    fn test_decode_utf32_strips_leading_bom_only() {
        let data = [
            0xFF, 0xFE, 0x00, 0x00, 0x41, 0x00, 0x00, 0x00, 0xFF, 0xFE, 0x00, 0x00,
        ];
        assert_eq!(decode_all(DecodingStrategy::Utf32(Endian::Little), &data), "A\u{feff}");
    }

    #[test]
    fn test_decode_utf32_invalid_scalars() {
        // Surrogate and out-of-range values
        let data = [0x00, 0xD8, 0x00, 0x00, 0x00, 0x00, 0x11, 0x00];
        assert_eq!(decode_all(DecodingStrategy::Utf32(Endian::Little), &data), "\u{fffd}\u{fffd}");
    }

    #[test]
    fn test_decode_utf32_truncated_tail() {
        let data = [0x41, 0x00, 0x00, 0x00, 0x42, 0x00];
        assert_eq!(decode_all(DecodingStrategy::Utf32(Endian::Little), &data), "A\u{fffd}");
    }

    #[test]
    fn test_decode_split_input_and_small_window() {
        let sjis = [0x93, 0xFA, 0x96, 0x7B, 0x8C, 0xEA];
        assert_eq!(decode_with(DecodingStrategy::ShiftJis, &sjis, 1, 4), "日本語");

        let utf32 = [0x41, 0x00, 0x00, 0x00, 0x00, 0xF6, 0x01, 0x00];
        assert_eq!(decode_with(DecodingStrategy::Utf32(Endian::Little), &utf32, 3, 4), "A😀");

        let latin1 = [0xE9, 0xE8, 0xEA];
        assert_eq!(decode_with(DecodingStrategy::Latin1, &latin1, 2, 2), "\u{e9}\u{e8}\u{ea}");
    }

    #[test]
    fn test_decode_empty_input() {
        assert_eq!(decode_all(DecodingStrategy::Utf32(Endian::Big), &[]), "");
        assert_eq!(decode_all(DecodingStrategy::EucKr, &[]), "");
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(DecodingStrategy::Utf16(Endian::Big).name(), "UTF-16BE");
        assert_eq!(DecodingStrategy::Latin1.name(), "ISO-8859-1");
        assert_eq!(DecodingStrategy::Gbk.name(), "GBK");
    }
}
