//! Image record decoder.
//!
//! Decodes one serialized camera image message into a typed frame. The wire
//! layout is the camera driver's 2-D image message: length-prefixed strings,
//! little-endian integers, no padding:
//!
//! ```text
//! seq:u32  stamp_sec:u32  stamp_nsec:u32
//! frame_id_len:u32  frame_id[frame_id_len]
//! height:u32  width:u32
//! encoding_len:u32  encoding[encoding_len]   (UTF-8, trailing NULs trimmed)
//! is_bigendian:u8  step:u32
//! data_len:u32  data[data_len]
//! ```
//!
//! This is deliberately NOT a schema-driven deserializer; exactly this one
//! record shape is supported. Returned pixel buffers are canonical: RGB
//! channel order for color frames, a single 8-bit plane for mono frames.
//! 16-bit mono samples are reduced with an exact truncating `value >> 8`;
//! downstream output parity depends on that bit shift, so it must never be
//! replaced with a rounded division.

use thiserror::Error;

/// Decode failure for a single record. Local to that record; the pipeline
/// counts it and moves on.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("record truncated: needed {needed} more bytes, {remaining} remaining")]
    TruncatedRecord { needed: usize, remaining: usize },

    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    #[error("unsupported image encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("payload size mismatch: declared {declared} bytes, expected {expected}")]
    SizeMismatch { declared: u64, expected: u64 },

    #[error("row stride {step} disagrees with expected {expected}")]
    InvalidStride { step: u32, expected: u32 },
}

/// Pixel encoding declared by a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageEncoding {
    Bgr8,
    Rgb8,
    Mono8,
    Mono16,
    Unsupported(String),
}

impl ImageEncoding {
    pub fn parse(name: &str) -> Self {
        match name {
            "bgr8" => ImageEncoding::Bgr8,
            "rgb8" => ImageEncoding::Rgb8,
            "mono8" | "gray8" => ImageEncoding::Mono8,
            "mono16" => ImageEncoding::Mono16,
            other => ImageEncoding::Unsupported(other.to_string()),
        }
    }

    /// `(channels, bytes per source sample)`, or `None` if unsupported.
    pub fn layout(&self) -> Option<(u32, u32)> {
        match self {
            ImageEncoding::Bgr8 | ImageEncoding::Rgb8 => Some((3, 1)),
            ImageEncoding::Mono8 => Some((1, 1)),
            ImageEncoding::Mono16 => Some((1, 2)),
            ImageEncoding::Unsupported(_) => None,
        }
    }
}

/// A decoded camera frame with a canonical 8-bit pixel buffer.
///
/// Invariant: `pixels.len() == width * height * channels`. Color frames are
/// RGB order regardless of the source encoding (the decoder owns the
/// BGR → RGB reorder); `encoding` records what the source declared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedFrame {
    pub width: u32,
    pub height: u32,
    /// 1 for mono, 3 for color.
    pub channels: u8,
    pub encoding: ImageEncoding,
    pub pixels: Vec<u8>,
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.buf.len() - self.pos;
        if remaining < len {
            return Err(DecodeError::TruncatedRecord {
                needed: len,
                remaining,
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

/// Decode one image record.
///
/// Never panics on malformed input; every structural problem maps to a
/// [`DecodeError`].
pub fn decode_image_record(bytes: &[u8]) -> Result<DecodedFrame, DecodeError> {
    let mut r = Reader::new(bytes);

    // seq / stamp_sec / stamp_nsec: present but not interpreted.
    r.read_u32()?;
    r.read_u32()?;
    r.read_u32()?;

    let frame_id_len = r.read_u32()? as usize;
    r.take(frame_id_len)?;

    let height = r.read_u32()?;
    let width = r.read_u32()?;
    if height == 0 || width == 0 {
        return Err(DecodeError::InvalidDimension { width, height });
    }

    let encoding_len = r.read_u32()? as usize;
    let encoding_bytes = r.take(encoding_len)?;
    let encoding_name = String::from_utf8_lossy(encoding_bytes);
    let encoding_name = encoding_name.trim_end_matches('\0');
    let encoding = ImageEncoding::parse(encoding_name);

    // is_bigendian is recorded but not honored; observed logs are all
    // little-endian. An extension that honors it must branch here.
    let _is_bigendian = r.read_u8()?;
    let step = r.read_u32()?;

    let data_len = r.read_u32()? as usize;
    let data = r.take(data_len)?;

    let Some((channels, bytes_per_sample)) = encoding.layout() else {
        return Err(DecodeError::UnsupportedEncoding(encoding_name.to_string()));
    };

    let expected = u64::from(height) * u64::from(width) * u64::from(channels) * u64::from(bytes_per_sample);
    if data_len as u64 != expected {
        return Err(DecodeError::SizeMismatch {
            declared: data_len as u64,
            expected,
        });
    }

    let expected_step = u64::from(width) * u64::from(channels) * u64::from(bytes_per_sample);
    if u64::from(step) != expected_step {
        return Err(DecodeError::InvalidStride {
            step,
            expected: expected_step as u32,
        });
    }

    let pixels = match encoding {
        ImageEncoding::Bgr8 => {
            let mut out = Vec::with_capacity(data.len());
            for px in data.chunks_exact(3) {
                out.extend_from_slice(&[px[2], px[1], px[0]]);
            }
            out
        }
        ImageEncoding::Rgb8 | ImageEncoding::Mono8 => data.to_vec(),
        ImageEncoding::Mono16 => data
            .chunks_exact(2)
            .map(|s| (u16::from_le_bytes([s[0], s[1]]) >> 8) as u8)
            .collect(),
        ImageEncoding::Unsupported(_) => unreachable!("rejected above"),
    };

    debug_assert_eq!(
        pixels.len() as u64,
        u64::from(width) * u64::from(height) * u64::from(channels)
    );

    Ok(DecodedFrame {
        width,
        height,
        channels: channels as u8,
        encoding,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a well-formed record around the given payload.
    fn encode_record(height: u32, width: u32, encoding: &str, step: u32, data: &[u8]) -> Vec<u8> {
        let frame_id = b"camera_link";
        let mut buf = Vec::new();
        buf.extend_from_slice(&42u32.to_le_bytes()); // seq
        buf.extend_from_slice(&1_700_000_000u32.to_le_bytes()); // stamp_sec
        buf.extend_from_slice(&500u32.to_le_bytes()); // stamp_nsec
        buf.extend_from_slice(&(frame_id.len() as u32).to_le_bytes());
        buf.extend_from_slice(frame_id);
        buf.extend_from_slice(&height.to_le_bytes());
        buf.extend_from_slice(&width.to_le_bytes());
        buf.extend_from_slice(&(encoding.len() as u32).to_le_bytes());
        buf.extend_from_slice(encoding.as_bytes());
        buf.push(0); // is_bigendian
        buf.extend_from_slice(&step.to_le_bytes());
        buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
        buf.extend_from_slice(data);
        buf
    }

    #[test]
    fn bgr8_reorders_to_rgb() {
        // Two pixels: blue then red, in BGR byte order.
        let data = [255, 0, 0, 0, 0, 255];
        let record = encode_record(1, 2, "bgr8", 6, &data);

        let frame = decode_image_record(&record).unwrap();
        assert_eq!(frame.width, 2);
        assert_eq!(frame.height, 1);
        assert_eq!(frame.channels, 3);
        assert_eq!(frame.encoding, ImageEncoding::Bgr8);
        assert_eq!(frame.pixels, vec![0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn rgb8_passes_through() {
        let data = [1, 2, 3, 4, 5, 6];
        let record = encode_record(2, 1, "rgb8", 3, &data);

        let frame = decode_image_record(&record).unwrap();
        assert_eq!(frame.pixels, data.to_vec());
        assert_eq!(frame.pixels.len(), (frame.width * frame.height * 3) as usize);
    }

    #[test]
    fn mono8_and_gray8_are_single_channel() {
        for name in ["mono8", "gray8"] {
            let data = [10, 20, 30, 40];
            let record = encode_record(2, 2, name, 2, &data);

            let frame = decode_image_record(&record).unwrap();
            assert_eq!(frame.channels, 1);
            assert_eq!(frame.encoding, ImageEncoding::Mono8);
            assert_eq!(frame.pixels, data.to_vec());
        }
    }

    #[test]
    fn mono16_uses_exact_truncating_shift() {
        // 0x1234 must become 0x12 (18), not 4660/256 rounded.
        let samples: Vec<u8> = [0x1234u16, 0x00FF, 0xFFFF, 0x0100]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let record = encode_record(1, 4, "mono16", 8, &samples);

        let frame = decode_image_record(&record).unwrap();
        assert_eq!(frame.pixels, vec![0x12, 0x00, 0xFF, 0x01]);
    }

    #[test]
    fn trailing_nul_in_encoding_is_trimmed() {
        let data = [7, 8, 9];
        let record = encode_record(1, 1, "rgb8\0\0", 3, &data);

        let frame = decode_image_record(&record).unwrap();
        assert_eq!(frame.encoding, ImageEncoding::Rgb8);
    }

    #[test]
    fn zero_dimension_fails() {
        let record = encode_record(0, 640, "rgb8", 1920, &[]);
        assert_eq!(
            decode_image_record(&record),
            Err(DecodeError::InvalidDimension {
                width: 640,
                height: 0
            })
        );
    }

    #[test]
    fn truncated_payload_fails() {
        let data = [1, 2, 3, 4, 5, 6];
        let mut record = encode_record(1, 2, "rgb8", 6, &data);
        record.truncate(record.len() - 4); // declared data_len now exceeds the buffer

        match decode_image_record(&record) {
            Err(DecodeError::TruncatedRecord { needed, remaining }) => {
                assert_eq!(needed, 6);
                assert_eq!(remaining, 2);
            }
            other => panic!("expected TruncatedRecord, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_encoding_fails() {
        let record = encode_record(1, 2, "yuv422", 4, &[0, 0, 0, 0]);
        assert_eq!(
            decode_image_record(&record),
            Err(DecodeError::UnsupportedEncoding("yuv422".to_string()))
        );
    }

    #[test]
    fn declared_size_must_match_dimensions() {
        // 2x2 rgb8 needs 12 bytes; declare and supply 9.
        let record = encode_record(2, 2, "rgb8", 6, &[0; 9]);
        assert_eq!(
            decode_image_record(&record),
            Err(DecodeError::SizeMismatch {
                declared: 9,
                expected: 12
            })
        );
    }

    #[test]
    fn bad_stride_fails() {
        let record = encode_record(1, 2, "rgb8", 8, &[0; 6]);
        assert_eq!(
            decode_image_record(&record),
            Err(DecodeError::InvalidStride {
                step: 8,
                expected: 6
            })
        );
    }

    #[test]
    fn empty_input_is_truncated_not_panic() {
        assert!(matches!(
            decode_image_record(&[]),
            Err(DecodeError::TruncatedRecord { .. })
        ));
    }
}
