//! Framing of Kelvinator commands on a byte stream.
//!
//! Used when the IR transceiver sits behind a serial port or a raw TCP
//! socket: each command travels as its 16 raw bytes, block 1 first.

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use super::checksum::{ChecksumError, KelvinatorData};
use super::command::{BLOCK1_MARKER, BLOCK2_MARKER, BLOCK_SIZE, FRAME_SIZE};


/// A received frame from a port
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RxFrame {
    Command(KelvinatorData),
    /// Markers in place but a checksum didn't match.
    Corrupted(Vec<u8>)
}

impl RxFrame {
    pub fn data(&self) -> Option<&KelvinatorData> {
        match self {
            RxFrame::Command(data) => Some(data),
            RxFrame::Corrupted(_) => None,
        }
    }
}

/// A frame to send to a port
pub type TxFrame = KelvinatorData;


#[derive(Error, Debug)]
enum FramingError {
    #[error("input buffer too small")]
    BufferTooSmall,
    #[error("block markers not found")]
    MarkersNotFound,
    #[error("{err}")]
    InvalidChecksum {
        err: ChecksumError,
        frame: Vec<u8>
    },
}


#[derive(Debug, Default)]
pub struct KelvinatorFrameCodec {
    skipped: usize,
}

impl KelvinatorFrameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    fn try_read_frame(src: &mut BytesMut) -> Result<KelvinatorData, FramingError> {
        if src.len() < FRAME_SIZE {
            return Err(FramingError::BufferTooSmall);
        }

        if src[3] != BLOCK1_MARKER || src[BLOCK_SIZE + 3] != BLOCK2_MARKER {
            return Err(FramingError::MarkersNotFound);
        }

        let frame = src.split_to(FRAME_SIZE);

        let mut words = &frame[..];
        let data = KelvinatorData::new(vec![words.get_u64_le(), words.get_u64_le()]);

        if let Err(err) = data.validate_checksum() {
            return Err(FramingError::InvalidChecksum { err, frame: frame.to_vec() })
        }

        Ok(data)
    }
}

impl Decoder for KelvinatorFrameCodec {
    type Item = RxFrame;

    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let frame = match Self::try_read_frame(src) {
                Ok(data) => RxFrame::Command(data),

                // need more data
                Err(FramingError::BufferTooSmall) => return Ok(None),

                Err(FramingError::MarkersNotFound) => {
                    // not aligned on a frame -- skip the junk to resync
                    src.advance(1);
                    self.skipped += 1;
                    continue;
                }

                Err(FramingError::InvalidChecksum { err, frame }) => {
                    debug!("{err} in frame {frame:02x?}");
                    RxFrame::Corrupted(frame)
                }
            };

            if self.skipped > 0 {
                debug!("skipped {} bytes to resync", self.skipped);
                self.skipped = 0;
            }

            return Ok(Some(frame))
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(frame) => Ok(Some(frame)),
            None => {
                if !buf.is_empty() {
                    debug!("discarding {} trailing bytes", buf.len());
                    buf.clear();
                }
                Ok(None)
            }
        }
    }
}

impl Encoder<TxFrame> for KelvinatorFrameCodec {
    type Error = std::io::Error;

    fn encode(&mut self, frame: TxFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(frame.data.len() * BLOCK_SIZE);

        for word in frame.data {
            dst.put_u64_le(word);
        }

        Ok(())
    }
}
