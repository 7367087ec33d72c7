use thiserror::Error;
use tracing::debug;

use super::command::BLOCK_SIZE;


/// Bytes covered by a block's checksum (the checksum lives in the
/// high nibble of the byte that follows).
const CHECKED_BYTES: usize = BLOCK_SIZE - 1;

trait NibbleSum {
    fn nibble_sum(&mut self) -> u8;
}

impl <'a>NibbleSum for std::slice::Iter<'a, u8> {
    fn nibble_sum(&mut self) -> u8 {
        self.fold(0u8, |acc, byte| acc.wrapping_add(byte & 0x0f).wrapping_add(byte >> 4)) & 0x0f
    }
}

/// Sum of every nibble in `bytes`, modulo 16.
pub fn nibble_sum(bytes: &[u8]) -> u8 {
    bytes.iter().nibble_sum()
}

pub fn block_checksum(block: &[u8; BLOCK_SIZE]) -> u8 {
    nibble_sum(&block[..CHECKED_BYTES])
}

pub fn stored_checksum(block: &[u8; BLOCK_SIZE]) -> u8 {
    block[CHECKED_BYTES] >> 4
}

pub fn set_block_checksum(block: &mut [u8; BLOCK_SIZE]) {
    let sum = block_checksum(block);
    block[CHECKED_BYTES] = (block[CHECKED_BYTES] & 0x0f) | (sum << 4);
}


#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid checksum in block {block} (expected {expected:x}, actual: {actual:x})")]
pub struct ChecksumError {
    pub block: usize,
    pub expected: u8,
    pub actual: u8,
}


/// Payload exchanged with the IR transport: one data word per block,
/// least significant byte first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KelvinatorData {
    pub data: Vec<u64>,
}

impl KelvinatorData {
    pub fn new(data: Vec<u64>) -> Self {
        Self { data }
    }

    /// Recompute and store the checksum of every block.
    pub fn apply_checksum(&mut self) {
        for word in self.data.iter_mut() {
            let mut block = word.to_le_bytes();
            set_block_checksum(&mut block);
            *word = u64::from_le_bytes(block);
        }
    }

    pub fn validate_checksum(&self) -> Result<(), ChecksumError> {
        for (i, word) in self.data.iter().enumerate() {
            let block = word.to_le_bytes();

            let expected = block_checksum(&block);
            let actual = stored_checksum(&block);

            if expected != actual {
                return Err(ChecksumError { block: i, expected, actual });
            }
        }

        Ok(())
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|word| word.to_le_bytes()).collect()
    }

    pub fn log(&self) {
        for (i, word) in self.data.iter().enumerate() {
            debug!("kelvinator data[{i}]: {word:016x}");
        }
    }
}

impl From<[u64; 2]> for KelvinatorData {
    fn from(words: [u64; 2]) -> Self {
        Self::new(words.to_vec())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibble_sum() {
        assert_eq!(nibble_sum(&[]), 0);
        assert_eq!(nibble_sum(&[0x12, 0x34]), 0xa);
        // 0xf + 0xf + 0x1 = 0x1f
        assert_eq!(nibble_sum(&[0xff, 0x01]), 0xf);
        assert_eq!(nibble_sum(&[0xff; 7]), (15 * 14) % 16);
    }

    #[test]
    fn test_block_checksum_ignores_byte7() {
        let mut block = [0x19, 0x08, 0x20, 0x50, 0x00, 0x00, 0x00, 0xff];
        assert_eq!(block_checksum(&block), (1 + 9 + 8 + 2 + 5) % 16);

        set_block_checksum(&mut block);
        assert_eq!(block[7], 0x9f);
        assert_eq!(stored_checksum(&block), 0x9);
    }

    #[test]
    fn test_apply_and_validate() {
        let mut data = KelvinatorData::new(vec![0x0000_0000_5020_0819, 0x0000_0000_7020_0819]);
        assert!(data.validate_checksum().is_err());

        data.apply_checksum();
        assert!(data.validate_checksum().is_ok());

        let bytes = data.bytes();
        assert_eq!(bytes[7] >> 4, nibble_sum(&bytes[0..7]));
        assert_eq!(bytes[15] >> 4, nibble_sum(&bytes[8..15]));
    }

    #[test]
    fn test_validate_reports_block() {
        let mut data = KelvinatorData::new(vec![0x0000_0000_5020_0819, 0x0000_0000_7020_0819]);
        data.apply_checksum();

        data.data[1] ^= 0x0100; // flip a bit in byte 9

        let err = data.validate_checksum().unwrap_err();
        assert_eq!(err.block, 1);
        assert_ne!(err.expected, err.actual);
    }
}
