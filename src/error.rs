//! Error types for the code-region finder.
//!
//! Only ROM ingestion can fail. The scanning heuristics are total over a
//! normalized image and report their findings as data, never as errors.

use thiserror::Error;

/// Primary error type for ROM loading.
#[derive(Debug, Error)]
pub enum FindcodeError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is too small to hold the magic word.
    #[error("File too small to be an N64 ROM: got {actual} bytes")]
    RomTooSmall {
        /// Actual file size in bytes.
        actual: usize,
    },

    /// The first word matches no known N64 ROM byte order.
    #[error("File is not an N64 game: first word 0x{magic:08X}")]
    UnknownRomFormat {
        /// The first word of the file, read as little-endian.
        magic: u32,
    },

    /// v64 images swap within 16-bit halves and are not supported.
    #[error("v64 (byteswapped) roms not supported")]
    UnsupportedByteSwapped,
}

/// Result type alias for loader operations.
pub type Result<T> = std::result::Result<T, FindcodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FindcodeError::UnknownRomFormat { magic: 0xDEAD_BEEF };
        assert!(err.to_string().contains("DEADBEEF"));

        let err = FindcodeError::RomTooSmall { actual: 2 };
        assert!(err.to_string().contains('2'));
    }
}
