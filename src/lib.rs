//! n64-findcode - Code Region Discovery for N64 Cartridge Images
//!
//! This library locates executable code embedded in a cartridge image,
//! where CPU instructions and RSP microcode sit interleaved with
//! compressed assets and padding and no file-system metadata says which
//! ranges are which.
//!
//! # How it works
//!
//! 1. **Return scanning**: every function ends in `jr $ra`, so the exact
//!    word `0x03E00008` (with a valid delay slot) anchors discovery.
//! 2. **Region growth**: from each return site the region grows outward
//!    while the words keep validating as plausible CPU instructions.
//! 3. **Boundary trimming**: the start retreats past instructions that
//!    read registers no caller would have set, and the end retreats to
//!    the last unconditional branch plus its delay slot.
//! 4. **Merging**: nearby regions separated by a gap that itself scans as
//!    CPU code or RSP microcode fuse into one; microcode gaps flag the
//!    region and extend it through the trailing microcode.
//!
//! The heuristics are tuned for retail titles and make no completeness or
//! soundness guarantees.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use n64_findcode::scan_file;
//!
//! fn main() -> Result<(), n64_findcode::FindcodeError> {
//!     let regions = scan_file("path/to/game.z64")?;
//!     for region in &regions {
//!         println!(
//!             "{:#X}..{:#X} rsp={}",
//!             region.rom_start, region.rom_end, region.has_rsp
//!         );
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]

pub mod engine;
pub mod error;
pub mod formatter;
pub mod isa;
pub mod rom;
pub mod types;

pub use engine::{find_code_regions, find_code_regions_with};
pub use error::{FindcodeError, Result};
pub use formatter::{HumanFormatter, JsonFormatter, RegionFormatter, ShortFormatter};
pub use rom::{Rom, RomEndianness};
pub use types::{RomRegion, ScanOptions};

use std::path::Path;

/// Scan a ROM file for code regions.
///
/// This is the primary entry point for file-based scanning. The file's
/// byte order is detected from its first word and normalized before the
/// heuristics run.
///
/// # Errors
///
/// Fails when the file cannot be read, is not a recognizable N64 image,
/// or is a v64 byteswapped dump.
pub fn scan_file<P: AsRef<Path>>(path: P) -> Result<Vec<RomRegion>> {
    let rom = Rom::load(path)?;
    Ok(find_code_regions(&rom))
}

/// Scan raw ROM file contents for code regions.
///
/// The bytes are interpreted exactly like a file on disk, including the
/// byte-order magic in the first word.
///
/// # Errors
///
/// Fails when the bytes do not form a recognizable N64 image.
pub fn scan_bytes(bytes: Vec<u8>) -> Result<Vec<RomRegion>> {
    let rom = Rom::from_file_bytes(bytes)?;
    Ok(find_code_regions(&rom))
}

/// Get version information for this library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_scan_bytes_rejects_unknown_magic() {
        let bytes = vec![0u8; 0x2000];
        assert!(matches!(
            scan_bytes(bytes),
            Err(FindcodeError::UnknownRomFormat { magic: 0 })
        ));
    }

    #[test]
    fn test_scan_bytes_empty_image() {
        let mut bytes = rom::MAGIC_LITTLE_ENDIAN.to_le_bytes().to_vec();
        bytes.resize(0x4000, 0);
        let regions = scan_bytes(bytes).unwrap();
        assert!(regions.is_empty());
    }
}
