//! Output formatters for discovered code regions.
//!
//! Trait-based formatters render a region list as a human-readable
//! report, JSON, or compact tab-separated lines.

use std::path::Path;

use crate::rom::{nearest_multiple_down, nearest_multiple_up};
use crate::types::RomRegion;

/// Print the exact region bounds instead of 16-byte-aligned ones.
///
/// True starts are usually 16-byte aligned because that is how linkers
/// place segments; when one is not, the human formatter emits a warning
/// next to the line.
pub const SHOW_TRUE_RANGES: bool = false;

/// Alignment applied to printed region bounds.
const DISPLAY_ALIGNMENT: usize = 16;

/// Trait for rendering a list of regions.
pub trait RegionFormatter {
    /// Render one region as a line of output.
    fn format_region(&self, region: &RomRegion) -> String;

    /// Render the complete report for a ROM.
    ///
    /// Default implementation concatenates the per-region lines.
    fn format_report(&self, path: &Path, regions: &[RomRegion]) -> String {
        let mut out = String::new();
        let _ = path;
        for region in regions {
            out.push_str(&self.format_region(region));
        }
        out
    }
}

/// Aligned display bounds for a region: start rounded down, end rounded up.
fn display_bounds(region: &RomRegion) -> (usize, usize) {
    (
        nearest_multiple_down(region.rom_start, DISPLAY_ALIGNMENT),
        nearest_multiple_up(region.rom_end, DISPLAY_ALIGNMENT),
    )
}

/// Human-readable output formatter.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    /// Quiet mode: region lines only, no report header.
    pub quiet: bool,
}

impl HumanFormatter {
    /// Create a human formatter with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a quiet formatter.
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl RegionFormatter for HumanFormatter {
    fn format_region(&self, region: &RomRegion) -> String {
        let rsp_note = if region.has_rsp { " [RSP microcode]" } else { "" };

        if SHOW_TRUE_RANGES {
            let warn = if region.rom_start % DISPLAY_ALIGNMENT != 0 {
                " [unaligned start]"
            } else {
                ""
            };
            format!(
                "  0x{:08X} to 0x{:08X} (0x{:06X}){}{}\n",
                region.rom_start,
                region.rom_end,
                region.len_bytes(),
                rsp_note,
                warn
            )
        } else {
            let (start, end) = display_bounds(region);
            format!(
                "  0x{:08X} to 0x{:08X} (0x{:06X}){}\n",
                start,
                end,
                end - start,
                rsp_note
            )
        }
    }

    fn format_report(&self, path: &Path, regions: &[RomRegion]) -> String {
        let mut out = String::new();
        if !self.quiet {
            out.push_str(&format!(
                "{}: found {} code regions:\n",
                path.display(),
                regions.len()
            ));
        }
        for region in regions {
            out.push_str(&self.format_region(region));
        }
        out
    }
}

/// JSON output formatter.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    /// Pretty-print the JSON document.
    pub pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonFormatter {
    /// Create a pretty-printing JSON formatter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compact JSON formatter.
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl RegionFormatter for JsonFormatter {
    fn format_region(&self, region: &RomRegion) -> String {
        serde_json::to_string(region).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_report(&self, path: &Path, regions: &[RomRegion]) -> String {
        #[derive(serde::Serialize)]
        struct RegionJson {
            rom_start: usize,
            rom_end: usize,
            aligned_start: usize,
            aligned_end: usize,
            length: usize,
            has_rsp: bool,
        }

        #[derive(serde::Serialize)]
        struct ReportJson {
            file: String,
            region_count: usize,
            regions: Vec<RegionJson>,
        }

        let report = ReportJson {
            file: path.display().to_string(),
            region_count: regions.len(),
            regions: regions
                .iter()
                .map(|r| {
                    let (aligned_start, aligned_end) = display_bounds(r);
                    RegionJson {
                        rom_start: r.rom_start,
                        rom_end: r.rom_end,
                        aligned_start,
                        aligned_end,
                        length: r.len_bytes(),
                        has_rsp: r.has_rsp,
                    }
                })
                .collect(),
        };

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        let mut out = rendered.unwrap_or_else(|_| "{}".to_string());
        out.push('\n');
        out
    }
}

/// Compact tab-separated output formatter, one region per line.
#[derive(Debug, Clone, Default)]
pub struct ShortFormatter;

impl ShortFormatter {
    /// Create a new short formatter.
    pub fn new() -> Self {
        Self
    }
}

impl RegionFormatter for ShortFormatter {
    fn format_region(&self, region: &RomRegion) -> String {
        let (start, end) = display_bounds(region);
        format!(
            "{:#X}\t{:#X}\t{:#X}\t{}\n",
            start,
            end,
            end - start,
            if region.has_rsp { "rsp" } else { "cpu" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_regions() -> Vec<RomRegion> {
        vec![
            RomRegion::new(0x1000, 0x1014),
            RomRegion {
                rom_start: 0x2008,
                rom_end: 0x2100,
                has_rsp: true,
            },
        ]
    }

    #[test]
    fn test_human_formatter_alignment() {
        let formatter = HumanFormatter::new();
        let output = formatter.format_report(&PathBuf::from("test.z64"), &sample_regions());

        assert!(output.contains("found 2 code regions"));
        // 0x1014 rounds up to 0x1020
        assert!(output.contains("0x00001000 to 0x00001020 (0x000020)"));
        // 0x2008 rounds down to 0x2000
        assert!(output.contains("0x00002000 to 0x00002100 (0x000100) [RSP microcode]"));
    }

    #[test]
    fn test_human_formatter_quiet() {
        let formatter = HumanFormatter::quiet();
        let output = formatter.format_report(&PathBuf::from("test.z64"), &sample_regions());
        assert!(!output.contains("found"));
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_json_formatter() {
        let formatter = JsonFormatter::compact();
        let output = formatter.format_report(&PathBuf::from("test.z64"), &sample_regions());
        assert!(output.contains("\"file\":\"test.z64\""));
        assert!(output.contains("\"region_count\":2"));
        assert!(output.contains("\"has_rsp\":true"));
        assert!(output.contains("\"aligned_end\":4128"));
    }

    #[test]
    fn test_short_formatter() {
        let formatter = ShortFormatter::new();
        let output = formatter.format_report(&PathBuf::from("test.z64"), &sample_regions());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0x1000\t0x1020\t0x20\tcpu"));
        assert!(lines[1].ends_with("rsp"));
    }
}
