//! n64-findcode CLI
//!
//! Command-line tool for locating code regions in N64 cartridge images.

use clap::{Parser, ValueEnum};
use n64_findcode::{
    find_code_regions_with, HumanFormatter, JsonFormatter, RegionFormatter, Rom, RomRegion,
    ScanOptions, ShortFormatter,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Locate code regions in an N64 cartridge image.
///
/// Scans the ROM for function returns, grows self-consistent instruction
/// ranges around them, and reports the resulting code regions, including
/// embedded RSP microcode.
#[derive(Parser, Debug)]
#[command(name = "n64-findcode")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// ROM image to analyze (.z64 or .n64; v64 is not supported)
    rom: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "human")]
    format: OutputFormat,

    /// Discard regions shorter than this many instructions
    #[arg(long)]
    min_region_instructions: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (region lines only)
    #[arg(short, long)]
    quiet: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable report
    Human,
    /// JSON document
    Json,
    /// Tab-separated lines
    Short,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("n64_findcode=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error analyzing {}: {}", args.rom.display(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> n64_findcode::Result<()> {
    let rom = Rom::load(&args.rom)?;

    let options = ScanOptions {
        min_region_instructions: args.min_region_instructions,
        ..ScanOptions::default()
    };
    let regions = find_code_regions_with(&rom, &options);

    print!("{}", format_output(&regions, args));
    Ok(())
}

fn format_output(regions: &[RomRegion], args: &Args) -> String {
    match args.format {
        OutputFormat::Human => {
            let formatter = if args.quiet {
                HumanFormatter::quiet()
            } else {
                HumanFormatter::new()
            };
            formatter.format_report(&args.rom, regions)
        }
        OutputFormat::Json => JsonFormatter::new().format_report(&args.rom, regions),
        OutputFormat::Short => ShortFormatter::new().format_report(&args.rom, regions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::try_parse_from(["n64-findcode", "game.z64"]).unwrap();
        assert_eq!(args.rom, PathBuf::from("game.z64"));
        assert!(!args.verbose);
    }

    #[test]
    fn test_rom_argument_is_required() {
        assert!(Args::try_parse_from(["n64-findcode"]).is_err());
    }

    #[test]
    fn test_format_options() {
        let args = Args::try_parse_from(["n64-findcode", "-f", "json", "game.z64"]).unwrap();
        assert!(matches!(args.format, OutputFormat::Json));
    }
}
