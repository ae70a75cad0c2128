// =============================================================================
// cli.rs — THE FRONT DOOR
// =============================================================================
//
// Four modes, one binary. clap handles the ceremony: an unknown mode gets
// usage and a non-zero exit, a missing required flag gets a targeted
// error and a non-zero exit, and none of it costs us a single line of
// hand-rolled argument parsing. This is the one module where doing less
// is the whole design.
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "handle-hunter")]
#[command(version)]
#[command(about = "Username reconnaissance engine with a few OSINT side quests", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Probe the site catalog for a handle
    Username {
        /// Username to search for
        #[arg(short, long)]
        username: String,

        /// Number of concurrent workers
        #[arg(short, long, default_value_t = 6)]
        concurrency: usize,

        /// Per-request timeout in seconds
        #[arg(short, long, default_value_t = 10)]
        timeout: u64,

        /// File to save the JSON results to
        #[arg(short, long, default_value = "results.json")]
        output: PathBuf,

        /// Also search a case-inverted variant of the username
        #[arg(short, long)]
        alternate: bool,
    },

    /// Compare the text of two or more web pages
    Websimilarity {
        /// URLs to compare (comma-separated, at least 2)
        #[arg(long)]
        urls: String,
    },

    /// Reverse-search an image against an external lookup endpoint
    Lens {
        /// File path of the photo to process
        #[arg(long)]
        image: PathBuf,
    },

    /// Extract GPS coordinates from a photo and resolve them to an address
    Geo {
        /// File path of the photo to process
        #[arg(long)]
        image: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_mode_parses_with_defaults() {
        let cli = Cli::try_parse_from(["handle-hunter", "username", "-u", "bob"]).unwrap();
        match cli.mode {
            Mode::Username {
                username,
                concurrency,
                timeout,
                output,
                alternate,
            } => {
                assert_eq!(username, "bob");
                assert_eq!(concurrency, 6);
                assert_eq!(timeout, 10);
                assert_eq!(output, PathBuf::from("results.json"));
                assert!(!alternate);
            }
            other => panic!("wrong mode: {other:?}"),
        }
    }

    #[test]
    fn test_all_username_flags_are_honored() {
        let cli = Cli::try_parse_from([
            "handle-hunter",
            "username",
            "-u",
            "bob",
            "-c",
            "12",
            "-t",
            "3",
            "-o",
            "out.json",
            "-a",
        ])
        .unwrap();
        match cli.mode {
            Mode::Username {
                concurrency,
                timeout,
                output,
                alternate,
                ..
            } => {
                assert_eq!(concurrency, 12);
                assert_eq!(timeout, 3);
                assert_eq!(output, PathBuf::from("out.json"));
                assert!(alternate);
            }
            other => panic!("wrong mode: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_mode_is_rejected() {
        assert!(Cli::try_parse_from(["handle-hunter", "interpretive-dance"]).is_err());
    }

    #[test]
    fn test_missing_required_parameter_is_rejected() {
        assert!(Cli::try_parse_from(["handle-hunter", "username"]).is_err());
        assert!(Cli::try_parse_from(["handle-hunter", "websimilarity"]).is_err());
        assert!(Cli::try_parse_from(["handle-hunter", "lens"]).is_err());
        assert!(Cli::try_parse_from(["handle-hunter", "geo"]).is_err());
    }

    #[test]
    fn test_no_mode_at_all_is_rejected() {
        assert!(Cli::try_parse_from(["handle-hunter"]).is_err());
    }
}
