//! CLI command handling.
//!
//! Provides subcommands for:
//! - Serving the site and Live Demo (`serve`, the default)
//! - Classifying a URL the way the demo does (`classify`)
//! - Running one AI enhancement from the terminal (`enhance`)
//! - Checking configuration and connectivity (`doctor`)

mod demo;
mod doctor;

pub use demo::{run_classify_command, run_enhance_command};
pub use doctor::run_doctor_command;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "eduboard")]
#[command(about = "Marketing site and live demo for AI-enhanced educational content")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the site (default if no subcommand given)
    Serve {
        /// Address to listen on
        #[arg(long, env = "EDUBOARD_BIND")]
        bind: Option<SocketAddr>,
    },

    /// Classify a URL as image, video, or neither
    Classify {
        /// Text containing an http(s) URL
        input: String,
    },

    /// Generate AI text and an image for some content
    Enhance {
        /// Text to enhance
        #[arg(long, conflicts_with_all = ["file", "url"])]
        text: Option<String>,

        /// Local file to enhance (text, image, or video)
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,

        /// Image or video URL to enhance
        #[arg(long)]
        url: Option<String>,
    },

    /// Check configuration and provider reachability
    Doctor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["eduboard"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_serve_bind() {
        let cli = Cli::try_parse_from(["eduboard", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        match cli.command {
            Some(Command::Serve { bind }) => {
                assert_eq!(bind, Some("0.0.0.0:8080".parse().unwrap()));
            }
            other => panic!("expected Serve, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_classify() {
        let cli = Cli::try_parse_from(["eduboard", "classify", "see https://x.com/a.png"]).unwrap();
        match cli.command {
            Some(Command::Classify { input }) => assert_eq!(input, "see https://x.com/a.png"),
            other => panic!("expected Classify, got {:?}", other),
        }
    }

    #[test]
    fn test_enhance_sources_conflict() {
        assert!(
            Cli::try_parse_from(["eduboard", "enhance", "--text", "a", "--url", "https://x.com"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["eduboard", "enhance", "--file", "a.png"]).is_ok());
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
