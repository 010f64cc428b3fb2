//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// lathe static site pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Source directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Config file path (default: lathe.toml)
    #[arg(short = 'C', long, default_value = "lathe.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build, serve and rebuild on changes
    #[command(visible_alias = "d")]
    Dev {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable file watching for auto-rebuild
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },

    /// Build a deployable site with file-relative links
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Build and serve without watching
    #[command(visible_alias = "p")]
    Prod {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Commands {
    /// Stage groups run after `common`.
    pub fn extra_groups(&self) -> &'static [&'static str] {
        match self {
            Self::Build { .. } => &[crate::pipeline::DEPLOY_GROUP],
            Self::Dev { .. } | Self::Prod { .. } => &[],
        }
    }
}

/// Shared build arguments for every command
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Clean output directory completely before building
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub clean: Option<bool>,

    /// Minify CSS output
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_flags() {
        let cli = Cli::parse_from(["lathe", "-C", "site/lathe.toml", "build", "--clean=false", "-m"]);
        assert_eq!(cli.config, PathBuf::from("site/lathe.toml"));
        let Commands::Build { build_args } = &cli.command else {
            panic!("expected build");
        };
        assert_eq!(build_args.clean, Some(false));
        assert_eq!(build_args.minify, Some(true));
        assert!(!build_args.verbose);
    }

    #[test]
    fn test_dev_flags() {
        let cli = Cli::parse_from(["lathe", "dev", "-i", "0.0.0.0", "-p", "8080", "--watch", "false"]);
        let Commands::Dev { interface, port, watch, .. } = &cli.command else {
            panic!("expected dev");
        };
        assert_eq!(interface.map(|ip| ip.to_string()).as_deref(), Some("0.0.0.0"));
        assert_eq!(*port, Some(8080));
        assert_eq!(*watch, Some(false));
    }

    #[test]
    fn test_extra_groups() {
        assert_eq!(Cli::parse_from(["lathe", "build"]).command.extra_groups(), ["deploy"]);
        assert!(Cli::parse_from(["lathe", "dev"]).command.extra_groups().is_empty());
        assert!(Cli::parse_from(["lathe", "prod"]).command.extra_groups().is_empty());
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        let err = Cli::try_parse_from(["lathe", "deploy"]).unwrap_err();
        assert!(err.to_string().contains("unrecognized subcommand 'deploy'"));
    }
}
