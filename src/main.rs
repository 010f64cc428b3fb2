//! lathe - a static site pipeline for markdown, templates and content records.

#![allow(dead_code)]

mod cli;
mod config;
mod content;
mod helpers;
mod link;
mod logger;
mod pipeline;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, build::build_site, serve};
use config::SiteConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    serve::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = SiteConfig::load(cli)?;
    let groups = cli.command.extra_groups();

    match &cli.command {
        Commands::Build { .. } => build_site(&config, groups, false).map(|_| ()),
        Commands::Dev { .. } => {
            // a broken first build is fixed by the next save
            if let Err(e) = build_site(&config, groups, false) {
                logger::status_error("build failed", &format!("{e:#}"));
            }
            serve::serve_site(cli, &config)
        }
        Commands::Prod { .. } => {
            build_site(&config, groups, false)?;
            serve::serve_site(cli, &config)
        }
    }
}
