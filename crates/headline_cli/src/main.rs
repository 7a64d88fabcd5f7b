//! Headline CLI
//!
//! Resolve heading attributes, render markup, and play the animation
//! headlessly.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use headline_core::Configuration;
use headline_element::render_markup;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod attributes;
mod play;

use attributes::AttributeArgs;
use play::{PlayOptions, Resize};

#[derive(Parser)]
#[command(name = "headline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Animated heading toolkit", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration
    Config {
        #[command(flatten)]
        source: AttributeArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Toml)]
        format: Format,
    },

    /// Print the generated markup
    Markup {
        #[command(flatten)]
        source: AttributeArgs,
    },

    /// Run the animation headlessly and print the heading as it changes
    Play {
        #[command(flatten)]
        source: AttributeArgs,

        /// Viewport width in pixels
        #[arg(long, default_value = "1280")]
        width: u32,

        /// Viewport height in pixels
        #[arg(long, default_value = "720")]
        height: u32,

        /// Simulated time in seconds
        #[arg(long, default_value = "8")]
        seconds: f32,

        /// Frames per second
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Resize the viewport mid-run, as SECONDS:WIDTHxHEIGHT
        #[arg(long, value_parser = Resize::parse)]
        resize: Option<Resize>,

        /// Emit JSON lines instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Toml,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Config { source, format } => cmd_config(&source, format),

        Commands::Markup { source } => cmd_markup(&source),

        Commands::Play {
            source,
            width,
            height,
            seconds,
            fps,
            resize,
            json,
        } => {
            let options = PlayOptions {
                width,
                height,
                seconds,
                fps,
                resize,
                json,
            };
            play::run(source.load()?, &options)
        }
    }
}

fn cmd_config(source: &AttributeArgs, format: Format) -> Result<()> {
    let config = Configuration::from_attributes(&source.load()?);
    let output = match format {
        Format::Toml => {
            toml::to_string_pretty(&config).context("Failed to serialize configuration")?
        }
        Format::Json => {
            serde_json::to_string_pretty(&config).context("Failed to serialize configuration")?
        }
    };
    println!("{}", output.trim_end());
    Ok(())
}

fn cmd_markup(source: &AttributeArgs) -> Result<()> {
    let config = Configuration::from_attributes(&source.load()?);
    print!("{}", render_markup(&config));
    Ok(())
}
