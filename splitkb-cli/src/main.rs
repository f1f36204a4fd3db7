mod hex;
mod layout;
mod scenario;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use firmware::config::{LEFT_MATRIX, RIGHT_MATRIX};
use splitkb_keymap::defaults;
use std::fs;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "splitkb-cli")]
#[command(about = "Host tools for the split keyboard pipeline")]
struct Cli {
    /// Log pipeline activity at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the default keymap as a text grid, or write it as HTML
    Layout {
        /// Only print this layer
        #[arg(long)]
        layer: Option<usize>,
        /// Write an HTML/SVG rendering of every layer to this file
        #[arg(long)]
        html: Option<String>,
    },
    /// Run a JSON scenario through a simulated source and sink
    Simulate {
        /// Path to the scenario file
        scenario: String,
    },
    /// Decode a hex-encoded sync message
    Decode {
        /// Message bytes, e.g. "02 19 e2"
        bytes: Vec<String>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Layout { layer, html } => {
            let keymap = defaults::keymap();

            if let Some(path) = html {
                fs::write(&path, layout::generate_html(&keymap, &LEFT_MATRIX, &RIGHT_MATRIX))
                    .with_context(|| format!("writing {}", path))?;
                println!("Wrote {}", path);
                return Ok(());
            }

            let layers = match layer {
                Some(layer) if layer >= keymap.num_layers() => {
                    bail!(
                        "layer {} does not exist (keymap has {})",
                        layer,
                        keymap.num_layers()
                    );
                }
                Some(layer) => layer..layer + 1,
                None => 0..keymap.num_layers(),
            };
            for layer in layers {
                println!("{}", layout::render_text(&keymap, layer, &LEFT_MATRIX, &RIGHT_MATRIX));
            }
        }
        Command::Simulate { scenario } => {
            let contents =
                fs::read_to_string(&scenario).with_context(|| format!("reading {}", scenario))?;
            let parsed = scenario::Scenario::from_json(&contents)
                .with_context(|| format!("in {}", scenario))?;
            let outcome = scenario::run(&parsed)?;

            for frame in &outcome.frames {
                println!(
                    "tick {:>4}  {:?}  {}",
                    frame.tick,
                    frame.mode,
                    hex::format_bytes(&frame.bytes)
                );
            }
            println!(
                "{} report(s), {} sync message(s), {} lost",
                outcome.frames.len(),
                outcome.sync_messages,
                outcome.lost_messages
            );
            if !outcome.held.is_empty() {
                println!("Still held: {:?}", outcome.held);
            }
        }
        Command::Decode { bytes } => {
            let bytes = hex::parse_hex_bytes(&bytes.join(" ")).context("parsing hex input")?;
            print!("{}", hex::describe_sync_message(&bytes)?);
        }
    }

    Ok(())
}
