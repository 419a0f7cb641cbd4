//! Command-line definition and command execution.

use std::io::Write;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use kitbag_types::{
    DateTimeExt, LossyList, Rgba, SliceExt, StrExt, TruncationPosition, emoji_flag, parse_iso8601,
    parse_iso8601_with_fractional_seconds,
};
use kitbag_utils::read_json;
use tracing::{debug, warn};

const LEADER: &str = "…";

#[derive(Debug, Parser)]
#[command(name = "kitbag")]
#[command(about = "Small text, collection, colour and date helpers")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Shorten text to a number of characters
    Truncate {
        /// Characters to keep
        limit: usize,
        text: String,
        /// Which part of the text to cut
        #[arg(value_enum, default_value = "tail")]
        position: Position,
    },
    /// Group items, one group per line
    Chunk {
        /// Items per group
        size: NonZeroUsize,
        items: Vec<String>,
    },
    /// Drop repeated items, keeping the first
    Uniq {
        /// Compare items case-insensitively
        #[arg(short = 'i', long)]
        ignore_case: bool,
        items: Vec<String>,
    },
    /// Show the components of a hex colour
    Color {
        /// `#RRGGBB` or `#RRGGBBAA`
        hex: String,
    },
    /// Print the current UTC time
    Now {
        /// Include milliseconds
        #[arg(long)]
        fractional: bool,
    },
    /// Normalise an ISO 8601 date-time to UTC
    Iso8601 { input: String },
    /// Print the valid colours in a JSON array of hex strings
    LossyColors { path: PathBuf },
    /// Print the flag emoji for a region, falling back to a language code
    Flag {
        region: Option<String>,
        language: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Position {
    Head,
    Middle,
    Tail,
}

impl From<Position> for TruncationPosition {
    fn from(position: Position) -> Self {
        match position {
            Position::Head => TruncationPosition::Head,
            Position::Middle => TruncationPosition::Middle,
            Position::Tail => TruncationPosition::Tail,
        }
    }
}

impl Command {
    pub fn run(self, out: &mut impl Write) -> Result<()> {
        debug!(command = ?self, "Running");
        match self {
            Self::Truncate {
                limit,
                text,
                position,
            } => writeln!(out, "{}", text.truncated(limit, position.into(), LEADER))?,
            Self::Chunk { size, items } => {
                for chunk in items.chunked(size.get()) {
                    writeln!(out, "{}", chunk.join(" "))?;
                }
            }
            Self::Uniq { ignore_case, items } => {
                let unique = if ignore_case {
                    items.uniques_by(|item| item.to_lowercase())
                } else {
                    items.uniques_by(Clone::clone)
                };
                for item in unique {
                    writeln!(out, "{item}")?;
                }
            }
            Self::Color { hex } => {
                let color = Rgba::from_hex(&hex)?;
                writeln!(
                    out,
                    "{color} r={:.3} g={:.3} b={:.3} a={:.3}",
                    color.red(),
                    color.green(),
                    color.blue(),
                    color.alpha()
                )?;
            }
            Self::Now { fractional } => {
                let now = Utc::now();
                let text = if fractional {
                    now.iso8601_with_fractional_seconds()
                } else {
                    now.iso8601()
                };
                writeln!(out, "{text}")?;
            }
            Self::Iso8601 { input } => {
                let text = if let Some(parsed) = parse_iso8601(&input) {
                    parsed.iso8601()
                } else if let Some(parsed) = parse_iso8601_with_fractional_seconds(&input) {
                    parsed.iso8601_with_fractional_seconds()
                } else {
                    return Err(anyhow!("not an ISO 8601 date-time: '{input}'"));
                };
                writeln!(out, "{text}")?;
            }
            Self::LossyColors { path } => {
                let colors: LossyList<Rgba> = read_json(&path)
                    .with_context(|| format!("could not load colours from {}", path.display()))?;
                if colors.skipped() > 0 {
                    warn!(
                        path = %path.display(),
                        skipped = colors.skipped(),
                        "Dropped malformed colours"
                    );
                }
                for color in &colors {
                    writeln!(out, "{color}")?;
                }
            }
            Self::Flag { region, language } => {
                writeln!(out, "{}", emoji_flag(region.as_deref(), language.as_deref()))?;
            }
        }
        Ok(())
    }
}
