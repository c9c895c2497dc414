//! chatscroll - Entry Point

use chatscroll::config::{self, CliOverrides, ResolvedConfig};
use chatscroll::model::AppError;
use chatscroll::source::{self, InputSource};
use chatscroll::view::{self, ColorConfig, ViewArgs};
use chatscroll::view_state::{CellMeasurer, Scrollback, ScrollbackOptions};
use clap::Parser;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Viewport width used when exporting without a terminal.
const EXPORT_WIDTH: u32 = 80;

/// chatscroll - scrollback viewer for IRC-style chat logs
#[derive(Parser, Debug)]
#[command(name = "chatscroll")]
#[command(version)]
#[command(about = "Scrollback viewer for chat logs with mIRC attribute codes")]
pub struct Args {
    /// Path to a chat log (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Scrollback capacity in visual lines (0 = unbounded)
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Break long lines anywhere instead of at word boundaries
    #[arg(long)]
    pub no_wordwrap: bool,

    /// Show [HH:MM:SS] time stamps
    #[arg(long)]
    pub timestamps: bool,

    /// Start with this search selected
    #[arg(short, long)]
    pub search: Option<String>,

    /// Write the scrollback to this file instead of opening the viewer
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export as JSON lines with time stamps
    #[arg(long, requires = "export")]
    pub jsonl: bool,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            capacity: self.capacity,
            no_wordwrap: self.no_wordwrap,
            timestamps: self.timestamps,
        }
    }
}

/// Defaults → Config File → Env Vars → CLI Args
fn resolve_config(args: &Args) -> Result<ResolvedConfig, AppError> {
    let config_file = config::load_config_with_precedence(args.config.clone())?;
    let merged = config::merge_config(config_file);
    let with_env = config::apply_env_overrides(merged);
    Ok(config::apply_cli_overrides(with_env, &args.overrides()))
}

/// Drain the source and write every line to `path`.
fn export(
    mut input: InputSource,
    options: ScrollbackOptions,
    path: &Path,
    jsonl: bool,
) -> Result<(), AppError> {
    let mut scrollback = Scrollback::new(CellMeasurer::new(), EXPORT_WIDTH, options);
    chatscroll::integration::load_all(&mut input, &mut scrollback)?;

    let writer = BufWriter::new(std::fs::File::create(path)?);
    if jsonl {
        scrollback.export_jsonl(writer)?;
    } else {
        scrollback.export_plain(writer)?;
    }
    info!(path = %path.display(), entries = scrollback.len(), jsonl, "exported scrollback");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = resolve_config(&args)?;

    chatscroll::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let input_source = source::detect_input_source(args.file.clone())?;
    let options = ScrollbackOptions::from(&config);

    if let Some(path) = &args.export {
        export(input_source, options, path, args.jsonl)?;
        return Ok(());
    }

    let view_args = ViewArgs {
        options,
        refresh: Duration::from_millis(config.refresh_ms),
        colors: ColorConfig::from_env_and_args(args.no_color),
        search: args.search.clone(),
    };
    view::run_with_source(input_source, view_args)?;

    Ok(())
}
