#![forbid(unsafe_code)]

use std::io::Write as _;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use futures::executor::block_on;
use serde::Serialize;
use vfeed_core::FeedConfig;
use vfeed_engine::{LazyList, PlainList, WindowController};

use crate::db::MemoryDb;
use crate::driver::{ScrollDriver, TraceLine};
use crate::error::{Result, SimError};
use crate::item::{FeedItem, feed_item};
use crate::template::{HtmlRenderer, template};
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Recycling window over a fixed slot pool.
    Virtual,
    /// Append one page per bottom crossing, never recycle.
    Lazy,
    /// Load and render everything at once.
    Plain,
}

#[derive(Debug, Parser)]
#[command(
    name = "vfeed-sim",
    about = "Scroll a simulated viewport over a recycled feed and print each transition",
    version
)]
pub struct Cli {
    /// Items in the in-memory dataset.
    #[arg(long, default_value_t = 1000)]
    pub items: usize,

    /// Items per fetch. Overrides the config file.
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Vertical gap between items in px. Overrides the config file.
    #[arg(long)]
    pub margin: Option<f64>,

    /// Viewport height in px.
    #[arg(long, default_value_t = 800.0)]
    pub height: f64,

    /// Number of scroll steps.
    #[arg(long, default_value_t = 40)]
    pub steps: usize,

    /// Scroll distance per step in px; negative scrolls up.
    #[arg(long, default_value_t = 400.0, allow_negative_numbers = true)]
    pub delta: f64,

    /// Scroll back to the top after the last step.
    #[arg(long)]
    pub round_trip: bool,

    /// Fail the first load that starts at this index.
    #[arg(long)]
    pub fail_at: Option<usize>,

    #[arg(long, value_enum, default_value_t = Mode::Virtual)]
    pub mode: Mode,

    /// Feed configuration in TOML or JSON.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Emit JSON lines instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Final state printed after the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub mode: &'static str,
    pub transitions: usize,
    pub errors: usize,
    pub window: Option<(usize, usize)>,
    pub elements: usize,
    pub created: usize,
    pub loads: usize,
}

pub fn run_from_env() -> Result<Summary> {
    let cli = Cli::parse();
    crate::init_tracing(cli.json);
    let stdout = std::io::stdout();
    run(&cli, &mut stdout.lock())
}

/// Resolve the feed configuration: file first, then flag overrides.
pub fn load_config(cli: &Cli) -> Result<FeedConfig> {
    let mut config = match &cli.config {
        Some(path) if path.extension().is_some_and(|ext| ext == "json") => {
            FeedConfig::from_json_file(path)?
        }
        Some(path) => FeedConfig::from_toml_file(path)?,
        None => FeedConfig::default(),
    };
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    if let Some(margin) = cli.margin {
        config.item_margin = margin;
    }
    Ok(config)
}

pub fn run(cli: &Cli, out: &mut impl std::io::Write) -> Result<Summary> {
    if !cli.delta.is_finite() {
        return Err(SimError::invalid(format!("delta must be finite, got {}", cli.delta)));
    }
    if !(cli.height.is_finite() && cli.height > 0.0) {
        return Err(SimError::invalid(format!("height must be > 0, got {}", cli.height)));
    }
    let config = load_config(cli)?;
    let db = MemoryDb::new(cli.items, config.page_size, feed_item);
    if let Some(start) = cli.fail_at {
        db.fail_at(start);
    }
    match cli.mode {
        Mode::Virtual => run_virtual(cli, config, &db, out),
        Mode::Lazy => run_lazy(cli, config, &db, out),
        Mode::Plain => run_plain(cli, &db, out),
    }
}

fn emit(cli: &Cli, out: &mut impl std::io::Write, line: &TraceLine) -> Result<()> {
    let written = if cli.json {
        writeln!(out, "{}", serde_json::to_string(line)?)
    } else {
        writeln!(
            out,
            "step={:<3} top={:<8.1} {:<6} {:<9} window={}..{} pad={:.1}/{:.1} extent={:.1}",
            line.step,
            line.scroll_top,
            line.edge,
            line.outcome,
            line.start,
            line.end,
            line.padding_top,
            line.padding_bottom,
            line.total_extent
        )
    };
    written.map_err(|err| SimError::invalid(format!("write failed: {err}")))
}

fn finish(cli: &Cli, out: &mut impl std::io::Write, summary: Summary) -> Result<Summary> {
    let written = if cli.json {
        writeln!(out, "{}", serde_json::to_string(&summary)?)
    } else {
        writeln!(
            out,
            "{}: {} transitions, {} errors, {} elements ({} created), {} loads",
            summary.mode,
            summary.transitions,
            summary.errors,
            summary.elements,
            summary.created,
            summary.loads
        )
    };
    written.map_err(|err| SimError::invalid(format!("write failed: {err}")))?;
    Ok(summary)
}

fn run_virtual(
    cli: &Cli,
    config: FeedConfig,
    db: &MemoryDb<FeedItem>,
    out: &mut impl std::io::Write,
) -> Result<Summary> {
    let controller = WindowController::new(config, db, HtmlRenderer::default())?;
    let mut driver = ScrollDriver::new(controller, Viewport::new(cli.height));
    let mut transitions = 0;
    let mut errors = 0;

    for line in block_on(driver.mount())? {
        emit(cli, out, &line)?;
        transitions += 1;
    }

    let back = if cli.round_trip { cli.steps } else { 0 };
    let deltas = std::iter::repeat_n(cli.delta, cli.steps).chain(std::iter::repeat_n(-cli.delta, back));
    for delta in deltas {
        match block_on(driver.scroll_by(delta)) {
            Ok(lines) => {
                for line in &lines {
                    emit(cli, out, line)?;
                }
                transitions += lines.len();
            }
            // A failed fetch leaves the window where it was; the next
            // crossing retries.
            Err(err) if err.is_retryable() => {
                tracing::warn!(message = "sim.transition_failed", error = %err);
                errors += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    let window = driver
        .cell()
        .with_controller(|c| (c.window().start(), c.window().end()));
    let created = driver
        .cell()
        .with_controller(|c| c.renderer().created())
        .unwrap_or_default();
    let elements = driver.unmount().len();
    finish(
        cli,
        out,
        Summary {
            mode: "virtual",
            transitions,
            errors,
            window,
            elements,
            created,
            loads: db.loads(),
        },
    )
}

fn run_lazy(
    cli: &Cli,
    config: FeedConfig,
    db: &MemoryDb<FeedItem>,
    out: &mut impl std::io::Write,
) -> Result<Summary> {
    let mut list = LazyList::new(config, db, HtmlRenderer::default())?;
    let mut transitions = 0;
    let mut errors = 0;
    for _ in 0..=cli.steps {
        if list.is_exhausted() {
            break;
        }
        match block_on(list.on_visibility(1.0)) {
            Ok(appended) => {
                transitions += 1;
                tracing::debug!(message = "sim.lazy", appended, len = list.len());
            }
            Err(err) if err.is_retryable() => {
                tracing::warn!(message = "sim.transition_failed", error = %err);
                errors += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
    let elements = list.len();
    finish(
        cli,
        out,
        Summary {
            mode: "lazy",
            transitions,
            errors,
            window: Some((0, elements)),
            elements,
            created: elements,
            loads: db.loads(),
        },
    )
}

fn run_plain(cli: &Cli, db: &MemoryDb<FeedItem>, out: &mut impl std::io::Write) -> Result<Summary> {
    let list = PlainList::new(db, template, cli.items);
    let markup = block_on(list.render())?;
    let elements = markup.matches("<section").count();
    if !cli.json {
        writeln!(out, "{} bytes of markup", markup.len())
            .map_err(|err| SimError::invalid(format!("write failed: {err}")))?;
    }
    finish(
        cli,
        out,
        Summary {
            mode: "plain",
            transitions: 1,
            errors: 0,
            window: Some((0, elements)),
            elements,
            created: elements,
            loads: db.loads(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vfeed-sim").chain(args.iter().copied()))
            .expect("args")
    }

    #[test]
    fn defaults_parse() {
        let cli = cli(&[]);
        assert_eq!(cli.items, 1000);
        assert_eq!(cli.mode, Mode::Virtual);
        assert_eq!(cli.page_size, None);
        let config = load_config(&cli).expect("config");
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn negative_delta_is_accepted() {
        let cli = cli(&["--delta", "-120", "--mode", "lazy"]);
        assert_eq!(cli.delta, -120.0);
        assert_eq!(cli.mode, Mode::Lazy);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("feed.toml");
        std::fs::write(&path, "page_size = 25\nitem_margin = 4.0\n").expect("write");
        let cli = cli(&["--config", path.to_str().expect("utf8"), "--page-size", "5"]);
        let config = load_config(&cli).expect("config");
        assert_eq!(config.page_size, 5);
        assert_eq!(config.item_margin, 4.0);
    }

    #[test]
    fn zero_page_size_fails_with_usage_code() {
        let cli = cli(&["--page-size", "0", "--steps", "1"]);
        let err = run(&cli, &mut Vec::new()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn plain_mode_renders_everything() {
        let cli = cli(&["--mode", "plain", "--items", "12"]);
        let summary = run(&cli, &mut Vec::new()).expect("run");
        assert_eq!(summary.elements, 12);
        assert_eq!(summary.loads, 1);
    }

    #[test]
    fn lazy_mode_stops_at_short_page() {
        let cli = cli(&["--mode", "lazy", "--items", "35", "--steps", "10"]);
        let summary = run(&cli, &mut Vec::new()).expect("run");
        assert_eq!(summary.elements, 35);
        assert_eq!(summary.loads, 4);
    }
}
