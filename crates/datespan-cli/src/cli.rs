use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use datespan_engine::{
    parse_timezone, DayFilter, DurationUnit, KeyValueStore, MemoryStore, Preset, ResultLog, Slot,
    Widget, WidgetOptions,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::store::FileStore;

#[derive(Debug, Parser)]
#[command(
    name = "datespan",
    version,
    about = "Count weekday-filtered days between two dates"
)]
pub struct Cli {
    /// Path to a config.toml (default: <config dir>/datespan/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the result history
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// IANA timezone dates are interpreted in (e.g. Europe/Berlin)
    #[arg(long, global = true)]
    pub tz: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less log output (-q errors only)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Count the days between two dates and record the result
    Calc {
        first: String,
        second: String,

        /// Which weekdays count: all, work, weekends
        #[arg(long)]
        days: Option<DayFilter>,

        /// Unit of the result: seconds, minutes, hours, days
        #[arg(long)]
        unit: Option<DurationUnit>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Do not add the result to the history
        #[arg(long)]
        no_save: bool,
    },
    /// Print the second date a preset produces from FIRST
    Preset { first: String, preset: Preset },
    /// Print the recorded results, newest first
    History {
        #[arg(long)]
        json: bool,
    },
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 1 {
        "error"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    init_tracing(cli.verbose, cli.quiet)?;

    let config = Config::load(cli.config.as_deref())?;
    let tz_name = cli
        .tz
        .clone()
        .or_else(|| config.timezone.clone())
        .unwrap_or_else(|| "UTC".to_string());
    let options = WidgetOptions {
        timezone: parse_timezone(&tz_name)?,
        separator: config.separator.unwrap_or('.'),
    };
    debug!(
        config = ?config.loaded_from,
        timezone = %options.timezone,
        separator = %options.separator,
        "widget options"
    );

    match cli.command {
        Command::Calc {
            first,
            second,
            days,
            unit,
            json,
            no_save,
        } => {
            let filter = days.or(config.defaults.days).unwrap_or_default();
            let unit = unit.or(config.defaults.unit).unwrap_or_default();
            let request = CalcRequest {
                first: &first,
                second: &second,
                filter,
                unit,
                json,
            };
            if no_save {
                calc(Widget::new(MemoryStore::new(), options), &request)
            } else {
                let store = open_store(cli.data_dir, &config)?;
                calc(Widget::new(store, options), &request)
            }
        }
        Command::Preset { first, preset } => {
            let mut widget = Widget::new(MemoryStore::new(), options);
            if !widget.validate_input(Slot::First, &first).is_valid() {
                bail!("'{first}' is not a valid date");
            }
            let text = widget
                .apply_preset(preset)?
                .ok_or_else(|| anyhow!("preset '{preset}' produced no date"))?;
            println!("{text}");
            Ok(())
        }
        Command::History { json } => {
            let store = open_store(cli.data_dir, &config)?;
            let mut log = ResultLog::new(store);
            let entries = log.load_all()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in entries {
                    println!("{entry}");
                }
            }
            Ok(())
        }
    }
}

struct CalcRequest<'a> {
    first: &'a str,
    second: &'a str,
    filter: DayFilter,
    unit: DurationUnit,
    json: bool,
}

fn calc<S: KeyValueStore>(mut widget: Widget<S>, request: &CalcRequest<'_>) -> anyhow::Result<()> {
    if let Err(err) = widget.restore() {
        warn!(error = %err, "starting with an empty history");
    }

    widget.validate_input(Slot::First, request.first);
    widget.validate_input(Slot::Second, request.second);

    let result = widget
        .calculate(request.filter, request.unit)
        .with_context(|| format!("cannot evaluate '{}' → '{}'", request.first, request.second))?;

    if request.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.message);
    }
    Ok(())
}

fn open_store(data_dir: Option<PathBuf>, config: &Config) -> anyhow::Result<FileStore> {
    let dir = data_dir
        .or_else(|| config.data_dir.clone())
        .or_else(|| dirs::data_dir().map(|d| d.join("datespan")))
        .ok_or_else(|| anyhow!("no data directory; pass --data-dir"))?;
    FileStore::open(&dir)
}
