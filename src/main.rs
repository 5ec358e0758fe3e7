use std::{error::Error, path::PathBuf};

use clap::{Parser, Subcommand};
use log::{error, info};
use pitwall::{
    AppConfig, ChartKind, ChartRequest, FileSessionProvider, PitwallError, SessionProvider,
    build_chart,
    export::{ExportTable, export_table_csv, write_chart_json},
    request::{parse_drivers, session_key},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Root of the session file tree, overrides the configured one
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build chart data as JSON
    Chart {
        #[arg(value_enum)]
        kind: ChartKind,

        #[arg(short, long)]
        year: Option<i32>,

        /// Event name or round number
        #[arg(short, long)]
        event: Option<String>,

        /// FP1, FP2, FP3, Q, S or R
        #[arg(short, long)]
        session: Option<String>,

        /// Driver codes separated by spaces or commas
        #[arg(short, long)]
        drivers: Option<String>,

        #[arg(long)]
        team: Option<String>,

        /// Pre-season test number
        #[arg(long)]
        test: Option<u32>,

        /// Day of the pre-season test
        #[arg(long)]
        day: Option<u32>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export a raw table of a session as CSV
    #[command(alias = "export-laps")]
    Export {
        #[arg(short, long)]
        year: Option<i32>,

        /// Event name or round number
        #[arg(short, long)]
        event: Option<String>,

        /// FP1, FP2, FP3, Q, S or R
        #[arg(short, long)]
        session: Option<String>,

        /// Pre-season test number
        #[arg(long)]
        test: Option<u32>,

        /// Day of the pre-season test
        #[arg(long)]
        day: Option<u32>,

        #[arg(long, value_enum, default_value_t = ExportTable::Laps)]
        table: ExportTable,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the effective configuration
    Config {
        #[arg(long)]
        save: bool,
    },
}

fn resolve_year(year: Option<i32>, config: &AppConfig) -> Result<i32, PitwallError> {
    year.or(config.default_year)
        .ok_or_else(|| PitwallError::InvalidUserInput {
            field: "year".to_string(),
            reason: "pass --year or set default_year in the config file".to_string(),
        })
}

fn provider(config: &AppConfig) -> Result<FileSessionProvider, PitwallError> {
    let root = config.resolved_data_dir()?;
    info!("Reading sessions from {:?}", root);
    Ok(FileSessionProvider::new(root))
}

#[allow(clippy::too_many_arguments)]
fn chart(
    config: &AppConfig,
    kind: ChartKind,
    year: Option<i32>,
    event: Option<&str>,
    session: Option<&str>,
    drivers: Option<&str>,
    team: Option<String>,
    test: Option<u32>,
    day: Option<u32>,
    output: Option<&PathBuf>,
) -> Result<(), PitwallError> {
    let year = resolve_year(year, config)?;
    let session = if kind.is_season_chart() {
        None
    } else {
        session_key(year, event, session, test, day)?
    };
    let request = ChartRequest {
        kind,
        year,
        session,
        drivers: drivers.map(parse_drivers).unwrap_or_default(),
        team,
    };
    let chart = build_chart(&request, &provider(config)?, &config.analysis)?;
    write_chart_json(output, &chart)
}

#[allow(clippy::too_many_arguments)]
fn export(
    config: &AppConfig,
    year: Option<i32>,
    event: Option<&str>,
    session: Option<&str>,
    test: Option<u32>,
    day: Option<u32>,
    table: ExportTable,
    output: &PathBuf,
) -> Result<(), PitwallError> {
    let year = resolve_year(year, config)?;
    let key = session_key(year, event, session, test, day)?.ok_or_else(|| {
        PitwallError::InvalidUserInput {
            field: "session".to_string(),
            reason: "pass --event and --session, or --test and --day".to_string(),
        }
    })?;
    let session = provider(config)?.load_session(&key)?;
    export_table_csv(output, &session, table)?;
    Ok(())
}

fn show_config(config: &AppConfig, save: bool) -> Result<(), PitwallError> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| PitwallError::ConfigSerializeError { source: e })?;
    println!("{}", content);
    if save {
        let path = config.save()?;
        info!("Config saved to {:?}", path);
    }
    Ok(())
}

fn main() {
    colog::init();

    let cli = Args::parse();
    let mut config = AppConfig::from_local_file().unwrap_or_default();
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = Some(data_dir);
    }

    let result = match &cli.command {
        Commands::Chart {
            kind,
            year,
            event,
            session,
            drivers,
            team,
            test,
            day,
            output,
        } => chart(
            &config,
            *kind,
            *year,
            event.as_deref(),
            session.as_deref(),
            drivers.as_deref(),
            team.clone(),
            *test,
            *day,
            output.as_ref(),
        ),
        Commands::Export {
            year,
            event,
            session,
            test,
            day,
            table,
            output,
        } => export(
            &config,
            *year,
            event.as_deref(),
            session.as_deref(),
            *test,
            *day,
            *table,
            output,
        ),
        Commands::Config { save } => show_config(&config, *save),
    };

    if let Err(e) = result {
        error!("{}", e);
        if let Some(source) = e.source() {
            error!("Caused by: {}", source);
        }
        std::process::exit(1);
    }
}
