// ==========================================
// OCIP/CCIP 合规评分系统 - 命令行入口
// ==========================================
// 命令: report weekly|deadlines|financial
//       sync dashboard|alerts|full
//       detail <program_id>
// 输出: stdout (console / json / csv), 日志走 stderr
// ==========================================

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

use wrapup_compliance::app::{render, resolve_db_path, AppState, OutputFormat};
use wrapup_compliance::config::{env_value, DEFAULT_WEB_ROOT, LOCALE_ENV, WEB_ROOT_ENV};
use wrapup_compliance::i18n::{self, t_with_args};
use wrapup_compliance::logging::{self, LogFormat};

#[derive(Parser, Debug)]
#[command(
    name = "wrapup-compliance",
    about = "OCIP/CCIP wrap-up compliance scoring, reporting and dashboard sync",
    version
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Path to the wrap-up manager database
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Web portal root directory (JSON files are written under <web_root>/api)
    #[arg(long, global = true)]
    web_root: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Console)]
    output: OutputFormat,

    /// Evaluation date (YYYY-MM-DD), defaults to today
    #[arg(long, global = true, value_parser = parse_date)]
    as_of: Option<NaiveDate>,

    /// Message locale (en, zh-CN)
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compliance reports
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
    /// Web portal data sync
    Sync {
        #[command(subcommand)]
        command: SyncCommand,
    },
    /// Print the detail document of one program
    Detail {
        /// Program id, e.g. WU-2026-001
        program_id: String,
    },
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Weekly compliance scorecard
    Weekly,
    /// Payroll deadlines due in the check horizon
    Deadlines,
    /// Financial impact summary
    Financial,
}

#[derive(Subcommand, Debug)]
enum SyncCommand {
    /// Write the dashboard status document
    Dashboard,
    /// Generate alerts only (no files written)
    Alerts,
    /// Dashboard status plus one detail document per program
    Full,
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date {:?}: {}", s, e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global = &cli.global;

    let log_format = match global.log_format.as_deref() {
        Some(raw) => match LogFormat::parse(raw) {
            Some(format) => format,
            None => bail!("unknown log format: {}", raw),
        },
        None => LogFormat::from_env(),
    };
    logging::init(log_format);

    let locale = global
        .locale
        .clone()
        .or_else(|| env_value(LOCALE_ENV))
        .unwrap_or_else(|| "en".to_string());
    i18n::set_locale(&locale);

    let as_of = global.as_of.unwrap_or_else(|| Local::now().date_naive());
    let web_root = global
        .web_root
        .clone()
        .or_else(|| env_value(WEB_ROOT_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WEB_ROOT));

    tracing::info!(
        version = wrapup_compliance::VERSION,
        %as_of,
        web_root = %web_root.display(),
        "{}",
        wrapup_compliance::APP_NAME
    );

    let resolved = resolve_db_path(global.db_path.as_deref())?;
    let state = AppState::new(resolved, web_root).context("failed to initialize application state")?;

    let output = run(&state, &cli.command, global.output, as_of)?;
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn run(state: &AppState, command: &Command, format: OutputFormat, as_of: NaiveDate) -> Result<String> {
    let text = match command {
        Command::Report { command } => match command {
            ReportCommand::Weekly => {
                let report = state.report_api.weekly_report(as_of)?;
                match format {
                    OutputFormat::Console => render::weekly_console(&report),
                    OutputFormat::Json => render::to_json(&report)?,
                    OutputFormat::Csv => render::weekly_csv(&report)?,
                }
            }
            ReportCommand::Deadlines => {
                let check = state.report_api.check_deadlines(as_of)?;
                match format {
                    OutputFormat::Console => render::deadlines_console(&check),
                    OutputFormat::Json => render::to_json(&check)?,
                    OutputFormat::Csv => render::deadlines_csv(&check)?,
                }
            }
            ReportCommand::Financial => {
                let summary = state.report_api.financial_summary(as_of)?;
                match format {
                    OutputFormat::Console => render::financial_console(&summary),
                    OutputFormat::Json => render::to_json(&summary)?,
                    OutputFormat::Csv => render::financial_csv(&summary)?,
                }
            }
        },
        Command::Sync { command } => match command {
            SyncCommand::Alerts => {
                let alerts = state.sync_api.generate_alerts(as_of)?;
                match format {
                    OutputFormat::Console => render::alerts_console(&alerts),
                    OutputFormat::Json => render::to_json(&alerts)?,
                    OutputFormat::Csv => render::alerts_csv(&alerts)?,
                }
            }
            SyncCommand::Dashboard => {
                let dashboard = state.sync_api.sync_dashboard(as_of)?;
                let path = state.sync_api.dashboard_path().display().to_string();
                match format {
                    OutputFormat::Json => render::to_json(&dashboard)?,
                    OutputFormat::Csv => render::alerts_csv(&dashboard.alerts)?,
                    OutputFormat::Console => render::dashboard_console(&dashboard, &path),
                }
            }
            SyncCommand::Full => {
                let result = state.sync_api.full_sync(as_of)?;
                let path = state.sync_api.dashboard_path().display().to_string();
                match format {
                    OutputFormat::Json => render::to_json(&result)?,
                    OutputFormat::Csv => render::alerts_csv(&result.dashboard.alerts)?,
                    OutputFormat::Console => {
                        let mut text = t_with_args(
                            "console.full_sync_done",
                            &[("count", &result.dashboard.programs.len().to_string())],
                        );
                        text.push('\n');
                        text.push_str(&render::dashboard_console(&result.dashboard, &path));
                        text
                    }
                }
            }
        },
        Command::Detail { program_id } => {
            let Some(detail) = state.sync_api.program_detail(program_id, as_of)? else {
                bail!(t_with_args("console.program_not_found", &[("id", program_id)]));
            };
            match format {
                OutputFormat::Console => render::detail_console(&detail),
                OutputFormat::Json | OutputFormat::Csv => render::to_json(&detail)?,
            }
        }
    };
    Ok(text)
}
