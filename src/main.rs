use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use eframe::egui;

use salary_viz::app::{SalaryVizApp, TITLE};
use salary_viz::chart::palette::PaletteChoice;
use salary_viz::config::{AppConfig, Theme};
use salary_viz::data::filter::SortOrder;
use salary_viz::data::loader::{DataSource, load_source};
use salary_viz::data::model::SalaryDataset;
use salary_viz::error::LoadError;
use salary_viz::export::{ExportKind, write_export};
use salary_viz::report::build_report;
use salary_viz::secrets::Secrets;
use salary_viz::server::{self, ServerState, parse_departments};
use salary_viz::state::{AppState, ViewState};
use salary_viz::ui;

/// Department salary summaries: average with min/max ranges.
#[derive(Parser)]
#[command(name = "salary-viz", version)]
struct Cli {
    /// Preferences file (defaults to ./.salary-viz/config.toml, then ~/.salary-viz/config.toml).
    #[arg(long, global = true, env = "SALARY_VIZ_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the viewer window (or serve it over HTTP with --headless).
    Run(RunArgs),
    /// Run one pass without a UI and write the requested files.
    Export(ExportArgs),
}

#[derive(Args, Default)]
struct RunArgs {
    /// CSV, JSON or Parquet file with Department, Average_Salary, Min_Salary, Max_Salary.
    data: Option<PathBuf>,

    /// Serve the report over HTTP instead of opening a window.
    #[arg(long)]
    headless: bool,

    /// Port for headless mode.
    #[arg(long, env = "SALARY_VIZ_PORT")]
    port: Option<u16>,

    /// Address to bind in headless mode.
    #[arg(long)]
    address: Option<String>,
}

#[derive(Args)]
struct ExportArgs {
    /// CSV, JSON or Parquet file; the built-in example when omitted.
    data: Option<PathBuf>,

    /// Write the bar chart as PNG (needs the png-export feature).
    #[arg(long)]
    png: Option<PathBuf>,

    /// Write the interactive bar chart as HTML.
    #[arg(long)]
    html: Option<PathBuf>,

    /// Write the simulated violin chart as HTML.
    #[arg(long)]
    violin_html: Option<PathBuf>,

    /// Write the current view as CSV.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// avg_desc, avg_asc or department.
    #[arg(long, default_value = "avg_desc")]
    sort: SortOrder,

    /// plotly, blues, viridis or mako.
    #[arg(long, default_value = "plotly")]
    palette: PaletteChoice,

    /// Comma-separated departments to keep (all when omitted).
    #[arg(long)]
    departments: Option<String>,

    /// Hide the min/max error bars.
    #[arg(long)]
    no_error_bars: bool,

    /// Simulated samples per department (50..=2000, step 50).
    #[arg(long)]
    samples: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let (config, config_path) = AppConfig::discover(cli.config.as_deref())?;
    if let Some(path) = &config_path {
        log::debug!("Config loaded from {}", path.display());
    }
    let theme = config.theme()?;
    let secrets = Secrets::load_default()?;

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => {
            let source = config.data_source(args.data.clone(), &secrets);
            if args.headless || config.server.headless {
                run_headless(&config, &args, source, theme)
            } else {
                run_window(source, theme)
            }
        }
        Command::Export(args) => {
            let source = config.data_source(args.data.clone(), &secrets);
            run_export(args, source, theme)
        }
    }
}

fn load_dataset(source: &DataSource) -> Result<SalaryDataset, LoadError> {
    SalaryDataset::from_table(&load_source(source)?)
}

fn run_window(source: DataSource, theme: Theme) -> anyhow::Result<()> {
    let mut state = AppState::new(theme);
    state.load(source);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        options,
        Box::new(move |cc| {
            ui::theme::apply(&cc.egui_ctx, &theme);
            Ok(Box::new(SalaryVizApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("viewer window failed: {e}"))
}

fn run_headless(
    config: &AppConfig,
    args: &RunArgs,
    source: DataSource,
    theme: Theme,
) -> anyhow::Result<()> {
    let port = args.port.unwrap_or(config.server.port);
    let address = args.address.as_deref().unwrap_or(&config.server.address);
    let addr: SocketAddr = format!("{address}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {address}:{port}"))?;

    let data = load_dataset(&source).map_err(|e| {
        log::error!("Failed to load {source}: {e:#}");
        format!("{e:#}")
    });
    if let Ok(dataset) = &data {
        log::info!("Loaded {} departments from {source}", dataset.len());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;
    runtime.block_on(server::serve(addr, ServerState::new(data, theme)))
}

fn run_export(args: ExportArgs, source: DataSource, theme: Theme) -> anyhow::Result<()> {
    let outputs: Vec<(ExportKind, PathBuf)> = [
        (ExportKind::Png, args.png),
        (ExportKind::BarHtml, args.html),
        (ExportKind::ViolinHtml, args.violin_html),
        (ExportKind::Csv, args.csv),
    ]
    .into_iter()
    .filter_map(|(kind, path)| path.map(|p| (kind, p)))
    .collect();
    if outputs.is_empty() {
        bail!("nothing to export: pass at least one of --png, --html, --violin-html, --csv");
    }

    let dataset = load_dataset(&source).with_context(|| format!("loading {source}"))?;

    let mut view = ViewState {
        sort: args.sort,
        palette: args.palette,
        show_error_bars: !args.no_error_bars,
        show_simulation: outputs.iter().any(|(kind, _)| *kind == ExportKind::ViolinHtml),
        ..ViewState::default()
    };
    if let Some(list) = &args.departments {
        view.selected_departments = parse_departments(list);
    }
    if let Some(samples) = args.samples {
        view.set_samples(samples);
    }

    let report = build_report(&dataset, &view);
    log::info!(
        "{} of {} departments in view",
        report.records.len(),
        dataset.len()
    );

    for (kind, path) in outputs {
        write_export(&report, &theme, kind, &path)
            .with_context(|| format!("exporting {kind} to {}", path.display()))?;
        log::info!("Wrote {kind} to {}", path.display());
    }
    Ok(())
}
