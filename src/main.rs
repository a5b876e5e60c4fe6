use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use serde::Serialize;

use f1stats::aggregate::{
    ConstructorMetric, ConstructorRaceScore, ConstructorRankMetric, EngineMetric, TyreMetric,
};
use f1stats::normalize::normalize_key;
use f1stats::season::{DriverRaceStanding, FastestLapView, PodiumEntry};
use f1stats::writer::{write_json, write_json_lines};
use f1stats::{
    AppConfig, CsvDirectoryLoader, Dashboard, RaceDetailsPresenter, SectionView, StatsError,
    TableLoader,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Directory holding the CSV and GeoJSON sources, overrides the config file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Season calendar with resolved countries
    Season {
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Per-year driver metrics
    Metrics {
        #[arg(long = "driver")]
        drivers: Vec<String>,
    },
    /// Fastest lap, podium and standings of one race
    Race {
        #[arg(short, long)]
        year: i32,

        #[arg(short, long)]
        round: u32,
    },
    /// Comparison series for selected constructors
    Constructors {
        #[arg(long = "id", required = true)]
        ids: Vec<String>,

        #[arg(short, long, value_enum, default_value_t = ConstructorMetric::Points)]
        metric: ConstructorMetric,
    },
    Rankings {
        #[command(subcommand)]
        ranking: Rankings,
    },
    /// Write every driver metric value as JSON lines
    Export {
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum Rankings {
    Champions,
    Tyres {
        #[arg(short, long, value_enum, default_value_t = TyreMetric::RaceWins)]
        metric: TyreMetric,
    },
    Engines {
        #[arg(short, long, value_enum, default_value_t = EngineMetric::RaceWins)]
        metric: EngineMetric,
    },
    Constructors {
        #[arg(short, long, value_enum, default_value_t = ConstructorRankMetric::TotalRaceWins)]
        metric: ConstructorRankMetric,
    },
}

#[derive(Serialize)]
struct Stage<'a, T> {
    stage: &'a str,
    view: T,
}

/// Prints every race details stage as it is presented
struct JsonPresenter<W: Write> {
    out: W,
    error: Option<StatsError>,
}

impl<W: Write> JsonPresenter<W> {
    fn emit<T: Serialize>(&mut self, stage: &str, view: T) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = write_json(&mut self.out, &Stage { stage, view }) {
            self.error = Some(e);
        }
    }
}

impl<W: Write> RaceDetailsPresenter for JsonPresenter<W> {
    async fn present_fastest_lap(&mut self, view: SectionView<FastestLapView>) {
        self.emit("fastestLap", view);
    }

    async fn present_podium(&mut self, view: SectionView<Vec<PodiumEntry>>) {
        self.emit("podium", view);
    }

    async fn present_standings(
        &mut self,
        drivers: SectionView<Vec<DriverRaceStanding>>,
        constructors: SectionView<Vec<ConstructorRaceScore>>,
    ) {
        self.emit("driverStandings", drivers);
        self.emit("constructorStandings", constructors);
    }
}

async fn execute(dashboard: &mut Dashboard, command: Commands) -> Result<(), StatsError> {
    let mut out = io::stdout().lock();
    match command {
        Commands::Season { year } => {
            let year = year.unwrap_or(dashboard.config().default_season);
            write_json(&mut out, &dashboard.season(year).await)
        }
        Commands::Metrics { drivers } => {
            let drivers: Vec<String> = drivers.iter().map(|d| normalize_key(d)).collect();
            let view = dashboard.driver_metrics().await.map(|metrics| {
                if drivers.is_empty() {
                    metrics
                } else {
                    metrics.restricted_to(&drivers)
                }
            });
            write_json(&mut out, &view)
        }
        Commands::Race { year, round } => {
            let mut presenter = JsonPresenter {
                out: &mut out,
                error: None,
            };
            dashboard.race_details(year, round, &mut presenter).await;
            match presenter.error {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
        Commands::Constructors { ids, metric } => {
            dashboard.constructor_selection_mut().set_selection(&ids)?;
            write_json(&mut out, &dashboard.constructor_comparison(metric).await)
        }
        Commands::Rankings { ranking } => match ranking {
            Rankings::Champions => write_json(&mut out, &dashboard.champions().await),
            Rankings::Tyres { metric } => write_json(&mut out, &dashboard.tyres(metric).await),
            Rankings::Engines { metric } => write_json(&mut out, &dashboard.engines(metric).await),
            Rankings::Constructors { metric } => {
                write_json(&mut out, &dashboard.constructors_overview(metric).await)
            }
        },
        Commands::Export { output } => match dashboard.driver_metrics().await {
            SectionView::Ready(metrics) => {
                let written = write_json_lines(&output, &metrics.rows())?;
                info!("Exported {} metric rows", written);
                Ok(())
            }
            placeholder => write_json(&mut out, &placeholder),
        },
    }
}

fn run(cli: Args) -> Result<(), StatsError> {
    let mut config = match AppConfig::from_local_file() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            warn!("Using default config: {}", e);
            AppConfig::default()
        }
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    info!("Reading data from {:?}", config.data_dir);

    let loader: Arc<dyn TableLoader> = Arc::new(CsvDirectoryLoader::new(config.data_dir.clone()));
    let mut dashboard = Dashboard::new(loader, config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| StatsError::RuntimeError { source: e })?;
    runtime.block_on(execute(&mut dashboard, cli.command))
}

fn main() {
    colog::init();

    let cli = Args::parse();
    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
