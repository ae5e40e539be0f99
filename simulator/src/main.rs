use anyhow::Context;
use clap::{CommandFactory, Parser};
use generator::profile::{write_district_file, GeneratorConfig};
use gui_bridge::bridge::GuiBridge;
use gui_bridge::sessions::SessionStore;
use rand::{rngs::StdRng, SeedableRng};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use stubblecore::session::view::DetectionPanel;
use stubblecore::session::{Action, DashboardView};
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::DashboardConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Stubble fire detection dashboard driver")]
struct Args {
    /// Load dashboard settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// District data file (JSON object keyed by district)
    #[arg(long)]
    data: Option<PathBuf>,
    /// Directory holding the optional demo images
    #[arg(long)]
    assets: Option<PathBuf>,
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Seed the score generator so runs replay
    #[arg(long)]
    seed: Option<u64>,
    /// Write a demo district data file to this path and exit
    #[arg(long)]
    generate_data: Option<PathBuf>,
    /// Run a single detection for --district and print the result
    #[arg(long, default_value_t = false)]
    offline: bool,
    #[arg(long)]
    district: Option<String>,
    /// Also notify authorities after the offline detection
    #[arg(long, default_value_t = false)]
    notify: bool,
    /// Serve the dashboard over HTTP until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

impl Args {
    fn has_mode(&self) -> bool {
        self.offline || self.serve || self.generate_data.is_some()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    if !args.has_mode() {
        Args::command()
            .print_help()
            .context("printing usage")?;
        anyhow::bail!("nothing to do: pass --offline, --serve or --generate-data");
    }

    let config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    }
    .with_overrides(args.data.clone(), args.assets.clone(), args.bind, args.seed);

    if let Some(path) = &args.generate_data {
        let generator = GeneratorConfig {
            seed: config.seed.unwrap_or_default(),
            ..Default::default()
        };
        let count = write_district_file(path, &generator)?;
        println!("Wrote {} districts to {}", count, path.display());
        return Ok(());
    }

    let runner = Arc::new(Runner::from_config(&config)?);
    log::info!(
        "loaded {} districts from {}",
        runner.table().len(),
        config.data_file.display()
    );

    if args.offline {
        run_offline(&runner, &config, args.district.as_deref(), args.notify)?;
    }

    if args.serve {
        let bridge = GuiBridge::new(runner.clone(), SessionStore::new(config.seed), config.bind)
            .context("starting dashboard bridge")?;
        bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
        bridge.publish_status(&format!(
            "shutting down with {} live sessions",
            bridge.live_sessions()
        ));
    }

    Ok(())
}

fn run_offline(
    runner: &Runner,
    config: &DashboardConfig,
    district: Option<&str>,
    notify: bool,
) -> anyhow::Result<()> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut state = runner.start_session();
    let mut notices = Vec::new();

    let mut actions = Vec::new();
    if let Some(district) = district {
        actions.push(Action::SelectDistrict(district.to_string()));
    }
    actions.push(Action::CheckFireActivity);
    if notify {
        actions.push(Action::NotifyAuthorities);
    }

    for action in actions {
        let outcome = runner
            .execute(&mut state, action.clone(), &mut rng)
            .with_context(|| format!("applying {:?}", action))?;
        notices.extend(outcome.notices);
    }

    print_view(&runner.view(&state, &notices));
    Ok(())
}

fn print_view(view: &DashboardView) {
    println!("{}", view.title);
    println!("District: {}", view.selected);
    if let Some(metrics) = &view.metrics {
        println!("AI Confidence: {}%", metrics.confidence_pct);
        println!("{}", metrics.aqi_summary());
    }
    match &view.detection {
        Some(DetectionPanel::Fire {
            headline,
            time,
            location,
            marker,
            status,
            ..
        }) => {
            println!("{headline}");
            println!("Time: {time} | {location}");
            println!("Marker: ({:.4}, {:.4}) {}", marker.lat, marker.lon, marker.popup);
            println!("{status}");
        }
        Some(DetectionPanel::Clear {
            headline,
            last_scan,
            ..
        }) => {
            println!("{headline}");
            println!("Last scan: {last_scan}");
        }
        None => {}
    }
    for notice in &view.notices {
        println!("[{:?}] {}", notice.level, notice.message);
    }
}
