use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use iwac_network_explorer::app::{AppConfig, NetworkExplorerApp};
use iwac_network_explorer::graph::GraphConfig;
use iwac_network_explorer::network::SizeMetric;
use iwac_network_explorer::theme::ThemeKind;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding `networks/<name>.json`.
    #[arg(long, default_value = "static/data")]
    data_dir: PathBuf,
    #[arg(long, default_value = "global")]
    network: String,
    #[arg(long, value_enum, default_value_t = SizeMetric::Count)]
    size_by: SizeMetric,
    #[arg(long, default_value_t = 300)]
    debounce_ms: u64,
    #[arg(long, value_enum, default_value_t = ThemeKind::Dark)]
    theme: ThemeKind,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("iwac_network_explorer=info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::info!(
        data_dir = %args.data_dir.display(),
        network = %args.network,
        "starting explorer"
    );

    let config = AppConfig {
        data_dir: args.data_dir,
        network: args.network,
        size_metric: args.size_by,
        theme: args.theme,
        graph: GraphConfig {
            debounce: Duration::from_millis(args.debounce_ms),
            ..GraphConfig::default()
        },
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "IWAC network explorer",
        options,
        Box::new(move |cc| Ok(Box::new(NetworkExplorerApp::new(cc, config)))),
    )
    .map_err(|error| anyhow!("explorer window failed: {error}"))
}
