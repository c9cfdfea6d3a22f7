mod app;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use itx_network::config::{LayoutProfile, PipelineConfig, SearchMode};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Structural,
    Compact,
}

impl From<ProfileArg> for LayoutProfile {
    fn from(profile: ProfileArg) -> Self {
        match profile {
            ProfileArg::Structural => Self::Structural,
            ProfileArg::Compact => Self::Compact,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Relation payload files (JSON with `nodes` and `edges`).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON pipeline configuration; CLI flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    profile: Option<ProfileArg>,

    /// Strongest edges kept per node before the spanning tree is added.
    #[arg(long)]
    top_k: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Share of the canvas the laid-out network may span.
    #[arg(long)]
    padding: Option<f32>,

    #[arg(long)]
    fuzzy_search: bool,
}

impl Args {
    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let profile = self.profile.map(LayoutProfile::from);
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_path(path, profile)?,
            None => PipelineConfig::for_profile(profile.unwrap_or_default()),
        };

        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(padding) = self.padding {
            config.viewport.padding = padding;
        }
        if self.fuzzy_search {
            config.search = SearchMode::Fuzzy;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.pipeline_config()?;
    tracing::info!(
        datasets = args.inputs.len(),
        profile = config.profile.label(),
        top_k = config.top_k,
        seed = config.seed,
        "starting viewer"
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let datasets = args.inputs;
    eframe::run_native(
        "itx-network",
        options,
        Box::new(move |cc| Ok(Box::new(app::ItxNetworkApp::new(cc, datasets, config)))),
    )
    .map_err(|error| anyhow::anyhow!("viewer failed: {error}"))
}
