use anyhow::{anyhow, Context, Result};
use bi_tree::{
    render, AnnotationTargets, ClientConfig, FixtureRecordSource, HttpRecordSource, RecordSource, ResultStore,
    TransformRequest, TransformService, TreeBuilder, TreeLabels,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bi-tree")]
#[command(about = "Build renderable trees from BI query decompositions")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    format: OutputFormat,

    /// Label preset: zh or en
    #[arg(long, default_value = "zh", global = true)]
    labels: String,

    /// JSON object mapping annotation keys to concept ids (defaults to the sample mapping)
    #[arg(long, global = true)]
    targets: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Build from a JSON fixture on disk
    Build {
        fixture: PathBuf,
    },
    /// Send a query to the transform endpoint (BI_API_URL) and build from the reply
    Fetch {
        query: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
    Outline,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let labels = TreeLabels::preset(&args.labels).ok_or_else(|| anyhow!("Unknown label preset: {}", args.labels))?;
    let targets = match &args.targets {
        Some(path) => load_targets(path)?,
        None => AnnotationTargets::sample(),
    };
    if targets.is_empty() {
        warn!("No annotation targets configured; notes must name concept ids directly");
    }
    let builder = TreeBuilder::new().with_labels(labels).with_annotation_targets(targets);

    let (source, request): (Box<dyn RecordSource>, TransformRequest) = match args.command {
        Command::Build { fixture } => {
            info!("Building from fixture {}", fixture.display());
            (Box::new(FixtureRecordSource::new(fixture)), TransformRequest { conversation: vec![] })
        }
        Command::Fetch { query } => {
            let config = ClientConfig::from_env()?;
            (Box::new(HttpRecordSource::new(config)?), TransformRequest::from_query(query))
        }
    };

    let service = TransformService::new(source, builder, ResultStore::new());
    let snapshot = service.refresh(&request).await?;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string(&snapshot.response)?,
        OutputFormat::Pretty => serde_json::to_string_pretty(&snapshot.response)?,
        OutputFormat::Outline => {
            let mut text = render::outline(&snapshot.response.root);
            text.push('\n');
            text.push_str(&snapshot.response.nl_steps.join("\n"));
            text
        }
    };
    println!("{}", output);

    Ok(())
}

fn load_targets(path: &Path) -> Result<AnnotationTargets> {
    let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let map: BTreeMap<String, String> =
        serde_json::from_str(&json).with_context(|| format!("{} must be a JSON object of strings", path.display()))?;
    Ok(map.into_iter().collect())
}
