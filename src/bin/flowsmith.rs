use anyhow::{Context as AnyhowContext, Result, bail};
use clap::{Parser, Subcommand};
use flowsmith::compiler::loader::{load_document, load_snapshot, save_snapshot};
use flowsmith::compiler::{Compiler, Decoder};
use flowsmith::export::{ExportConfig, ExportPipeline, HttpBuildService};
use flowsmith::graph::template::template_for;
use flowsmith::graph::{FileRef, NodeId, NodeType};
use flowsmith::store::Store;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML file with export settings
    #[arg(long, short, global = true, env = "FLOWSMITH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a saved graph into a configuration document
    Compile {
        /// Graph file (JSON, or YAML for .yaml/.yml)
        #[arg(long, short)]
        graph: PathBuf,

        /// Where to write the document (stdout when omitted)
        #[arg(long, short)]
        out: Option<PathBuf>,

        #[arg(long)]
        app_name: Option<String>,

        #[arg(long)]
        app_description: Option<String>,
    },

    /// Rebuild a graph from an exported configuration document
    Decode {
        /// Configuration document (JSON)
        #[arg(long, short)]
        document: PathBuf,

        /// Where to write the graph (stdout as JSON when omitted)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Attach a local file to a node's file fields
    Upload {
        /// Graph file to update in place
        #[arg(long, short)]
        graph: PathBuf,

        /// Local id of the node receiving the file
        #[arg(long, short)]
        node: String,

        /// File to attach
        #[arg(long, short)]
        file: PathBuf,

        /// Embed the file bytes instead of metadata only
        #[arg(long)]
        embed: bool,
    },

    /// List node types and their default fields
    Templates,

    /// Compile a graph, send it to the build service and save the artifact
    Export {
        #[arg(long, short)]
        graph: PathBuf,

        /// Build endpoint URL
        #[arg(long, short, env = "FLOWSMITH_ENDPOINT")]
        endpoint: Option<String>,

        /// Artifact destination (defaults to the configured artifact name)
        #[arg(long, short)]
        out: Option<PathBuf>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        #[arg(long)]
        app_name: Option<String>,

        #[arg(long)]
        app_description: Option<String>,
    },
}

fn load_config(path: Option<&Path>) -> Result<ExportConfig> {
    match path {
        Some(path) => ExportConfig::from_yaml_file(path),
        None => Ok(ExportConfig::default()),
    }
}

fn write_output(out: Option<&Path>, content: &str) -> Result<()> {
    match out {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Compile { graph, out, app_name, app_description } => {
            let snapshot = load_snapshot(&graph)?;
            info!("Loaded graph with {} nodes.", snapshot.nodes.len());

            let compiler = Compiler::new(
                app_name.as_deref().unwrap_or(&config.app_name),
                app_description.as_deref().unwrap_or(&config.app_description),
            );
            let document = compiler.compile_snapshot(&snapshot)?;
            write_output(out.as_deref(), &document.to_json()?)?;
        }

        Commands::Decode { document, out } => {
            let document = load_document(&document)?;
            let snapshot = Decoder::new().decode(&document)?;
            info!("Decoded {} nodes from '{}'.", snapshot.nodes.len(), document.app_name);

            match out {
                Some(path) => save_snapshot(&path, &snapshot)?,
                None => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            }
        }

        Commands::Upload { graph, node, file, embed } => {
            let mut store = Store::new();
            store.load(load_snapshot(&graph)?)?;

            let file_ref = FileRef::from_path(&file, embed)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let updated = store.upload_file(&NodeId::from(node.as_str()), file_ref)?;
            save_snapshot(&graph, &store.snapshot())?;
            info!("Attached {} to {} field(s) of node {}.", file.display(), updated, node);
        }

        Commands::Templates => {
            for node_type in NodeType::BUILTIN {
                let template = template_for(&node_type);
                println!("{} ({})", node_type, template.title);
                for field in &template.fields {
                    println!("  - {} [{}]", field.label, field.field_type);
                }
            }
        }

        Commands::Export { graph, endpoint, out, timeout, app_name, app_description } => {
            if let Some(endpoint) = endpoint {
                config.endpoint = endpoint;
            }
            if let Some(timeout) = timeout {
                config.timeout_secs = timeout;
            }
            if let Some(app_name) = app_name {
                config.app_name = app_name;
            }
            if let Some(app_description) = app_description {
                config.app_description = app_description;
            }
            if config.endpoint.is_empty() {
                bail!("No build endpoint configured");
            }

            let snapshot = load_snapshot(&graph)?;
            let compiler = Compiler::new(&config.app_name, &config.app_description);
            let out = out.unwrap_or_else(|| PathBuf::from(&config.artifact_name));

            info!("Exporting to {}", config.endpoint);
            let pipeline = ExportPipeline::new(HttpBuildService::new(&config)?);
            let artifact = pipeline.export_to(&compiler, &snapshot, &out).await?;
            info!("Saved {} bytes to {}", artifact.len(), out.display());
        }
    }

    Ok(())
}
