//! Note Graph - command line front end
//!
//! Every command prints JSON on stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use note_graph::extract::NoteExtractor;
use note_graph::graph::{GraphCompiler, IdentityStrategy, LocalOpsFactory};
use note_graph::publish::{
    ContentStore, FsContentStore, FsTransactionOutbox, HttpAnchorService, NotePublisher,
    PublicationCoordinator, PublishDebouncer, PublishRequest,
};
use note_graph::relations::{infer_relationships, RelationshipGraph};
use note_graph::tags::TagIndex;
use note_graph::vault::FsVaultStore;
use note_graph::{BatchOutcome, Config};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "note-graph")]
#[command(about = "Compile a Markdown note vault into an entity/relation graph")]
struct Cli {
    /// Path to a YAML config file (defaults to ./config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Vault root (overrides config.yaml and NOTE_GRAPH_VAULT_PATH)
    #[arg(long, global = true)]
    vault: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one note
    Extract {
        /// Vault-relative note path
        note: String,
    },

    /// Query or edit the tag index
    Tags {
        #[command(subcommand)]
        command: TagCommands,
    },

    /// Infer relationships between all notes
    Relations {
        /// Number of most connected notes to report
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Compile one note into graph ops
    Compile {
        note: String,

        #[arg(long)]
        no_tags: bool,

        #[arg(long)]
        no_links: bool,

        /// Derive ids from note path, tag names and link targets
        #[arg(long)]
        stable_ids: bool,
    },

    /// Compile one note and write its op log to a local content store
    Export {
        note: String,

        /// Output directory for op log files
        #[arg(long)]
        out: PathBuf,
    },

    /// Publish notes: store op logs, fetch anchor calldata, queue transactions
    Publish {
        /// Vault-relative note paths
        notes: Vec<String>,

        /// Publish every note outside the excluded folders
        #[arg(long, conflicts_with_all = ["notes", "stdin"])]
        all: bool,

        /// Read note paths from stdin, one per line, debouncing repeats
        #[arg(long, conflicts_with = "notes")]
        stdin: bool,

        /// Directory for op logs (`ops/`) and the transaction outbox (`transactions/`)
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum TagCommands {
    /// All tags, optionally only those used at least `min_count` times
    List {
        #[arg(long, default_value = "0")]
        min_count: usize,
    },
    /// Aggregate tag statistics
    Stats,
    /// Tags co-occurring with a tag
    Related { tag: String },
    /// Suggest existing tags for a note
    Suggest { note: String },
    /// Parent/child view of nested tags
    Hierarchy,
    /// Most frequent tag pairs
    Pairs {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Rename a tag in every note
    Rename { old: String, new: String },
    /// Remove a tag from every note
    Delete { tag: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing on stderr so stdout stays machine readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,note_graph=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;
    if let Some(vault) = cli.vault {
        config.vault_path = vault;
    }
    let vault = Arc::new(FsVaultStore::new(config.vault_path.clone()));
    tracing::debug!(vault = %config.vault_path.display(), "Using vault");

    match cli.command {
        Commands::Extract { note } => {
            let note = NoteExtractor::new(vault).extract_path(&note).await?;
            print_json(&note)
        }
        Commands::Tags { command } => run_tags(&config, vault, command).await,
        Commands::Publish {
            notes,
            all,
            stdin,
            out,
        } => run_publish(&config, vault, notes, all, stdin, out).await,
        Commands::Relations { top } => run_relations(&config, vault, top).await,
        Commands::Compile {
            note,
            no_tags,
            no_links,
            stable_ids,
        } => {
            let mut options = config.compile_options();
            options.include_tags &= !no_tags;
            options.include_links &= !no_links;
            if stable_ids {
                options.identity = IdentityStrategy::PathKeyed;
            }

            let note = NoteExtractor::new(vault).extract_path(&note).await?;
            let compiled = GraphCompiler::new(Arc::new(LocalOpsFactory::new()))
                .compile(&note, &options);
            print_json(&compiled)
        }
        Commands::Export { note, out } => {
            let note = NoteExtractor::new(vault).extract_path(&note).await?;
            let compiled = GraphCompiler::new(Arc::new(LocalOpsFactory::new()))
                .compile(&note, &config.compile_options());
            let request = PublishRequest {
                name: note.title.clone(),
                ops: compiled.flatten_ops(),
                author_address: config.author_address.clone(),
                network: config.network,
            };

            let store = FsContentStore::new(out);
            let content_id = store.publish_operation_log(&request).await?;
            let file = store.path_for(&content_id)?;
            print_json(&json!({
                "content_id": content_id,
                "file": file.display().to_string(),
                "ops": request.ops.len(),
            }))
        }
    }
}

async fn run_tags(config: &Config, vault: Arc<FsVaultStore>, command: TagCommands) -> Result<()> {
    let index = TagIndex::with_ttl(vault, config.tag_cache_ttl);

    match command {
        TagCommands::List { min_count } => print_json(&index.tags_by_frequency(min_count).await),
        TagCommands::Stats => print_json(&index.statistics().await),
        TagCommands::Related { tag } => print_json(&index.related_tags(&tag).await),
        TagCommands::Suggest { note } => {
            let suggestions = index
                .suggest_tags_for(&note)
                .await
                .with_context(|| format!("Failed to suggest tags for {}", note))?;
            print_json(&suggestions)
        }
        TagCommands::Hierarchy => print_json(&index.hierarchy().await),
        TagCommands::Pairs { limit } => print_json(&index.top_tag_pairs(limit).await),
        TagCommands::Rename { old, new } => {
            let outcome = index.rename_tag(&old, &new).await?;
            print_outcome(&outcome)
        }
        TagCommands::Delete { tag } => {
            let outcome = index.delete_tag(&tag).await?;
            print_outcome(&outcome)
        }
    }
}

async fn run_publish(
    config: &Config,
    vault: Arc<FsVaultStore>,
    notes: Vec<String>,
    all: bool,
    stdin: bool,
    out: PathBuf,
) -> Result<()> {
    let settings = config.publish_settings()?;
    let anchor = HttpAnchorService::new(settings.api_url(), settings.network)?;
    let outbox = FsTransactionOutbox::new(out.join("transactions"), &settings.author_address);
    let coordinator = Arc::new(
        PublicationCoordinator::new(
            settings,
            vault,
            Arc::new(LocalOpsFactory::new()),
            Arc::new(FsContentStore::new(out.join("ops"))),
            Arc::new(anchor),
            Arc::new(outbox),
        )
        .with_options(config.compile_options())
        .with_excluded_folders(config.excluded_folders.clone()),
    );

    if all {
        let outcome = coordinator.publish_vault().await?;
        return print_json(&json!({
            "published": outcome.items,
            "failures": failures_json(&outcome),
        }));
    }

    if stdin {
        let debouncer = PublishDebouncer::new(coordinator.clone(), config.debounce_ms);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut triggers = 0;
        while let Some(line) = lines.next_line().await? {
            let path = line.trim();
            if !path.is_empty() {
                debouncer.trigger(path);
                triggers += 1;
            }
        }
        debouncer.shutdown().await;
        return print_json(&json!({ "triggers": triggers }));
    }

    let mut receipts = Vec::with_capacity(notes.len());
    for note in &notes {
        let receipt = coordinator
            .publish_note(note)
            .await
            .with_context(|| format!("Failed to publish {}", note))?;
        receipts.push(receipt);
    }
    print_json(&receipts)
}

async fn run_relations(config: &Config, vault: Arc<FsVaultStore>, top: usize) -> Result<()> {
    let notes = NoteExtractor::new(vault)
        .extract_vault(&config.excluded_folders)
        .await;
    let edges = infer_relationships(&notes.items);
    let graph = RelationshipGraph::build(&notes.items, &edges);

    print_json(&json!({
        "notes": graph.note_count(),
        "edge_counts": graph.edge_counts(),
        "edges": edges,
        "clusters": graph.connected_components(),
        "most_connected": graph.most_connected(top),
        "isolated": graph.isolated_notes(),
        "failures": failures_json(&notes),
    }))
}

fn print_outcome(outcome: &BatchOutcome<String>) -> Result<()> {
    print_json(&json!({
        "updated": outcome.items,
        "failures": failures_json(outcome),
    }))
}

fn failures_json<T>(outcome: &BatchOutcome<T>) -> serde_json::Value {
    outcome
        .failures
        .iter()
        .map(|f| json!({ "path": f.path, "error": f.error.to_string() }))
        .collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
