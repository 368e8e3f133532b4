//! panelgate demo CLI
//!
//! Drives the overlay against the simulated panel from `panelgate-dom`.
//!
//! Usage:
//!   cargo run -p demo -- simulate --email appr@example.com
//!   cargo run -p demo -- resolve --email jane@example.com --url https://example.com/roles.csv
//!   cargo run -p demo -- status set --path /docs/a.html --status approved
//!   cargo run -p demo -- status get --path /docs/a.html
//!   cargo run -p demo -- publish --href https://main--site--org.page/docs/a.html

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use panelgate_contracts::{
    error::{GateError, GateResult},
    visibility::ControlClass,
};
use panelgate_core::{search, traits::PanelHost};
use panelgate_directory::{
    DirectoryClient, DirectoryConfig, HttpTableSource, SessionCache, StaticTableSource, TableSource,
};
use panelgate_dom::{
    sample::{rerender_env_switcher, sample_panel, SamplePanel},
    Document, SimulatedWindow,
};
use panelgate_policy::RuleEngine;
use panelgate_runtime::{HostEvent, Intent, Outcome, Phase, Runtime, RuntimeConfig};
use panelgate_workflow::{ApprovalWorkflow, FileStore, MemoryStore, PublishDecision};

/// Directory used when neither `--table` nor `--url` nor a configured URL is given.
const DEMO_TABLE: &str = "email,role\n\
                          pub@example.com,publisher\n\
                          appr@example.com,approver\n\
                          auth@example.com,author\n";

const DEFAULT_HREF: &str = "https://main--site--org.page/docs/a.html";

// ── CLI definition ────────────────────────────────────────────────────────────

/// panelgate: role-based gating for a host authoring panel.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "panelgate overlay demo",
    long_about = "Runs the panelgate overlay against a simulated authoring panel:\n\
                  role resolution, visibility rules, re-render handling and the\n\
                  approval-gated publish action."
)]
struct Cli {
    /// Runtime configuration file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Attach to a simulated panel, re-render it, then try to publish.
    Simulate {
        /// Email shown in the panel's user menu. Omit to simulate a signed-out user.
        #[arg(long)]
        email: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
        /// Page the panel is shown on.
        #[arg(long, default_value = DEFAULT_HREF)]
        href: String,
        /// Mark the page approved before the publish attempt.
        #[arg(long)]
        approve: bool,
        /// Override the delay before reading the signed-in user.
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Look an email up in the directory and report the raw result.
    Resolve {
        #[arg(long)]
        email: String,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Read or write a document's approval status.
    Status {
        #[command(subcommand)]
        action: StatusAction,
    },
    /// Request publishing of a page through the approval gate.
    Publish {
        #[arg(long, default_value = DEFAULT_HREF)]
        href: String,
        /// Directory holding the approval store.
        #[arg(long, default_value = ".panelgate")]
        store: PathBuf,
    },
}

#[derive(Subcommand)]
enum StatusAction {
    Get {
        #[arg(long)]
        path: String,
        #[arg(long, default_value = ".panelgate")]
        store: PathBuf,
    },
    Set {
        #[arg(long)]
        path: String,
        /// Any status; only `approved` opens the publish gate.
        #[arg(long)]
        status: String,
        #[arg(long, default_value = "")]
        comments: String,
        #[arg(long, default_value = ".panelgate")]
        store: PathBuf,
    },
}

/// Where the directory table comes from.
#[derive(clap::Args)]
struct SourceArgs {
    /// Read the table from a local file.
    #[arg(long, conflicts_with = "url")]
    table: Option<PathBuf>,
    /// Fetch the table over HTTP.
    #[arg(long)]
    url: Option<String>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> GateResult<()> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::from_file(path)?,
        None => RuntimeConfig::default(),
    };

    match cli.command {
        Command::Simulate {
            email,
            source,
            href,
            approve,
            delay_ms,
        } => {
            if let Some(delay) = delay_ms {
                config.initial_delay_ms = delay;
            }
            simulate(&config, email.as_deref(), &source, &href, approve).await
        }
        Command::Resolve { email, source } => resolve(&config, &email, &source).await,
        Command::Status { action } => match action {
            StatusAction::Get { path, store } => status_get(&config, &path, &store),
            StatusAction::Set {
                path,
                status,
                comments,
                store,
            } => status_set(&config, &path, &status, &comments, &store),
        },
        Command::Publish { href, store } => publish(&config, &href, &store),
    }
}

// ── Directory source ──────────────────────────────────────────────────────────

enum DemoSource {
    Static(StaticTableSource),
    Http(HttpTableSource),
}

#[async_trait]
impl TableSource for DemoSource {
    async fn fetch(&self) -> GateResult<String> {
        match self {
            DemoSource::Static(source) => source.fetch().await,
            DemoSource::Http(source) => source.fetch().await,
        }
    }
}

fn table_source(args: &SourceArgs, config: &DirectoryConfig) -> GateResult<DemoSource> {
    if let Some(path) = &args.table {
        let text = std::fs::read_to_string(path).map_err(|e| GateError::Config {
            reason: format!("failed to read table '{}': {}", path.display(), e),
        })?;
        return Ok(DemoSource::Static(StaticTableSource(text)));
    }
    let url = args.url.clone().unwrap_or_else(|| config.url.clone());
    if url.is_empty() {
        println!("No directory given; using the built-in demo table.");
        return Ok(DemoSource::Static(StaticTableSource(DEMO_TABLE.to_string())));
    }
    let timeout = Duration::from_millis(config.timeout_ms);
    Ok(DemoSource::Http(HttpTableSource::new(url, timeout)?))
}

fn parse_href(href: &str) -> GateResult<Url> {
    Url::parse(href).map_err(|e| GateError::Config {
        reason: format!("invalid href '{}': {}", href, e),
    })
}

// ── Commands ──────────────────────────────────────────────────────────────────

async fn simulate(
    config: &RuntimeConfig,
    email: Option<&str>,
    source: &SourceArgs,
    href: &str,
    approve: bool,
) -> GateResult<()> {
    let directory = SessionCache::new(DirectoryClient::new(
        table_source(source, &config.directory)?,
        config.directory.delimiter,
    ));
    let (doc, panel) = sample_panel(email);
    let window = SimulatedWindow::new(parse_href(href)?);
    let mut runtime = Runtime::new(doc, window, directory, MemoryStore::new(), config)?;

    println!("── Attach ──────────────────────────────────────────");
    match runtime.start().await {
        Phase::Active { role, .. } => println!("  signed in as {}; role {}", email.unwrap_or("?"), role),
        Phase::Degraded { .. } => println!("  nobody signed in; panel disabled"),
        Phase::AwaitingPanel => println!("  no panel found"),
    }
    print_controls(runtime.host(), runtime.engine(), &panel);

    println!("── Host re-render ──────────────────────────────────");
    rerender_env_switcher(runtime.host_mut(), &panel);
    println!("  env switcher replaced by fresh items");
    print_controls(runtime.host(), runtime.engine(), &panel);
    match runtime.handle(HostEvent::Changed).await {
        Outcome::Reapplied => println!("  rules re-applied"),
        _ => println!("  no watcher; nothing re-applied"),
    }
    print_controls(runtime.host(), runtime.engine(), &panel);

    println!("── Publish ─────────────────────────────────────────");
    if approve {
        let path = parse_href(href)?.path().to_string();
        runtime.workflow().set_status(&path, "approved", "approved from demo")?;
        println!("  {} marked approved", path);
    }
    if let Outcome::Publish(decision) = runtime.handle(HostEvent::Intent(Intent::PublishLive)).await {
        print_decision(&decision);
    }
    println!();
    Ok(())
}

async fn resolve(config: &RuntimeConfig, email: &str, source: &SourceArgs) -> GateResult<()> {
    let client = DirectoryClient::new(table_source(source, &config.directory)?, config.directory.delimiter);
    match client.lookup(email).await {
        Ok(Some(role)) => println!("{} → {}", email, role),
        Ok(None) => println!("{} → no match (resolves to author)", email),
        Err(e) => println!("{} → lookup failed: {} (resolves to author)", email, e),
    }
    Ok(())
}

fn status_get(config: &RuntimeConfig, path: &str, store: &Path) -> GateResult<()> {
    let workflow = ApprovalWorkflow::new(FileStore::new(store), config.workflow.clone());
    let record = workflow.get_status(path);
    println!("{}: {}", path, record.status);
    if let Some(comments) = record.comments.filter(|c| !c.is_empty()) {
        println!("  comments: {}", comments);
    }
    if let Some(updated) = record.updated {
        println!("  updated:  {}", updated.to_rfc3339());
    }
    Ok(())
}

fn status_set(config: &RuntimeConfig, path: &str, status: &str, comments: &str, store: &Path) -> GateResult<()> {
    let workflow = ApprovalWorkflow::new(FileStore::new(store), config.workflow.clone());
    let record = workflow.set_status(path, status, comments)?;
    info!(store = %store.display(), "status persisted");
    println!("{}: {}", path, record.status);
    Ok(())
}

fn publish(config: &RuntimeConfig, href: &str, store: &Path) -> GateResult<()> {
    let workflow = ApprovalWorkflow::new(FileStore::new(store), config.workflow.clone());
    let window = SimulatedWindow::new(parse_href(href)?);
    print_decision(&workflow.request_publish(&window));
    Ok(())
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_controls(doc: &Document, engine: &RuleEngine, panel: &SamplePanel) {
    for class in ControlClass::ALL {
        let controls = search(doc, Some(panel.panel_root), engine.selector(class));
        let hidden = controls.iter().filter(|n| doc.is_hidden(**n)).count();
        let state = if hidden == 0 { "visible" } else { "hidden" };
        println!("  {:<8} {}", format!("{:?}", class).to_lowercase(), state);
    }
}

fn print_decision(decision: &PublishDecision) {
    match decision {
        PublishDecision::Opened { url } => println!("  published: opened {}", url),
        PublishDecision::Blocked { status } => println!("  blocked (status {}): page must be APPROVED first", status),
    }
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("panelgate: Role Gating for Authoring Panels");
    println!("============================================");
    println!();
    println!("Pipeline on attach:");
    println!("  [1] Find the panel and read the signed-in email");
    println!("  [2] Resolve the role from the directory (author on any failure)");
    println!("  [3] Hide controls the role may not use; show the role badge");
    println!("  [4] Re-apply on every host re-render");
    println!("  [5] Publish only opens for APPROVED documents");
    println!();
}
