// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! apiprobe CLI
//!
//! Runs the import reconciliation against a page URL, performs user-initiated
//! imports, and edits the session configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use apiprobe_app_core::{
    header_menu, ConfigForm, ConfigStore, HeaderEffect, MemorySessionStorage, Navigator,
    SessionStorage, SharedToasts, ToastKind,
};
use apiprobe_http::{ReqwestTransport, RequestDispatcher};
use apiprobe_import::{
    FetchResult, ImportSync, MemoryLocation, ServiceImportInfo, ServiceStore, SyncPhase,
};
use apiprobe_storage_fs::FsSessionStorage;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_PAGE_URL: &str = "http://localhost/";
const TOAST_CAPACITY: usize = 16;

#[derive(Parser, Debug)]
#[command(author, version, about = "Import OpenAPI/Swagger descriptions and manage session config")]
struct Args {
    /// Keep session storage in memory for this run only
    #[arg(long, global = true)]
    ephemeral: bool,
    /// Session storage directory (defaults to the per-user data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Print imported operations as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run startup reconciliation against a page URL carrying the import query
    Open {
        /// e.g. `http://app/?importModeType=url&serviceURL=http://x/api.json`
        page_url: String,
    },
    /// Import a service description, as if typed into the search box
    Search {
        /// Service description URL
        service_url: String,
        /// Page URL whose query receives `serviceURL`
        #[arg(long, default_value = DEFAULT_PAGE_URL)]
        page_url: String,
    },
    /// Show or change the session configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
    /// List header menu entries, or run one by id
    Menu {
        /// Entry id to run
        #[arg(long)]
        select: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the current configuration
    Show,
    /// Update the configuration; omitted fields keep their current value
    Set {
        /// Request timeout in seconds (1..=3600)
        #[arg(long)]
        timeout: Option<i64>,
        /// Authorization header value; pass an empty string to clear it
        #[arg(long)]
        authorization: Option<String>,
    },
}

struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn go_to(&self, route: &str) {
        println!("navigate -> {route}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let storage = open_storage(&args)?;
    let config = Arc::new(ConfigStore::new(storage));
    let toasts = SharedToasts::new(TOAST_CAPACITY);

    let result = run(&args, &config, &toasts).await;
    report_toasts(&toasts);
    result
}

fn open_storage(args: &Args) -> Result<Arc<dyn SessionStorage>> {
    if args.ephemeral {
        return Ok(Arc::new(MemorySessionStorage::new()));
    }
    let storage = match &args.data_dir {
        Some(dir) => FsSessionStorage::at(dir),
        None => FsSessionStorage::new(),
    }
    .context("open session storage")?;
    info!(path = %storage.base().display(), "session storage");
    Ok(Arc::new(storage))
}

async fn run(args: &Args, config: &Arc<ConfigStore>, toasts: &SharedToasts) -> Result<()> {
    match &args.cmd {
        Command::Open { page_url } => {
            let (sync, location) = import_sync(page_url, config, toasts)?;
            let result = sync.initialize().await?;
            println!("phase: {:?}", sync.phase());
            if sync.phase() == SyncPhase::Skipped {
                println!("url: {}", location.current_url());
            }
            print_result(result.as_ref(), args.json)?;
        }
        Command::Search {
            service_url,
            page_url,
        } => {
            let (sync, location) = import_sync(page_url, config, toasts)?;
            let result = sync.search(service_url).await?;
            println!("url: {}", location.current_url());
            print_result(result.as_ref(), args.json)?;
        }
        Command::Config { cmd } => config_command(cmd, config, toasts)?,
        Command::Menu { select } => menu_command(select.as_deref())?,
    }
    Ok(())
}

fn import_sync(
    page_url: &str,
    config: &Arc<ConfigStore>,
    toasts: &SharedToasts,
) -> Result<(ImportSync<ReqwestTransport>, Arc<MemoryLocation>)> {
    let location = Arc::new(
        MemoryLocation::parse(page_url).with_context(|| format!("parse page url {page_url:?}"))?,
    );
    let dispatcher = Arc::new(RequestDispatcher::new(
        ReqwestTransport::new(),
        Arc::clone(config),
        Arc::new(toasts.clone()),
    ));
    let sync = ImportSync::new(
        dispatcher,
        location.clone(),
        Arc::new(ServiceStore::new()),
        Arc::new(toasts.clone()),
    );
    Ok((sync, location))
}

fn print_result(result: Option<&FetchResult>, json: bool) -> Result<()> {
    match result {
        None => println!("no import"),
        Some(FetchResult::Failed { status }) => match status {
            Some(status) => println!("import failed: HTTP {status}"),
            None => println!("import failed: no response"),
        },
        Some(FetchResult::Succeeded(imported)) => print_service(imported, json)?,
    }
    Ok(())
}

fn print_service(imported: &ServiceImportInfo, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&imported.operations)?);
        return Ok(());
    }
    let spec = &imported.parsed_spec;
    println!(
        "service: {} ({}, {})",
        imported.service_url,
        spec.title().unwrap_or("untitled"),
        spec.version().unwrap_or("?")
    );
    for op in &imported.operations {
        let deprecated = if op.deprecated { " [deprecated]" } else { "" };
        match &op.operation_id {
            Some(id) => println!("  {:<7} {} ({id}){deprecated}", op.method, op.path),
            None => println!("  {:<7} {}{deprecated}", op.method, op.path),
        }
    }
    Ok(())
}

fn config_command(cmd: &ConfigCommand, config: &ConfigStore, toasts: &SharedToasts) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let form = ConfigForm::initial(config);
            let saved = config.read().is_some();
            println!(
                "timeout: {}s{}",
                form.timeout_secs,
                if saved { "" } else { " (default)" }
            );
            if form.authorization.is_empty() {
                println!("authorization: <none>");
            } else {
                println!("authorization: {}", form.authorization);
            }
        }
        ConfigCommand::Set {
            timeout,
            authorization,
        } => {
            let mut form = ConfigForm::initial(config);
            if let Some(timeout) = timeout {
                form.timeout_secs = *timeout;
            }
            if let Some(authorization) = authorization {
                form.authorization.clone_from(authorization);
            }
            let saved = form.submit(config, toasts)?;
            println!("timeout: {}s", saved.timeout_secs());
        }
    }
    Ok(())
}

fn menu_command(select: Option<&str>) -> Result<()> {
    let menu = header_menu();
    let Some(id) = select else {
        for item in &menu {
            println!("{}  {}", item.id, item.label);
        }
        return Ok(());
    };
    let item = menu
        .iter()
        .find(|item| item.id == id)
        .ok_or_else(|| anyhow!("no menu entry with id {id:?}"))?;
    match item.action.run(&PrintNavigator) {
        HeaderEffect::OpenConfigDialog => {
            println!("run `apiprobe config set --timeout <secs> [--authorization <value>]`");
        }
        HeaderEffect::Navigated => {}
    }
    Ok(())
}

fn report_toasts(toasts: &SharedToasts) {
    for toast in toasts.drain() {
        match toast.kind {
            ToastKind::Error => error!(message = %toast.message, "toast"),
            ToastKind::Warn => warn!(message = %toast.message, "toast"),
            ToastKind::Info | ToastKind::Success => info!(message = %toast.message, "toast"),
        }
    }
}
