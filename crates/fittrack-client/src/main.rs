//! `fittrack`: command-line client for the fittrack API.
//!
//! # Usage
//!
//! ```text
//! fittrack --url http://localhost:3000 --token <jwt> list goals
//! fittrack get workoutplans 5d0c…
//! fittrack create workoutplans/5d0c…/exercises '{"name":"Squat","sets":5}'
//! fittrack stats frequency
//! fittrack --config ~/.config/fittrack/client.toml list workoutlogs
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fittrack_client::{Gateway, Notification, Notifier, Session, Severity, TracingNotifier};
use fittrack_core::fallback::FallbackProvider;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "fittrack", about = "Command-line client for the fittrack API")]
struct Args {
  /// Path to a TOML config file (url, token, fallback).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the fittrack server (default: http://localhost:3000).
  #[arg(long, env = "FITTRACK_URL")]
  url: Option<String>,

  /// Bearer token sent with every request.
  #[arg(long, env = "FITTRACK_TOKEN", hide_env_values = true)]
  token: Option<String>,

  /// Do not substitute sample data when the server is unreachable.
  #[arg(long)]
  no_fallback: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List records, e.g. `goals` or `workoutplans/<id>/exercises`.
  List { resource: String },
  /// Fetch one record.
  Get { resource: String, id: String },
  /// Create a record from a JSON object.
  Create { resource: String, json: String },
  /// Merge a JSON object into an existing record.
  Update {
    resource: String,
    id:       String,
    json:     String,
  },
  /// Delete a record.
  Delete { resource: String, id: String },
  /// Dashboard statistics.
  Stats {
    #[arg(value_enum, default_value_t = StatsKind::Summary)]
    kind: StatsKind,
  },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StatsKind {
  Summary,
  Frequency,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  token:    String,
  fallback: Option<bool>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let file_cfg = match &args.config {
    Some(path) => read_config(path)?,
    None => ConfigFile::default(),
  };

  // CLI flags and env override the config file, which overrides defaults.
  let url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| "http://localhost:3000".to_string());
  let session = Session::new();
  if let Some(token) = args
    .token
    .or_else(|| (!file_cfg.token.is_empty()).then(|| file_cfg.token.clone()))
  {
    session.set(token);
  }

  let mut gateway = Gateway::new(url, session).context("building gateway")?;
  if !args.no_fallback && file_cfg.fallback.unwrap_or(true) {
    gateway = gateway.with_fallback(FallbackProvider::from_clock());
  }

  match run(&gateway, args.command).await {
    Ok(()) => Ok(()),
    Err(e) => {
      TracingNotifier.notify(Notification::new(Severity::Error, format!("{e:#}")));
      Err(e)
    }
  }
}

fn read_config(path: &Path) -> Result<ConfigFile> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading config file {}", path.display()))?;
  toml::from_str(&raw).context("parsing config file")
}

async fn run(gateway: &Gateway, command: Command) -> Result<()> {
  match command {
    Command::List { resource } => print(&gateway.list(&resource).await?),
    Command::Get { resource, id } => print(&gateway.get(&resource, &id).await?),
    Command::Create { resource, json } => {
      print(&gateway.create(&resource, &parse_json(&json)?).await?)
    }
    Command::Update { resource, id, json } => {
      print(&gateway.update(&resource, &id, &parse_json(&json)?).await?)
    }
    Command::Delete { resource, id } => {
      gateway.delete(&resource, &id).await?;
      TracingNotifier.notify(Notification::new(Severity::Success, format!("deleted {resource}/{id}")));
      Ok(())
    }
    Command::Stats { kind: StatsKind::Summary } => print(&gateway.stats_summary().await?),
    Command::Stats { kind: StatsKind::Frequency } => print(&gateway.workout_frequency().await?),
  }
}

fn parse_json(raw: &str) -> Result<Value> {
  serde_json::from_str(raw).context("argument is not valid JSON")
}

fn print<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value).context("serialising output")?);
  Ok(())
}
