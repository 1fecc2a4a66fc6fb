//! Command-line interface for panelforge.
//!
//! Provides commands for serving the HTTP API, generating a story locally,
//! consuming a remote server's stream, and inspecting configuration.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use crate::config;
use crate::core::{EventSink, Orchestrator};
use crate::domain::{Artifact, StreamEvent, Topic};
use crate::stream::{encode_event, fetch_story, StoryProgress};

/// panelforge - Topic to illustrated comic story, streamed page by page
#[derive(Parser, Debug)]
#[command(name = "panelforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate a story in-process and print progress
    Generate {
        /// Topic of the story
        topic: String,

        /// Print raw event-stream frames instead of progress
        #[arg(long)]
        json: bool,
    },

    /// Request a story from a running server and follow its stream
    Fetch {
        /// Topic of the story
        topic: String,

        /// Streaming endpoint
        #[arg(
            short,
            long,
            env = "PANELFORGE_URL",
            default_value = "http://127.0.0.1:5000/api/generate-comic"
        )]
        url: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve { host, port } => serve(host, port).await,
            Commands::Generate { topic, json } => generate(&topic, json).await,
            Commands::Fetch { topic, url } => fetch(&topic, &url).await,
            Commands::Config => show_config(),
        }
    }
}

async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = config::config()?.clone();
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    crate::server::serve(&config).await
}

/// Run the pipeline locally, rendering events as they arrive
async fn generate(topic: &str, json: bool) -> Result<()> {
    let topic = Topic::parse(topic)?;
    let config = config::config()?;
    let orchestrator = Orchestrator::from_config(config)?;

    let (tx, mut rx) = mpsc::channel(16);
    let run = tokio::spawn(async move {
        let sink = EventSink::new(tx);
        orchestrator.run(topic, &sink).await
    });

    let mut progress = StoryProgress::new();
    while let Some(event) = rx.recv().await {
        progress.apply(&event);
        if json {
            print!("{}", encode_event(&event));
        } else {
            render_event(&event, &progress);
        }
    }

    let run = run.await.context("Pipeline task panicked")?;
    eprintln!(
        "\n[Run {} finished: {} pages, {} failed]",
        run.id,
        run.pages.len(),
        run.page_errors.len()
    );

    finish(&progress)
}

/// Follow a remote server's stream
async fn fetch(topic: &str, url: &str) -> Result<()> {
    Topic::parse(topic)?;
    let progress = fetch_story(url, topic, render_event).await?;
    finish(&progress)
}

fn finish(progress: &StoryProgress) -> Result<()> {
    match &progress.error {
        Some(error) => anyhow::bail!("Generation failed: {}", error),
        None => Ok(()),
    }
}

fn render_event(event: &StreamEvent, progress: &StoryProgress) {
    match event {
        StreamEvent::PageComplete { page } => {
            println!("=== Page {} ===", page.index);
            println!("{}", page.unit_text);
            match &page.artifact {
                Artifact::Image { location_reference } => {
                    println!("[image] {}", location_reference)
                }
                Artifact::Description { text } => println!("[description] {}", text),
            }
            println!();
        }
        StreamEvent::PageError { page_number, error } => {
            eprintln!("[page {} failed: {}]", page_number, error);
        }
        StreamEvent::Error { error } => {
            eprintln!("[error: {}]", error);
        }
        _ => eprintln!("[{}]", progress.status),
    }
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = config::reload_config()?;

    println!("panelforge Configuration");
    println!("========================\n");

    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    println!(
        "API key:     {}\n",
        if config.has_api_key() { "set" } else { "NOT SET" }
    );

    let yaml = serde_yaml::to_string(&config).context("Failed to render configuration")?;
    println!("{}", yaml);

    Ok(())
}
