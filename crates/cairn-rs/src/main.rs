//! Command-line access to Cairn memory and media analysis.

use anyhow::Context;
use cairn_rs::aws::AwsBackends;
use cairn_rs::config::CairnConfig;
use cairn_rs::media::{AnalysisOverrides, AnalysisRequest, AnalysisSettings, MediaKind};
use cairn_rs::memory::presentation::{
    Tone, format_context_response, format_delete_response, format_list_response,
    format_retrieve_response, format_store_response, panel,
};
use cairn_rs::memory::{MemoryOverrides, Owner, check_min_score};
use cairn_rs::tools::{ToolServices, media_analyzer, memory_service};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line options.
#[derive(Parser)]
#[command(name = "cairn", version, about = "User-isolated vector memory and media analysis")]
struct Cli {
    /// Optional path to a cairn.json5 config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store, search, list and delete memories
    Memory {
        #[command(subcommand)]
        action: MemoryCommand,
    },
    /// Analyze images, documents and videos
    Media {
        #[command(subcommand)]
        action: MediaCommand,
    },
}

#[derive(Subcommand)]
enum MemoryCommand {
    /// Store a new memory
    Store {
        #[command(flatten)]
        target: MemoryTargetArgs,
        content: String,
    },
    /// Search memories by similarity
    Retrieve {
        #[command(flatten)]
        target: MemoryTargetArgs,
        query: String,
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long, value_parser = parse_min_score)]
        min_score: Option<f32>,
    },
    /// List memories, newest first
    List {
        #[command(flatten)]
        target: MemoryTargetArgs,
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Delete a memory by key
    Delete {
        #[command(flatten)]
        target: MemoryTargetArgs,
        memory_key: String,
    },
    /// Show the context gathered for the next turn
    Context {
        #[command(flatten)]
        target: MemoryTargetArgs,
        input: Option<String>,
        #[arg(long)]
        max_memories: Option<usize>,
        #[arg(long, value_parser = parse_min_score)]
        min_score: Option<f32>,
    },
}

/// Owner and index selection shared by memory commands.
#[derive(Args)]
struct MemoryTargetArgs {
    /// Owning user
    #[arg(long)]
    user: Option<String>,
    /// Owning agent, used when no user is given
    #[arg(long)]
    agent: Option<String>,
    #[arg(long)]
    bucket: Option<String>,
    #[arg(long)]
    index: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    embedding_model: Option<String>,
}

impl MemoryTargetArgs {
    fn owner(&self) -> anyhow::Result<Owner> {
        Owner::from_ids(self.user.as_deref(), self.agent.as_deref())
            .context("either --user or --agent is required")
    }

    fn overrides(&self) -> MemoryOverrides {
        MemoryOverrides {
            vector_bucket_name: self.bucket.clone(),
            index_name: self.index.clone(),
            region_name: self.region.clone(),
            embedding_model: self.embedding_model.clone(),
        }
    }
}

#[derive(Subcommand)]
enum MediaCommand {
    /// Analyze a local file or s3:// object
    Analyze {
        path: String,
        #[arg(long, default_value = "Describe what you see in this file")]
        prompt: String,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        system_prompt: Option<String>,
        /// Reject anything that is not a video
        #[arg(long)]
        video_only: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cairn_rs::init_logging();

    let cli = Cli::parse();
    let config =
        CairnConfig::load(cli.config.as_deref()).context("failed to load config")?;
    info!("starting cairn (config_set={})", cli.config.is_some());
    let services = ToolServices {
        config,
        backends: Arc::new(AwsBackends::load().await),
        caller_defaults: Default::default(),
    };

    let output = match cli.command {
        Command::Memory { action } => run_memory(&services, action).await?,
        Command::Media { action } => run_media(&services, action).await?,
    };
    println!("{output}");
    Ok(())
}

fn parse_min_score(raw: &str) -> Result<f32, String> {
    let value: f32 = raw.parse().map_err(|err| format!("{err}"))?;
    check_min_score(value).map_err(|err| err.to_string())?;
    Ok(value)
}

async fn run_memory(services: &ToolServices, command: MemoryCommand) -> anyhow::Result<String> {
    let defaults = &services.config.memory;
    let target = match &command {
        MemoryCommand::Store { target, .. }
        | MemoryCommand::Retrieve { target, .. }
        | MemoryCommand::List { target, .. }
        | MemoryCommand::Delete { target, .. }
        | MemoryCommand::Context { target, .. } => target,
    };
    let owner = target.owner()?;
    let service = memory_service(services, &target.overrides());
    service
        .ensure_ready()
        .await
        .context("failed to prepare vector index")?;

    let rendered = match &command {
        MemoryCommand::Store { content, .. } => {
            let outcome = service.store(content, &owner, None).await?;
            format_store_response(&outcome, content)
        }
        MemoryCommand::Retrieve {
            query,
            top_k,
            min_score,
            ..
        } => {
            let outcome = service
                .retrieve(
                    query,
                    &owner,
                    top_k.unwrap_or(defaults.top_k),
                    min_score.unwrap_or(defaults.min_score),
                )
                .await?;
            format_retrieve_response(&outcome)
        }
        MemoryCommand::List { top_k, .. } => {
            let outcome = service
                .list(&owner, top_k.unwrap_or(defaults.top_k))
                .await?;
            format_list_response(&outcome, &owner)
        }
        MemoryCommand::Delete { memory_key, .. } => {
            let outcome = service.delete(memory_key, Some(&owner)).await?;
            format_delete_response(&outcome)
        }
        MemoryCommand::Context {
            input,
            max_memories,
            min_score,
            ..
        } => {
            let outcome = service
                .auto_context(
                    &owner,
                    input.as_deref(),
                    max_memories.unwrap_or(defaults.max_context_memories),
                    min_score.unwrap_or(defaults.min_score),
                )
                .await?;
            format_context_response(&outcome)
        }
    };
    Ok(rendered)
}

async fn run_media(services: &ToolServices, command: MediaCommand) -> anyhow::Result<String> {
    let MediaCommand::Analyze {
        path,
        prompt,
        model,
        region,
        system_prompt,
        video_only,
    } = command;
    let settings = AnalysisSettings::resolve(
        &AnalysisOverrides {
            model_id: model,
            region,
            system_prompt,
        },
        &services.config.media,
        &services.caller_defaults,
    );
    let analyzer = media_analyzer(services, &settings.region);
    let report = analyzer
        .analyze(
            &AnalysisRequest {
                media_path: path,
                prompt,
                only: video_only.then_some(MediaKind::Video),
            },
            &settings,
        )
        .await
        .context("media analysis failed")?;
    Ok(panel("Media Analysis", &report.render(), Tone::Cyan))
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, MemoryCommand};
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn min_score_outside_unit_range_is_refused() {
        let err = Cli::try_parse_from([
            "cairn", "memory", "retrieve", "--user", "u1", "food", "--min-score", "1.5",
        ])
        .err()
        .expect("out of range");
        assert!(err.to_string().contains("min_score must be between 0 and 1"));
        assert!(
            Cli::try_parse_from(["cairn", "memory", "context", "--user", "u1", "--min-score=-0.1"])
                .is_err()
        );

        let cli = Cli::try_parse_from([
            "cairn", "memory", "retrieve", "--user", "u1", "food", "--min-score", "0.4",
        ])
        .expect("in range");
        let Command::Memory {
            action: MemoryCommand::Retrieve { min_score, .. },
        } = cli.command
        else {
            panic!("expected memory retrieve");
        };
        assert_eq!(min_score, Some(0.4));
    }
}
