use super::App;
use anyhow::{Context, Result, bail};
use clap::Args;
use relive_application::optimistic::{RemoveMemory, ToggleLike};
use relive_application::{OptimisticMutationCoordinator, UploadOrchestrator};
use relive_core::media::AssetKind;
use relive_core::memory::{DraftMemory, MemoryFeed, MemoryFields, MemoryId};
use relive_infrastructure::MediaFileLoader;
use std::path::PathBuf;

#[derive(Args)]
pub struct SubmitArgs {
    #[arg(long)]
    title: String,
    /// Date of the memory, YYYY-MM-DD
    #[arg(long)]
    date: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    location: String,
    #[arg(long, default_value = "")]
    tag: String,
    /// Patient the memory is created for, see `relive patients`
    #[arg(long)]
    patient_id: Option<u64>,
    /// Update this memory instead of creating a new one
    #[arg(long)]
    memory_id: Option<u64>,
    /// Caption attached to images and videos
    #[arg(long)]
    caption: Option<String>,
    /// Speaker of voice recordings, as NAME:RELATION
    #[arg(long)]
    speaker: Option<String>,
    /// Images, videos, and audio files to attach
    files: Vec<PathBuf>,
}

pub async fn list(app: &App) -> Result<()> {
    let memories = app.api.list_memories().await?;
    if memories.is_empty() {
        println!("No memories yet");
    }
    for memory in memories {
        println!(
            "{:>6}  {}  {}  ({} like{}{})",
            memory.id,
            memory.date,
            memory.title,
            memory.likes_count,
            if memory.likes_count == 1 { "" } else { "s" },
            if memory.is_liked { ", liked by you" } else { "" }
        );
    }
    Ok(())
}

pub async fn submit(app: &App, args: SubmitArgs) -> Result<()> {
    let speaker = match args.speaker.as_deref() {
        Some(value) => match value.split_once(':') {
            Some((name, relation)) => Some((name.trim().to_string(), relation.trim().to_string())),
            None => bail!("--speaker must look like NAME:RELATION"),
        },
        None => None,
    };

    let mut draft = DraftMemory::new(MemoryFields {
        title: args.title,
        description: args.description,
        date: args.date,
        location: args.location,
        tag: args.tag,
    });
    draft.patient_id = args.patient_id;
    draft.memory_id = args.memory_id.map(MemoryId);

    let loader = MediaFileLoader::new();
    for path in &args.files {
        let mut asset = loader
            .load(path)
            .await
            .with_context(|| format!("Cannot attach {}", path.display()))?;
        match asset.kind {
            AssetKind::Image | AssetKind::Video => {
                if let Some(caption) = &args.caption {
                    asset = asset.with_caption(caption.as_str());
                }
            }
            AssetKind::Audio => {
                if let Some((name, relation)) = &speaker {
                    asset = asset.with_speaker(name.as_str(), relation.as_str());
                }
            }
        }
        draft.add_asset(asset)?;
    }

    let orchestrator = UploadOrchestrator::new(app.api.clone());
    let report = orchestrator.submit(&mut draft, None).await?;

    println!(
        "Memory {} {}",
        report.memory_id,
        if report.created { "created" } else { "updated" }
    );
    for id in report.failed_assets() {
        if let Some(asset) = draft.asset(id) {
            println!("  failed: {}", asset.file_name);
        }
    }
    if let Some(warning) = report.warning_message() {
        eprintln!("{}", warning);
        eprintln!(
            "Submit the failed files again with --memory-id {} to retry.",
            report.memory_id
        );
    }
    Ok(())
}

async fn coordinator(app: &App) -> Result<OptimisticMutationCoordinator> {
    let memories = app.api.list_memories().await?;
    Ok(OptimisticMutationCoordinator::new(
        app.api.client().clone(),
        MemoryFeed::new(memories),
    ))
}

pub async fn toggle_like(app: &App, id: u64) -> Result<()> {
    let coordinator = coordinator(app).await?;
    let memory_id = MemoryId(id);
    coordinator
        .apply(ToggleLike { memory_id })?
        .outcome()
        .await?;

    if let Some(memory) = coordinator.feed().get(memory_id) {
        println!(
            "{} memory {} ({} likes)",
            if memory.is_liked { "Liked" } else { "Unliked" },
            memory_id,
            memory.likes_count
        );
    }
    Ok(())
}

pub async fn delete(app: &App, id: u64) -> Result<()> {
    let coordinator = coordinator(app).await?;
    coordinator
        .apply(RemoveMemory {
            memory_id: MemoryId(id),
        })?
        .outcome()
        .await?;
    println!("Deleted memory {}", id);
    Ok(())
}
