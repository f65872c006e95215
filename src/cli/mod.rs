//! Command-line interface for vidcat.
//!
//! Maps each catalog operation to a subcommand. Failures exit with a code
//! per error kind: 2 not found, 3 bad input, 4 storage, 1 anything else.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::warn;

use crate::core::{CatalogError, ErrorKind};
use crate::domain::NewVideo;
use crate::library::Library;

pub mod comment;

/// vidcat - Video catalog with deduplicated images
#[derive(Parser, Debug)]
#[command(name = "vidcat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all videos
    List,

    /// Show the full record of a video
    Show {
        /// Video ID
        video_id: String,
    },

    /// Create a video
    Create {
        /// Title (auto-numbered Untitled_Video_NN if omitted)
        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        channel: Option<String>,

        #[arg(long)]
        duration: Option<String>,

        /// Media URL of the video itself
        #[arg(long)]
        media_url: Option<String>,

        /// Image file to upload as the display image
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Initial view count (import)
        #[arg(long)]
        views: Option<String>,

        /// Initial like count (import)
        #[arg(long)]
        likes: Option<String>,

        /// Creation time in epoch milliseconds (import)
        #[arg(long)]
        timestamp: Option<i64>,

        /// Comments as a JSON list (import)
        #[arg(long)]
        comments: Option<String>,
    },

    /// Manage comments on a video
    Comment {
        #[command(subcommand)]
        command: comment::CommentCommands,
    },

    /// Add one like to a video
    Like {
        /// Video ID
        video_id: String,
    },

    /// Check stored images against their recorded digests
    Verify,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = crate::config::config()?;
        let library = Library::from_config(config);

        match self.command {
            Commands::List => list_videos(&library).await,
            Commands::Show { video_id } => {
                let video = library.videos().get(&video_id).await?;
                print_json(&video)
            }
            Commands::Create {
                title,
                description,
                channel,
                duration,
                media_url,
                image,
                views,
                likes,
                timestamp,
                comments,
            } => {
                let input = NewVideo {
                    title,
                    description,
                    channel,
                    duration,
                    media_url,
                    image: None,
                    views,
                    likes,
                    timestamp,
                    comments,
                };
                create_video(&library, input, image).await
            }
            Commands::Comment { command } => comment::execute(&library, command).await,
            Commands::Like { video_id } => {
                let likes = library.counters().increment_likes(&video_id).await?;
                println!("{}", likes);
                Ok(())
            }
            Commands::Verify => verify(&library).await,
            Commands::Config => show_config(),
        }
    }
}

/// Exit code for a failed command
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<CatalogError>().map(CatalogError::kind) {
        Some(ErrorKind::NotFound) => 2,
        Some(ErrorKind::BadInput) => 3,
        Some(ErrorKind::Storage) => 4,
        None => 1,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// List all videos
async fn list_videos(library: &Library) -> Result<()> {
    let videos = library.videos().list().await?;

    if videos.is_empty() {
        println!("No videos found");
        return Ok(());
    }

    println!(
        "{:<38} {:<30} {:<20} {:>10} {:>10}",
        "ID", "TITLE", "CHANNEL", "VIEWS", "LIKES"
    );
    println!("{}", "-".repeat(112));

    for video in videos {
        println!(
            "{:<38} {:<30} {:<20} {:>10} {:>10}",
            video.id,
            truncate(&video.title, 30),
            truncate(video.channel.as_deref().unwrap_or("-"), 20),
            video.views.as_deref().unwrap_or("0"),
            video.likes.as_deref().unwrap_or("0"),
        );
    }

    Ok(())
}

/// Stage the image (if any) and create the video
async fn create_video(library: &Library, mut input: NewVideo, image: Option<PathBuf>) -> Result<()> {
    if let Some(ref path) = image {
        input.image = Some(library.images().stage_file(path).await?);
    }
    let staged = input.image.clone();

    match library.videos().create(input).await {
        Ok(video) => print_json(&video),
        Err(err) => {
            // The record never referenced the staged copy
            if let Some(upload) = staged {
                if let Err(e) = tokio::fs::remove_file(&upload.path).await {
                    warn!(path = %upload.path.display(), error = %e, "Failed to remove staged image");
                }
            }
            Err(err.into())
        }
    }
}

async fn verify(library: &Library) -> Result<()> {
    let report = library.verify().await?;

    for problem in &report.problems {
        println!("{}", problem);
    }
    println!(
        "Checked {} image(s), {} problem(s)",
        report.checked,
        report.problems.len()
    );

    Ok(report.ensure_clean()?)
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = crate::config::config()?;

    println!("Home:          {}", config.home.display());
    println!("Catalog:       {}", config.catalog.display());
    println!("Images:        {}", config.images.display());
    println!("Image prefix:  {}", config.image_url_prefix);
    println!("Default image: {}", config.default_image);
    println!("Lock timeout:  {:?}", config.lock_timeout);
    match config.config_file {
        Some(ref path) => println!("Config file:   {}", path.display()),
        None => println!("Config file:   (none)"),
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
