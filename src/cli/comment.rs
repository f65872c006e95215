//! Comment subcommands.

use anyhow::Result;
use clap::Subcommand;

use crate::domain::NewComment;
use crate::library::Library;

use super::print_json;

/// Comment-related subcommands
#[derive(Subcommand, Debug)]
pub enum CommentCommands {
    /// Add a comment to a video
    Add {
        /// Video ID
        video_id: String,

        /// Comment text
        text: String,

        /// Author name (defaults to "Anonymous")
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Delete a comment from a video
    Delete {
        /// Video ID
        video_id: String,

        /// Comment ID
        comment_id: String,
    },

    /// List the comments of a video
    List {
        /// Video ID
        video_id: String,
    },
}

/// Execute a comment subcommand
pub async fn execute(library: &Library, command: CommentCommands) -> Result<()> {
    match command {
        CommentCommands::Add {
            video_id,
            text,
            name,
        } => {
            let mut input = NewComment::new(text);
            input.name = name;
            let comment = library.comments().add(&video_id, input).await?;
            print_json(&comment)
        }
        CommentCommands::Delete {
            video_id,
            comment_id,
        } => {
            let removed = library.comments().delete(&video_id, &comment_id).await?;
            print_json(&removed)
        }
        CommentCommands::List { video_id } => {
            let comments = library.comments().list(&video_id).await?;

            if comments.is_empty() {
                println!("No comments");
                return Ok(());
            }

            for comment in comments {
                println!(
                    "{:<38} {:<20} {:>5}  {}",
                    comment.id, comment.name, comment.likes, comment.comment
                );
            }
            Ok(())
        }
    }
}
