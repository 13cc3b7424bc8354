//! Text rendering of a comment tree for an external summarizer.
//!
//! The summarizer itself is a collaborator behind [`Summarizer`]; this
//! module only fixes its input format: one `"{indent}- {raw text}"` entry
//! per comment, four spaces of indent per level, depth-first, entries
//! separated by a blank line.

use async_trait::async_trait;
use tracing::info;

use crate::app::{RedthreadError, Result};
use crate::domain::comment::CommentIter;
use crate::domain::{Comment, CommentTree};

const INDENT: &str = "    ";

const EXPORT_TEMPLATE: &str = "You are the best content writer in the world! These are a Reddit post's comments.
Summarise the key themes and main points. Identify the top points or themes discussed in the comments, with examples for each. Include a brief overview of any major differing viewpoints if present.

";

const SUMMARY_TEMPLATE: &str = "Summarize the following Reddit comments, summarize the key themes and main points, with examples of each, provide a final summary of the overall comments:

";

/// Text-in, text-out summarization service
#[async_trait]
pub trait Summarizer {
    async fn summarize(&self, text: &str) -> Result<String>;
}

/// One line per comment, depth-first.
pub fn flatten_comments(comments: &[Comment]) -> Vec<String> {
    let lines: Vec<String> = CommentIter::new(comments)
        .map(|(depth, comment)| format!("{}- {}", INDENT.repeat(depth), comment.raw_text))
        .collect();
    info!("Flattened {} comments", lines.len());
    lines
}

pub fn flatten_tree(tree: &CommentTree) -> Vec<String> {
    flatten_comments(&tree.comments)
}

/// The flattened comments joined by blank lines
pub fn render_outline(tree: &CommentTree) -> String {
    flatten_tree(tree).join("\n\n")
}

/// Prompt asking for a summary of the whole thread
pub fn summary_prompt(tree: &CommentTree) -> String {
    format!("{}{}", SUMMARY_TEMPLATE, render_outline(tree))
}

/// Prompt asking a question about the thread.
///
/// Fails with [`RedthreadError::EmptyQuestion`] for a blank question.
pub fn question_prompt(tree: &CommentTree, question: &str) -> Result<String> {
    let question = question.trim();
    if question.is_empty() {
        return Err(RedthreadError::EmptyQuestion);
    }

    Ok(format!(
        "Let's consider the following Reddit comments:\n\n{}\n\nAnswer the following question based on the information in the comments above: {}",
        render_outline(tree),
        question
    ))
}

/// Standalone text meant to be pasted into any assistant
pub fn export_prompt(tree: &CommentTree) -> String {
    format!("{}{}", EXPORT_TEMPLATE, render_outline(tree))
}

pub async fn summarize_tree<S>(summarizer: &S, tree: &CommentTree) -> Result<String>
where
    S: Summarizer + Sync + ?Sized,
{
    summarizer.summarize(&summary_prompt(tree)).await
}
