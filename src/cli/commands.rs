use futures::future::join_all;

use crate::app::{AppContext, RedthreadError, Result};
use crate::domain::{CommentTree, Post};
use crate::reddit::SortType;
use crate::summary;

pub async fn list_posts(
    ctx: &AppContext,
    subreddits: &[String],
    sort: Option<SortType>,
    limit: Option<u32>,
    after: Option<&str>,
) -> Result<()> {
    let sort = sort.unwrap_or(ctx.config.listing.default_sort);
    let limit = limit.unwrap_or(ctx.config.listing.default_limit);

    let pages = join_all(
        subreddits
            .iter()
            .map(|subreddit| ctx.client.fetch_posts_page(subreddit, sort, limit, after)),
    )
    .await;

    let mut errors = 0;

    for (subreddit, page) in subreddits.iter().zip(pages) {
        match page {
            Ok(page) => {
                println!("r/{} ({})", subreddit.trim_start_matches("r/"), sort.display_name());
                for post in &page.posts {
                    print_post(post);
                }
                if let Some(after) = page.after {
                    println!("  next page: --after {}", after);
                }
                println!();
            }
            Err(e) => {
                errors += 1;
                eprintln!("  Error fetching r/{}: {}", subreddit, e);
            }
        }
    }

    if errors > 0 {
        eprintln!("{} of {} subreddits failed", errors, subreddits.len());
    }
    Ok(())
}

fn print_post(post: &Post) {
    let pinned = if post.stickied { " [pinned]" } else { "" };
    println!(
        "  {:>6} pts {:>5} comments  {}{}",
        post.score,
        post.num_comments,
        post.display_title(),
        pinned
    );
    println!("         {}", post.permalink);
    if let Some(image) = post.best_image_url() {
        println!("         image: {}", image);
    }
}

pub async fn show_comments(ctx: &AppContext, permalink: &str, json: bool) -> Result<()> {
    let tree = ctx.client.fetch_comments(permalink).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    print_tree(&tree);
    println!("\n{} comments", tree.len());
    Ok(())
}

fn print_tree(tree: &CommentTree) {
    for (depth, comment) in tree.iter() {
        let indent = "  ".repeat(depth);
        let mut lines = comment.processed_text.lines();

        println!("{}- {}", indent, lines.next().unwrap_or_default());
        for line in lines {
            println!("{}  {}", indent, line);
        }
        for image in comment.limited_image_urls() {
            println!("{}  [image] {}", indent, image);
        }
        if comment.has_more_images() {
            println!(
                "{}  [+{} more images]",
                indent,
                comment.image_urls.len() - 2
            );
        }
        for link in &comment.links {
            println!("{}  [link] {} -> {}", indent, link.label, link.url);
        }
    }
}

pub async fn outline(
    ctx: &AppContext,
    permalink: &str,
    question: Option<&str>,
    export: bool,
) -> Result<()> {
    if question.is_some_and(|q| q.trim().is_empty()) {
        return Err(RedthreadError::EmptyQuestion);
    }

    let tree = ctx.client.fetch_comments(permalink).await?;

    let prompt = match question {
        Some(question) => summary::question_prompt(&tree, question)?,
        None if export => summary::export_prompt(&tree),
        None => summary::summary_prompt(&tree),
    };

    println!("{}", prompt);
    Ok(())
}
