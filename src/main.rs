// SPDX-License-Identifier: MPL-2.0

use clap::{Parser, Subcommand};
use pollboard::api::{BoardClient, FeedQuery, OrderBy};
use pollboard::categories::{CategoryStore, flatten_for_select};
use pollboard::comments::{CommentThread, flatten_with_depth, render_depth};
use pollboard::config::APP_NAME;
use pollboard::feed::{Completion, FeedLoader, PostFeedSource};
use pollboard::posts::PostAdmin;
use pollboard::quiz::QuizSession;
use pollboard::runtime;
use pollboard::state::{AppSettings, SessionContext};
use pollboard::util::time_ago;
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pollboard", version, about = "Browse a debate and vote board from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL (defaults to the saved setting)
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List posts, page by page
    Feed {
        /// Search posts by title
        #[arg(long)]
        title: Option<String>,
        /// Only posts in this category
        #[arg(long)]
        category: Option<String>,
        /// recent, oldest or popular
        #[arg(long, default_value = "recent")]
        order: OrderBy,
        /// Stop after this many pages
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Show the comment thread of a post
    Comments { post_id: i64 },
    /// List categories with their full paths
    Categories,
    /// Show the signed-in user, if any
    Whoami,
    /// Show a post's quiz, optionally answering it
    Quiz {
        post_id: i64,
        /// Option id to submit
        #[arg(long)]
        answer: Option<i64>,
    },
    /// Delete a post (admins only)
    DeletePost { post_id: i64 },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match runtime::block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{APP_NAME}: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let settings = AppSettings::load();
    let base = cli.api_url.as_deref().unwrap_or(&settings.api_base_url);
    let client = Arc::new(BoardClient::with_base(base)?);
    tracing::debug!(base = %client.base_url(), "using backend");

    match cli.command {
        Commands::Feed {
            title,
            category,
            order,
            pages,
        } => {
            let query = FeedQuery {
                order_by: order,
                title,
                category_slug: category,
            };
            show_feed(client, query, settings.page_size, pages).await
        }
        Commands::Comments { post_id } => show_comments(&client, post_id).await,
        Commands::Categories => show_categories(&client).await,
        Commands::Whoami => {
            let mut session = SessionContext::new();
            session.refresh(client.as_ref()).await;
            match session.user() {
                Some(user) if session.is_admin() => println!("{} (admin)", user.username),
                Some(user) => println!("{}", user.username),
                None => println!("not signed in"),
            }
            Ok(())
        }
        Commands::Quiz { post_id, answer } => take_quiz(&client, post_id, answer).await,
        Commands::DeletePost { post_id } => {
            let mut session = SessionContext::new();
            session.refresh(client.as_ref()).await;
            let admin = PostAdmin::for_session(&session)?;

            let source = PostFeedSource::new(Arc::clone(&client));
            let mut listing = FeedLoader::new(FeedQuery::default(), settings.page_size);
            admin
                .delete(client.as_ref(), post_id, &mut listing, &source)
                .await?;
            println!("deleted post #{post_id}, {} posts on the first page", listing.items().len());
            Ok(())
        }
    }
}

async fn show_feed(
    client: Arc<BoardClient>,
    query: FeedQuery,
    page_size: usize,
    pages: usize,
) -> Result<(), Box<dyn Error>> {
    let source = PostFeedSource::new(client);
    let mut loader = FeedLoader::new(query, page_size);
    let mut shown = 0;

    for _ in 0..pages {
        let Some(outcome) = loader.load_next(&source).await else {
            break;
        };
        for post in &loader.items()[shown..] {
            let age = post.created_at.as_deref().map(time_ago).unwrap_or_default();
            let closed = if post.is_closed() { " [closed]" } else { "" };
            println!(
                "#{:<6} {}{}  ({} comments, {} votes) {}",
                post.id, post.title, closed, post.comment_count, post.vote_count, age
            );
        }
        shown = loader.items().len();

        match outcome {
            Completion::Appended(_) => {}
            Completion::Exhausted(_) | Completion::Stale => break,
            Completion::Failed => {
                return Err(loader.error().unwrap_or("failed to load posts").into());
            }
        }
    }

    if loader.has_more() {
        println!("-- more posts available --");
    }
    Ok(())
}

async fn show_comments(client: &BoardClient, post_id: i64) -> Result<(), Box<dyn Error>> {
    let mut thread = CommentThread::new(post_id);
    thread.reload(client).await?;

    println!("{} comments", thread.total());
    for (level, node) in flatten_with_depth(thread.forest()) {
        let indent = "    ".repeat(render_depth(level));
        let body = if node.record.deleted {
            "(deleted)"
        } else {
            node.record.content.as_str()
        };
        println!(
            "{indent}{} · {}\n{indent}  {body}",
            node.record.author_handle,
            time_ago(&node.record.updated_at)
        );
    }
    Ok(())
}

async fn take_quiz(
    client: &BoardClient,
    post_id: i64,
    answer: Option<i64>,
) -> Result<(), Box<dyn Error>> {
    let mut session = QuizSession::new(post_id);
    session.open(client).await;
    if let Some(error) = session.error() {
        return Err(error.into());
    }
    let Some(quiz) = session.quiz() else {
        println!("this post has no quiz");
        return Ok(());
    };

    println!("{}", quiz.question);
    for option in &quiz.options {
        println!("  [{}] {}", option.id, option.option_text);
    }

    let Some(option_id) = answer else {
        return Ok(());
    };
    if !session.select(option_id) {
        return Err(format!("no option {option_id} in this quiz").into());
    }
    let correct = session.submit(client).await?;
    println!("{}", if correct { "correct!" } else { "wrong." });
    if let Some(explanation) = session.explanation() {
        println!("{explanation}");
    }
    Ok(())
}

async fn show_categories(client: &BoardClient) -> Result<(), Box<dyn Error>> {
    let mut store = CategoryStore::new();
    store.load(client).await?;
    for option in flatten_for_select(store.tree()) {
        println!("{:>4}  {}", option.id, option.label);
    }
    Ok(())
}
