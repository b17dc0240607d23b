use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vista_client::{ClearOutcome, HttpTransport, SubmitOutcome, ThreadController, ThreadView};
use vista_types::DataUri;

/// Chat with a Vista server: the first prompt generates, later prompts refine.
#[derive(Debug, Parser)]
#[command(name = "vista-chat", version)]
struct Args {
    /// Base URL of the Vista API server
    #[arg(long, env = "VISTA_SERVER", default_value = "http://localhost:4000")]
    server: String,

    /// Directory to write ready images into
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(dir) = &args.out_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let transport = HttpTransport::new(&args.server)?;
    let controller = ThreadController::new(transport);

    println!("Thread {} on {}", controller.thread_id(), args.server);
    println!("Type a prompt. /clear resets the thread, /quit exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/clear" => match controller.clear_thread().await {
                ClearOutcome::Cleared => println!("Thread cleared."),
                ClearOutcome::Rejected => println!("Busy; try again once the current request finishes."),
                ClearOutcome::Failed => print_banner(&controller.snapshot()),
            },
            prompt => match controller.submit_prompt(prompt).await {
                SubmitOutcome::Rejected => {}
                SubmitOutcome::Ready(entry_id) => {
                    let view = controller.snapshot();
                    report_ready(&view, &entry_id, args.out_dir.as_ref()).await;
                }
                SubmitOutcome::Failed(_) => print_banner(&controller.snapshot()),
            },
        }
    }

    Ok(())
}

/// Print a ready entry and save its image when an output directory is set.
/// A bad image or a failed write is reported and the session keeps going.
async fn report_ready(view: &ThreadView, entry_id: &str, out_dir: Option<&PathBuf>) {
    let Some((index, entry)) = view.entries.iter().enumerate().find(|(_, e)| e.id == entry_id) else {
        return;
    };
    let seed = entry.seed.as_deref().unwrap_or("-");
    let image_data = entry.image_data.as_deref().unwrap_or_default();

    let Some(dir) = out_dir else {
        println!("[{}] ready  seed={}  ({} bytes encoded)", index + 1, seed, image_data.len());
        return;
    };

    let name = format!("{:02}-{}", index + 1, entry.id);
    match save_image(dir, &name, image_data).await {
        Ok(path) => println!("[{}] ready  seed={}  -> {}", index + 1, seed, path.display()),
        Err(e) => eprintln!("[{}] ready  seed={}  but not saved: {:#}", index + 1, seed, e),
    }
}

async fn save_image(dir: &Path, name: &str, image_data: &str) -> Result<PathBuf> {
    let image = DataUri::parse(image_data).context("Server returned a malformed image")?;
    let path = dir.join(format!("{}.{}", name, image.extension()));
    tokio::fs::write(&path, &image.bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn print_banner(view: &ThreadView) {
    if let Some(banner) = &view.banner {
        eprintln!("error: {}", banner.message);
    }
}
