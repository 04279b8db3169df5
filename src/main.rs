mod archive;
mod parser;
mod settings;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use parser::extract::Extractor;
use settings::Settings;

#[derive(Parser)]
#[command(name = "vk_archive_parser", about = "Extract messages from a saved VK archive as JSON")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Flags that take precedence over `VKARCH_*` settings.
#[derive(Args)]
struct Overrides {
    /// Encoding of the saved pages (WHATWG label)
    #[arg(long, global = true)]
    encoding: Option<String>,
    /// Class token marking a message container
    #[arg(long, global = true)]
    message_class: Option<String>,
    /// Class token marking a message header
    #[arg(long, global = true)]
    header_class: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write all messages, grouped by user, as JSON
    Parse {
        /// Archive root (the folder containing `messages/`)
        archive: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
        /// Sort each user's messages by date (undated last)
        #[arg(long)]
        sort: bool,
    },
    /// Show extraction statistics
    Stats {
        /// Archive root (the folder containing `messages/`)
        archive: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(encoding) = cli.overrides.encoding {
        settings.encoding = encoding;
    }
    if let Some(class) = cli.overrides.message_class {
        settings.message_class = class;
    }
    if let Some(class) = cli.overrides.header_class {
        settings.header_class = class;
    }
    let extractor = Extractor::new(settings.extract_config()?);

    let result = match cli.command {
        Commands::Parse {
            archive: root,
            output,
            pretty,
            sort,
        } => {
            let mut report = run_archive(&root, &settings, &extractor)?;
            if sort {
                for user in &mut report.users {
                    archive::sort_by_date(&mut user.messages);
                }
            }

            let out: Box<dyn Write> = match &output {
                Some(path) => Box::new(
                    File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?,
                ),
                None => Box::new(io::stdout().lock()),
            };
            let mut out = BufWriter::new(out);
            if pretty {
                serde_json::to_writer_pretty(&mut out, &report.users)?;
            } else {
                serde_json::to_writer(&mut out, &report.users)?;
            }
            out.flush()?;

            if let Some(path) = output {
                eprintln!(
                    "Wrote {} messages for {} users to {}",
                    report.stats.messages,
                    report.stats.users,
                    path.display()
                );
            }
            Ok(())
        }
        Commands::Stats { archive: root } => {
            let report = run_archive(&root, &settings, &extractor)?;
            let s = report.stats;
            println!("Users:       {}", s.users);
            println!("Pages:       {}", s.pages);
            println!("Messages:    {}", s.messages);
            println!("Undated:     {}", s.undated);
            println!("Dropped:     {}", s.dropped);
            println!("Bad months:  {}", s.unrecognized_months);

            if !report.users.is_empty() {
                println!("\n{:<24} | {:>8}", "User", "Messages");
                println!("{}", "-".repeat(35));
                for user in &report.users {
                    println!("{:<24} | {:>8}", truncate(&user.user_id, 24), user.messages.len());
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

fn run_archive(
    root: &std::path::Path,
    settings: &Settings,
    extractor: &Extractor,
) -> Result<archive::ArchiveReport> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages ({per_sec})")?
            .progress_chars("#>-"),
    );

    let report = archive::parse_archive(
        root,
        &settings.messages_dir,
        &settings.encoding,
        extractor,
        &pb,
    )?;
    pb.finish_and_clear();
    Ok(report)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
