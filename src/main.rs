use std::path::{Path, PathBuf};
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use inpxdb::library::fetch::BookFetcher;
use inpxdb::storage::layout::reset_index;
use inpxdb::{import_collection, Book, Collection, Config, Database, ImportOptions, SearchField};

/// Imports INPX collection indexes and queries the resulting book index
#[derive(Parser)]
#[command(name = "inpxdb")]
#[command(version)]
struct Cli {
    /// Index root (document store + search index)
    #[arg(long, global = true)]
    index: Option<PathBuf>,

    /// Library root holding book folders and sub-archives
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    /// Analyzer language for a newly created index
    #[arg(long, global = true)]
    language: Option<String>,

    /// Log debug events
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import an .inpx file into the index
    Import {
        file: PathBuf,
        /// Keep records flagged as deleted
        #[arg(long)]
        keep_deleted: bool,
        /// Only add books whose ids are not indexed yet
        #[arg(long)]
        partial: bool,
    },
    /// Search one field (Title, Authors, Series) or all of them
    Search {
        query: String,
        #[arg(long, default_value = "All")]
        field: String,
        #[arg(long, default_value_t = 0)]
        page: usize,
    },
    /// Books published during the last year, newest first
    Recent {
        #[arg(long)]
        count: Option<usize>,
    },
    /// Print one book
    Get { id: String },
    /// Copy a book's file out of the library
    Fetch {
        id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct SearchPage<'a> {
    total: u64,
    page: usize,
    pages: u64,
    has_next: bool,
    hits: &'a [Book],
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let defaults = Config::default();
    let config = Config {
        index_path: cli.index.unwrap_or(defaults.index_path),
        library_path: cli.library.unwrap_or(defaults.library_path),
        language: cli.language.unwrap_or(defaults.language),
        ..defaults
    };

    match cli.command {
        Commands::Import { file, keep_deleted, partial } => import(&config, &file, keep_deleted, partial),
        Commands::Search { query, field, page } => {
            let db = Database::open(&config.index_path)?;
            let result = db.search_by_field(SearchField::from_name(&field), &query, page, config.page_size)?;
            print_json(&SearchPage {
                total: result.total,
                page,
                pages: result.total_pages(config.page_size),
                has_next: result.has_next(page, config.page_size),
                hits: &result.hits,
            })?;
            db.close()?;
            Ok(())
        }
        Commands::Recent { count } => {
            let db = Database::open(&config.index_path)?;
            let books = db.get_most_recent(count.unwrap_or(config.page_size))?;
            print_json(&books)?;
            db.close()?;
            Ok(())
        }
        Commands::Get { id } => {
            let db = Database::open(&config.index_path)?;
            let book = db.get_by_id(&id)?;
            print_json(&book)?;
            db.close()?;
            Ok(())
        }
        Commands::Fetch { id, output } => {
            let db = Database::open(&config.index_path)?;
            let book = db.get_by_id(&id)?;
            db.close()?;

            let data = BookFetcher::new(&config.library_path)
                .read(&book)
                .with_context(|| format!("reading file of book {}", id))?;
            let output = output.unwrap_or_else(|| PathBuf::from(BookFetcher::file_name(&book)));
            std::fs::write(&output, &data)
                .with_context(|| format!("writing {}", output.display()))?;
            tracing::info!("wrote {} bytes to {}", data.len(), output.display());
            Ok(())
        }
    }
}

fn import(config: &Config, file: &Path, keep_deleted: bool, partial: bool) -> anyhow::Result<()> {
    let mut collection = Collection::open(file)
        .with_context(|| format!("opening {}", file.display()))?
        .with_queue_capacity(config.stream_queue_capacity);

    if !partial {
        reset_index(&config.index_path)?;
    }

    let mut db = Database::create(&config.index_path, &config.language)?;
    let options = ImportOptions {
        keep_deleted,
        partial,
        batch_size: config.batch_size,
    };

    let outcome = import_collection(&mut collection, &mut db, options);
    collection.close();
    let closed = db.close();

    let stats = match outcome {
        Ok(stats) => stats,
        Err(aborted) => {
            print_json(&aborted.stats)?;
            if let Err(e) = closed {
                tracing::warn!("closing index after a failed import: {}", e);
            }
            return Err(aborted.into());
        }
    };
    closed?;
    print_json(&stats)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
