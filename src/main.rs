//! lectern - USFM/USX to Bible API document tree

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Deserialize;

use lectern::generate::batched;
use lectern::{
    BookSegment, FsSink, GenerateOptions, OutputSink, ParseOutput, ParsedBook, SourceFormat,
    StaticAudioIndex, Translation,
};

#[derive(Parser)]
#[command(name = "lectern")]
#[command(version, about = "USFM/USX to Bible API document tree", long_about = None)]
#[command(after_help = "EXAMPLES:
    lectern input/ out/                Generate all documents
    lectern input/ out/ --book-ids     Use canonical ids in chapter paths
    lectern input/ out/ --filter '\\.json$'
                                       Regenerate chapter documents only

INPUT LAYOUT:
    input/<translation>/metadata.json  Translation metadata
    input/<translation>/*.usfm|*.usx   One file per book")]
struct Cli {
    /// Input directory (one subdirectory per translation)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory for the generated document tree
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Use canonical book ids in chapter paths instead of common names
    #[arg(long)]
    book_ids: bool,

    /// Only emit documents whose path matches this regex
    #[arg(long, value_name = "REGEX")]
    filter: Option<String>,

    /// Audio index JSON file (entries of translation/book/chapter/reader/url)
    #[arg(long, value_name = "FILE")]
    audio_index: Option<PathBuf>,

    /// Documents per write batch
    #[arg(long, default_value_t = 100)]
    batch_size: usize,

    /// Suppress warning output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[derive(Deserialize)]
struct AudioEntry {
    translation: String,
    book: String,
    chapter: u32,
    reader: String,
    url: String,
}

fn run(cli: &Cli) -> lectern::Result<()> {
    let mut books: Vec<ParsedBook> = Vec::new();
    let mut warning_count = 0usize;

    for entry in fs::read_dir(&cli.input)? {
        let dir = entry?.path();
        if !dir.is_dir() {
            continue;
        }
        let translation = load_translation(&dir)?;
        translation.validate()?;
        let sources = book_sources(&dir)?;

        // Books are independent before generation; parse them in
        // parallel, each worker owning its builder state exclusively.
        let parsed: Vec<lectern::Result<ParseOutput>> = std::thread::scope(|scope| {
            let handles: Vec<_> = sources
                .iter()
                .map(|(path, format)| {
                    scope.spawn(move || {
                        let content = fs::read_to_string(path)?;
                        lectern::parse(&content, *format)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("parse worker panicked"))
                .collect()
        });

        for output in parsed {
            let output = output?;
            if !cli.quiet {
                for warning in &output.warnings {
                    eprintln!("warning: {}: {warning}", translation.id);
                }
            }
            warning_count += output.warnings.len();
            books.push(ParsedBook {
                translation: translation.clone(),
                book: output.book,
            });
        }
    }

    let path_filter = match &cli.filter {
        Some(pattern) => Some(regex::Regex::new(pattern).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
        })?),
        None => None,
    };
    let audio = match &cli.audio_index {
        Some(path) => Some(load_audio_index(path)?),
        None => None,
    };
    let options = GenerateOptions {
        book_segment: if cli.book_ids {
            BookSegment::Id
        } else {
            BookSegment::CommonName
        },
        audio: audio.as_ref().map(|a| a as &dyn lectern::AudioIndex),
        path_filter,
    };

    let docs = lectern::generate(&books, &options)?;

    let mut sink = FsSink::new(&cli.output);
    for batch in batched(&docs, cli.batch_size) {
        for doc in batch {
            sink.write(doc)?;
        }
    }

    if !cli.quiet {
        eprintln!(
            "wrote {} documents for {} books ({} warnings)",
            docs.len(),
            books.len(),
            warning_count
        );
    }
    Ok(())
}

fn load_translation(dir: &Path) -> lectern::Result<Translation> {
    let bytes = fs::read(dir.join("metadata.json"))?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn book_sources(dir: &Path) -> lectern::Result<Vec<(PathBuf, SourceFormat)>> {
    let mut sources = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("usfm") => SourceFormat::Usfm,
            Some("usx") => SourceFormat::Usx,
            _ => continue,
        };
        sources.push((path, format));
    }
    sources.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(sources)
}

fn load_audio_index(path: &Path) -> lectern::Result<StaticAudioIndex> {
    let bytes = fs::read(path)?;
    let entries: Vec<AudioEntry> = serde_json::from_slice(&bytes)?;
    let mut index = StaticAudioIndex::new();
    for e in entries {
        index.insert(e.translation, e.book, e.chapter, e.reader, e.url);
    }
    Ok(index)
}
