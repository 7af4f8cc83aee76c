//! bindery - Markdown to EPUB converter

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use bindery::{BookMeta, CoverImage, PreamblePolicy, SegmentOptions};

#[derive(Parser)]
#[command(name = "bindery")]
#[command(version, about = "Markdown to EPUB converter", long_about = None)]
#[command(after_help = "EXAMPLES:
    bindery notes.md                              Convert with defaults
    bindery notes.md -o book.epub --title Notes   Choose output and title
    bindery notes.md --cover art.png              Embed a cover image
    bindery notes.md --outline                    Print the chapter plan as JSON")]
struct Cli {
    /// Input Markdown file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output EPUB file (defaults to the slugified title)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Book title (defaults to the input file stem)
    #[arg(long)]
    title: Option<String>,

    /// Book author
    #[arg(long, default_value = "Unknown")]
    author: String,

    /// Book language tag
    #[arg(long, default_value = "en")]
    language: String,

    /// Cover image (png and gif kept as-is, anything else treated as jpeg)
    #[arg(long, value_name = "IMAGE")]
    cover: Option<PathBuf>,

    /// Encoding to try when the input is not valid UTF-8
    #[arg(long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Keep content before the first chapter heading as a leading chapter
    #[arg(long)]
    keep_preamble: bool,

    /// Print the outline and chapter plan as JSON instead of writing a package
    #[arg(long)]
    outline: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log::LevelFilter::Info
        })
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let raw = std::fs::read(&cli.input).map_err(|e| format!("{}: {e}", cli.input.display()))?;
    let text = bindery::decode_text(&raw, cli.encoding.as_deref());

    let options = SegmentOptions {
        preamble: if cli.keep_preamble {
            PreamblePolicy::LeadingChapter
        } else {
            PreamblePolicy::Discard
        },
    };

    if cli.outline {
        return print_outline(&text, &options);
    }

    let title = match &cli.title {
        Some(title) => title.clone(),
        None => cli
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("book")
            .to_string(),
    };
    let meta = BookMeta::new(title)
        .with_author(cli.author.as_str())
        .with_language(cli.language.as_str());

    let cover = match &cli.cover {
        Some(path) => {
            let data = std::fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
            let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("jpg");
            Some(CoverImage::new(data, extension))
        }
        None => None,
    };

    let package = bindery::convert_with_options(&text, &meta, cover.as_ref(), &options)
        .map_err(|e| e.to_string())?;

    let output = match &cli.output {
        Some(path) => path.clone(),
        None => PathBuf::from(&package.file_name),
    };
    std::fs::write(&output, &package.bytes).map_err(|e| format!("{}: {e}", output.display()))?;

    if !cli.quiet {
        println!("wrote {} ({} bytes)", output.display(), package.bytes.len());
    }

    Ok(())
}

fn print_outline(text: &str, options: &SegmentOptions) -> Result<(), String> {
    let document = bindery::markdown::parse(text);
    let outline = bindery::outline::extract(&document);
    let chapters = bindery::segment::segment(&document, &outline, options);

    #[derive(serde::Serialize)]
    struct Plan<'a> {
        headings: &'a [bindery::outline::HeadingRecord],
        chapters: &'a [bindery::segment::Chapter],
    }

    let plan = Plan {
        headings: outline.headings(),
        chapters: &chapters,
    };
    let json = serde_json::to_string_pretty(&plan).map_err(|e| e.to_string())?;
    println!("{json}");

    Ok(())
}
