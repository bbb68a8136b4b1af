//! unartifact CLI - extraction artifact cleanup tool
//!
//! A command-line tool for cleaning paginated documents exported from a viewer.

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use unartifact::cleanup::CanonicalKey;
use unartifact::scan::{PageScan, ScanOptions};
use unartifact::{
    clean_document, load_file, render, CleanupOptions, FragmentKind, OutputFormat, RenderOptions,
};

/// Suspicious matches listed per page before the rest is summarized.
const MAX_MATCHES_SHOWN: usize = 20;

/// Removes extraction artifacts from paginated HTML, JSON and text documents
#[derive(Parser)]
#[command(
    name = "unartifact",
    author = "iyulab",
    version,
    about = "Remove extraction artifacts from paginated documents",
    long_about = "unartifact - cleanup for text extracted into paginated viewers.\n\n\
                  Drops garbage fragments, strips noise glyphs, removes page-local\n\
                  repeats and wraps bare math notation.\n\n\
                  Usage:\n  \
                  unartifact <file>              Clean and write all formats to <stem>_output/\n  \
                  unartifact <file> <output>     Clean and write to the given directory\n  \
                  unartifact scan <file>         Report leftover artifacts"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file path (for default conversion)
    #[arg(global = false)]
    input: Option<PathBuf>,

    /// Output directory (for default conversion)
    #[arg(global = false)]
    output: Option<PathBuf>,

    #[command(flatten)]
    cleanup: CleanupArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Flags shared by every command that runs the cleanup pass
#[derive(Args, Clone, Default)]
struct CleanupArgs {
    /// JSON file with cleanup options
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep repeated fragments
    #[arg(long, global = true)]
    no_dedupe: bool,

    /// Do not wrap math notation
    #[arg(long, global = true)]
    no_math: bool,

    /// Keep fragments carrying artifact signatures
    #[arg(long, global = true)]
    no_drop: bool,

    /// Clean pages in parallel
    #[arg(long, global = true)]
    parallel: bool,
}

impl CleanupArgs {
    fn to_options(&self) -> unartifact::Result<CleanupOptions> {
        let mut options = match self.config {
            Some(ref path) => CleanupOptions::from_json_file(path)?,
            None => CleanupOptions::default(),
        };
        if self.no_dedupe {
            options = options.without_dedupe();
        }
        if self.no_math {
            options = options.without_math_wrapping();
        }
        if self.no_drop {
            options = options.without_drop();
        }
        if self.parallel {
            options = options.parallel();
        }
        options.validate()?;
        Ok(options)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a document and write a single format
    Clean {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default: inferred from the output extension, else markdown)
        #[arg(short, long)]
        format: Option<Format>,

        /// Emit a heading before each page (markdown)
        #[arg(long)]
        page_headings: bool,

        /// Include metadata as frontmatter
        #[arg(long)]
        frontmatter: bool,
    },

    /// Report leftover artifacts without changing anything
    Scan {
        /// Input file path
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Minimum length of a line counted as repeated
        #[arg(long, default_value_t = unartifact::scan::DEFAULT_MIN_LINE_LEN)]
        min_len: usize,
    },

    /// Print the canonical deduplication key of a text
    Key {
        /// Text to normalize
        text: String,

        /// Treat the text as a list item
        #[arg(long)]
        list_item: bool,
    },

    /// Show document information and cleanup statistics
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Show version information
    Version,
}

/// Output format
#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Markdown
    Markdown,
    /// Viewer-style HTML
    Html,
    /// Plain text
    Text,
    /// Document model as JSON
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Initializes stderr logging. `RUST_LOG` overrides the verbosity flag.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = cli.command else {
        // Default command (unartifact <file> [output])
        if let Some(input) = cli.input {
            return run_convert(&input, cli.output.as_deref(), &cli.cleanup.to_options()?);
        }
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Clean {
            input,
            output,
            format,
            page_headings,
            frontmatter,
        } => {
            let options = cli.cleanup.to_options()?;
            let pb = create_spinner("Loading document...");

            let mut doc = load_file(&input)?;
            pb.set_message("Cleaning...");
            let report = clean_document(&mut doc, &options);

            let mut render_options = RenderOptions::default();
            if page_headings {
                render_options = render_options.with_page_headings();
            }
            if frontmatter {
                render_options = render_options.with_frontmatter();
            }

            let format = format.unwrap_or_else(|| infer_format(output.as_deref()));
            let content = match format {
                Format::Json => doc.to_json()?,
                Format::Markdown => render::render_markdown(&doc, &render_options)?,
                Format::Html => render::render_html(&doc, &render_options)?,
                Format::Text => render::render_text(&doc, &render_options)?,
            };

            pb.finish_and_clear();
            write_output(output.as_deref(), &content)?;

            if let Some(path) = output {
                println!(
                    "{} Cleaned {} pages, removed {} fragments: {}",
                    "✓".green().bold(),
                    report.pages,
                    report.removed(),
                    path.display()
                );
            }
        }

        Commands::Scan {
            input,
            json,
            min_len,
        } => {
            let pb = create_spinner("Scanning document...");
            let doc = load_file(&input)?;
            let options = ScanOptions::default().with_min_line_len(min_len);
            let scans = unartifact::scan::scan_document(&doc, &options);
            pb.finish_and_clear();

            if json {
                write_output(None, &serde_json::to_string_pretty(&scans)?)?;
            } else {
                print_scan(&input, &scans);
            }
        }

        Commands::Key { text, list_item } => {
            let kind = if list_item {
                FragmentKind::ListItem
            } else {
                FragmentKind::Paragraph
            };
            println!("{}", CanonicalKey::new(kind, &text));
        }

        Commands::Info { input } => {
            let options = cli.cleanup.to_options()?;
            let pb = create_spinner("Analyzing document...");

            let format = unartifact::detect_format_from_path(&input)?;
            let doc = load_file(&input)?;
            let mut cleaned = doc.clone();
            let report = clean_document(&mut cleaned, &options);

            pb.finish_and_clear();

            println!("{}", "Document Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {}", "Format".bold(), format);
            println!("{}: {}", "Pages".bold(), doc.page_count());
            if let Some(max_page) = doc.max_page() {
                println!("{}: {}", "Last page".bold(), max_page);
            }
            if let Some(ref title) = doc.metadata.title {
                println!("{}: {}", "Title".bold(), title);
            }

            let text = doc.plain_text();
            println!("\n{}", "Content Statistics".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Fragments".bold(), doc.fragment_count());
            println!("{}: {}", "Words".bold(), text.split_whitespace().count());
            println!("{}: {}", "Characters".bold(), text.chars().count());

            println!("\n{}", "Cleanup Preview".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Dropped".bold(), report.dropped);
            for (kind, count) in &report.drop_reasons {
                println!("  {} ({}): {}", kind, kind.signature(), count);
            }
            println!("{}: {}", "Rewritten".bold(), report.rewritten);
            println!("{}: {}", "Duplicates".bold(), report.deduplicated);
            println!("{}: {}", "Kept".bold(), report.kept);
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Run the default convert command - writes every format to the output directory
fn run_convert(
    input: &Path,
    output: Option<&Path>,
    options: &CleanupOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_spinner("Loading document...");

    // Determine output directory
    let output_dir = match output {
        Some(p) => p.to_path_buf(),
        None => {
            let stem = input
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let parent = input.parent().unwrap_or(Path::new("."));
            parent.join(format!("{}_output", stem))
        }
    };

    fs::create_dir_all(&output_dir)?;

    let mut doc = load_file(input)?;

    pb.set_message("Cleaning...");
    let report = clean_document(&mut doc, options);

    let render_options = RenderOptions::default().with_frontmatter();
    for format in [OutputFormat::Html, OutputFormat::Markdown, OutputFormat::Text] {
        pb.set_message(format!("Writing clean.{}...", format.extension()));
        let path = output_dir.join(format!("clean.{}", format.extension()));
        fs::write(&path, render::render(&doc, format, &render_options)?)?;
    }

    pb.set_message("Writing JSON...");
    fs::write(output_dir.join("content.json"), doc.to_json()?)?;
    fs::write(
        output_dir.join("report.json"),
        serde_json::to_string_pretty(&report)?,
    )?;

    pb.finish_and_clear();

    // Print summary
    println!("{}", "Cleanup Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Output".bold(), output_dir.display());
    for name in ["clean.html", "clean.md", "clean.txt", "content.json", "report.json"] {
        println!("  {} {}", "✓".green(), name);
    }

    // Print statistics
    println!("\n{}", "Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Pages".bold(), report.pages);
    println!("{}: {}", "Fragments".bold(), report.seen);
    println!("{}: {}", "Dropped".bold(), report.dropped);
    println!("{}: {}", "Rewritten".bold(), report.rewritten);
    println!("{}: {}", "Duplicates".bold(), report.deduplicated);

    Ok(())
}

fn infer_format(output: Option<&Path>) -> Format {
    let Some(path) = output else {
        return Format::Markdown;
    };
    if path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
    {
        return Format::Json;
    }
    match OutputFormat::from_path(path) {
        Ok(OutputFormat::Html) => Format::Html,
        Ok(OutputFormat::Text) => Format::Text,
        _ => Format::Markdown,
    }
}

fn print_scan(input: &Path, scans: &[PageScan]) {
    let dirty: Vec<&PageScan> = scans.iter().filter(|s| !s.report.is_clean()).collect();

    println!("{}", "Scan Report".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), scans.len());
    println!("{}: {}", "Pages with findings".bold(), dirty.len());

    for scan in dirty {
        let label = scan
            .page
            .map_or_else(|| "?".to_string(), |n| n.to_string());
        println!("\n{} {}", "Page".bold(), label);

        for repeated in &scan.report.repeated_lines {
            println!(
                "  {} line {} repeated {}x: {}",
                "!".yellow().bold(),
                repeated.line,
                repeated.repetitions,
                repeated.text
            );
        }
        for found in scan.report.suspicious.iter().take(MAX_MATCHES_SHOWN) {
            println!(
                "  {} {} '{}' ...{}...",
                "!".yellow().bold(),
                found.description,
                found.occurrence,
                found.context
            );
        }
        let hidden = scan.report.suspicious.len().saturating_sub(MAX_MATCHES_SHOWN);
        if hidden > 0 {
            println!("  ... and {} more (use --json for the full list)", hidden);
        }
    }
}

fn print_version() {
    println!(
        "{} {}",
        "unartifact".green().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("Extraction artifact cleanup for paginated documents");
    println!();
    println!("Supported inputs: viewer HTML, JSON, plain text");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
