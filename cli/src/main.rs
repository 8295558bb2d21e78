//! doctables CLI - table detection for document element trees

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;

use doctables::extract::{CoordinateOrigin, Flavor, StaticExtractor};
use doctables::pipeline::{FailurePolicy, PipelineOutput};
use doctables::{
    load_document, CommandExtractor, Diagnostics, Document, ElementKind, JsonFormat, PageSelection,
    Pipeline, TableDetectionModule, TableDetectionOptions, TableExtractor,
};

#[derive(Parser)]
#[command(name = "doctables")]
#[command(version)]
#[command(about = "Detect tables in document element trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an external table extractor over every page
    Detect {
        /// Input document (JSON)
        #[arg(value_name = "DOCUMENT")]
        input: PathBuf,

        /// Extractor program to run per page
        #[arg(long, env = "DOCTABLES_EXTRACTOR", value_name = "PROGRAM")]
        extractor: PathBuf,

        /// Extractor argument; {page}, {index}, {source} and {flavor} are substituted
        #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
        args: Vec<String>,

        /// Extraction flavor passed to the extractor
        #[arg(long, value_enum, default_value = "lattice")]
        flavor: FlavorArg,

        /// Seconds allowed per extractor call
        #[arg(long, default_value = "60", value_name = "SECS")]
        timeout: u64,

        /// Maximum concurrent extractor calls (defaults to CPU count)
        #[arg(short, long, value_name = "N")]
        jobs: Option<usize>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Apply a recorded extractor payload to every selected page
    Replay {
        /// Input document (JSON)
        #[arg(value_name = "DOCUMENT")]
        input: PathBuf,

        /// Recorded payload (JSON array of table descriptors)
        #[arg(value_name = "PAYLOAD")]
        payload: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Show document information
    Info {
        /// Input document (JSON)
        #[arg(value_name = "DOCUMENT")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct CommonArgs {
    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Coordinate origin of the extractor's boxes
    #[arg(long, value_enum, default_value = "top-left")]
    origin: OriginArg,

    /// Subsume elements when this fraction of their area lies inside a table
    #[arg(long, value_name = "FRACTION")]
    overlap: Option<f32>,

    /// Also run on pages that already hold tables
    #[arg(long)]
    keep_existing: bool,

    /// Keep the document as far as it got if the module fails
    #[arg(long)]
    keep_going: bool,

    /// Write diagnostics as JSON to this file
    #[arg(long, value_name = "FILE")]
    diagnostics: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FlavorArg {
    /// Ruling-line based detection
    Lattice,
    /// Whitespace based detection
    Stream,
}

impl From<FlavorArg> for Flavor {
    fn from(flavor: FlavorArg) -> Self {
        match flavor {
            FlavorArg::Lattice => Flavor::Lattice,
            FlavorArg::Stream => Flavor::Stream,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OriginArg {
    /// Origin at the top-left corner, y grows downwards
    TopLeft,
    /// PDF user space, y grows upwards
    BottomLeft,
}

impl From<OriginArg> for CoordinateOrigin {
    fn from(origin: OriginArg) -> Self {
        match origin {
            OriginArg::TopLeft => CoordinateOrigin::TopLeft,
            OriginArg::BottomLeft => CoordinateOrigin::BottomLeft,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Detect {
            input,
            extractor,
            args,
            flavor,
            timeout,
            jobs,
            common,
        } => cmd_detect(&input, extractor, args, flavor, timeout, jobs, &common),
        Commands::Replay {
            input,
            payload,
            common,
        } => cmd_replay(&input, &payload, &common),
        Commands::Info { input } => cmd_info(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_detect(
    input: &Path,
    program: PathBuf,
    args: Vec<String>,
    flavor: FlavorArg,
    timeout: u64,
    jobs: Option<usize>,
    common: &CommonArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = CommandExtractor::new(program)
        .args(args)
        .with_flavor(flavor.into())
        .with_origin(common.origin.into());

    let mut options = build_options(common)?.with_timeout(Duration::from_secs(timeout));
    if let Some(jobs) = jobs {
        options = options.with_max_concurrent_extractions(jobs);
    }

    run(input, extractor, options, common)
}

fn cmd_replay(
    input: &Path,
    payload: &Path,
    common: &CommonArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = StaticExtractor::from_payload_file(payload)?.with_origin(common.origin.into());
    run(input, extractor, build_options(common)?, common)
}

fn build_options(common: &CommonArgs) -> Result<TableDetectionOptions, Box<dyn std::error::Error>> {
    let mut options = TableDetectionOptions::new();
    if let Some(p) = &common.pages {
        let pages = PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?;
        options = options.with_pages(pages);
    }
    if let Some(fraction) = common.overlap {
        options = options.with_overlap_threshold(fraction);
    }
    if common.keep_existing {
        options = options.with_existing_tables(doctables::tables::ExistingTablePolicy::Preserve);
    }
    options.validate()?;
    Ok(options)
}

fn run(
    input: &Path,
    extractor: impl TableExtractor + 'static,
    options: TableDetectionOptions,
    common: &CommonArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_document(input)?;
    log::debug!("loaded {} page(s) from {}", doc.page_count(), input.display());
    let policy = if common.keep_going {
        FailurePolicy::SkipAndContinue
    } else {
        FailurePolicy::Fatal
    };

    let PipelineOutput {
        document,
        diagnostics,
    } = Pipeline::new()
        .with_default_policy(policy)
        .add(TableDetectionModule::new(extractor).with_options(options))
        .run(doc)?;

    report_diagnostics(&diagnostics);
    if let Some(path) = &common.diagnostics {
        fs::write(path, serde_json::to_string_pretty(&diagnostics)?)?;
    }

    let format = if common.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = doctables::render::to_json(&document, format)?;

    if let Some(path) = &common.output {
        fs::write(path, &json)?;
        eprintln!(
            "{} {} ({} table(s))",
            "Saved to".green(),
            path.display(),
            document.elements_of::<doctables::Table>().len()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn report_diagnostics(diagnostics: &Diagnostics) {
    for d in diagnostics {
        let location = d
            .page
            .map(|p| format!("page {}", p + 1))
            .unwrap_or_else(|| "document".to_string());
        eprintln!("{} [{}] {}: {}", "warning".yellow().bold(), d.module, location, d.message);
    }
}

fn kind_counts(doc: &Document) -> Vec<(ElementKind, usize)> {
    ElementKind::ALL
        .iter()
        .map(|&kind| {
            let count = doc.pages.iter().map(|p| p.count_of(kind)).sum();
            (kind, count)
        })
        .collect()
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_document(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), doc.page_count());

    if let Some(ref source) = doc.metadata.source {
        println!("{}: {}", "Source".bold(), source.display());
    }
    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref producer) = doc.metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }

    println!();
    println!("{}", "Elements".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for (kind, count) in kind_counts(&doc) {
        println!("{}: {}", kind.to_string().bold(), count);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "doctables".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Table detection for document element trees");
}
