use clap::{Parser, Subcommand};
use quadprint::imaging::{ImageBackend, RustBackend};
use quadprint::process::ProcessEvent;
use quadprint::{config, output, pipeline, render, scan};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use tracing_subscriber::EnvFilter;

/// Shared positional inputs for commands that read images.
#[derive(clap::Args, Clone)]
struct InputArgs {
    /// Image files or directories of images, in document order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn version_string() -> &'static str {
    let on_tag = env!("QUADPRINT_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("QUADPRINT_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup; called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "quadprint")]
#[command(about = "Lay out images four to a page as a printable A4 PDF")]
#[command(long_about = "\
Lay out images four to a page as a printable A4 PDF

Every image is turned 90° counter-clockwise and placed in a 2x2 grid of
92x131mm cells, in the order given. Directories expand to their image files
sorted by name, so rasterized PDF pages (page-001.png, page-002.png, ...)
stay together and in order.

  quadprint build cover.jpg scans/ back.png -o booklet.pdf

Files that fail to decode are skipped and reported; the rest of the batch
is still printed. PDFs must be rasterized to images first.

Run 'quadprint gen-config' to generate a documented quadprint.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (defaults to ./quadprint.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log per-image and per-page detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process and lay out images, then write the PDF
    Build {
        #[command(flatten)]
        input: InputArgs,
        /// Output file (defaults to output.file_name from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the page plan without writing a document
    Plan {
        #[command(flatten)]
        input: InputArgs,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// List which inputs would be used, without processing them
    Check(InputArgs),
    /// Print a stock quadprint.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(config::CONFIG_FILE_NAME));

    match cli.command {
        Command::Build { input, output } => {
            let config = config::load_config(&config_path)?;
            init_thread_pool(&config.processing);
            let scanned = scan::collect_sources(&input.inputs, &config.input)?;
            print_lines(output::format_scan_skips(&scanned));
            let output_path = output.unwrap_or_else(|| PathBuf::from(&config.output.file_name));

            println!("==> Processing {} images", scanned.sources.len());
            let (tx, printer) = spawn_progress_printer();
            // Render into memory so a failed build leaves no partial file behind
            let mut sink = render::PdfSink::new(Vec::new());
            let result =
                pipeline::build_document(&RustBackend::new(), &scanned.sources, &mut sink, Some(tx));
            printer.join().map_err(|_| "progress printer panicked")?;
            let summary = result?;

            std::fs::write(&output_path, sink.into_inner())?;
            output::print_build_summary(&summary, &output_path);
        }
        Command::Plan { input, json } => {
            let config = config::load_config(&config_path)?;
            init_thread_pool(&config.processing);
            let scanned = scan::collect_sources(&input.inputs, &config.input)?;

            if json {
                let planned = pipeline::plan_document(&RustBackend::new(), &scanned.sources, None)?;
                println!("{}", serde_json::to_string_pretty(&planned.plan)?);
            } else {
                print_lines(output::format_scan_skips(&scanned));
                let (tx, printer) = spawn_progress_printer();
                let result =
                    pipeline::plan_document(&RustBackend::new(), &scanned.sources, Some(tx));
                printer.join().map_err(|_| "progress printer panicked")?;
                let planned = result?;
                println!();
                output::print_plan(&planned.plan);
            }
        }
        Command::Check(input) => {
            let config = config::load_config(&config_path)?;
            let scanned = scan::collect_sources(&input.inputs, &config.input)?;
            let backend = RustBackend::new();
            let dimensions: Vec<_> = scanned
                .sources
                .iter()
                .map(|s| backend.identify(&s.bytes).ok())
                .collect();
            output::print_check_output(&scanned, &dimensions);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "quadprint=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Print progress events on a separate thread; the thread ends when the sender is dropped.
///
/// The page processor sends its events in input order once the parallel
/// phase is done, so lines appear in batch order rather than as each image
/// finishes.
fn spawn_progress_printer() -> (Sender<ProcessEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            print_lines(output::format_process_event(&event));
        }
    });
    (tx, printer)
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}
