//! Command-line interface for the splitter.

use std::path::PathBuf;

use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{SplitOptions, DEFAULT_FILE_COUNT, DEFAULT_MAX_HEADER_LINES};
use crate::error::Result;
use crate::runner::{split_file, SplitReport};
use crate::splitter::{NoProgress, ProgressEvent, ProgressObserver, TracingObserver};

/// Split a single, large XML document into N smaller documents.
///
/// Lines before the first element form a header and lines after the last
/// element form a footer; both are copied into every output file. Elements
/// are distributed over the output files round-robin.
#[derive(Debug, Parser)]
#[command(name = "xmlsplit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Input XML file
    pub input: PathBuf,

    /// Output directory (created if missing)
    pub output_dir: PathBuf,

    /// Element tag to split on (e.g., record or <record>)
    pub tag: String,

    /// Number of output files
    #[arg(short = 'n', long = "number", default_value_t = DEFAULT_FILE_COUNT)]
    pub number: usize,

    /// Lines to scan for the first element before giving up (0 = no limit)
    #[arg(long, default_value_t = DEFAULT_MAX_HEADER_LINES)]
    pub max_header_lines: u64,

    /// Do not print progress or the summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Build run options from the parsed arguments.
    #[must_use]
    pub fn to_options(&self) -> SplitOptions {
        let max_header_lines = match self.max_header_lines {
            0 => None,
            limit => Some(limit),
        };
        SplitOptions::new(&self.input, &self.output_dir, &self.tag)
            .with_file_count(self.number)
            .with_max_header_lines(max_header_lines)
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    split_command(&cli)
}

/// Execute a split with progress output.
fn split_command(cli: &Cli) -> Result<()> {
    let options = cli.to_options();

    if cli.quiet {
        split_file(&options, &mut NoProgress)?;
        return Ok(());
    }

    println!(
        "{} {} into {} files on {}",
        style("Splitting").bold(),
        style(options.input.display()).cyan(),
        style(options.file_count).green(),
        style(format!("<{}>", options.tag.trim_matches(['<', '>']))).green()
    );
    println!();

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Reading header...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    // Events also go to the log so RUST_LOG=info keeps a record of the run
    let mut log = TracingObserver;
    let mut observer = |event: &ProgressEvent| {
        log.on_event(event);
        match event {
            ProgressEvent::LinesRead { .. } | ProgressEvent::ElementsProcessed { .. } => {
                pb.set_message(event.to_string());
            }
            _ => pb.println(format!("  {event}")),
        }
    };

    let report = match split_file(&options, &mut observer) {
        Ok(report) => report,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();
    print_report(&report);

    Ok(())
}

fn print_report(report: &SplitReport) {
    let summary = &report.summary;

    println!();
    println!("  Lines read: {}", summary.lines_read);
    println!("  Elements: {}", style(summary.elements_written).green());
    println!(
        "  Header/footer lines: {}/{}",
        summary.header_lines, summary.footer_lines
    );
    println!("  Element lines: {}", summary.element_lines);
    for (path, count) in report.outputs.iter().zip(&summary.slot_elements) {
        println!("    {} ({count} elements)", path.display());
    }
    if summary.unterminated_element {
        println!(
            "  {}",
            style("Warning: input ended inside an unterminated element; it was written with the footer")
                .yellow()
                .bold()
        );
    }

    println!();
    println!(
        "{} read {} lines, processed {} elements, took {} ms",
        style("Done:").green().bold(),
        summary.lines_read,
        summary.elements_written,
        report.elapsed.as_millis()
    );
}
