//! Command-line interface for the harvester.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::bundle::{BundleAssembler, ProgressSink};
use crate::catalog::{load_catalog, CatalogSource, StatuteCatalog, ALL_CATEGORY, CATEGORIES};
use crate::config::{HarvesterConfig, DEFAULT_SELECTION_FILE};
use crate::error::{HarvesterError, Result};
use crate::fetcher::HttpFetcher;
use crate::markdown;
use crate::selection::SelectionList;
use crate::types::StatuteReference;

/// Hourei Harvester - Bundle Japanese statutes from e-Gov as Markdown.
#[derive(Parser)]
#[command(name = "hourei-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the official statute categories.
    Categories,

    /// List statutes, optionally restricted to a category.
    List {
        /// Category name (default: すべて)
        #[arg(short, long)]
        category: Option<String>,

        /// Only show labels containing this keyword
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Download one statute and convert it to Markdown.
    Convert {
        /// e-Gov law ID (e.g., 325AC0000000201)
        law_id: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Maintain a persisted selection list.
    Select {
        /// Selection file
        #[arg(short, long, default_value = DEFAULT_SELECTION_FILE)]
        file: PathBuf,

        #[command(subcommand)]
        action: SelectAction,
    },

    /// Download the selected statutes and write them to a ZIP archive.
    Bundle {
        /// Category whose statute list resolves the labels (default: すべて)
        #[arg(short, long)]
        category: Option<String>,

        /// Selection file to read labels from
        #[arg(short, long)]
        selection: Option<PathBuf>,

        /// Display labels to bundle, after those from the selection file
        labels: Vec<String>,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum SelectAction {
    /// Append labels, ignoring ones already selected.
    Add { labels: Vec<String> },
    /// Remove labels.
    Remove { labels: Vec<String> },
    /// Print the selection.
    Show,
    /// Remove every label.
    Clear,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = HarvesterConfig::from_env();

    match cli.command {
        Commands::Categories => {
            categories_command();
            Ok(())
        }
        Commands::List { category, filter } => {
            list_command(&config, category.as_deref(), filter.as_deref())
        }
        Commands::Convert { law_id, output } => {
            convert_command(config, &law_id, output.as_deref())
        }
        Commands::Select { file, action } => select_command(&file, action),
        Commands::Bundle {
            category,
            selection,
            labels,
            output,
        } => bundle_command(
            config,
            category.as_deref(),
            selection.as_deref(),
            labels,
            output.as_deref(),
        ),
    }
}

fn categories_command() {
    println!("{}", style(ALL_CATEGORY).bold());
    for (name, code) in CATEGORIES {
        println!("{} {name}", style(code).dim());
    }
}

fn list_command(config: &HarvesterConfig, category: Option<&str>, filter: Option<&str>) -> Result<()> {
    let source = CatalogSource::from_name(category)?;

    let spinner = spinner(format!("Loading statute list ({})...", source.name()));
    let catalog = load_catalog(config, &source);
    spinner.finish_and_clear();
    let catalog = catalog?;

    let shown = matching_statutes(&catalog, filter);
    for reference in &shown {
        println!("{}  {}", style(&reference.id).dim(), reference.display_label);
    }

    eprintln!();
    eprintln!(
        "{} of {} statutes in {}",
        style(shown.len()).bold(),
        catalog.len(),
        style(source.name()).cyan()
    );

    Ok(())
}

/// Catalog entries whose display label contains `filter`, or all of them.
fn matching_statutes<'a>(
    catalog: &'a StatuteCatalog,
    filter: Option<&'a str>,
) -> Vec<&'a StatuteReference> {
    match filter {
        Some(keyword) => catalog.search(keyword).collect(),
        None => catalog.iter().collect(),
    }
}

fn convert_command(config: HarvesterConfig, law_id: &str, output: Option<&Path>) -> Result<()> {
    let fetcher = HttpFetcher::new(config)?;

    let spinner = spinner(format!("Downloading {law_id}..."));
    let raw = fetcher.try_fetch(law_id);
    spinner.finish_and_clear();
    let raw = raw?;

    let text = markdown::convert(&raw.bytes);

    match output {
        Some(path) => {
            fs::write(path, text)?;
            eprintln!("{} {}", style("Saved to:").green().bold(), path.display());
        }
        None => print!("{text}"),
    }

    Ok(())
}

fn select_command(file: &Path, action: SelectAction) -> Result<()> {
    let mut selection = SelectionList::new();
    if file.exists() {
        selection.load_file(file)?;
    }

    match action {
        SelectAction::Add { labels } => {
            let added = selection.extend(labels);
            selection.save_file(file)?;
            println!("Added {} ({} selected)", style(added).green(), selection.len());
        }
        SelectAction::Remove { labels } => {
            let removed = labels.iter().filter(|label| selection.remove(label.as_str())).count();
            selection.save_file(file)?;
            println!("Removed {} ({} selected)", style(removed).yellow(), selection.len());
        }
        SelectAction::Show => {
            for (index, label) in selection.iter().enumerate() {
                println!("{:>3}. {label}", index + 1);
            }
            if selection.is_empty() {
                println!("{}", style("(empty)").dim());
            }
        }
        SelectAction::Clear => {
            selection.clear();
            selection.save_file(file)?;
            println!("Selection cleared");
        }
    }

    Ok(())
}

fn bundle_command(
    config: HarvesterConfig,
    category: Option<&str>,
    selection_file: Option<&Path>,
    labels: Vec<String>,
    output: Option<&Path>,
) -> Result<()> {
    let source = CatalogSource::from_name(category)?;

    let mut selection = SelectionList::new();
    if let Some(path) = selection_file {
        selection.load_file(path)?;
    }
    selection.extend(labels);
    if selection.is_empty() {
        return Err(HarvesterError::EmptySelection);
    }

    let output_dir = output.unwrap_or_else(|| Path::new("."));
    if !output_dir.is_dir() {
        return Err(HarvesterError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Output directory does not exist: {}", output_dir.display()),
        )));
    }

    let spinner = spinner(format!("Loading statute list ({})...", source.name()));
    let catalog = load_catalog(&config, &source);
    spinner.finish_and_clear();
    let catalog = catalog?;

    println!(
        "{} {} statutes from {}",
        style("Bundling").bold(),
        selection.len(),
        style(source.name()).cyan()
    );

    let fetcher = HttpFetcher::new(config)?;
    let mut progress = BarProgress::new();
    let bundle = BundleAssembler::new(&fetcher).assemble(&selection, &catalog, &mut progress)?;
    let path = bundle.save_to(output_dir)?;

    let report = &bundle.report;
    println!();
    println!("  Documents: {}", style(report.documents.len()).green());
    println!("  Images: {}", report.images.len());
    if !report.skipped.is_empty() {
        println!("  Skipped: {}", style(report.skipped.len()).yellow().bold());
        for skipped in &report.skipped {
            println!("    {} ({})", skipped.label, skipped.reason);
        }
    }
    println!();
    println!("{} {}", style("Saved to:").green().bold(), path.display());

    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Progress bar shown while a bundle is assembled.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .expect("valid template"),
        );
        Self { bar }
    }
}

impl ProgressSink for BarProgress {
    fn start(&mut self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.enable_steady_tick(std::time::Duration::from_millis(100));
    }

    fn item(&mut self, name: &str) {
        self.bar.set_message(format!("Processing {name}..."));
    }

    fn warn(&mut self, message: &str) {
        self.bar
            .println(format!("{} {message}", style("Warning:").yellow().bold()));
    }

    fn advance(&mut self, done: usize, _total: usize) {
        self.bar.set_position(done as u64);
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }
}
