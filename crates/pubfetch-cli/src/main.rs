use std::path::PathBuf;

use clap::{builder::ArgAction, Parser};
use console::{style, Emoji};
use errors::CliErrors;
use pubfetch::{
  entrez::{DEFAULT_BASE_URL, DEFAULT_MAX_RESULTS},
  ConsoleSink, CsvSink, EntrezClient, EntrezConfig, Pipeline, RunReport, Sink,
};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod errors;

static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
static BOOKS: Emoji<'_, '_> = Emoji("📚 ", "");
static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "");
static SUCCESS: Emoji<'_, '_> = Emoji("✨ ", "");

#[derive(Parser)]
#[command(
  author,
  version,
  about = "Search PubMed and list papers with authors at pharmaceutical or biotech companies"
)]
struct Cli {
  /// PubMed search query (full PubMed query syntax is supported)
  query: String,

  /// File name to save results as CSV; prints a table when omitted
  #[arg(short, long)]
  file: Option<PathBuf>,

  /// Print search progress and enable debug logging
  #[arg(short, long)]
  debug: bool,

  /// Verbose mode (-v, -vv, -vvv)
  #[arg(short, long, action = ArgAction::Count, help = "Increase logging verbosity")]
  verbose: u8,

  /// Maximum number of papers to fetch
  #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
  max_results: usize,

  /// NCBI API key for a higher request rate limit
  #[arg(long, env = "NCBI_API_KEY", hide_env_values = true)]
  api_key: Option<String>,

  /// Base URL of the E-utilities service
  #[arg(long, env = "PUBFETCH_EUTILS_URL", default_value = DEFAULT_BASE_URL, hide = true)]
  base_url: String,
}

/// Setup logging with the specified verbosity level
fn setup_logging(verbosity: u8, debug: bool) {
  let verbosity = if debug { verbosity.max(2) } else { verbosity };
  let filter = match verbosity {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_target(true)
    .init();
}

/// Progress lines shown with `--debug` once the run is done, kept off stdout so
/// the table stays clean
fn print_progress(report: &RunReport) {
  eprintln!(
    "{} Found {} paper IDs: {}",
    style(BOOKS).cyan(),
    style(report.identifiers.len()).yellow(),
    report.identifiers.join(", ")
  );
  for failure in &report.extraction.failures {
    eprintln!("{} Skipped {}", style(WARNING).yellow(), failure);
  }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliErrors> {
  let cli = Cli::parse();
  setup_logging(cli.verbose, cli.debug);

  let config = EntrezConfig {
    base_url: cli.base_url,
    max_results: cli.max_results,
    api_key: cli.api_key,
    ..EntrezConfig::default()
  };
  trace!("Using E-utilities at: {}", config.base_url);
  let client = EntrezClient::new(config)?;

  if cli.debug {
    eprintln!(
      "{} Searching PubMed for: {}",
      style(LOOKING_GLASS).cyan(),
      style(&cli.query).yellow()
    );
  }
  let report = Pipeline::new(&client, &client)
    .with_max_results(client.config().max_results)
    .run(&cli.query)
    .await?;

  if cli.debug {
    print_progress(&report);
  }

  let rows = report.rows();
  debug!("Report has {} rows", rows.len());

  match &cli.file {
    Some(path) => {
      if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        trace!("Creating parent directories: {}", parent.display());
        std::fs::create_dir_all(parent)?;
      }
      let written = CsvSink::new(path).write(&rows)?;
      println!(
        "{} Saved {} results to {}",
        style(SAVE).green(),
        style(written).yellow(),
        style(path.display()).yellow()
      );
    },
    None if rows.is_empty() => {
      println!(
        "{} No papers found matching: {}",
        style(WARNING).yellow(),
        style(&cli.query).yellow()
      );
    },
    None => {
      let written = ConsoleSink::new(std::io::stdout().lock()).write(&rows)?;
      let with_company =
        report.extraction.papers.iter().filter(|paper| paper.has_company_authors()).count();
      println!(
        "\n{} Found {} papers, {} with non-academic authors",
        style(SUCCESS).green(),
        style(written).yellow(),
        style(with_company).yellow()
      );
    },
  }
  Ok(())
}
