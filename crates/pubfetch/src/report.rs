//! Tabular rendering of extracted papers.
//!
//! Each [`Paper`] is flattened into a [`ReportRow`], joining the author and
//! affiliation lists with `"; "`. A [`Sink`] then renders the rows, either as a
//! console table or as a CSV file.
//!
//! # Examples
//!
//! ```no_run
//! use pubfetch::{CsvSink, Paper, ReportRow, Sink};
//!
//! # fn example(papers: Vec<Paper>) -> Result<(), pubfetch::errors::PubfetchError> {
//! let rows: Vec<ReportRow> = papers.iter().map(ReportRow::from).collect();
//! let written = CsvSink::new("results.csv").write(&rows)?;
//! println!("Saved {written} results");
//! # Ok(())
//! # }
//! ```

use std::{
  io::Write,
  path::{Path, PathBuf},
};

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};

use super::*;

/// Separator for the author and affiliation columns.
pub const LIST_SEPARATOR: &str = "; ";

/// Column headers, in output order.
pub const HEADERS: [&str; 6] = [
  "PubmedID",
  "Title",
  "Publication Date",
  "Non-academic Author(s)",
  "Company Affiliation(s)",
  "Corresponding Author Email",
];

/// One paper flattened into report columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
  /// PubMed identifier
  #[serde(rename = "PubmedID")]
  pub pubmed_id:            String,
  /// Article title
  #[serde(rename = "Title")]
  pub title:                String,
  /// Publication year
  #[serde(rename = "Publication Date")]
  pub publication_date:     String,
  /// Non-academic author names, `"; "`-joined
  #[serde(rename = "Non-academic Author(s)")]
  pub non_academic_authors: String,
  /// Company affiliations, `"; "`-joined
  #[serde(rename = "Company Affiliation(s)")]
  pub company_affiliations: String,
  /// Corresponding author email, possibly empty
  #[serde(rename = "Corresponding Author Email")]
  pub corresponding_email:  String,
}

impl From<&Paper> for ReportRow {
  fn from(paper: &Paper) -> Self {
    Self {
      pubmed_id:            paper.id.clone(),
      title:                paper.title.clone(),
      publication_date:     paper.publication_year.clone(),
      non_academic_authors: paper.non_academic_authors.join(LIST_SEPARATOR),
      company_affiliations: paper.company_affiliations.join(LIST_SEPARATOR),
      corresponding_email:  paper.corresponding_email.clone(),
    }
  }
}

impl ReportRow {
  /// The row's cells in [`HEADERS`] order.
  pub fn cells(&self) -> [&str; 6] {
    [
      self.pubmed_id.as_str(),
      self.title.as_str(),
      self.publication_date.as_str(),
      self.non_academic_authors.as_str(),
      self.company_affiliations.as_str(),
      self.corresponding_email.as_str(),
    ]
  }
}

/// Destination for report rows.
pub trait Sink {
  /// Writes all rows and returns how many were written.
  fn write(&mut self, rows: &[ReportRow]) -> Result<usize, PubfetchError>;
}

/// Renders rows as a table on any writer, typically stdout.
pub struct ConsoleSink<W: Write> {
  /// Where the table goes
  out:   W,
  /// Maximum table width, or `None` to size to the terminal
  width: Option<u16>,
}

impl<W: Write> ConsoleSink<W> {
  /// Creates a sink that sizes its table to the terminal.
  pub fn new(out: W) -> Self { Self { out, width: None } }

  /// Fixes the table width instead of querying the terminal.
  pub fn with_width(mut self, width: u16) -> Self {
    self.width = Some(width);
    self
  }

  /// Gives back the underlying writer.
  pub fn into_inner(self) -> W { self.out }
}

impl<W: Write> Sink for ConsoleSink<W> {
  fn write(&mut self, rows: &[ReportRow]) -> Result<usize, PubfetchError> {
    let mut table = Table::new();
    table
      .load_preset(UTF8_FULL)
      .set_content_arrangement(ContentArrangement::Dynamic)
      .set_header(HEADERS.iter().map(|h| Cell::new(h).add_attribute(Attribute::Bold)));
    if let Some(width) = self.width {
      table.set_width(width);
    }
    for row in rows {
      table.add_row(row.cells());
    }

    writeln!(self.out, "{table}")?;
    self.out.flush()?;
    Ok(rows.len())
  }
}

/// Writes rows to a CSV file with a header line.
pub struct CsvSink {
  /// Output file, created or truncated on write
  path: PathBuf,
}

impl CsvSink {
  /// Creates a sink for `path`.
  pub fn new(path: impl AsRef<Path>) -> Self { Self { path: path.as_ref().to_path_buf() } }

  /// The output file path.
  pub fn path(&self) -> &Path { &self.path }
}

impl Sink for CsvSink {
  fn write(&mut self, rows: &[ReportRow]) -> Result<usize, PubfetchError> {
    debug!("Writing {} rows to {}", rows.len(), self.path.display());
    let mut writer = csv::Writer::from_path(&self.path)?;
    if rows.is_empty() {
      // serialize only emits the header alongside the first record
      writer.write_record(HEADERS)?;
    }
    for row in rows {
      writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(rows.len())
  }
}
