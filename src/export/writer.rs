//! CSV output of projected firewall rules.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::row::{OutputRow, HEADER};
use crate::compute::FirewallRule;
use crate::error::{Error, Result};

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of data rows written, header excluded
    pub rows: usize,
    /// Destination file
    pub path: PathBuf,
}

/// Writes a header followed by one row per rule.
///
/// Each row is echoed to `echo` before it is written to the CSV sink. The
/// echo is best effort: after its first failure it is dropped and the CSV
/// output continues.
pub struct CsvExporter<W: Write, E: Write> {
    writer: csv::Writer<W>,
    echo: Option<E>,
    rows: usize,
}

impl<W: Write, E: Write> CsvExporter<W, E> {
    /// Wrap a sink and write the header row.
    pub fn new(sink: W, echo: E) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(sink);
        writer.write_record(HEADER)?;
        Ok(Self {
            writer,
            echo: Some(echo),
            rows: 0,
        })
    }

    /// Project and write one rule.
    pub fn write_rule(&mut self, rule: &FirewallRule) -> Result<()> {
        let row = OutputRow::from_rule(rule);
        if let Some(ref mut echo) = self.echo {
            if let Err(e) = writeln!(echo, "{}", row.echo_line()) {
                warn!("Row echo stopped: {}", e);
                self.echo = None;
            }
        }
        self.writer.write_record(row.cells())?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush everything and hand back the sink.
    pub fn finish(mut self) -> Result<(W, usize)> {
        self.writer.flush()?;
        if let Some(ref mut echo) = self.echo {
            if let Err(e) = echo.flush() {
                debug!("Flushing row echo failed: {}", e);
            }
        }
        let sink = self
            .writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))?;
        Ok((sink, self.rows))
    }
}

/// Write all rules, in order, to `sink`. Returns the number of data rows.
pub fn write_rules<W: Write, E: Write>(rules: &[FirewallRule], sink: W, echo: E) -> Result<usize> {
    let mut exporter = CsvExporter::new(sink, echo)?;
    for rule in rules {
        exporter.write_rule(rule)?;
    }
    let (_, rows) = exporter.finish()?;
    Ok(rows)
}

/// Create (or truncate) `path` and write all rules to it.
pub fn export_to_file<E: Write>(rules: &[FirewallRule], path: &Path, echo: E) -> Result<ExportSummary> {
    let file = File::create(path).map_err(|source| Error::CreateOutput {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Writing {} rule(s) to {}", rules.len(), path.display());

    let rows = write_rules(rules, file, echo)?;
    Ok(ExportSummary {
        rows,
        path: path.to_path_buf(),
    })
}
