//! Tab-separated report output.

use std::io::Write;
use std::path::Path;

use cohort_core::error::{CohortError, Result};
use cohort_core::models::ResultRow;
use tracing::debug;

/// Field delimiter of the written report.
pub const OUTPUT_DELIMITER: u8 = b'\t';

/// Header of the written report.
pub const OUTPUT_HEADER: [&str; 2] = ["timestamp", "value"];

/// Write `rows` as a header plus one `YYYY-MM-DD<TAB>integer` line each.
///
/// The header is always written, so an empty result still yields a valid
/// table.
pub fn write_rows<W: Write>(writer: W, rows: &[ResultRow]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(OUTPUT_DELIMITER)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(OUTPUT_HEADER)?;
    for row in rows {
        wtr.write_record([
            row.timestamp.format("%Y-%m-%d").to_string(),
            row.value.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Atomically write the report to `path`, replacing any existing file.
///
/// Rows go to a sibling temp file first, which is then renamed over `path`.
pub fn write_report(path: &Path, rows: &[ResultRow]) -> Result<()> {
    let write_err = |source: std::io::Error| CohortError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let tmp = path.with_extension("csv.tmp");
    let file = std::fs::File::create(&tmp).map_err(write_err)?;
    if let Err(e) = write_rows(std::io::BufWriter::new(file), rows) {
        let _ = std::fs::remove_file(&tmp);
        return Err(output_error(path, e));
    }
    std::fs::rename(&tmp, path).map_err(write_err)?;

    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Attach `path` to record and flush failures raised while writing it.
fn output_error(path: &Path, err: CohortError) -> CohortError {
    let source = match err {
        CohortError::Csv(e) => std::io::Error::from(e),
        CohortError::Io(e) => e,
        other => return other,
    };
    CohortError::FileWrite {
        path: path.to_path_buf(),
        source,
    }
}
