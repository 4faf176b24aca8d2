//! Export of joined rows to CSV or JSON
//!
//! The file is written to a hidden temporary sibling and renamed into place
//! once complete, so a failed run never leaves a partial export behind.

use crate::config::OutputFormat;
use crate::error::CreditsError;
use chrono::{DateTime, Local};
use prisma_credits_types::{JoinedRow, EXPORT_COLUMNS};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Export file name prefix
pub const FILE_PREFIX: &str = "PrismaCloudCreditUsage_";

/// Serializes joined rows with the fixed column schema
#[derive(Debug, Clone, Copy, Default)]
pub struct Exporter {
    format: OutputFormat,
}

impl Exporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write `rows` to any sink in this exporter's format
    pub fn export<W: Write>(&self, rows: &[JoinedRow], sink: W) -> io::Result<()> {
        match self.format {
            OutputFormat::Csv => export_rows_to_csv(rows, sink),
            OutputFormat::Json => export_rows_to_json(rows, sink),
        }
    }

    /// Write `rows` to a timestamped file inside `dir`
    ///
    /// # Errors
    /// Returns `CreditsError::Export` if the directory or file cannot be
    /// created or written
    pub fn export_to_dir(
        &self,
        rows: &[JoinedRow],
        dir: &Path,
        generated_at: DateTime<Local>,
    ) -> Result<PathBuf, CreditsError> {
        let path = dir.join(output_file_name(generated_at, self.format));
        self.export_to_file(rows, &path)?;
        Ok(path)
    }

    /// Write `rows` to `path` (created/overwritten)
    pub fn export_to_file(&self, rows: &[JoinedRow], path: &Path) -> Result<(), CreditsError> {
        let export_err = |source| CreditsError::Export {
            path: path.to_path_buf(),
            source,
        };

        // Create parent directory if needed
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(export_err)?;
        }

        let partial = partial_path(path);
        let result = File::create(&partial)
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                self.export(rows, &mut writer)?;
                writer.flush()
            })
            .and_then(|()| std::fs::rename(&partial, path));

        if let Err(e) = result {
            let _ = std::fs::remove_file(&partial);
            return Err(export_err(e));
        }

        tracing::info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}

/// `PrismaCloudCreditUsage_<YYYY-MM-DD_HHMMSS>.<ext>`
pub fn output_file_name(generated_at: DateTime<Local>, format: OutputFormat) -> String {
    format!(
        "{}{}.{}",
        FILE_PREFIX,
        generated_at.format("%Y-%m-%d_%H%M%S"),
        format.extension()
    )
}

fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.partial", name))
}

/// Export rows to CSV
///
/// Header is always written, even for zero rows. Fields containing the
/// separator, quotes or newlines are quoted.
pub fn export_rows_to_csv<W: Write>(rows: &[JoinedRow], sink: W) -> io::Result<()> {
    let mut writer = csv::Writer::from_writer(sink);

    writer.write_record(EXPORT_COLUMNS).map_err(io::Error::other)?;

    for row in rows {
        writer
            .write_record(row.to_record())
            .map_err(io::Error::other)?;
    }

    writer.flush()
}

/// Export rows as a pretty-printed JSON array
pub fn export_rows_to_json<W: Write>(rows: &[JoinedRow], mut sink: W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut sink, rows).map_err(io::Error::from)?;
    writeln!(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use prisma_credits_types::{CloudType, ResourceTypeCounts};

    const HEADER: &str = "accountName,accountId,groupName,groupId,cloudType,total,container,iam,container_caas,data_store,agentless_host,host,serverless,iaas,waas,agentless_container";

    fn row(account_name: &str, group_id: &str) -> JoinedRow {
        JoinedRow {
            account_name: account_name.to_string(),
            account_id: "A1".to_string(),
            group_name: "Prod".to_string(),
            group_id: group_id.to_string(),
            cloud_type: CloudType::Azure,
            total: 42,
            resource_type_counts: ResourceTypeCounts {
                host: 5,
                waas: 1,
                ..Default::default()
            },
        }
    }

    fn csv_string(rows: &[JoinedRow]) -> String {
        let mut out = Vec::new();
        export_rows_to_csv(rows, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_header_only_for_zero_rows() {
        let output = csv_string(&[]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines, [HEADER]);
    }

    #[test]
    fn test_rows_in_input_order() {
        let output = csv_string(&[row("AcctOne", "G1"), row("AcctOne", "G2")]);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "AcctOne,A1,Prod,G1,azure,42,0,0,0,0,0,5,0,0,1,0");
        assert_eq!(lines[2], "AcctOne,A1,Prod,G2,azure,42,0,0,0,0,0,5,0,0,1,0");
    }

    #[test]
    fn test_embedded_separators_are_quoted() {
        let output = csv_string(&[row("Acme, Inc. \"prod\"", "G1")]);
        let data = output.lines().nth(1).unwrap();
        assert!(data.starts_with("\"Acme, Inc. \"\"prod\"\"\",A1,"));
    }

    #[test]
    fn test_json_export() {
        let mut out = Vec::new();
        Exporter::new(OutputFormat::Json)
            .export(&[row("AcctOne", "G1")], &mut out)
            .unwrap();

        let parsed: Vec<JoinedRow> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, vec![row("AcctOne", "G1")]);
    }

    #[test]
    fn test_output_file_name() {
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(
            output_file_name(at, OutputFormat::Csv),
            "PrismaCloudCreditUsage_2024-03-07_090502.csv"
        );
        assert_eq!(
            output_file_name(at, OutputFormat::Json),
            "PrismaCloudCreditUsage_2024-03-07_090502.json"
        );
    }

    #[test]
    fn test_export_to_dir_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("nested/out");
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();

        let path = Exporter::new(OutputFormat::Csv)
            .export_to_dir(&[row("AcctOne", "G1")], &out_dir, at)
            .unwrap();

        assert_eq!(path.parent().unwrap(), out_dir.as_path());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);

        // No temporary file left behind
        let entries: Vec<_> = std::fs::read_dir(&out_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
