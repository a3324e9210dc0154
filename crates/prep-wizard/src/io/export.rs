//! Export of the prepared dataset to CSV or Excel.

use polars::prelude::*;
use rust_xlsxwriter::Workbook;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::dataset::DatasetHandle;
use crate::error::{Result, ResultExt, WizardError};
use crate::prompt::{ChoiceProvider, Prompt, ask_option};
use crate::types::{ExportFormat, Resolution};
use crate::utils::{DtypeCategory, numeric_values, series_dtype_category, text_values};

/// Write the frame as CSV with a header row and no index.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    let mut df = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .context(format!("Failed to write {}", path.display()))
}

/// Write the frame as the first worksheet of an xlsx workbook.
///
/// The header row holds the column names; numbers and booleans keep their
/// type and nulls are left blank.
pub fn write_excel(df: &DataFrame, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (index, column) in df.get_columns().iter().enumerate() {
        let col = u16::try_from(index)
            .map_err(|_| WizardError::Internal("too many columns for a worksheet".to_string()))?;
        worksheet.write_string(0, col, column.name().as_str())?;

        let series = column.as_materialized_series();
        match series_dtype_category(series) {
            DtypeCategory::Numeric => {
                for (row, value) in numeric_values(series)?.into_iter().enumerate() {
                    if let Some(v) = value {
                        worksheet.write_number(row as u32 + 1, col, v)?;
                    }
                }
            }
            DtypeCategory::Boolean => {
                for (row, value) in series.bool()?.into_iter().enumerate() {
                    if let Some(v) = value {
                        worksheet.write_boolean(row as u32 + 1, col, v)?;
                    }
                }
            }
            _ => {
                for (row, value) in text_values(series)?.into_iter().enumerate() {
                    if let Some(v) = value {
                        worksheet.write_string(row as u32 + 1, col, v)?;
                    }
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Writes exports into an optional output directory.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    output_dir: Option<PathBuf>,
}

impl Exporter {
    const MENU: &'static str = "export";

    pub fn new(output_dir: Option<PathBuf>) -> Self {
        Self { output_dir }
    }

    /// Path of `<stem>.<ext>` inside the output directory.
    pub fn target_path(&self, stem: &str, format: ExportFormat) -> Result<PathBuf> {
        let stem = stem.trim();
        if stem.is_empty() {
            return Err(WizardError::InvalidSelection(
                "the file name cannot be empty".to_string(),
            ));
        }
        let file_name = format!("{}.{}", stem, format.extension());
        Ok(match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        })
    }

    /// Write the dataset and return the path written.
    pub fn export(&self, df: &DataFrame, stem: &str, format: ExportFormat) -> Result<PathBuf> {
        let path = self.target_path(stem, format)?;
        if let Some(dir) = &self.output_dir
            && !dir.exists()
        {
            std::fs::create_dir_all(dir)?;
            info!("Created output directory: {}", dir.display());
        }

        match format {
            ExportFormat::Csv => write_csv(df, &path)?,
            ExportFormat::Excel => write_excel(df, &path)?,
        }
        info!(path = %path.display(), rows = df.height(), "Exported dataset");
        Ok(path)
    }

    /// Interactive entry point.
    pub fn resolve(
        &self,
        data: &DatasetHandle,
        choices: &mut dyn ChoiceProvider,
    ) -> Result<Resolution> {
        let prompt = Prompt::menu("Export data")
            .option(ExportFormat::Csv.display_name())
            .option(ExportFormat::Excel.display_name())
            .option("Back");
        let format = match ask_option(choices, Self::MENU, &prompt)? {
            1 => ExportFormat::Csv,
            2 => ExportFormat::Excel,
            _ => return Ok(Resolution::Cancelled),
        };

        let stem = choices.prompt(&Prompt::question("File name (without extension)"))?;
        let path = self.export(data.df(), &stem, format)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Resolution::Applied(format!("Data exported as \"{}\"", file_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::loader::{read_csv, read_excel};
    use crate::prompt::ScriptedChoices;
    use crate::types::LoadFormat;
    use pretty_assertions::assert_eq;

    fn frame() -> DataFrame {
        df![
            "x" => [Some(1.5), None, Some(3.0)],
            "flag" => [true, false, true],
            "name" => ["a", "b", "c"],
        ]
        .unwrap()
    }

    #[test]
    fn test_empty_stem_is_rejected() {
        let exporter = Exporter::default();
        assert!(matches!(
            exporter.target_path("  ", ExportFormat::Csv),
            Err(WizardError::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_csv_export_has_header_and_no_index() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(Some(dir.path().join("out")));
        let path = exporter.export(&frame(), "prepared", ExportFormat::Csv).unwrap();

        assert_eq!(path, dir.path().join("out").join("prepared.csv"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().next().unwrap(), "x,flag,name");
        let back = read_csv(&path, 100).unwrap();
        assert_eq!(back.shape(), (3, 3));
    }

    #[test]
    fn test_excel_export_round_trips_values() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(Some(dir.path().to_path_buf()));
        let path = exporter.export(&frame(), "book", ExportFormat::Excel).unwrap();

        let back = read_excel(&path).unwrap();
        assert_eq!(back.shape(), (3, 3));
        assert_eq!(back.column("x").unwrap().null_count(), 1);
        assert_eq!(back.column("flag").unwrap().dtype(), &DataType::Boolean);
    }

    #[test]
    fn test_resolve_reports_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(Some(dir.path().to_path_buf()));
        let data = DatasetHandle::new(frame(), "in.csv", LoadFormat::Csv);
        let mut choices = ScriptedChoices::new(["1", "result"]);

        let resolution = exporter.resolve(&data, &mut choices).unwrap();
        assert_eq!(
            resolution,
            Resolution::Applied("Data exported as \"result.csv\"".to_string())
        );
        assert!(dir.path().join("result.csv").exists());
    }

    #[test]
    fn test_resolve_back() {
        let data = DatasetHandle::new(frame(), "in.csv", LoadFormat::Csv);
        let mut choices = ScriptedChoices::new(["3"]);
        assert_eq!(
            Exporter::default().resolve(&data, &mut choices).unwrap(),
            Resolution::Cancelled
        );
    }
}
