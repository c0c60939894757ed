use anyhow::anyhow;
use formatx::formatx;
use std::fmt::Debug;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Destination for the reports produced by a project run, one stream per report.
pub trait OutputWriter: Debug + Sync + Send {
    /// Open the stream for the report identified by `location_key`, e.g. `("tilt_matrix", "csv")`.
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write>;

    /// True when nothing written is kept, so building reports can be skipped altogether.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each report to its own file in `directory`. The name comes from a template with two
/// positional placeholders, the report key and then the extension, e.g. `"shenzhen__{}.{}"`.
#[derive(Debug)]
pub struct FileOutputWriter {
    directory: PathBuf,
    file_name_template: String,
}

impl FileOutputWriter {
    pub fn new(directory: PathBuf, file_name_template: String) -> Self {
        Self {
            directory,
            file_name_template,
        }
    }

    pub fn report_path(&self, location_key: &str, file_extension: &str) -> anyhow::Result<PathBuf> {
        let file_name = formatx!(&self.file_name_template, location_key, file_extension)
            .map_err(|error| anyhow!("Could not build report file name: {error:?}"))?;

        Ok(self.directory.join(file_name))
    }
}

impl OutputWriter for FileOutputWriter {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        let file = File::create(self.report_path(location_key, file_extension)?)?;

        Ok(BufWriter::new(file))
    }
}

/// Discards every report; used when only the returned results are wanted.
#[derive(Debug, Default)]
pub struct SinkOutputWriter;

impl OutputWriter for SinkOutputWriter {
    fn writer_for_location_key(&self, _: &str, _: &str) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env::temp_dir;

    #[test]
    fn should_name_report_from_template() {
        let output = FileOutputWriter::new(PathBuf::from("results"), "site__{}.{}".to_string());

        assert_eq!(
            output.report_path("tilt_matrix", "csv").unwrap(),
            PathBuf::from("results").join("site__tilt_matrix.csv")
        );
    }

    #[test]
    fn should_write_report_to_file() {
        let output = FileOutputWriter::new(
            temp_dir(),
            format!("output_writer_test_{}__{{}}.{{}}", std::process::id()),
        );

        {
            let mut writer = output.writer_for_location_key("check", "txt").unwrap();
            writer.write_all(b"ok").unwrap();
            writer.flush().unwrap();
        }

        let path = output.report_path("check", "txt").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ok");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn should_treat_sink_as_noop() {
        let output = SinkOutputWriter;

        assert!(output.is_noop());
        assert!(output
            .writer_for_location_key("anything", "csv")
            .unwrap()
            .write_all(b"discarded")
            .is_ok());
    }
}
