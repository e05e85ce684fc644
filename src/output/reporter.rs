use super::*;
use std::fs;
use tracing::info;

use super::text::TextGenerator;

pub struct Reporter {
    format: OutputFormat,
    output_path: Option<String>,
}

impl Reporter {
    /// Writes to `output_path` when given, to stdout otherwise.
    pub fn new(format: &str, output_path: Option<&str>) -> Result<Self> {
        let format = OutputFormat::from(format);
        let output_path = output_path.map(|path| super::add_file_extension(path, &format));

        Ok(Self {
            format,
            output_path,
        })
    }

    pub fn render(&self, report: &Report) -> Result<String> {
        match self.format {
            OutputFormat::Text => TextGenerator.generate(report),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        }
    }

    pub fn generate_report(&self, report: &Report) -> Result<()> {
        let content = self.render(report)?;

        match &self.output_path {
            Some(path) => {
                fs::write(path, content)?;
                info!("Report saved to {}", path);
            }
            None => println!("{}", content),
        }
        Ok(())
    }
}
