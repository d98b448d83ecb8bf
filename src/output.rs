use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Result;
use colored::*;

use crate::cli::OutputFormat;
use crate::scanner::ScanReport;

pub struct OutputWriter {
    format: OutputFormat,
    file: Option<PathBuf>,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, file: Option<PathBuf>) -> Self {
        Self { format, file }
    }

    pub fn write(&self, report: &ScanReport) -> Result<()> {
        let output = self.render(report)?;

        match &self.file {
            Some(path) => {
                let file = File::create(path)?;
                let mut writer = BufWriter::new(file);
                writer.write_all(output.as_bytes())?;
                writer.flush()?;
            }
            None => {
                print!("{}", output);
                io::stdout().flush()?;
            }
        }

        Ok(())
    }

    pub fn render(&self, report: &ScanReport) -> Result<String> {
        Ok(match self.format {
            OutputFormat::Human => format_human(report),
            OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(report)?),
            OutputFormat::Csv => format_csv(report),
        })
    }
}

fn format_human(report: &ScanReport) -> String {
    let mut output = String::new();

    if report.has_open_ports() {
        for port in &report.open_ports {
            output.push_str(&format!("{} {}\n", port.to_string().bold(), "Open".green()));
        }
    } else {
        output.push_str(&format!("{}\n", "No open ports".yellow()));
    }

    output.push_str(&format!(
        "{}\n",
        format!("Done! ({} seconds)", report.elapsed_secs()).cyan()
    ));

    output
}

fn format_csv(report: &ScanReport) -> String {
    let mut csv = String::from("target,port,state\n");
    for port in &report.open_ports {
        csv.push_str(&format!("{},{},open\n", report.target, port));
    }
    csv
}
