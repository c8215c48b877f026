use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::exit::{io_error, CliError, CliResult, INTERNAL, USAGE};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One decoded item of a frame buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRow {
    pub offset: usize,
    pub depth: usize,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: String,
}

#[derive(Serialize)]
struct InspectOutput<'a> {
    payload_size: usize,
    items: &'a [ItemRow],
}

pub fn print_items(rows: &[ItemRow], payload: &[u8], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let out = InspectOutput {
                payload_size: payload.len(),
                items: rows,
            };
            let line = serde_json::to_string(&out)
                .map_err(|err| CliError::new(INTERNAL, err.to_string()))?;
            println!("{line}");
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["OFFSET", "TYPE", "VALUE"]);
            for row in rows {
                table.add_row(vec![
                    row.offset.to_string(),
                    format!("{}{}", "  ".repeat(row.depth), row.kind),
                    row.value.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                println!(
                    "{:>5}  {}{} {}",
                    row.offset,
                    "  ".repeat(row.depth),
                    row.kind,
                    row.value
                );
            }
        }
        OutputFormat::Raw => print_raw(payload)?,
    }
    Ok(())
}

/// Write binary output, as a hex line when `hex` is set.
///
/// Raw bytes are refused when stdout is a terminal.
pub fn print_binary(data: &[u8], hex: bool) -> CliResult<()> {
    if hex {
        println!("{}", hex::encode(data));
        return Ok(());
    }
    if std::io::stdout().is_terminal() {
        return Err(CliError::new(
            USAGE,
            "refusing to write binary output to a terminal (use --hex)",
        ));
    }
    print_raw(data)
}

pub fn print_raw(data: &[u8]) -> CliResult<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(data)
        .and_then(|()| out.flush())
        .map_err(|err| io_error("failed writing stdout", err))
}
