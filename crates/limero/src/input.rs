use std::fs;
use std::io::Read;
use std::path::Path;

use crate::exit::{hex_error, io_error, CliResult};

/// Read the whole input, from `path` or stdin when none is given.
pub fn read_input(path: Option<&Path>) -> CliResult<Vec<u8>> {
    let data = match path {
        Some(path) => fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?,
        None => {
            let mut data = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut data)
                .map_err(|err| io_error("failed reading stdin", err))?;
            data
        }
    };
    tracing::debug!(bytes = data.len(), "input read");
    Ok(data)
}

/// Read binary input, optionally given as hex text.
pub fn read_binary(path: Option<&Path>, hex_input: bool) -> CliResult<Vec<u8>> {
    let data = read_input(path)?;
    if hex_input {
        decode_hex(&data)
    } else {
        Ok(data)
    }
}

/// Decode hex digits, ignoring any whitespace between them.
pub fn decode_hex(text: &[u8]) -> CliResult<Vec<u8>> {
    let digits: Vec<u8> = text
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    hex::decode(digits).map_err(|err| hex_error("invalid hex input", err))
}
