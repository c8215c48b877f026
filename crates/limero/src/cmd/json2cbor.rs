use limero_frame::{FrameConfig, FrameWriter};
use limero_value::Value;

use crate::cmd::Json2cborArgs;
use crate::exit::{frame_error, value_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::input::read_input;
use crate::output::print_binary;

pub fn run(args: Json2cborArgs) -> CliResult<i32> {
    let data = read_input(args.input.as_deref())?;
    let text = std::str::from_utf8(&data)
        .map_err(|err| CliError::new(DATA_INVALID, format!("input is not UTF-8: {err}")))?;

    let value = Value::from_json(text).map_err(|err| value_error("invalid JSON", err))?;
    let cbor = value.to_cbor();
    tracing::debug!(kind = value.kind().as_str(), cbor = cbor.len(), "converted");

    let out = if args.frame {
        frame_payload(&cbor, args.max_frame_size)?
    } else {
        cbor
    };
    print_binary(&out, args.hex)?;
    Ok(SUCCESS)
}

fn frame_payload(payload: &[u8], max_frame_size: usize) -> CliResult<Vec<u8>> {
    let config = FrameConfig {
        max_frame_size,
        ..FrameConfig::default()
    };
    let mut writer = FrameWriter::with_config(Vec::new(), config);
    writer
        .send(payload)
        .map_err(|err| frame_error("framing failed", err))?;
    Ok(writer.into_inner())
}
