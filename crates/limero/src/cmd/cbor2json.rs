use bytes::BytesMut;
use limero_frame::{decode_frame, FrameConfig};
use limero_value::Value;

use crate::cmd::Cbor2jsonArgs;
use crate::exit::{frame_error, value_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::input::read_binary;

pub fn run(args: Cbor2jsonArgs) -> CliResult<i32> {
    let data = read_binary(args.input.as_deref(), args.hex)?;

    let payloads = if args.frame {
        let config = FrameConfig {
            max_frame_size: args.max_frame_size,
            verify_crc: !args.no_crc,
        };
        unframe(&data, &config)?
    } else {
        vec![data]
    };

    for payload in &payloads {
        let value = Value::from_cbor(payload).map_err(|err| value_error("invalid CBOR", err))?;
        println!("{}", value.to_json(args.pretty, 0));
    }
    Ok(SUCCESS)
}

/// Split a wire stream into frame payloads. A missing final delimiter is
/// tolerated.
fn unframe(data: &[u8], config: &FrameConfig) -> CliResult<Vec<Vec<u8>>> {
    let mut buf = BytesMut::from(data);
    if buf.last().is_some_and(|&b| b != 0) {
        buf.extend_from_slice(&[0]);
    }

    let mut payloads = Vec::new();
    while let Some(payload) =
        decode_frame(&mut buf, config).map_err(|err| frame_error("invalid frame", err))?
    {
        payloads.push(payload.to_vec());
    }
    tracing::debug!(frames = payloads.len(), "input unframed");

    if payloads.is_empty() {
        return Err(CliError::new(DATA_INVALID, "input holds no frames"));
    }
    Ok(payloads)
}
