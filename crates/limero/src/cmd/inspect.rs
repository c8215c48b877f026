use limero_frame::decoder::MAX_DEPTH;
use limero_frame::{CborType, FrameDecoder, FrameError};

use crate::cmd::InspectArgs;
use crate::exit::{frame_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::input::read_binary;
use crate::output::{print_items, ItemRow, OutputFormat};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let data = read_binary(args.input.as_deref(), args.hex)?;

    let mut decoder = FrameDecoder::from_bytes(&data);
    if args.frame {
        decoder
            .decode_cobs()
            .map_err(|err| frame_error("invalid frame", err))?;
        decoder
            .check_crc()
            .map_err(|err| frame_error("invalid frame", err))?;
    }

    let (rows, open) = walk(&mut decoder).map_err(|err| frame_error("decode failed", err))?;
    let payload = &decoder.as_bytes()[..decoder.position()];
    print_items(&rows, payload, format)?;

    if open > 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!("buffer ends with {open} unclosed container(s)"),
        ));
    }
    Ok(SUCCESS)
}

/// Decode every item up to the end of the readable buffer.
///
/// Returns the rows and the number of containers still open at the end.
pub fn walk(decoder: &mut FrameDecoder) -> Result<(Vec<ItemRow>, usize), FrameError> {
    // Items left per open container; `None` until an end marker.
    let mut open: Vec<Option<u64>> = Vec::new();
    let mut rows = Vec::new();

    while decoder.remaining() > 0 {
        let offset = decoder.position();
        let ty = decoder.peek_type()?;

        let value = match ty {
            CborType::End => {
                if !matches!(open.last(), Some(None)) {
                    return Err(FrameError::StrayEnd { offset });
                }
                decoder.decode_end()?;
                open.pop();
                rows.push(row(offset, open.len(), ty, String::new()));
                close_item(&mut open);
                continue;
            }
            CborType::Array | CborType::Map => {
                let count = if ty == CborType::Array {
                    decoder.decode_array()?
                } else {
                    decoder.decode_map()?
                };
                rows.push(row(offset, open.len(), ty, describe_len(count)));
                match count {
                    Some(0) => close_item(&mut open),
                    Some(n) if ty == CborType::Map => open.push(Some(n.saturating_mul(2))),
                    other => open.push(other),
                }
                if open.len() > MAX_DEPTH {
                    return Err(FrameError::NestingTooDeep { max: MAX_DEPTH });
                }
                continue;
            }
            CborType::Uint => decoder.decode_uint()?.to_string(),
            CborType::Int => decoder.decode_int()?.to_string(),
            CborType::Str => format!("{:?}", decoder.decode_str()?),
            CborType::Bstr => format!("h'{}'", hex::encode(decoder.decode_bytes()?)),
            CborType::Float => decoder.decode_f32()?.to_string(),
            CborType::Double => decoder.decode_f64()?.to_string(),
            CborType::Bool => decoder.decode_bool()?.to_string(),
            CborType::Null => {
                decoder.decode_null()?;
                "null".to_string()
            }
        };
        rows.push(row(offset, open.len(), ty, value));
        close_item(&mut open);
    }

    tracing::debug!(items = rows.len(), open = open.len(), "buffer walked");
    Ok((rows, open.len()))
}

fn row(offset: usize, depth: usize, ty: CborType, value: String) -> ItemRow {
    ItemRow {
        offset,
        depth,
        kind: ty.as_str(),
        value,
    }
}

fn describe_len(count: Option<u64>) -> String {
    match count {
        Some(n) => format!("len {n}"),
        None => "indefinite".to_string(),
    }
}

// Count one finished item against the enclosing containers, closing every
// definite container whose last item this was.
fn close_item(open: &mut Vec<Option<u64>>) {
    while let Some(Some(left)) = open.last_mut() {
        *left -= 1;
        if *left > 0 {
            break;
        }
        open.pop();
    }
}
