use limero::frame::{FrameConfig, FrameReader, FrameWriter};
use limero::{FrameDecoder, FrameEncoder, Value, ValueKind};

#[test]
fn value_tree_over_framed_stream() {
    let reading = Value::from_json(r#"{"id":"m1","rpm":[1500,1498],"ok":true}"#).unwrap();

    let mut writer = FrameWriter::new(Vec::new());
    writer.send(&reading.to_cbor()).unwrap();
    writer.send(&Value::Null.to_cbor()).unwrap();
    let wire = writer.into_inner();

    let mut reader = FrameReader::with_config(wire.as_slice(), FrameConfig::default());
    let first = Value::from_cbor(&reader.read_frame().unwrap()).unwrap();
    let second = Value::from_cbor(&reader.read_frame().unwrap()).unwrap();

    assert_eq!(first, reading);
    assert_eq!(first["rpm"][1].as_int(), 1498);
    assert_eq!(second.kind(), ValueKind::Null);
}

#[test]
fn typed_fields_through_crc_and_cobs() {
    let mut encoder = FrameEncoder::default();
    encoder.encode_array().unwrap();
    encoder.encode("motor").unwrap();
    encoder.encode(&-40i32).unwrap();
    encoder.encode(&Some(0.5f32)).unwrap();
    encoder.encode(&None::<u8>).unwrap();
    encoder.encode_end().unwrap();
    encoder.add_crc().unwrap();
    encoder.add_cobs().unwrap();

    let mut decoder = FrameDecoder::default();
    for &byte in encoder.as_bytes() {
        if decoder.add_byte(byte).unwrap() {
            break;
        }
    }
    decoder.decode_cobs().unwrap();
    decoder.check_crc().unwrap();

    assert_eq!(decoder.decode_array().unwrap(), None);
    assert_eq!(decoder.decode::<String>().unwrap(), "motor");
    assert_eq!(decoder.decode::<i32>().unwrap(), -40);
    assert_eq!(decoder.decode_opt::<f32>().unwrap(), Some(0.5));
    assert_eq!(decoder.decode_opt::<u8>().unwrap(), None);
    decoder.decode_end().unwrap();
    assert_eq!(decoder.remaining(), 0);
}
