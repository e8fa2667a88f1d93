use geobuf_core_wasm::value::format_double;
use geobuf_core_wasm::{parse_geobuf, CollectingSink, Draw, Projection};
use prost::encoding;
use proptest::prelude::*;

struct Passthrough;

impl Projection for Passthrough {
    fn project(&self, x: f64, y: f64, _zoom: u32) -> (i64, i64) {
        (x as i64, y as i64)
    }
}

fn decode(bytes: &[u8]) -> Result<Vec<geobuf_core_wasm::SerialFeature>, geobuf_core_wasm::DecodeError> {
    let mut sink = CollectingSink::new();
    parse_geobuf(bytes, 0, "fuzz", &Passthrough, &mut sink)?;
    Ok(sink.into_features())
}

// Single-feature document holding one LineString at precision 10^0
fn line_document(coords: &[i64]) -> Vec<u8> {
    let mut geometry = Vec::new();
    encoding::int32::encode(1, &2, &mut geometry);
    encoding::sint64::encode_packed(3, coords, &mut geometry);

    let mut feature = Vec::new();
    encoding::bytes::encode(1, &geometry, &mut feature);

    let mut document = Vec::new();
    encoding::int64::encode(3, &0, &mut document);
    encoding::bytes::encode(5, &feature, &mut document);
    document
}

proptest! {
    #[test]
    fn fuzz_parse_geobuf_no_panics(bytes in prop::collection::vec(any::<u8>(), 0..1024)) {
        // The goal is simply to ensure this does not panic.
        let _ = decode(&bytes);
    }

    #[test]
    fn line_points_are_running_sums(deltas in prop::collection::vec((-1_000i64..1_000, -1_000i64..1_000), 1..64)) {
        let coords: Vec<i64> = deltas.iter().flat_map(|(dx, dy)| [*dx, *dy]).collect();

        let features = decode(&line_document(&coords)).unwrap();

        prop_assert_eq!(features.len(), 1);
        let commands = &features[0].geometry.commands;
        prop_assert_eq!(commands.len(), deltas.len());

        let (mut x, mut y) = (0, 0);
        for (i, (dx, dy)) in deltas.iter().enumerate() {
            x += dx;
            y += dy;
            let expected = if i == 0 { Draw::MoveTo(x, y) } else { Draw::LineTo(x, y) };
            prop_assert_eq!(commands[i], expected);
        }
    }

    #[test]
    fn decoding_is_repeatable(deltas in prop::collection::vec(-10_000i64..10_000, 0..64)) {
        let document = line_document(&deltas);
        let first = decode(&document).unwrap();
        let second = decode(&document).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn double_formatting_round_trips(value in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        let text = format_double(value);
        prop_assert_eq!(&text, &format_double(value));
        prop_assert_eq!(text.parse::<f64>().unwrap(), value);
    }
}
