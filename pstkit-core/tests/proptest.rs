//! Property-based tests using proptest

use bytes::BytesMut;
use pstkit_core::{
    codec::{decode_fixed, decode_text, encode_fixed, encode_text},
    grid::{compress, expand},
    pack_str, unpack_bytes, FieldKind, GridKind, PstLine, Schema,
};
use proptest::prelude::*;

fn fixed_kind() -> impl Strategy<Value = (FieldKind, usize)> {
    prop_oneof![
        Just((FieldKind::Int, 4)),
        Just((FieldKind::Hex, 4)),
        Just((FieldKind::Binary, 1)),
        Just((FieldKind::Short, 2)),
        Just((FieldKind::Char, 1)),
        Just((FieldKind::LowChar, 1)),
        Just((FieldKind::MilliFloat, 4)),
        Just((FieldKind::MicroFloat, 4)),
        Just((FieldKind::Bulk, 7)),
    ]
}

fn grid_kind() -> impl Strategy<Value = GridKind> {
    prop_oneof![Just(GridKind::Feature), Just(GridKind::Sailing), Just(GridKind::Coast)]
}

proptest! {
    #[test]
    fn prop_fixed_fields_round_trip(
        (kind, width) in fixed_kind(),
        seed in prop::collection::vec(any::<u8>(), 7)
    ) {
        let bytes = &seed[..width];
        let text = decode_fixed("P_0", kind, bytes).unwrap();
        let mut out = BytesMut::new();
        encode_fixed("P_0", kind, width, &text, &mut out).unwrap();
        prop_assert_eq!(&out[..], bytes);
    }

    #[test]
    fn prop_text_round_trip(bytes in prop::collection::vec(any::<u8>(), 0..=100)) {
        let text = decode_text(&bytes);
        prop_assert!(!text.contains(':'));
        prop_assert!(!text.contains('\n'));
        prop_assert_eq!(encode_text("T_0", &text).unwrap(), bytes);
    }

    #[test]
    fn prop_text_survives_line_parsing(bytes in prop::collection::vec(any::<u8>(), 0..=100)) {
        let line = format!("T_0   : t0   :   {}   :   note", decode_text(&bytes));
        let parsed = PstLine::parse(1, &line).unwrap().unwrap();
        prop_assert_eq!(encode_text("T_0", &parsed.value).unwrap(), bytes);
    }

    #[test]
    fn prop_grid_features_restore_row(
        kind in grid_kind(),
        cells in prop::collection::vec(any::<u8>(), 1..300)
    ) {
        let grid = compress(kind, &cells);
        let mut row = expand(kind, "M_0", &grid.text, cells.len()).unwrap();
        for &(i, value) in &grid.anomalies {
            row[i] = value;
        }
        if kind == GridKind::Sailing {
            // The overlay only remembers its anomalies
            for (restored, original) in row.iter().zip(&cells) {
                if kind.is_anomaly(*original) {
                    prop_assert_eq!(restored, original);
                } else {
                    prop_assert_eq!(*restored, 0);
                }
            }
        } else {
            prop_assert_eq!(row, cells);
        }
    }

    #[test]
    fn prop_schema_round_trip(
        ints in prop::collection::vec(any::<u32>(), 3),
        name in prop::collection::vec(any::<u8>(), 0..=100),
        map in prop::collection::vec(prop_oneof![Just(0u8), Just(0xFF), any::<u8>()], 24)
    ) {
        let schema = Schema::builder()
            .section("Name", 1, 8, FieldKind::PaddedText)
            .section("A", 3, 4, FieldKind::Int)
            .section("Map", 2, 12, FieldKind::Grid(GridKind::Feature))
            .build()
            .unwrap();

        let mut data = (name.len() as u32).to_le_bytes().to_vec();
        data.extend_from_slice(&name);
        data.extend_from_slice(&[0; 8]);
        for v in &ints {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&map);

        let (text, summary) = unpack_bytes(&schema, &data).unwrap();
        prop_assert_eq!(summary.bytes_read, data.len() as u64);
        let (packed, _) = pack_str(&text).unwrap();
        prop_assert_eq!(packed.as_ref(), data.as_slice());
    }

    #[test]
    fn prop_unpack_never_panics(
        data in prop::collection::vec(any::<u8>(), 0..512)
    ) {
        let schema = Schema::builder()
            .section("Intro", 2, 4, FieldKind::Int)
            .uniform("Intro_0", FieldKind::Text)
            .section("Map", 2, 9, FieldKind::Grid(GridKind::Coast))
            .section("z", 1, 4, FieldKind::Zero)
            .build()
            .unwrap();
        // Should either succeed or return an error, never panic
        let result = unpack_bytes(&schema, &data);
        prop_assert!(result.is_ok() || result.is_err());
    }

    #[test]
    fn prop_pack_never_panics(text in "[A-Za-z0-9_: .#\n-]{0,256}") {
        let result = pack_str(&text);
        prop_assert!(result.is_ok() || result.is_err());
    }

    #[test]
    fn prop_line_parse_never_panics(line in ".{0,128}") {
        let _ = PstLine::parse(1, &line);
    }
}
