//! Integration tests for the complete unpack → edit → pack flow

use pstkit_core::{
    context::RunContext, pack_str, pack_strict, unpack_bytes, Annotator, CodecError, FieldKind,
    GridKind, Layout, Schema, Unpacker,
};
use std::io::Cursor;

const FEATURE_MAP_START: usize = 612_272;
const SAILING_MAP_START: usize = 748_950;
const COAST_MAP_START: usize = 888_840 + 128 * 16;
const ZERO_REGION_START: usize = 887_676;
const STARTING_YEAR_AT: usize = 888_836;

fn blank_savegame() -> Vec<u8> {
    let layout = Layout::of(&Schema::savegame().unwrap()).unwrap();
    vec![0u8; layout.min_stream_len()]
}

/// Comments Log lines with the starting year seen so far
struct YearNotes;

impl Annotator for YearNotes {
    fn comment(&self, region: &str, _value: &str, ctx: &RunContext) -> String {
        match (region.starts_with("Log_"), ctx.starting_year()) {
            (true, Some(year)) => format!("since {}", year),
            _ => String::new(),
        }
    }

    fn translation(&self, _region: &str, _value: &str, _ctx: &RunContext) -> String {
        String::new()
    }
}

#[test]
fn test_blank_savegame_round_trip() {
    let schema = Schema::savegame().unwrap();
    let data = blank_savegame();

    let (text, summary) = unpack_bytes(&schema, &data).unwrap();
    assert_eq!(summary.bytes_read, data.len() as u64);
    assert_eq!(summary.starting_year, Some(0));
    assert_eq!(summary.features, 0);
    assert!(text.starts_with("## Intro starts at byte 0\nIntro_0   : t0   :      :    \n"));
    assert!(text.contains("## CityName starts at byte 24\n"));
    assert!(text.contains("## Log starts at byte 310524\n# Ship's Log\n"));
    assert!(text.contains("\nd_0   : x36   :   zero_string   :    \n"));

    let (packed, pack_summary) = pack_str(&text).unwrap();
    assert_eq!(packed.as_ref(), data.as_slice());
    assert_eq!(pack_summary.lines, summary.lines);

    let (strict, _) = pack_strict(&text, &schema).unwrap();
    assert_eq!(strict.as_ref(), data.as_slice());
}

#[test]
fn test_section_offsets_match_layout() {
    let schema = Schema::savegame().unwrap();
    let (text, _) = unpack_bytes(&schema, &blank_savegame()).unwrap();
    assert!(text.contains(&format!("## FeatureMap starts at byte {}\n", FEATURE_MAP_START)));
    assert!(text.contains(&format!("## SailingMap starts at byte {}\n", SAILING_MAP_START)));
    assert!(text.contains(&format!("## CoastMap starts at byte {}\n", COAST_MAP_START)));
    assert!(text.contains(&format!("## d starts at byte {}\n", ZERO_REGION_START)));
}

#[test]
fn test_terrain_round_trip_with_features() {
    let schema = Schema::savegame().unwrap();
    let mut data = blank_savegame();

    // Feature map: land, a village marker and more land
    data[FEATURE_MAP_START] = 0xFF;
    data[FEATURE_MAP_START + 5] = 0x42;
    data[FEATURE_MAP_START + 293 + 292] = 0xFF;
    // Sailing overlay keeps only its anomalies
    data[SAILING_MAP_START + 7] = 0x10;
    // Coast map: land, a low marker and a high marker
    data[COAST_MAP_START] = 9;
    data[COAST_MAP_START + 1] = 3;
    data[COAST_MAP_START + 2] = 7;

    let (text, summary) = unpack_bytes(&schema, &data).unwrap();
    assert_eq!(summary.features, 4);
    assert!(text.contains("\nFeatureMap_0_5   : F1   :  42  :   \n"));
    assert!(text.contains("\nSailingMap_0_7   : F1   :  10  :   \n"));
    assert!(text.contains("\nCoastMap_0_1   : F1   :  03  :   \n"));
    assert!(text.contains("\nCoastMap_0_2   : F1   :  07  :   \n"));

    let (packed, _) = pack_strict(&text, &schema).unwrap();
    assert_eq!(packed.as_ref(), data.as_slice());
}

#[test]
fn test_edited_value_lands_in_place() {
    let schema = Schema::savegame().unwrap();
    let data = blank_savegame();
    let (text, _) = unpack_bytes(&schema, &data).unwrap();

    let edited = text.replacen("Skill_0   : V4   :   0   :", "Skill_0   : V4   :   3   :", 1);
    let (packed, _) = pack_strict(&edited, &schema).unwrap();
    let tail = &packed[packed.len() - 4..];
    assert_eq!(tail, &3u32.to_le_bytes());
    assert_eq!(&packed[..packed.len() - 4], &data[..data.len() - 4]);
}

#[test]
fn test_edited_string_shifts_following_bytes() {
    let schema = Schema::savegame().unwrap();
    let data = blank_savegame();
    let (text, _) = unpack_bytes(&schema, &data).unwrap();

    let edited = text.replacen(
        "Intro_0   : t0   :      :",
        "Intro_0   : t0   :   Blackbeard   :",
        1,
    );
    let (packed, _) = pack_strict(&edited, &schema).unwrap();
    assert_eq!(packed.len(), data.len() + 10);
    assert_eq!(&packed[..4], &10u32.to_le_bytes());
    assert_eq!(&packed[4..14], b"Blackbeard");

    let (again, _) = unpack_bytes(&schema, &packed).unwrap();
    assert!(again.contains("Intro_0   : t0   :   Blackbeard   :"));
}

#[test]
fn test_starting_year_feeds_later_annotations() {
    let schema = Schema::savegame().unwrap();
    let mut data = blank_savegame();
    data[STARTING_YEAR_AT..STARTING_YEAR_AT + 4].copy_from_slice(&1660i32.to_le_bytes());

    let mut out = Vec::new();
    let summary = Unpacker::with_annotator(&schema, Cursor::new(&data), &mut out, YearNotes)
        .unpack_all()
        .unwrap();
    assert_eq!(summary.starting_year, Some(1660));
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("\nLog_0_0   : c1   :   0   :   since 1660 \n"));

    // The jump and return leave the walk untouched
    let (plain, _) = unpack_bytes(&schema, &data).unwrap();
    let (packed, _) = pack_str(&plain).unwrap();
    assert_eq!(packed.as_ref(), data.as_slice());
}

#[test]
fn test_runs_do_not_share_starting_year() {
    let schema = Schema::savegame().unwrap();
    let mut first = blank_savegame();
    first[STARTING_YEAR_AT..STARTING_YEAR_AT + 4].copy_from_slice(&1600i32.to_le_bytes());
    let mut second = blank_savegame();
    second[STARTING_YEAR_AT..STARTING_YEAR_AT + 4].copy_from_slice(&1680i32.to_le_bytes());

    let (_, a) = unpack_bytes(&schema, &first).unwrap();
    let (_, b) = unpack_bytes(&schema, &second).unwrap();
    assert_eq!(a.starting_year, Some(1600));
    assert_eq!(b.starting_year, Some(1680));
}

#[test]
fn test_nonzero_byte_in_zero_region_is_fatal() {
    let schema = Schema::savegame().unwrap();
    let mut data = blank_savegame();
    data[ZERO_REGION_START + 10] = 1;
    let err = unpack_bytes(&schema, &data).unwrap_err();
    assert_eq!(
        err,
        CodecError::NonZeroInZeroField {
            region: "d_0".into(),
            offset: 10
        }
    );
}

#[test]
fn test_short_savegame_is_truncated() {
    let schema = Schema::savegame().unwrap();
    let data = vec![0u8; 100_000];
    let err = unpack_bytes(&schema, &data).unwrap_err();
    assert!(matches!(err, CodecError::TruncatedStream { .. }));
}

#[test]
fn test_custom_schema_round_trip() {
    let schema = Schema::builder()
        .section("Hdr", 3, 4, FieldKind::Int)
        .uniform("Hdr_1", FieldKind::MilliFloat)
        .uniform("Hdr_2", FieldKind::Hex)
        .section("Map", 2, 6, FieldKind::Grid(GridKind::Coast))
        .build()
        .unwrap();

    let mut data = Vec::new();
    data.extend_from_slice(&7u32.to_le_bytes());
    data.extend_from_slice(&2500i32.to_le_bytes());
    data.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    data.extend_from_slice(&[9, 0, 0, 1, 9, 0]);
    data.extend_from_slice(&[0, 0, 0, 0, 0, 12]);

    let (text, _) = unpack_bytes(&schema, &data).unwrap();
    let expected = "\
## Hdr starts at byte 0
Hdr_0   : V4   :   7   :
Hdr_1   : g4   :   2.5   :
Hdr_2   : h4   :   EF.BE.AD.DE   :
## Map starts at byte 12
Map_0_6   : MM6   :   88   :
Map_1_6   : MM6   :   04   :
Map_0_3   : F1   :  01  :
Map_1_5   : F1   :  0c  :
";
    // Comment columns are empty, so only separator padding trails each line
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    assert_eq!(lines, expected.lines().collect::<Vec<_>>());

    let (packed, _) = pack_strict(&text, &schema).unwrap();
    assert_eq!(packed.as_ref(), data.as_slice());
}
