//! Fuzzing entry points for pstkit-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_unpack

use pstkit_core::{schema::Subsection, FieldKind, GridKind, Schema};

/// Small schema touching every leaf kind, so short inputs reach deep code
fn mixed_schema() -> Option<Schema> {
    Schema::builder()
        .section("Intro", 3, 4, FieldKind::Int)
        .uniform("Intro_0", FieldKind::Text)
        .uniform("Intro_1", FieldKind::Hex)
        .section("Name", 2, 8, FieldKind::PaddedText)
        .section("P", 1, 16, FieldKind::Bulk)
        .split(
            "P_0",
            &[
                Subsection::repeated(FieldKind::Short, 2, 2),
                Subsection::of(FieldKind::Binary),
                Subsection::of(FieldKind::Char),
                Subsection::of(FieldKind::LowChar),
                Subsection::sized(FieldKind::Bulk, 1),
                Subsection::of(FieldKind::MilliFloat),
                Subsection::of(FieldKind::MicroFloat),
            ],
        )
        .section("F", 2, 9, FieldKind::Grid(GridKind::Feature))
        .section("S", 1, 9, FieldKind::Grid(GridKind::Sailing))
        .section("C", 1, 9, FieldKind::Grid(GridKind::Coast))
        .section("z", 1, 4, FieldKind::Zero)
        .sentinel("Intro_2", 4)
        .build()
        .ok()
}

pub fn fuzz_unpack(data: &[u8]) {
    use pstkit_core::unpack_bytes;

    // Try to unpack - should never panic
    if let Some(schema) = mixed_schema() {
        let _ = unpack_bytes(&schema, data);
    }
    if let Ok(schema) = Schema::savegame() {
        let _ = unpack_bytes(&schema, data);
    }
}

pub fn fuzz_pack(data: &[u8]) {
    use pstkit_core::pack_str;

    // Try to pack - should never panic
    let text = String::from_utf8_lossy(data);
    let _ = pack_str(&text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzz_unpack_empty() {
        fuzz_unpack(&[]);
    }

    #[test]
    fn test_fuzz_unpack_random() {
        fuzz_unpack(&[0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn test_fuzz_unpack_long_string_prefix() {
        fuzz_unpack(&[0xFF; 1024]);
    }

    #[test]
    fn test_fuzz_pack_empty() {
        fuzz_pack(&[]);
    }

    #[test]
    fn test_fuzz_pack_garbage() {
        fuzz_pack(b"A_0 : M4 : zz :\nA_0_9 : F1 : 1 :\n:::\n\xff\xfe");
    }

    #[test]
    fn test_mixed_schema_unpacks_zeros() {
        let schema = mixed_schema().unwrap();
        // Intro 12, Name 24, P 16, grids 36, z 4
        let data = vec![0u8; 92];
        let (_, summary) = pstkit_core::unpack_bytes(&schema, &data).unwrap();
        assert_eq!(summary.bytes_read, data.len() as u64);
    }
}
