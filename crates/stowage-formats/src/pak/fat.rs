//! FAT record codec and entry name normalization

use crate::cursor::BinaryCursor;
use crate::pak::error::{PakError, PakResult};

/// PAK magic bytes
pub const PAK_MAGIC: [u8; 4] = *b"PACK";

/// Size of one on-disk FAT record
pub const FAT_RECORD_SIZE: usize = 64;

/// Width of the NUL-padded name field within a record
pub(crate) const NAME_FIELD_SIZE: usize = 56;

/// Usable name bytes: the field keeps at least one terminating NUL
pub(crate) const MAX_NAME_LEN: usize = NAME_FIELD_SIZE - 1;

/// Header length: magic + fat_start + fat_size
pub(crate) const HEADER_SIZE: u64 = 12;

/// A single member entry from a PAK FAT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PakEntry {
    /// Normalized member name (lowercase, `/` separators)
    pub name: String,
    /// Absolute offset of the member's bytes
    pub offset: u32,
    /// Member size in bytes
    pub size: u32,
}

/// Normalize a member name to its identity form.
///
/// Back-slashes become forward slashes and ASCII letters are lowercased.
pub(crate) fn normalize_name(name: &str) -> String {
    name.replace('\\', "/").to_ascii_lowercase()
}

/// Parse `entry_count` FAT records from the cursor.
///
/// Names are normalized on the way in. Record fields are i32 on disk;
/// negative offsets or sizes are structural corruption.
pub(crate) fn parse_fat(
    cursor: &mut BinaryCursor<'_>,
    entry_count: usize,
) -> PakResult<Vec<PakEntry>> {
    // Capacity capped by what the region can actually hold.
    let mut entries = Vec::with_capacity(entry_count.min(cursor.remaining() / FAT_RECORD_SIZE));
    for _ in 0..entry_count {
        let name = normalize_name(&cursor.read_fixed_cstring(NAME_FIELD_SIZE)?);
        let offset = cursor.read_i32_le()?;
        let size = cursor.read_i32_le()?;
        if offset < 0 || size < 0 {
            return Err(PakError::InvalidHeader(format!(
                "FAT record '{name}' has negative offset or size"
            )));
        }
        entries.push(PakEntry {
            name,
            offset: offset as u32,
            size: size as u32,
        });
    }
    Ok(entries)
}

/// Encode a normalized name into the 56-byte NUL-padded field.
///
/// Fails rather than truncating: a name that does not fit the field would
/// otherwise silently change identity on the next open.
pub(crate) fn encode_name(name: &str) -> PakResult<[u8; NAME_FIELD_SIZE]> {
    let mut field = [0u8; NAME_FIELD_SIZE];
    let mut len = 0;
    for ch in name.chars() {
        let code = ch as u32;
        if code > 0xFF {
            return Err(PakError::InvalidName {
                name: name.to_string(),
            });
        }
        if len >= MAX_NAME_LEN {
            return Err(PakError::NameTooLong {
                name: name.to_string(),
                max: MAX_NAME_LEN,
            });
        }
        field[len] = code as u8;
        len += 1;
    }
    Ok(field)
}

/// Encode one FAT record.
pub(crate) fn encode_record(entry: &PakEntry) -> PakResult<[u8; FAT_RECORD_SIZE]> {
    let mut record = [0u8; FAT_RECORD_SIZE];
    record[..NAME_FIELD_SIZE].copy_from_slice(&encode_name(&entry.name)?);
    record[NAME_FIELD_SIZE..NAME_FIELD_SIZE + 4].copy_from_slice(&entry.offset.to_le_bytes());
    record[NAME_FIELD_SIZE + 4..].copy_from_slice(&entry.size.to_le_bytes());
    Ok(record)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalization_lowercases_and_forward_slashes() {
        assert_eq!(normalize_name("Maps\\E1M1.BSP"), "maps/e1m1.bsp");
        assert_eq!(normalize_name("sound/talk.wav"), "sound/talk.wav");
    }

    #[test]
    fn record_round_trip() {
        let entry = PakEntry {
            name: "gfx/palette.lmp".to_string(),
            offset: 12,
            size: 768,
        };
        let record = encode_record(&entry).unwrap();
        assert_eq!(record.len(), FAT_RECORD_SIZE);

        let mut cursor = BinaryCursor::new(&record);
        let parsed = parse_fat(&mut cursor, 1).unwrap();
        assert_eq!(parsed, vec![entry]);
    }

    #[test]
    fn name_at_limit_fits_one_past_fails() {
        let at_limit = "a".repeat(MAX_NAME_LEN);
        assert!(encode_name(&at_limit).is_ok());

        let too_long = "a".repeat(MAX_NAME_LEN + 1);
        let err = encode_name(&too_long).unwrap_err();
        assert!(matches!(err, PakError::NameTooLong { max: 55, .. }));
    }

    #[test]
    fn non_latin1_name_is_rejected() {
        let err = encode_name("data/\u{20AC}.txt").unwrap_err();
        assert!(matches!(err, PakError::InvalidName { .. }));
    }

    #[test]
    fn negative_record_fields_are_corruption() {
        let mut record = [0u8; FAT_RECORD_SIZE];
        record[..5].copy_from_slice(b"a.txt");
        record[NAME_FIELD_SIZE..NAME_FIELD_SIZE + 4].copy_from_slice(&(-1i32).to_le_bytes());

        let mut cursor = BinaryCursor::new(&record);
        assert!(matches!(
            parse_fat(&mut cursor, 1),
            Err(PakError::InvalidHeader(_))
        ));
    }
}
