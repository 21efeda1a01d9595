//! Short-name validity rules for sprites and voxels.

/// Characters allowed in a sprite or voxel lump name besides `A-Z` and `0-9`.
const EXTRA_NAME_CHARS: &[u8] = b"[\\]^_-";

fn is_name_char(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit() || EXTRA_NAME_CHARS.contains(&b)
}

/// A sprite frame name: four-character sprite, frame letter, rotation, and an
/// optional mirrored frame/rotation pair (`TROOA1`, `TROOA2A8`).
///
/// Expects an uppercased name.
pub fn is_valid_sprite_name(name: &str) -> bool {
    matches!(name.len(), 6 | 8) && name.bytes().all(is_name_char)
}

/// A voxel name: one to eight name characters. Expects an uppercased name.
pub fn is_valid_voxel_name(name: &str) -> bool {
    (1..=8).contains(&name.len()) && name.bytes().all(is_name_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_names() {
        assert!(is_valid_sprite_name("TROOA1"));
        assert!(is_valid_sprite_name("TROOA2A8"));
        assert!(is_valid_sprite_name("PLAY[0"));
        assert!(!is_valid_sprite_name("TROOA"));
        assert!(!is_valid_sprite_name("TROOA2A"));
        assert!(!is_valid_sprite_name("troo a1"));
        assert!(!is_valid_sprite_name("TROO.1"));
    }

    #[test]
    fn test_voxel_names() {
        assert!(is_valid_voxel_name("BARREL"));
        assert!(is_valid_voxel_name("K"));
        assert!(!is_valid_voxel_name(""));
        assert!(!is_valid_voxel_name("LONGVOXEL"));
        assert!(!is_valid_voxel_name("MY VOX"));
    }
}
