use super::{short_name, LumpError, SHORT_NAME_LEN};
use byteorder::{ReadBytesExt, LE};
use std::io::Cursor;

/// The `PNAMES` table: patch names referenced by index from `TEXTURE1`/`TEXTURE2`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchNames {
    names: Vec<String>,
}

impl PatchNames {
    pub const LUMP_NAME: &'static str = "PNAMES";

    pub fn new(names: Vec<String>) -> Self {
        Self {
            names: names.into_iter().map(|n| n.to_ascii_uppercase()).collect(),
        }
    }

    /// Decode `i32` count followed by `count` NUL-padded 8-byte names.
    pub fn decode(data: &[u8]) -> Result<Self, LumpError> {
        let mut reader = Cursor::new(data);
        let count = reader.read_i32::<LE>().map_err(|_| LumpError::TooSmall {
            lump: Self::LUMP_NAME,
            len: data.len(),
            min: 4,
        })?;

        if count < 0 {
            return Err(LumpError::Truncated {
                lump: Self::LUMP_NAME,
                reason: format!("negative name count {}", count),
            });
        }

        let available = (data.len() - 4) / SHORT_NAME_LEN;
        if count as usize > available {
            return Err(LumpError::Truncated {
                lump: Self::LUMP_NAME,
                reason: format!("{} names declared, room for {}", count, available),
            });
        }

        let names = data[4..4 + count as usize * SHORT_NAME_LEN]
            .chunks_exact(SHORT_NAME_LEN)
            .map(short_name)
            .collect();
        Ok(Self { names })
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pnames(names: &[&str]) -> Vec<u8> {
        let mut data = (names.len() as i32).to_le_bytes().to_vec();
        for name in names {
            let mut raw = [0u8; 8];
            raw[..name.len()].copy_from_slice(name.as_bytes());
            data.extend_from_slice(&raw);
        }
        data
    }

    #[test]
    fn test_decode() {
        let table = PatchNames::decode(&pnames(&["wall00_1", "DOOR2_1"])).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0), Some("WALL00_1"));
        assert_eq!(table.get(1), Some("DOOR2_1"));
        assert_eq!(table.get(2), None);
    }

    #[test]
    fn test_count_past_end() {
        let mut data = pnames(&["WALL00_1"]);
        data[0] = 3;
        assert!(matches!(
            PatchNames::decode(&data),
            Err(LumpError::Truncated { .. })
        ));
    }

    #[test]
    fn test_too_small() {
        assert!(PatchNames::decode(&[1, 0]).is_err());
    }
}
