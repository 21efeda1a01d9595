use super::LumpError;

/// The `COLORMAP` lump: a run of 256-byte palette remapping tables.
///
/// Table 0 is full brightness; the light-diminishing tables follow it. Bytes
/// past the last complete table are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMap {
    tables: Vec<[u8; 256]>,
}

impl ColorMap {
    pub const LUMP_NAME: &'static str = "COLORMAP";
    pub const TABLE_LEN: usize = 256;
    pub const MIN_LEN: usize = Self::TABLE_LEN;

    pub fn decode(data: &[u8]) -> Result<Self, LumpError> {
        if data.len() < Self::MIN_LEN {
            return Err(LumpError::TooSmall {
                lump: Self::LUMP_NAME,
                len: data.len(),
                min: Self::MIN_LEN,
            });
        }

        let tables = data
            .chunks_exact(Self::TABLE_LEN)
            .map(|chunk| {
                let mut table = [0u8; 256];
                table.copy_from_slice(chunk);
                table
            })
            .collect();
        Ok(Self { tables })
    }

    /// The full-brightness table.
    pub fn main(&self) -> &[u8; 256] {
        &self.tables[0]
    }

    pub fn table(&self, index: usize) -> Option<&[u8; 256]> {
        self.tables.get(index)
    }

    pub fn tables(&self) -> &[[u8; 256]] {
        &self.tables
    }
}
