use super::LumpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// The 256-color `PLAYPAL` palette.
///
/// Only the first palette of the lump is decoded; the damage and pickup tint
/// palettes that follow it are not used by the resource layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; 256],
}

impl Palette {
    pub const LUMP_NAME: &'static str = "PLAYPAL";

    /// Smallest lump accepted. A palette one byte short of a full 768-byte
    /// table still decodes; the missing blue component reads as 0.
    pub const MIN_LEN: usize = 767;

    pub fn decode(data: &[u8]) -> Result<Self, LumpError> {
        if data.len() < Self::MIN_LEN {
            return Err(LumpError::TooSmall {
                lump: Self::LUMP_NAME,
                len: data.len(),
                min: Self::MIN_LEN,
            });
        }

        let mut colors = [Rgb::default(); 256];
        for (i, color) in colors.iter_mut().enumerate() {
            let base = i * 3;
            *color = Rgb {
                r: data[base],
                g: data[base + 1],
                b: data.get(base + 2).copied().unwrap_or(0),
            };
        }
        Ok(Self { colors })
    }

    pub fn color(&self, index: u8) -> Rgb {
        self.colors[index as usize]
    }

    pub fn colors(&self) -> &[Rgb; 256] {
        &self.colors
    }
}
