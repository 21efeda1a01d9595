use super::{short_name, LumpError, PatchNames, SHORT_NAME_LEN};
use crate::textures::{DefinitionKind, PatchPlacement, TextureDefinition};
use byteorder::{ReadBytesExt, LE};
use std::io::{Cursor, Seek, SeekFrom};

/// On-disk layout of a `TEXTURE1`/`TEXTURE2` lump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureTableFormat {
    /// 22-byte texture header with an unused column directory, 10-byte patches.
    Doom,
    /// 18-byte texture header, 6-byte patches.
    Strife,
}

impl TextureTableFormat {
    fn header_len(self) -> usize {
        match self {
            Self::Doom => 22,
            Self::Strife => 18,
        }
    }

    fn patch_len(self) -> usize {
        match self {
            Self::Doom => 10,
            Self::Strife => 6,
        }
    }

    fn patch_count_offset(self) -> usize {
        match self {
            Self::Doom => 20,
            Self::Strife => 16,
        }
    }
}

const WORLD_PANNING: u16 = 0x8000;

fn read_i16_at(data: &[u8], pos: usize) -> Option<i16> {
    data.get(pos..pos + 2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
}

fn entry_fits(data: &[u8], offset: usize, end: usize, format: TextureTableFormat) -> bool {
    let Some(count) = read_i16_at(data, offset + format.patch_count_offset()) else {
        return false;
    };
    count >= 0 && offset + format.header_len() + count as usize * format.patch_len() <= end
}

/// Pick the layout by looking at the first entry.
///
/// Doom entries carry a four-byte column directory that is always zero where
/// Strife entries store their patch count and the first patch origin.
fn detect_format(data: &[u8], offsets: &[usize]) -> TextureTableFormat {
    let Some(&first) = offsets.first() else {
        return TextureTableFormat::Doom;
    };
    let end = offsets
        .iter()
        .copied()
        .filter(|&o| o > first)
        .min()
        .unwrap_or(data.len());

    let column_directory = data.get(first + 16..first + 20);
    if column_directory == Some(&[0, 0, 0, 0][..])
        && entry_fits(data, first, end, TextureTableFormat::Doom)
    {
        return TextureTableFormat::Doom;
    }
    if entry_fits(data, first, end, TextureTableFormat::Strife) {
        return TextureTableFormat::Strife;
    }
    TextureTableFormat::Doom
}

fn scale(raw: u8) -> f32 {
    if raw == 0 {
        1.0
    } else {
        raw as f32 / 8.0
    }
}

/// Decode a legacy texture table, resolving patch indices through `pnames`.
///
/// Entries whose offset points outside the lump are skipped with a warning, as
/// are patch references past the end of `pnames`.
pub fn decode_texture_table(
    lump: &'static str,
    data: &[u8],
    pnames: &PatchNames,
) -> Result<Vec<TextureDefinition>, LumpError> {
    let mut reader = Cursor::new(data);
    let count = reader.read_i32::<LE>().map_err(|_| LumpError::TooSmall {
        lump,
        len: data.len(),
        min: 4,
    })?;
    if count < 0 || 4 + count as usize * 4 > data.len() {
        return Err(LumpError::Truncated {
            lump,
            reason: format!("offset table for {} textures does not fit", count),
        });
    }

    let mut offsets = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let offset = reader.read_i32::<LE>().map_err(|e| LumpError::Truncated {
            lump,
            reason: e.to_string(),
        })?;
        offsets.push(offset.max(0) as usize);
    }

    let format = detect_format(data, &offsets);
    tracing::debug!("{}: {} textures, {:?} layout", lump, count, format);

    let mut definitions = Vec::with_capacity(offsets.len());
    for offset in offsets {
        match read_entry(lump, data, offset, format, pnames) {
            Ok(definition) => definitions.push(definition),
            Err(reason) => tracing::warn!("Skipping texture in {} at {}: {}", lump, offset, reason),
        }
    }
    Ok(definitions)
}

fn read_entry(
    lump: &str,
    data: &[u8],
    offset: usize,
    format: TextureTableFormat,
    pnames: &PatchNames,
) -> std::io::Result<TextureDefinition> {
    let mut reader = Cursor::new(data);
    reader.seek(SeekFrom::Start(offset as u64))?;

    let mut raw_name = [0u8; SHORT_NAME_LEN];
    std::io::Read::read_exact(&mut reader, &mut raw_name)?;
    let name = short_name(&raw_name);

    let flags = reader.read_u16::<LE>()?;
    let scale_x = reader.read_u8()?;
    let scale_y = reader.read_u8()?;
    let width = reader.read_i16::<LE>()?;
    let height = reader.read_i16::<LE>()?;
    if format == TextureTableFormat::Doom {
        reader.read_i32::<LE>()?;
    }
    let patch_count = reader.read_i16::<LE>()?;

    let mut patches = Vec::with_capacity(patch_count.max(0) as usize);
    for _ in 0..patch_count.max(0) {
        let x = reader.read_i16::<LE>()?;
        let y = reader.read_i16::<LE>()?;
        let index = reader.read_i16::<LE>()?;
        if format == TextureTableFormat::Doom {
            reader.read_i16::<LE>()?;
            reader.read_i16::<LE>()?;
        }

        match usize::try_from(index).ok().and_then(|i| pnames.get(i)) {
            Some(patch) => patches.push(PatchPlacement {
                name: patch.to_string(),
                x: x as i32,
                y: y as i32,
            }),
            None => tracing::warn!(
                "{}: texture '{}' references patch {} but PNAMES has {} entries",
                lump,
                name,
                index,
                pnames.len()
            ),
        }
    }

    Ok(TextureDefinition {
        kind: DefinitionKind::Texture,
        name,
        width: width as i32,
        height: height as i32,
        scale_x: scale(scale_x),
        scale_y: scale(scale_y),
        world_panning: flags & WORLD_PANNING != 0,
        patches,
    })
}
