//! Text resource payloads and the lump families they belong to.

use crate::engine::ReaderId;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// A text lump found in one container, handed to an external parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResourceData {
    pub data: Vec<u8>,
    /// Engine the lump was read from.
    pub reader: ReaderId,
    /// Display name of that engine's container.
    pub reader_name: String,
    /// Path of the lump inside the container.
    pub path: String,
    /// Short single-lump script-style resource.
    pub script: bool,
}

impl TextResourceData {
    /// The lump as text. Invalid UTF-8 is replaced rather than rejected, since
    /// most of these lumps are written in a legacy 8-bit code page.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

/// Base game of the loaded resources. Only affects GLDEFS discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Doom,
    Heretic,
    Hexen,
    Strife,
    #[default]
    Unknown,
}

impl GameType {
    /// The game-specific GLDEFS lump, looked up before the generic `GLDEFS`.
    pub fn gldefs_lump(self) -> Option<&'static str> {
        match self {
            Self::Doom => Some("DOOMDEFS"),
            Self::Heretic => Some("HTICDEFS"),
            Self::Hexen => Some("HEXNDEFS"),
            Self::Strife => Some("STRFDEFS"),
            Self::Unknown => None,
        }
    }
}

impl FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "doom" => Ok(Self::Doom),
            "heretic" => Ok(Self::Heretic),
            "hexen" => Ok(Self::Hexen),
            "strife" => Ok(Self::Strife),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown game type '{}'", other)),
        }
    }
}

macro_rules! script_types {
    ($($variant:ident => $lump:literal),* $(,)?) => {
        /// Text lump families that can be looked up with
        /// [`ResourceEngine::text_lump_data`](crate::ResourceEngine::text_lump_data).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ScriptType {
            $($variant),*
        }

        impl ScriptType {
            pub const ALL: &'static [ScriptType] = &[$(ScriptType::$variant),*];

            /// Conventional lump name, which is also the file title searched for.
            pub fn lump_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $lump),*
                }
            }
        }
    };
}

script_types! {
    Modeldef => "MODELDEF",
    Decorate => "DECORATE",
    Gldefs => "GLDEFS",
    Sndseq => "SNDSEQ",
    Mapinfo => "MAPINFO",
    Voxeldef => "VOXELDEF",
    Textures => "TEXTURES",
    Animdefs => "ANIMDEFS",
    Reverbs => "REVERBS",
    Terrain => "TERRAIN",
    X11r6rgb => "X11R6RGB",
    Cvarinfo => "CVARINFO",
    Sndinfo => "SNDINFO",
    Lockdefs => "LOCKDEFS",
    Menudef => "MENUDEF",
    Sbarinfo => "SBARINFO",
    Gameinfo => "GAMEINFO",
    Keyconf => "KEYCONF",
    Fontdefs => "FONTDEFS",
    Decaldef => "DECALDEF",
    Language => "LANGUAGE",
    Zscript => "ZSCRIPT",
    Dehacked => "DEHACKED",
    Iwadinfo => "IWADINFO",
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lump_name())
    }
}

impl FromStr for ScriptType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.lump_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown text lump type '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_type_names() {
        assert_eq!(ScriptType::Sndinfo.lump_name(), "SNDINFO");
        assert_eq!("x11r6rgb".parse::<ScriptType>(), Ok(ScriptType::X11r6rgb));
        assert!("NOTALUMP".parse::<ScriptType>().is_err());
    }

    #[test]
    fn test_gldefs_lump_per_game() {
        assert_eq!(GameType::Hexen.gldefs_lump(), Some("HEXNDEFS"));
        assert_eq!(GameType::Unknown.gldefs_lump(), None);
        assert_eq!("Strife".parse::<GameType>(), Ok(GameType::Strife));
    }

    #[test]
    fn test_lossy_text() {
        let data = TextResourceData {
            data: vec![b'a', 0xff, b'b'],
            reader: ReaderId::from_raw(1),
            reader_name: "test".into(),
            path: "DECORATE".into(),
            script: true,
        };
        assert_eq!(data.text(), "a\u{fffd}b");
    }
}
