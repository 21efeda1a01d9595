//! Override-aware resource aggregation for Doom-engine containers.
//!
//! This crate presents a stack of directories, PK3 (zip) archives and WAD
//! files, including WADs embedded at the root of another container, as one
//! deterministic resource space. It supports:
//!
//! - **Palettes and colormaps**: `PLAYPAL`/`COLORMAP` with size validation
//! - **Textures**: `TEXTURE1`/`TEXTURE2` with `PNAMES`, `TEXTURES` lumps, and
//!   image files in `textures/`
//! - **Flats, sprites, hi-res and colormap images** with per-category precedence
//! - **Sprite and voxel names** filtered through the engine's naming rules
//! - **Text lumps**: DECORATE, ZSCRIPT, MODELDEF, (Z)MAPINFO, GLDEFS,
//!   DEHACKED, IWADINFO and any other [`ScriptType`]
//! - **Parse-once caching** of `TEXTURES` lumps across category loads
//! - **Suspend/resume** to release file handles while another program writes
//!
//! Image pixels are never decoded; results are [`ImageRecord`]s describing
//! where each image comes from.
//!
//! # Example
//!
//! ```no_run
//! use lumpstack::{ParserCache, ResourceStack};
//! use camino::Utf8Path;
//!
//! # fn main() -> lumpstack::Result<()> {
//! let mut stack = ResourceStack::load(Utf8Path::new("lumpstack.toml"))?;
//! let mut cache = ParserCache::new();
//!
//! let palette = stack.load_palette()?;
//! let textures = stack.load_textures(&mut cache)?;
//! let flats = stack.load_flats(&mut cache)?;
//! println!(
//!     "palette: {}, {} textures, {} flats",
//!     palette.is_some(),
//!     textures.len(),
//!     flats.len()
//! );
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod cache;
pub mod diagnostics;
mod embedded;
pub mod engine;
pub mod error;
pub mod image;
pub mod location;
pub mod lumps;
pub mod names;
pub mod stack;
pub mod text;
pub mod textures;

pub use backend::{ContainerBackend, DirectoryBackend, Pk3Backend, WadBackend};
pub use cache::ParserCache;
pub use diagnostics::{Diagnostic, DiagnosticLevel, DiagnosticLog};
pub use engine::{EngineOptions, ReaderId, ResourceEngine};
pub use error::{Error, Result};
pub use image::{ImageFormat, ImageKind, ImageMap, ImageRecord, ImageSource, LongName, TextureSet};
pub use location::{LocationKind, ResourceLocation};
pub use lumps::{ColorMap, Palette, PatchNames};
pub use names::{is_valid_sprite_name, is_valid_voxel_name};
pub use stack::{ResourceStack, StackConfig};
pub use text::{GameType, ScriptType, TextResourceData};
pub use textures::{
    DefinitionKind, DefinitionParser, TextureDefinition, TexturesParseResult, TexturesParser,
};
