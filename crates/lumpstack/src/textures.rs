//! Composite texture definitions and the `TEXTURES` lump parser.
//!
//! A `TEXTURES` lump defines textures, flats, sprites and wall textures in one
//! document:
//!
//! ```text
//! // comment
//! WallTexture "BIGDOOR9", 128, 128
//! {
//!     XScale 2.0
//!     Patch "DOOR9_1", 0, 0
//!     Patch "DOOR9_2", 64, 0 { FlipX }
//! }
//! Sprite TROOZ0, 41, 57 { Offset 20, 52 Patch TROOA1, 0, 0 }
//! ```
//!
//! The parser is injected into [`ParserCache`](crate::ParserCache) through the
//! [`DefinitionParser`] trait so tests can swap in a counting double.

use crate::text::TextResourceData;

/// Which section of a `TEXTURES` lump a definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Texture,
    WallTexture,
    Flat,
    Sprite,
    /// Standalone graphics (title screens, status bar art); listed with textures.
    Graphic,
}

impl DefinitionKind {
    fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "texture" => Some(Self::Texture),
            "walltexture" => Some(Self::WallTexture),
            "flat" => Some(Self::Flat),
            "sprite" => Some(Self::Sprite),
            "graphic" => Some(Self::Graphic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatchPlacement {
    pub name: String,
    pub x: i32,
    pub y: i32,
}

/// A texture assembled from patches, from `TEXTURE1`/`TEXTURE2` or `TEXTURES`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDefinition {
    pub kind: DefinitionKind,
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub world_panning: bool,
    pub patches: Vec<PatchPlacement>,
}

impl TextureDefinition {
    pub fn new(kind: DefinitionKind, name: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            kind,
            name: name.into(),
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            world_panning: false,
            patches: Vec::new(),
        }
    }
}

/// Everything one `TEXTURES` lump defines, split by section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TexturesParseResult {
    pub textures: Vec<TextureDefinition>,
    pub flats: Vec<TextureDefinition>,
    pub sprites: Vec<TextureDefinition>,
    pub walltextures: Vec<TextureDefinition>,
}

impl TexturesParseResult {
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
            && self.flats.is_empty()
            && self.sprites.is_empty()
            && self.walltextures.is_empty()
    }

    fn push(&mut self, definition: TextureDefinition) {
        match definition.kind {
            DefinitionKind::Texture | DefinitionKind::Graphic => self.textures.push(definition),
            DefinitionKind::WallTexture => self.walltextures.push(definition),
            DefinitionKind::Flat => self.flats.push(definition),
            DefinitionKind::Sprite => self.sprites.push(definition),
        }
    }
}

/// Turns a structured-text definition lump into its per-category definitions.
///
/// Implementations report problems through `tracing` and return whatever they
/// managed to parse.
pub trait DefinitionParser {
    fn parse(&self, data: &TextResourceData) -> TexturesParseResult;
}

/// Parser for the ZDoom `TEXTURES` syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct TexturesParser;

impl DefinitionParser for TexturesParser {
    fn parse(&self, data: &TextResourceData) -> TexturesParseResult {
        let text = data.text();
        let mut parser = Parser {
            tokens: Tokenizer::new(&text).collect(),
            pos: 0,
            source: &data.path,
        };
        let result = parser.parse_document();
        tracing::debug!(
            "Parsed '{}': {} textures, {} flats, {} sprites, {} wall textures",
            data.path,
            result.textures.len(),
            result.flats.len(),
            result.sprites.len(),
            result.walltextures.len()
        );
        result
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Quoted(&'a str),
    Comma,
    Open,
    Close,
}

/// Byte-level scanner producing tokens with their line numbers.
struct Tokenizer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    fn skip_trivia(&mut self) {
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b == b'\n' {
                self.line += 1;
                self.pos += 1;
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if self.bytes[self.pos..].starts_with(b"//") {
                while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
            } else if self.bytes[self.pos..].starts_with(b"/*") {
                self.pos += 2;
                while self.pos < self.bytes.len() && !self.bytes[self.pos..].starts_with(b"*/") {
                    if self.bytes[self.pos] == b'\n' {
                        self.line += 1;
                    }
                    self.pos += 1;
                }
                self.pos = (self.pos + 2).min(self.bytes.len());
            } else {
                break;
            }
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = (Token<'a>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_trivia();
        if self.pos >= self.bytes.len() {
            return None;
        }

        let text = self.text;
        let line = self.line;
        let start = self.pos;
        let token = match self.bytes[start] {
            b',' => {
                self.pos += 1;
                Token::Comma
            }
            b'{' => {
                self.pos += 1;
                Token::Open
            }
            b'}' => {
                self.pos += 1;
                Token::Close
            }
            b'"' => {
                self.pos += 1;
                while self.pos < self.bytes.len() && self.bytes[self.pos] != b'"' {
                    if self.bytes[self.pos] == b'\n' {
                        self.line += 1;
                    }
                    self.pos += 1;
                }
                let end = self.pos;
                self.pos = (self.pos + 1).min(self.bytes.len());
                Token::Quoted(&text[start + 1..end])
            }
            _ => {
                while self.pos < self.bytes.len() {
                    let b = self.bytes[self.pos];
                    if b.is_ascii_whitespace() || matches!(b, b',' | b'{' | b'}' | b'"') {
                        break;
                    }
                    if self.bytes[self.pos..].starts_with(b"//")
                        || self.bytes[self.pos..].starts_with(b"/*")
                    {
                        break;
                    }
                    self.pos += 1;
                }
                // Multi-byte characters only ever appear inside a word, so the
                // boundaries above always fall on ASCII bytes.
                Token::Word(&text[start..self.pos])
            }
        };
        Some((token, line))
    }
}

struct Parser<'a, 's> {
    tokens: Vec<(Token<'a>, usize)>,
    pos: usize,
    source: &'s str,
}

impl<'a, 's> Parser<'a, 's> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, l)| *l)
            .unwrap_or(1)
    }

    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}:{}: {}", self.source, self.line(), message);
    }

    fn parse_document(&mut self) -> TexturesParseResult {
        let mut result = TexturesParseResult::default();

        while let Some(token) = self.next() {
            match token {
                Token::Word(word) => match DefinitionKind::from_keyword(word) {
                    Some(kind) => match self.parse_definition(kind) {
                        Ok(definition) => result.push(definition),
                        Err(message) => {
                            self.warn(&message);
                            return result;
                        }
                    },
                    None => self.skip_statement(),
                },
                Token::Open => self.skip_block(),
                _ => {}
            }
        }

        result
    }

    fn parse_definition(&mut self, kind: DefinitionKind) -> Result<TextureDefinition, String> {
        if matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case("optional")) {
            self.next();
        }

        let name = self.expect_name("texture name")?;
        self.expect_comma()?;
        let width = self.expect_int("width")?;
        self.expect_comma()?;
        let height = self.expect_int("height")?;

        let mut definition = TextureDefinition::new(kind, name.to_ascii_uppercase(), width, height);
        if self.peek() != Some(&Token::Open) {
            return Ok(definition);
        }
        self.next();

        loop {
            match self.next() {
                Some(Token::Close) => break,
                Some(Token::Word(word)) => self.parse_property(&mut definition, word)?,
                Some(Token::Open) => self.skip_block(),
                Some(_) => {}
                None => return Err(format!("unexpected end of file in '{}'", definition.name)),
            }
        }

        Ok(definition)
    }

    fn parse_property(&mut self, definition: &mut TextureDefinition, word: &str) -> Result<(), String> {
        match word.to_ascii_lowercase().as_str() {
            "patch" | "graphic" | "sprite" => {
                let name = self.expect_name("patch name")?;
                self.expect_comma()?;
                let x = self.expect_int("patch x offset")?;
                self.expect_comma()?;
                let y = self.expect_int("patch y offset")?;
                if self.peek() == Some(&Token::Open) {
                    self.next();
                    self.skip_block();
                }
                definition.patches.push(PatchPlacement {
                    name: name.to_ascii_uppercase(),
                    x,
                    y,
                });
            }
            "xscale" => definition.scale_x = self.expect_float("XScale")?,
            "yscale" => definition.scale_y = self.expect_float("YScale")?,
            "worldpanning" => definition.world_panning = true,
            _ => self.skip_values(),
        }
        Ok(())
    }

    /// Consume the values of an unknown property.
    fn skip_values(&mut self) {
        loop {
            match self.peek() {
                Some(Token::Comma) | Some(Token::Quoted(_)) => {
                    self.next();
                }
                Some(Token::Word(w)) if w.parse::<f64>().is_ok() => {
                    self.next();
                }
                Some(Token::Open) => {
                    self.next();
                    self.skip_block();
                }
                _ => break,
            }
        }
    }

    /// Skip an unknown top-level statement, including its block if it has one.
    fn skip_statement(&mut self) {
        while let Some(token) = self.peek() {
            match token {
                Token::Open => {
                    self.next();
                    self.skip_block();
                    return;
                }
                Token::Word(w) if DefinitionKind::from_keyword(w).is_some() => return,
                _ => {
                    self.next();
                }
            }
        }
    }

    /// Skip to the matching close brace. The open brace is already consumed.
    fn skip_block(&mut self) {
        let mut depth = 1;
        while let Some(token) = self.next() {
            match token {
                Token::Open => depth += 1,
                Token::Close => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn expect_name(&mut self, what: &str) -> Result<&'a str, String> {
        match self.next() {
            Some(Token::Word(w)) | Some(Token::Quoted(w)) => Ok(w),
            other => Err(format!("expected {}, found {:?}", what, other)),
        }
    }

    fn expect_comma(&mut self) -> Result<(), String> {
        match self.next() {
            Some(Token::Comma) => Ok(()),
            other => Err(format!("expected ',', found {:?}", other)),
        }
    }

    fn expect_int(&mut self, what: &str) -> Result<i32, String> {
        match self.next() {
            Some(Token::Word(w)) => w
                .parse::<i32>()
                .map_err(|_| format!("expected integer {}, found '{}'", what, w)),
            other => Err(format!("expected integer {}, found {:?}", what, other)),
        }
    }

    fn expect_float(&mut self, what: &str) -> Result<f32, String> {
        match self.next() {
            Some(Token::Word(w)) => w
                .parse::<f32>()
                .map_err(|_| format!("expected number for {}, found '{}'", what, w)),
            other => Err(format!("expected number for {}, found {:?}", what, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReaderId;

    fn lump(text: &str) -> TextResourceData {
        TextResourceData {
            data: text.as_bytes().to_vec(),
            reader: ReaderId::from_raw(1),
            reader_name: "test".into(),
            path: "TEXTURES.txt".into(),
            script: true,
        }
    }

    #[test]
    fn test_parse_sections() {
        let result = TexturesParser.parse(&lump(
            r#"
            // doors
            Texture "DOOR1", 64, 72
            {
                XScale 2.0
                YScale 2
                Patch "DOOR2_1", 0, 0
                Patch DOOR2_4, 32, -8 { FlipX Rotate 90 }
            }
            /* a flat */
            Flat FLOOR7_1, 64, 64 { Patch "FLAT1", 0, 0 }
            Sprite "TROOZ0", 41, 57 { Offset 20, 52 Patch TROOA1, 0, 0 }
            WallTexture optional "BIGDOOR9", 128, 128 { WorldPanning }
            "#,
        ));

        assert_eq!(result.textures.len(), 1);
        let door = &result.textures[0];
        assert_eq!(door.name, "DOOR1");
        assert_eq!((door.width, door.height), (64, 72));
        assert_eq!(door.scale_x, 2.0);
        assert_eq!(door.patches.len(), 2);
        assert_eq!(door.patches[1].name, "DOOR2_4");
        assert_eq!(door.patches[1].y, -8);

        assert_eq!(result.flats[0].name, "FLOOR7_1");
        assert_eq!(result.sprites[0].patches[0].name, "TROOA1");
        assert_eq!(result.walltextures[0].name, "BIGDOOR9");
        assert!(result.walltextures[0].world_panning);
    }

    #[test]
    fn test_unknown_statements_are_skipped() {
        let result = TexturesParser.parse(&lump(
            r#"
            define "SPECIAL", 64, 64
            Texture "STEP1", 32, 8 { Patch "STEP1", 0, 0 }
            "#,
        ));

        assert_eq!(result.textures.len(), 1);
        assert_eq!(result.textures[0].name, "STEP1");
    }

    #[test]
    fn test_graphics_are_listed_with_textures() {
        let result = TexturesParser.parse(&lump(
            r#"
            Graphic "TITLE", 320, 200 { Patch "TITLEPIC", 0, 0 }
            Texture "STEP1", 32, 8 { Patch "STEP1", 0, 0 }
            "#,
        ));

        assert_eq!(result.textures.len(), 2);
        assert_eq!(result.textures[0].kind, DefinitionKind::Graphic);
        assert_eq!(result.textures[0].name, "TITLE");
        assert_eq!(result.textures[0].patches[0].name, "TITLEPIC");
        assert_eq!((result.textures[0].width, result.textures[0].height), (320, 200));
    }

    #[test]
    fn test_parse_error_keeps_earlier_definitions() {
        let result = TexturesParser.parse(&lump(
            r#"
            Texture "GOOD", 64, 64 { Patch "P1", 0, 0 }
            Texture "BAD", wide, 64 { }
            Texture "NEVER", 64, 64 { }
            "#,
        ));

        assert_eq!(result.textures.len(), 1);
        assert_eq!(result.textures[0].name, "GOOD");
    }

    #[test]
    fn test_definition_without_block() {
        let result = TexturesParser.parse(&lump("Flat \"BLANK\", 64, 64"));
        assert_eq!(result.flats.len(), 1);
        assert!(result.flats[0].patches.is_empty());
    }
}
