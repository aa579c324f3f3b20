#![forbid(unsafe_code)]

//! Drawing commands and their byte encoding.
//!
//! Commands are stored as variable-sized records in a flat byte buffer:
//!
//! ```text
//! tag:u8  size:u32  fields...
//! ```
//!
//! `size` is the full record length including the header, so a reader can
//! step from record to record without decoding the payload. All integers are
//! little-endian. `DrawText` ends with a length-prefixed UTF-8 payload sized to
//! the string.
//!
//! The record bytes double as the hashing input: two commands hash equal
//! exactly when every field, and for text every byte of the string, matches.

use framecache_core::{Color, FontId, Rect};

const TAG_FREE_FONT: u8 = 0;
const TAG_SET_CLIP: u8 = 1;
const TAG_DRAW_RECT: u8 = 2;
const TAG_DRAW_TEXT: u8 = 3;

/// Record header: tag byte plus 32-bit record size.
pub const HEADER_LEN: usize = 5;

const RECT_LEN: usize = 16;
const COLOR_LEN: usize = 4;
const FONT_LEN: usize = 8;

/// A drawing command, borrowed from its encoded record.
///
/// Fonts are referenced by handle only; a command never owns a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Release a font once the frame has been presented.
    FreeFont { font: FontId },
    /// Replace the active clip region. Already intersected with the screen.
    SetClip { rect: Rect },
    DrawRect {
        rect: Rect,
        color: Color,
    },
    DrawText {
        /// Text bounds: pen origin, total advance, and line height.
        rect: Rect,
        color: Color,
        font: FontId,
        tab_width: i32,
        text: &'a str,
    },
}

impl<'a> Command<'a> {
    #[inline]
    fn tag(&self) -> u8 {
        match self {
            Self::FreeFont { .. } => TAG_FREE_FONT,
            Self::SetClip { .. } => TAG_SET_CLIP,
            Self::DrawRect { .. } => TAG_DRAW_RECT,
            Self::DrawText { .. } => TAG_DRAW_TEXT,
        }
    }

    /// Bounds of a drawing command. `None` for commands that draw nothing.
    #[inline]
    pub fn draw_rect(&self) -> Option<Rect> {
        match self {
            Self::DrawRect { rect, .. } | Self::DrawText { rect, .. } => Some(*rect),
            Self::FreeFont { .. } | Self::SetClip { .. } => None,
        }
    }

    /// Size of the encoded record in bytes.
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN
            + match self {
                Self::FreeFont { .. } => FONT_LEN,
                Self::SetClip { .. } => RECT_LEN,
                Self::DrawRect { .. } => RECT_LEN + COLOR_LEN,
                Self::DrawText { text, .. } => {
                    RECT_LEN + COLOR_LEN + FONT_LEN + 4 + 4 + text.len()
                }
            }
    }

    /// Append the encoded record to `out`.
    ///
    /// Writes exactly [`Command::encoded_len`] bytes.
    pub fn encode(&self, out: &mut Vec<u8>) {
        let len = self.encoded_len();
        out.push(self.tag());
        out.extend_from_slice(&(len as u32).to_le_bytes());
        match self {
            Self::FreeFont { font } => out.extend_from_slice(&font.to_le_bytes()),
            Self::SetClip { rect } => out.extend_from_slice(&rect.to_le_bytes()),
            Self::DrawRect { rect, color } => {
                out.extend_from_slice(&rect.to_le_bytes());
                out.extend_from_slice(&color.0.to_le_bytes());
            }
            Self::DrawText {
                rect,
                color,
                font,
                tab_width,
                text,
            } => {
                out.extend_from_slice(&rect.to_le_bytes());
                out.extend_from_slice(&color.0.to_le_bytes());
                out.extend_from_slice(&font.to_le_bytes());
                out.extend_from_slice(&tab_width.to_le_bytes());
                out.extend_from_slice(&(text.len() as u32).to_le_bytes());
                out.extend_from_slice(text.as_bytes());
            }
        }
    }

    /// Decode the record at the start of `bytes`.
    ///
    /// Returns the command and its record length, or `None` if the bytes do
    /// not hold a well-formed record.
    pub fn decode(bytes: &'a [u8]) -> Option<(Command<'a>, usize)> {
        let mut r = Reader::new(bytes);
        let tag = r.u8()?;
        let size = r.u32()? as usize;
        if size < HEADER_LEN || size > bytes.len() {
            return None;
        }
        let command = match tag {
            TAG_FREE_FONT => Command::FreeFont { font: r.font()? },
            TAG_SET_CLIP => Command::SetClip { rect: r.rect()? },
            TAG_DRAW_RECT => Command::DrawRect {
                rect: r.rect()?,
                color: Color(r.u32()?),
            },
            TAG_DRAW_TEXT => {
                let rect = r.rect()?;
                let color = Color(r.u32()?);
                let font = r.font()?;
                let tab_width = r.u32()? as i32;
                let len = r.u32()? as usize;
                let text = std::str::from_utf8(r.take(len)?).ok()?;
                Command::DrawText {
                    rect,
                    color,
                    font,
                    tab_width,
                    text,
                }
            }
            _ => return None,
        };
        (r.pos == size).then_some((command, size))
    }
}

/// Little-endian cursor over a record.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let out = self.bytes.get(self.pos..end)?;
        self.pos = end;
        Some(out)
    }

    fn array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.take(N)?.try_into().ok()
    }

    fn u8(&mut self) -> Option<u8> {
        self.array::<1>().map(|b| b[0])
    }

    fn u32(&mut self) -> Option<u32> {
        self.array::<4>().map(u32::from_le_bytes)
    }

    fn rect(&mut self) -> Option<Rect> {
        self.array::<RECT_LEN>().map(Rect::from_le_bytes)
    }

    fn font(&mut self) -> Option<FontId> {
        self.array::<FONT_LEN>().map(FontId::from_le_bytes)
    }
}
