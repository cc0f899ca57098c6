use crate::refs::{ObjectReferences, RefType};
use crate::units::Pt;
use crate::Error;
use owned_ttf_parser::{AsFaceRef, GlyphId, OwnedFace};
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo};
use pdf_writer::{Finish, Name, Pdf, Ref, Str};
use std::collections::HashMap;
use std::path::PathBuf;

// Metrics of the built-in Courier base font, in em units. Courier is the
// fallback precisely because its fixed 600/1000 advance keeps width
// measurement exact without embedded metric tables.
const BUILTIN_ADVANCE: f32 = 0.6;
const BUILTIN_ASCENT: f32 = 0.629;
const BUILTIN_DESCENT: f32 = -0.157;

/// A font usable for measuring and typesetting text.
///
/// Embedded fonts are TTF/OTF faces parsed with [owned_ttf_parser] and
/// written into the PDF in their entirety as CID fonts, so any glyph the
/// face carries (including Cyrillic) renders correctly. The built-in
/// variant references the viewer's Courier base font without embedding
/// anything; it only covers Latin-1, and any other character degrades to
/// `?` at encoding time.
pub enum Font {
    Embedded(OwnedFace),
    Builtin,
}

/// Text encoded for a content stream `Tj` operator.
pub(crate) enum EncodedText {
    /// 16-bit glyph ids for an Identity-H encoded CID font
    Glyphs(Vec<u16>),
    /// Latin-1 bytes for the built-in base font
    Bytes(Vec<u8>),
}

impl Font {
    /// Load a font from raw bytes, parsing the font and returning an error
    /// if the font could not be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font, Error> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        Ok(Font::Embedded(face))
    }

    /// The non-embedded Courier fallback
    pub fn builtin() -> Font {
        Font::Builtin
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, Font::Embedded(_))
    }

    /// Calculate the ascent (distance from the baseline to the top of the font) for the given font size
    pub fn ascent(&self, size: Pt) -> Pt {
        match self {
            Font::Embedded(face) => {
                let face = face.as_face_ref();
                size * (face.ascender() as f32 / face.units_per_em() as f32)
            }
            Font::Builtin => size * BUILTIN_ASCENT,
        }
    }

    /// Calculate the descent (distance from the baseline to the bottom of the font) for the given
    /// font size. Note: this is usually negative
    pub fn descent(&self, size: Pt) -> Pt {
        match self {
            Font::Embedded(face) => {
                let face = face.as_face_ref();
                size * (face.descender() as f32 / face.units_per_em() as f32)
            }
            Font::Builtin => size * BUILTIN_DESCENT,
        }
    }

    /// Calculate the default line height of the font for the given size. The returned value is
    /// how much to vertically offset a second row of text below a first row of text.
    pub fn line_height(&self, size: Pt) -> Pt {
        match self {
            Font::Embedded(face) => {
                let face = face.as_face_ref();
                let scaling = size.0 / face.units_per_em() as f32;
                Pt((face.line_gap() as f32 + face.ascender() as f32 - face.descender() as f32)
                    * scaling)
            }
            Font::Builtin => size * (BUILTIN_ASCENT - BUILTIN_DESCENT),
        }
    }

    /// Calculate the rendered width of a string of text at the given size.
    /// Characters without a glyph in the face measure as the replacement
    /// glyph, matching how they will be rendered.
    pub fn width_of(&self, text: &str, size: Pt) -> Pt {
        match self {
            Font::Embedded(face) => {
                let face = face.as_face_ref();
                let scaling = size.0 / face.units_per_em() as f32;
                Pt(text
                    .chars()
                    .map(|ch| {
                        glyph_or_replacement(face, ch)
                            .and_then(|gid| face.glyph_hor_advance(gid))
                            .unwrap_or_default() as f32
                            * scaling
                    })
                    .sum())
            }
            Font::Builtin => Pt(size.0 * BUILTIN_ADVANCE * text.chars().count() as f32),
        }
    }

    pub(crate) fn encode_text(&self, text: &str) -> EncodedText {
        match self {
            Font::Embedded(face) => {
                let face = face.as_face_ref();
                EncodedText::Glyphs(
                    text.chars()
                        .map(|ch| glyph_or_replacement(face, ch).map(|gid| gid.0).unwrap_or(0))
                        .collect(),
                )
            }
            Font::Builtin => EncodedText::Bytes(
                text.chars()
                    .map(|ch| {
                        let cp = ch as u32;
                        if (0x20..0x7F).contains(&cp) || (0xA0..0x100).contains(&cp) {
                            cp as u8
                        } else {
                            b'?'
                        }
                    })
                    .collect(),
            ),
        }
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, index: usize, writer: &mut Pdf) {
        match self {
            Font::Embedded(face) => write_embedded(face, refs, index, writer),
            Font::Builtin => {
                let id = refs.gen(RefType::Font(index));
                let mut font = writer.type1_font(id);
                font.base_font(Name(b"Courier"));
                font.encoding_predefined(Name(b"WinAnsiEncoding"));
            }
        }
    }
}

/// Try each candidate font path in order, returning the first one that can
/// be read and parsed along with the path that won.
pub fn first_available(candidates: &[PathBuf]) -> Option<(Font, PathBuf)> {
    for path in candidates {
        let Ok(bytes) = std::fs::read(path) else {
            continue;
        };
        match Font::load(bytes) {
            Ok(font) => return Some((font, path.clone())),
            Err(e) => log::warn!("failed to parse font {}: {e}", path.display()),
        }
    }
    None
}

fn glyph_or_replacement(face: &owned_ttf_parser::Face<'_>, ch: char) -> Option<GlyphId> {
    face.glyph_index(ch)
        .or_else(|| face.glyph_index('\u{FFFD}'))
        .or_else(|| face.glyph_index('?'))
}

/// Every glyph id the face's unicode cmap subtables map, paired with one
/// representative character, sorted by glyph id. Restricted to the BMP so
/// the ToUnicode cmap stays valid UTF-16.
fn glyph_map(face: &owned_ttf_parser::Face<'_>) -> Vec<(u16, char)> {
    let mut map: HashMap<u16, char> = HashMap::new();

    if let Some(cmap) = face.tables().cmap {
        for subtable in cmap.subtables.into_iter().filter(|t| t.is_unicode()) {
            subtable.codepoints(|codepoint: u32| {
                if codepoint > 0xFFFF {
                    return;
                }
                if let Ok(ch) = char::try_from(codepoint) {
                    if let Some(gid) = subtable.glyph_index(codepoint).filter(|gid| gid.0 > 0) {
                        map.entry(gid.0).or_insert(ch);
                    }
                }
            });
        }
    }

    let mut ids: Vec<(u16, char)> = map.into_iter().collect();
    ids.sort_by_key(|&(gid, _)| gid);
    ids
}

fn write_embedded(face: &OwnedFace, refs: &mut ObjectReferences, index: usize, writer: &mut Pdf) {
    let font_id = refs.gen(RefType::Font(index));
    let cid_font_id = write_cid(face, refs, index, writer);
    let to_unicode_id = write_to_unicode(face, refs, index, writer);

    let mut font = writer.type0_font(font_id);
    font.base_font(Name(format!("F{index}").as_bytes()));
    font.encoding_predefined(Name(b"Identity-H"));
    font.descendant_font(cid_font_id);
    font.to_unicode(to_unicode_id);
}

fn write_cid(face: &OwnedFace, refs: &mut ObjectReferences, index: usize, writer: &mut Pdf) -> Ref {
    let descriptor_id = write_descriptor(face, refs, index, writer);

    let id = refs.gen(RefType::CidFont(index));
    let mut cid_font = writer.cid_font(id);
    cid_font.subtype(CidFontType::Type2);
    cid_font.base_font(Name(format!("F{index}").as_bytes()));
    cid_font.system_info(SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    });
    cid_font.font_descriptor(descriptor_id);

    let face_ref = face.as_face_ref();
    let to_milli = 1000.0 / face_ref.units_per_em() as f32;
    let glyphs = glyph_map(face_ref);

    // the most common advance becomes the default width so the widths
    // array only needs to spell out the exceptions
    let mut advance_counts: HashMap<u16, usize> = HashMap::new();
    for &(gid, _) in glyphs.iter() {
        let advance = face_ref.glyph_hor_advance(GlyphId(gid)).unwrap_or_default();
        *advance_counts.entry(advance).or_insert(0) += 1;
    }
    let default_width = advance_counts
        .iter()
        .max_by_key(|(_, &count)| count)
        .map(|(&advance, _)| advance as f32 * to_milli)
        .unwrap_or(1000.0);

    // widths are written as runs of consecutive glyph ids
    let mut widths = cid_font.widths();
    let mut run_start: u16 = 0;
    let mut run: Vec<f32> = Vec::new();
    let mut previous: Option<u16> = None;
    for &(gid, _) in glyphs.iter() {
        let width = face_ref.glyph_hor_advance(GlyphId(gid)).unwrap_or_default() as f32 * to_milli;
        match previous {
            Some(p) if gid == p.wrapping_add(1) => run.push(width),
            _ => {
                if !run.is_empty() {
                    widths.consecutive(run_start, run.drain(..));
                }
                run_start = gid;
                run.push(width);
            }
        }
        previous = Some(gid);
    }
    if !run.is_empty() {
        widths.consecutive(run_start, run);
    }
    widths.finish();

    cid_font.default_width(default_width);
    cid_font.cid_to_gid_map_predefined(Name(b"Identity"));

    id
}

fn write_font_data(
    face: &OwnedFace,
    refs: &mut ObjectReferences,
    index: usize,
    writer: &mut Pdf,
) -> Ref {
    let id = refs.gen(RefType::FontData(index));

    writer
        .stream(id, face.as_slice())
        .pair(Name(b"Length1"), face.as_slice().len() as i32);

    id
}

fn write_descriptor(
    face: &OwnedFace,
    refs: &mut ObjectReferences,
    index: usize,
    writer: &mut Pdf,
) -> Ref {
    let font_data_id = write_font_data(face, refs, index, writer);
    let face_ref = face.as_face_ref();

    let id = refs.gen(RefType::FontDescriptor(index));
    let to_milli = 1000.0 / face_ref.units_per_em() as f32;

    let mut flags = FontFlags::empty();
    if face_ref.is_monospaced() {
        flags.set(FontFlags::FIXED_PITCH, true);
    }
    if face_ref.is_italic() {
        flags.set(FontFlags::ITALIC, true);
    }

    let bbox = face_ref.global_bounding_box();

    let mut descriptor = writer.font_descriptor(id);
    descriptor.name(Name(format!("F{index}").as_bytes()));
    descriptor.flags(flags);
    descriptor.bbox(pdf_writer::Rect {
        x1: bbox.x_min as f32 * to_milli,
        y1: bbox.y_min as f32 * to_milli,
        x2: bbox.x_max as f32 * to_milli,
        y2: bbox.y_max as f32 * to_milli,
    });
    descriptor.italic_angle(0.0);
    descriptor.ascent(face_ref.ascender() as f32 * to_milli);
    descriptor.descent(face_ref.descender() as f32 * to_milli);
    descriptor.cap_height(
        face_ref
            .capital_height()
            .map(|h| h as f32 * to_milli)
            .unwrap_or(1000.0),
    );
    // TTF doesn't carry a vertical stem width; 80 is a plausible text weight
    descriptor.stem_v(80.0);
    descriptor.font_file2(font_data_id);

    id
}

fn write_to_unicode(
    face: &OwnedFace,
    refs: &mut ObjectReferences,
    index: usize,
    writer: &mut Pdf,
) -> Ref {
    let id = refs.gen(RefType::ToUnicode(index));

    let mut map: String = r#"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe)
/Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
"#
    .replace("\r\n", "\n");

    let glyphs = glyph_map(face.as_face_ref());
    for block in glyphs.chunks(100) {
        map.push_str(&format!("{} beginbfchar\n", block.len()));
        for &(gid, ch) in block {
            map.push_str(&format!("<{gid:04x}> <{:04x}>\n", ch as u32));
        }
        map.push_str("endbfchar\n");
    }
    map.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");

    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
        map.as_bytes(),
        miniz_oxide::deflate::CompressionLevel::DefaultLevel as u8,
    );
    let mut stream = writer.stream(id, compressed.as_slice());
    stream.filter(pdf_writer::Filter::FlateDecode);

    id
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtin_widths_are_exact() {
        let font = Font::builtin();
        assert_eq!(font.width_of("Page 1", Pt(10.0)), Pt(36.0));
        assert_eq!(font.width_of("", Pt(10.0)), Pt(0.0));
    }

    #[test]
    fn builtin_encoding_degrades_to_question_marks() {
        let font = Font::builtin();
        match font.encode_text("ab Я c") {
            EncodedText::Bytes(bytes) => assert_eq!(bytes, b"ab ? c".to_vec()),
            EncodedText::Glyphs(_) => panic!("builtin font must encode to bytes"),
        }
    }
}
