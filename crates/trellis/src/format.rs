//! Inline text markup
//!
//! Text with formatting enabled may embed these directives:
//!
//! | Markup      | Effect          |
//! |-------------|-----------------|
//! | `[#rrggbb]` | colour start    |
//! | `[d]`       | colour end      |
//! | `[uline]`   | underline start |
//! | `[u]`       | underline end   |
//!
//! Directives are removed from the displayed text and recorded as
//! [`FormatTag`]s indexed by character position. Anything that is not a
//! well-formed directive is kept literally.

bitflags::bitflags! {
    /// Effects switched on or off at a tag position
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TagFlags: u8 {
        const COLOUR_START = 1 << 0;
        const COLOUR_END = 1 << 1;
        const UNDERLINE_START = 1 << 2;
        const UNDERLINE_END = 1 << 3;
    }
}

/// A formatting change at a character index of the displayed text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatTag {
    /// Character index (not byte offset) into the displayed text
    pub index: usize,
    pub flags: TagFlags,
    /// `0xRRGGBB`, meaningful when `flags` has `COLOUR_START`
    pub colour: u32,
}

/// Result of [`parse`]: displayed text plus its tags in index order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedText {
    pub text: String,
    pub tags: Vec<FormatTag>,
}

enum Directive {
    ColourStart(u32),
    ColourEnd,
    UnderlineStart,
    UnderlineEnd,
}

impl Directive {
    fn flags(&self) -> TagFlags {
        match self {
            Directive::ColourStart(_) => TagFlags::COLOUR_START,
            Directive::ColourEnd => TagFlags::COLOUR_END,
            Directive::UnderlineStart => TagFlags::UNDERLINE_START,
            Directive::UnderlineEnd => TagFlags::UNDERLINE_END,
        }
    }
}

/// Recognize a directive at the start of `rest`, returning it with its byte length
fn directive_at(rest: &str) -> Option<(Directive, usize)> {
    if rest.starts_with("[d]") {
        return Some((Directive::ColourEnd, 3));
    }
    if rest.starts_with("[u]") {
        return Some((Directive::UnderlineEnd, 3));
    }
    if rest.starts_with("[uline]") {
        return Some((Directive::UnderlineStart, 7));
    }
    let hex = rest.strip_prefix("[#")?.get(..7)?;
    let (digits, close) = hex.split_at(6);
    if close != "]" || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let colour = u32::from_str_radix(digits, 16).ok()?;
    Some((Directive::ColourStart(colour), 9))
}

/// Append a tag, merging with the previous one when both share an index
fn push_tag(tags: &mut Vec<FormatTag>, index: usize, flags: TagFlags, colour: u32) {
    if let Some(last) = tags.last_mut() {
        if last.index == index {
            last.flags |= flags;
            if flags.contains(TagFlags::COLOUR_START) {
                last.colour = colour;
            }
            return;
        }
    }
    tags.push(FormatTag {
        index,
        flags,
        colour,
    });
}

/// Strip markup from `source`
pub fn parse(source: &str) -> ParsedText {
    let mut text = String::with_capacity(source.len());
    let mut tags = Vec::new();
    let mut chars = 0usize;
    let mut offset = 0usize;

    while offset < source.len() {
        let rest = &source[offset..];
        if rest.starts_with('[') {
            if let Some((directive, len)) = directive_at(rest) {
                let colour = match directive {
                    Directive::ColourStart(colour) => colour,
                    _ => 0,
                };
                push_tag(&mut tags, chars, directive.flags(), colour);
                offset += len;
                continue;
            }
        }
        let Some(ch) = rest.chars().next() else {
            break;
        };
        text.push(ch);
        chars += 1;
        offset += ch.len_utf8();
    }

    ParsedText { text, tags }
}

/// Tags for the character range `start..end`, re-based to start at zero.
///
/// Effects that are active at `start` are re-opened with a tag at index 0, so a
/// wrapped line keeps the colour and underline of the text it was cut from.
pub fn slice_tags(tags: &[FormatTag], start: usize, end: usize) -> Vec<FormatTag> {
    let mut colour = None;
    let mut underline = false;
    for tag in tags.iter().take_while(|tag| tag.index <= start) {
        if tag.flags.contains(TagFlags::COLOUR_END) {
            colour = None;
        }
        if tag.flags.contains(TagFlags::COLOUR_START) {
            colour = Some(tag.colour);
        }
        if tag.flags.contains(TagFlags::UNDERLINE_END) {
            underline = false;
        }
        if tag.flags.contains(TagFlags::UNDERLINE_START) {
            underline = true;
        }
    }

    let mut out = Vec::new();
    let mut carried = TagFlags::empty();
    if colour.is_some() {
        carried |= TagFlags::COLOUR_START;
    }
    if underline {
        carried |= TagFlags::UNDERLINE_START;
    }
    if !carried.is_empty() {
        push_tag(&mut out, 0, carried, colour.unwrap_or(0));
    }

    for tag in tags
        .iter()
        .filter(|tag| tag.index > start && tag.index < end)
    {
        push_tag(&mut out, tag.index - start, tag.flags, tag.colour);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colour_markup() {
        let parsed = parse("a[#ff0000]b[d]c");
        assert_eq!(parsed.text, "abc");
        assert_eq!(
            parsed.tags,
            vec![
                FormatTag {
                    index: 1,
                    flags: TagFlags::COLOUR_START,
                    colour: 0xff0000,
                },
                FormatTag {
                    index: 2,
                    flags: TagFlags::COLOUR_END,
                    colour: 0,
                },
            ]
        );
    }

    #[test]
    fn test_tags_at_same_index_coalesce() {
        let parsed = parse("[#00ff00][uline]x[u][d]");
        assert_eq!(parsed.text, "x");
        assert_eq!(parsed.tags.len(), 2);
        assert_eq!(
            parsed.tags[0].flags,
            TagFlags::COLOUR_START | TagFlags::UNDERLINE_START
        );
        assert_eq!(parsed.tags[0].colour, 0x00ff00);
        assert_eq!(parsed.tags[1].index, 1);
        assert_eq!(
            parsed.tags[1].flags,
            TagFlags::UNDERLINE_END | TagFlags::COLOUR_END
        );
    }

    #[test]
    fn test_malformed_markup_is_literal() {
        for source in ["[#ff00]x", "[#gg0000]", "[x]", "[", "a[#ff0000"] {
            let parsed = parse(source);
            assert_eq!(parsed.text, source);
            assert!(parsed.tags.is_empty());
        }
    }

    #[test]
    fn test_index_counts_characters() {
        let parsed = parse("héllo[u]");
        assert_eq!(parsed.tags[0].index, 5);
    }

    #[test]
    fn test_slice_carries_active_effects() {
        let parsed = parse("ab[#112233]cd[uline]ef[d]gh");
        // "abcdefgh": colour 2..6, underline from 4
        let tags = slice_tags(&parsed.tags, 3, 8);
        assert_eq!(tags[0].index, 0);
        assert_eq!(tags[0].flags, TagFlags::COLOUR_START);
        assert_eq!(tags[0].colour, 0x112233);
        assert_eq!(tags[1].index, 1);
        assert_eq!(tags[1].flags, TagFlags::UNDERLINE_START);
        assert_eq!(tags[2].index, 3);
        assert_eq!(tags[2].flags, TagFlags::COLOUR_END);
    }
}
