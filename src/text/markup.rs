//! Markup sanitizing for notification titles and bodies.
//!
//! Senders may use `<b>`, `<i>` and `<u>` and the five predefined entities.
//! Anything else is escaped so it shows up as literal text. Text that still
//! fails to parse after normalization is escaped wholesale; callers never see
//! an error.

use quick_xml::Reader;
use quick_xml::events::Event;
use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Entities passed through as-is by both sanitizing paths.
const ENTITIES: [&str; 5] = ["&amp;", "&quot;", "&apos;", "&lt;", "&gt;"];

/// Tags a sender may use. Everything else starting with `<` is escaped.
const SENDER_TAGS: [&str; 6] = ["<b>", "<i>", "<u>", "</b>", "</i>", "</u>"];

/// Tags the renderer understands.
static MARKUP_TAGS: phf::Set<&'static str> = phf::phf_set! {
    "b", "big", "i", "s", "small", "span", "sub", "sup", "tt", "u", "markup",
};

/// Attributes accepted on `<span>`.
static SPAN_ATTRIBUTES: phf::Set<&'static str> = phf::phf_set! {
    "font", "font_desc", "font_family", "face", "size", "style", "weight",
    "variant", "stretch", "foreground", "fgcolor", "color", "background",
    "bgcolor", "underline", "underline_color", "rise", "strikethrough",
    "strikethrough_color", "fallback", "lang", "letter_spacing", "alpha",
    "fgalpha", "bgalpha",
};

#[derive(Error, Debug)]
pub enum MarkupError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Bad attribute: {0}")]
    Attr(#[from] AttrError),

    #[error("Bad entity: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("Unknown tag <{0}>")]
    UnknownTag(String),

    #[error("Attribute {attribute:?} not allowed on <{tag}>")]
    UnknownAttribute { tag: String, attribute: String },

    #[error("Closing </{0}> does not match the open tag")]
    Unbalanced(String),

    #[error("Tag <{0}> is never closed")]
    Unclosed(String),

    #[error("Unsupported markup construct")]
    Unsupported,
}

/// The text renderer's markup services.
pub trait MarkupRenderer {
    /// Validate `markup`, returning its plain-text projection.
    fn parse_markup(&self, markup: &str) -> Result<String, MarkupError>;

    /// Escape literal text so it renders verbatim.
    fn escape_text(&self, text: &str) -> String;
}

/// [`MarkupRenderer`] for the Pango-style tag vocabulary, backed by quick-xml.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMarkup;

impl MarkupRenderer for DefaultMarkup {
    fn parse_markup(&self, markup: &str) -> Result<String, MarkupError> {
        let mut reader = Reader::from_str(markup);
        let mut open: Vec<String> = Vec::new();
        let mut plain = String::with_capacity(markup.len());

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    check_tag(&tag, &e)?;
                    open.push(tag);
                }
                Event::Empty(e) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    check_tag(&tag, &e)?;
                }
                Event::End(e) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if open.pop().as_deref() != Some(tag.as_str()) {
                        return Err(MarkupError::Unbalanced(tag));
                    }
                }
                Event::Text(e) => plain.push_str(&e.unescape()?),
                Event::Eof => break,
                _ => return Err(MarkupError::Unsupported),
            }
        }

        match open.pop() {
            Some(tag) => Err(MarkupError::Unclosed(tag)),
            None => Ok(plain),
        }
    }

    fn escape_text(&self, text: &str) -> String {
        quick_xml::escape::escape(text).into_owned()
    }
}

fn check_tag(tag: &str, start: &quick_xml::events::BytesStart<'_>) -> Result<(), MarkupError> {
    if !MARKUP_TAGS.contains(tag) {
        return Err(MarkupError::UnknownTag(tag.to_string()));
    }
    for attr in start.attributes() {
        let attr = attr?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if tag != "span" || !SPAN_ATTRIBUTES.contains(name.as_str()) {
            return Err(MarkupError::UnknownAttribute { tag: tag.to_string(), attribute: name });
        }
        attr.unescape_value()?;
    }
    Ok(())
}

/// Make `text` safe to hand to the renderer as markup.
///
/// With `allow_markup`, sender tags and entities survive when the result
/// parses. Otherwise, or when it does not parse, every special character is
/// escaped except the start of an already-escaped entity, so sanitizing twice
/// gives the same result as sanitizing once.
pub fn fix_markup(text: &str, allow_markup: bool, renderer: &dyn MarkupRenderer) -> String {
    if allow_markup {
        let normalized = normalize_markup(text);
        match renderer.parse_markup(&normalized) {
            Ok(_) => return normalized,
            Err(e) => tracing::debug!("Falling back to escaped text: {}", e),
        }
    }
    escape_preserving_entities(text, renderer)
}

/// Escape stray `&` and any `<` that does not open or close a sender tag.
pub fn normalize_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, ch) in text.char_indices() {
        let rest = &text[i..];
        match ch {
            '&' if !starts_with_entity(rest) => out.push_str("&amp;"),
            '<' if !SENDER_TAGS.iter().any(|tag| rest.starts_with(tag)) => out.push_str("&lt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape `text` through the renderer, copying recognized entities verbatim.
pub fn escape_preserving_entities(text: &str, renderer: &dyn MarkupRenderer) -> String {
    let mut out = String::with_capacity(text.len());
    let mut segment_start = 0;
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        match ENTITIES.iter().find(|entity| rest.starts_with(*entity)) {
            Some(entity) => {
                out.push_str(&renderer.escape_text(&text[segment_start..i]));
                out.push_str(entity);
                i += entity.len();
                segment_start = i;
            }
            None => i += rest.chars().next().map_or(1, char::len_utf8),
        }
    }
    out.push_str(&renderer.escape_text(&text[segment_start..]));
    out
}

fn starts_with_entity(text: &str) -> bool {
    ENTITIES.iter().any(|entity| text.starts_with(entity))
}
