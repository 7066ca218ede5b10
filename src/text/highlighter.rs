//! Label that underlines the URLs in its text and opens them on click.

use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::{Rc, Weak};

use super::geometry::TextGeometry;
use super::markup::fix_markup;
use super::url::{UrlSpan, find_urls, launch_uri};
use crate::event::Propagation;
use crate::shell::{Cursor, Services};
use crate::widget::{Actor, ActorSignal};

/// Theme color consulted for link styling.
pub const LINK_COLOR: &str = "link-color";

pub struct UrlHighlighter {
    actor: Actor,
    services: Rc<Services>,
    /// Sanitized markup, before link styling.
    text: RefCell<String>,
    plain_text: RefCell<String>,
    urls: RefCell<Vec<UrlSpan>>,
    highlighted: RefCell<String>,
    link_color: RefCell<String>,
    geometry: RefCell<Option<Rc<dyn TextGeometry>>>,
    cursor_changed: Cell<bool>,
}

impl UrlHighlighter {
    pub fn new(text: &str, allow_markup: bool, services: &Rc<Services>) -> Rc<Self> {
        let highlighter = Rc::new_cyclic(|weak: &Weak<Self>| {
            let actor = Actor::new("url-highlighter");
            let weak = weak.clone();
            actor.connect(ActorSignal::StyleChanged, move || {
                if let Some(this) = weak.upgrade() {
                    this.on_style_changed();
                }
            });
            Self {
                actor,
                services: services.clone(),
                text: RefCell::new(String::new()),
                plain_text: RefCell::new(String::new()),
                urls: RefCell::new(Vec::new()),
                highlighted: RefCell::new(String::new()),
                link_color: RefCell::new(services.config.link_color.clone()),
                geometry: RefCell::new(None),
                cursor_changed: Cell::new(false),
            }
        });
        highlighter.set_markup(text, allow_markup);
        highlighter
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Replace the text. URLs are re-detected in the plain-text projection
    /// and the link styling is rebuilt.
    pub fn set_markup(&self, text: &str, allow_markup: bool) {
        let markup = fix_markup(text, allow_markup, self.services.markup.as_ref());
        let plain = match self.services.markup.parse_markup(&markup) {
            Ok(plain) => plain,
            Err(e) => {
                tracing::warn!("Sanitized markup failed to parse: {}", e);
                markup.clone()
            }
        };

        *self.urls.borrow_mut() = find_urls(&plain);
        *self.plain_text.borrow_mut() = plain;
        *self.text.borrow_mut() = markup;
        self.highlight_urls();
    }

    /// Sanitized markup without link styling.
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    /// What the label displays, without any markup.
    pub fn plain_text(&self) -> String {
        self.plain_text.borrow().clone()
    }

    /// URLs found in [`plain_text`](Self::plain_text).
    pub fn urls(&self) -> Vec<UrlSpan> {
        self.urls.borrow().clone()
    }

    /// Markup handed to the renderer, with every URL underlined and colored.
    pub fn highlighted_markup(&self) -> String {
        self.highlighted.borrow().clone()
    }

    pub fn link_color(&self) -> String {
        self.link_color.borrow().clone()
    }

    /// Restyle links with `color`. Does nothing if it is the current color.
    pub fn set_link_color(&self, color: &str) {
        if *self.link_color.borrow() == color {
            return;
        }
        *self.link_color.borrow_mut() = color.to_string();
        self.highlight_urls();
    }

    /// Install the renderer's layout of [`plain_text`](Self::plain_text).
    pub fn set_geometry(&self, geometry: Option<Rc<dyn TextGeometry>>) {
        *self.geometry.borrow_mut() = geometry;
    }

    fn on_style_changed(&self) {
        if let Some(color) = self.actor.lookup_color(LINK_COLOR) {
            let color: String = color.chars().take(7).collect();
            self.set_link_color(&color);
        }
    }

    /// Wrap each URL span in link styling. Span offsets count plain-text
    /// characters, so they are mapped back onto the markup string first;
    /// everything outside the spans is copied unchanged.
    fn highlight_urls(&self) {
        let markup = {
            let text = self.text.borrow();
            let color = self.link_color.borrow();
            let chars = plain_char_ranges(&text);
            let mut markup = String::with_capacity(text.len());
            let mut pos = 0;
            for url in self.urls.borrow().iter() {
                let (Some(first), Some(last)) = (chars.get(url.offset), chars.get(url.end().saturating_sub(1))) else {
                    continue;
                };
                if url.length == 0 || first.start < pos {
                    continue;
                }
                markup.push_str(&text[pos..first.start]);
                markup.push_str(&format!(
                    r#"<span foreground="{}"><u>{}</u></span>"#,
                    color,
                    &text[first.start..last.end]
                ));
                pos = last.end;
            }
            markup.push_str(&text[pos..]);

            // A span crossing a tag boundary would unbalance the markup.
            match self.services.markup.parse_markup(&markup) {
                Ok(_) => markup,
                Err(e) => {
                    tracing::debug!("Dropping link styling: {}", e);
                    text.clone()
                }
            }
        };
        *self.highlighted.borrow_mut() = markup;
    }

    /// Index of the URL under the local point `(x, y)`.
    ///
    /// The hit character is the last one whose line spans `y` and whose left
    /// edge is at or before `x`, so a point past the end of a line lands on
    /// that line's last character.
    pub fn find_url_at(&self, x: f32, y: f32) -> Option<usize> {
        let geometry = self.geometry.borrow().clone()?;
        let mut found = None;
        for offset in 0..geometry.char_count() {
            let Some(cell) = geometry.position_to_coords(offset) else {
                continue;
            };
            if cell.y > y || cell.y + cell.line_height < y || x < cell.x {
                continue;
            }
            found = Some(offset);
        }
        let found = found?;
        self.urls.borrow().iter().position(|url| url.contains(found))
    }

    /// The label is hidden or fully transparent; pointer events pass through.
    fn is_inert(&self) -> bool {
        !self.actor.is_visible() || self.actor.paint_opacity() == 0.0
    }

    /// Claim the press when it lands on a URL so the release reaches us.
    pub fn button_press(&self, x: f32, y: f32) -> Propagation {
        if self.is_inert() || self.find_url_at(x, y).is_none() {
            return Propagation::Propagate;
        }
        Propagation::Stop
    }

    pub fn button_release(&self, x: f32, y: f32) -> Propagation {
        if self.is_inert() {
            return Propagation::Propagate;
        }
        let url = match self.find_url_at(x, y) {
            Some(index) => self.urls.borrow()[index].text.clone(),
            None => return Propagation::Propagate,
        };
        let uri = launch_uri(&url);
        tracing::debug!("Launching {}", uri);
        self.services.host.launch_uri(&uri);
        Propagation::Stop
    }

    pub fn motion(&self, x: f32, y: f32) -> Propagation {
        if self.is_inert() {
            return Propagation::Propagate;
        }
        let over_url = self.find_url_at(x, y).is_some();
        if over_url && !self.cursor_changed.get() {
            self.services.host.set_cursor(Cursor::PointingHand);
            self.cursor_changed.set(true);
        } else if !over_url {
            self.services.host.set_cursor(Cursor::Default);
            self.cursor_changed.set(false);
        }
        Propagation::Propagate
    }

    pub fn leave(&self) -> Propagation {
        if self.is_inert() {
            return Propagation::Propagate;
        }
        if self.cursor_changed.replace(false) {
            self.services.host.set_cursor(Cursor::Default);
        }
        Propagation::Propagate
    }
}

/// Byte range in `markup` of each character of its plain-text projection.
/// Tags contribute nothing and an entity counts as one character.
fn plain_char_ranges(markup: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::with_capacity(markup.len());
    let mut pos = 0;
    while let Some(c) = markup[pos..].chars().next() {
        let end = match c {
            '<' => {
                pos = markup[pos..].find('>').map_or(markup.len(), |i| pos + i + 1);
                continue;
            }
            '&' => markup[pos..].find(';').map_or(pos + 1, |i| pos + i + 1),
            _ => pos + c.len_utf8(),
        };
        ranges.push(pos..end);
        pos = end;
    }
    ranges
}
