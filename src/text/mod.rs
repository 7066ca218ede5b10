//! Text handling: URL detection, markup sanitizing and the URL-highlighting
//! label built from both.

pub mod geometry;
pub mod highlighter;
pub mod markup;
pub mod url;

pub use geometry::{CharBox, MonospaceGeometry, TextGeometry};
pub use highlighter::UrlHighlighter;
pub use markup::{DefaultMarkup, MarkupError, MarkupRenderer, fix_markup};
pub use url::{UrlSpan, find_urls};
