//! Character positions in laid-out text.

/// Where a character sits in the label's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharBox {
    pub x: f32,
    /// Top of the line holding the character.
    pub y: f32,
    pub line_height: f32,
}

/// Offset-to-position mapping supplied by the text renderer for the plain
/// text of a label.
pub trait TextGeometry {
    /// Number of characters in the laid-out plain text.
    fn char_count(&self) -> usize;

    fn position_to_coords(&self, offset: usize) -> Option<CharBox>;
}

/// Fixed-width cells, optionally wrapped at a column count. `\n` starts a
/// new line.
#[derive(Debug, Clone)]
pub struct MonospaceGeometry {
    boxes: Vec<CharBox>,
}

impl MonospaceGeometry {
    pub fn new(text: &str, char_width: f32, line_height: f32, wrap_columns: Option<usize>) -> Self {
        let mut boxes = Vec::with_capacity(text.len());
        let (mut column, mut line) = (0usize, 0usize);
        for ch in text.chars() {
            if wrap_columns.is_some_and(|cols| cols > 0 && column >= cols) {
                column = 0;
                line += 1;
            }
            boxes.push(CharBox {
                x: column as f32 * char_width,
                y: line as f32 * line_height,
                line_height,
            });
            if ch == '\n' {
                column = 0;
                line += 1;
            } else {
                column += 1;
            }
        }
        Self { boxes }
    }

    /// Number of laid-out lines.
    pub fn line_count(&self) -> usize {
        self.boxes.last().map_or(0, |b| (b.y / b.line_height).round() as usize + 1)
    }
}

impl TextGeometry for MonospaceGeometry {
    fn char_count(&self) -> usize {
        self.boxes.len()
    }

    fn position_to_coords(&self, offset: usize) -> Option<CharBox> {
        self.boxes.get(offset).copied()
    }
}
