//! Label measurement and rendering.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::info;
use svg::node::{Text as SvgText, element as svg_element};

use dotweave_core::{
    color::Color,
    geometry::{Point, Size},
};

/// Font settings shared by every label of a drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    font_family: String,
    font_size: f32,
}

impl TextStyle {
    pub fn new(font_family: impl Into<String>, font_size: f32) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
        }
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Size of `text` in points, one line per `\n`.
    pub fn measure(&self, text: &str) -> Size {
        TEXT_MANAGER
            .get_or_init(TextManager::new)
            .calculate_text_size(text, self)
    }

    /// A `<text>` element centered on `center`, with one `<tspan>` per line.
    pub(crate) fn render(&self, text: &str, center: Point, color: Color) -> svg_element::Text {
        let lines: Vec<&str> = text.lines().collect();
        let line_height = self.measure(text).height() / lines.len().max(1) as f32;
        let y_offset = -(line_height * lines.len() as f32 + line_height) / 2.0;

        let mut rendered = svg_element::Text::new("")
            .set("x", center.x())
            .set("y", center.y() + y_offset)
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size)
            .set("fill", color.to_string())
            .set("fill-opacity", color.alpha());
        for line in lines {
            rendered = rendered.add(
                svg_element::TSpan::new("")
                    .set("x", center.x())
                    .set("dy", line_height)
                    .add(SvgText::new(line)),
            );
        }
        rendered
    }
}

/// Owns the font database used for measuring.
struct TextManager {
    font_system: Arc<Mutex<FontSystem>>,
}

impl TextManager {
    fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: Arc::new(Mutex::new(FontSystem::new())),
        }
    }

    fn calculate_text_size(&self, text: &str, style: &TextStyle) -> Size {
        if text.is_empty() {
            return Size::default();
        }

        // A panic while measuring leaves the font database intact.
        let mut font_system = self
            .font_system
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Points to pixels at standard DPI.
        let font_size_px = style.font_size * 1.33;
        let metrics = Metrics::new(font_size_px, font_size_px * 1.15);

        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);
        let attrs = Attrs::new().family(Family::Name(&style.font_family));
        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;
        for run in buffer.layout_runs() {
            if let Some(last) = run.glyphs.last() {
                width = width.max(last.x + last.w);
            }
            height += metrics.line_height;
        }
        if height == 0.0 {
            // No font matched; estimate from the character count.
            let longest = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
            width = longest as f32 * font_size_px * 0.55;
            height = metrics.line_height * text.lines().count().max(1) as f32;
        }

        Size::new(width, height)
    }
}

static TEXT_MANAGER: OnceLock<TextManager> = OnceLock::new();
