//! Vertical cursor and page-break bookkeeping for the receipt layout.
//!
//! All coordinates are millimetres from the top-left corner of the page.
//! [`Layout::ensure_space`] is the only place a page break is decided.

use crate::capability::{RenderSurface, TextAlign, TextStyle};
use crate::font::FontFace;
use crate::types::{Color, PageFormat, Rect};

pub const ROW_MIN_HEIGHT: f32 = 6.0;
pub const ROW_LINE_HEIGHT: f32 = 5.0;
pub const ROW_PADDING: f32 = 2.0;

/// Distance of the page-number baseline from the bottom edge.
pub const PAGE_STAMP_OFFSET: f32 = 6.0;

pub const ZEBRA_FILL: Color = Color::rgb8(252, 240, 181);

fn page_stamp_style() -> TextStyle {
    TextStyle::new(FontFace::Regular, 9.0, Color::rgb8(120, 120, 120))
}

/// A header row repeated at the top of every continuation page while a
/// table is being laid out.
#[derive(Debug, Clone, PartialEq)]
pub struct TableHeader {
    pub x: f32,
    pub width: f32,
    pub height: f32,
    pub fill: Color,
    pub style: TextStyle,
    /// Baseline offset from the top of the row.
    pub baseline: f32,
    /// Column captions and their left x.
    pub cells: Vec<(String, f32)>,
}

impl TableHeader {
    pub fn draw<S: RenderSurface + ?Sized>(&self, surface: &mut S, y: f32) {
        surface.fill_rect(Rect::new(self.x, y, self.width, self.height), self.fill);
        for (caption, x) in &self.cells {
            surface.place_text(caption, *x, y + self.baseline, self.style, TextAlign::Left);
        }
    }
}

/// Page cursor over a render surface.
pub struct Layout<'s, S: RenderSurface + ?Sized> {
    surface: &'s mut S,
    format: PageFormat,
    cursor: f32,
    /// Cursor position right after the page was opened.
    page_top: f32,
    continuation: Option<TableHeader>,
}

impl<'s, S: RenderSurface + ?Sized> Layout<'s, S> {
    pub fn new(surface: &'s mut S) -> Self {
        let format = surface.format();
        Self {
            surface,
            format,
            cursor: format.margins.top,
            page_top: format.margins.top,
            continuation: None,
        }
    }

    pub fn surface(&mut self) -> &mut S {
        &mut *self.surface
    }

    pub fn format(&self) -> PageFormat {
        self.format
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn set_cursor(&mut self, y: f32) {
        self.cursor = y;
    }

    pub fn advance(&mut self, dy: f32) {
        self.cursor += dy;
    }

    /// Registers the header drawn after each subsequent page break, or clears
    /// it with `None`.
    pub fn set_continuation_header(&mut self, header: Option<TableHeader>) {
        self.continuation = header;
    }

    /// Breaks to a new page when `required` millimetres no longer fit above the
    /// bottom margin. Returns whether a break happened.
    ///
    /// Nothing breaks while the cursor still sits at the top of its page: a
    /// block taller than the printable area is placed there and overruns.
    pub fn ensure_space(&mut self, required: f32) -> bool {
        if self.cursor + required <= self.format.printable_bottom() {
            return false;
        }
        if self.cursor <= self.page_top {
            tracing::debug!(
                page = self.surface.current_page() + 1,
                required,
                "block taller than the printable area"
            );
            return false;
        }
        let from = self.surface.current_page();
        self.stamp_page_number();
        self.surface.add_page();
        self.cursor = self.format.margins.top;
        tracing::debug!(
            from_page = from + 1,
            to_page = self.surface.current_page() + 1,
            required,
            continuation = self.continuation.is_some(),
            "page break"
        );
        if let Some(header) = &self.continuation {
            header.draw(&mut *self.surface, self.cursor);
            self.cursor += header.height;
        }
        self.page_top = self.cursor;
        true
    }

    /// Writes "Page N" for the current page in the bottom-right corner.
    pub fn stamp_page_number(&mut self) {
        let label = format!("Page {}", self.surface.current_page() + 1);
        self.surface.place_text(
            &label,
            self.format.right_edge(),
            self.format.height - PAGE_STAMP_OFFSET,
            page_stamp_style(),
            TextAlign::Right,
        );
    }

    /// Re-selects the last page and stamps it. Earlier pages were stamped as
    /// they were left.
    pub fn stamp_last_page(&mut self) {
        let last = self.surface.page_count().saturating_sub(1);
        self.surface.set_page(last);
        self.stamp_page_number();
    }

    /// Shades even row ordinals across `width` at the cursor.
    pub fn stripe(&mut self, ordinal: usize, x: f32, width: f32, height: f32) {
        if ordinal % 2 == 0 {
            self.surface
                .fill_rect(Rect::new(x, self.cursor, width, height), ZEBRA_FILL);
        }
    }

    pub fn wrap(&self, text: &str, max_width: f32, style: TextStyle) -> Vec<String> {
        wrap_text(text, max_width, |candidate| {
            self.surface.measure_text(candidate, style)
        })
    }
}

pub fn row_height(line_count: usize) -> f32 {
    (line_count as f32 * ROW_LINE_HEIGHT + ROW_PADDING).max(ROW_MIN_HEIGHT)
}

/// Greedy word wrap. Words wider than `max_width` are hard-broken at
/// character boundaries; the trailing fragment may share a line with the
/// following word.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() {
            let candidate = format!("{current} {word}");
            if measure(&candidate) <= max_width {
                current = candidate;
                continue;
            }
            lines.push(std::mem::take(&mut current));
        }
        if measure(word) <= max_width {
            current.push_str(word);
            continue;
        }
        for ch in word.chars() {
            current.push(ch);
            if current.chars().count() > 1 && measure(&current) > max_width {
                current.pop();
                lines.push(std::mem::replace(&mut current, ch.to_string()));
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;
    use crate::engine::PdfSurface;
    use proptest::prelude::*;

    fn char_width(text: &str) -> f32 {
        text.chars().count() as f32
    }

    fn header() -> TableHeader {
        TableHeader {
            x: 20.0,
            width: 170.0,
            height: 8.0,
            fill: Color::rgb8(184, 134, 11),
            style: TextStyle::new(FontFace::Bold, 10.0, Color::WHITE),
            baseline: 5.0,
            cells: vec![("Item Name".into(), 25.0), ("Qty".into(), 120.0)],
        }
    }

    #[test]
    fn wraps_greedily() {
        let lines = wrap_text("alpha beta gamma delta", 11.0, char_width);
        assert_eq!(lines, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn overlong_words_are_hard_broken() {
        let lines = wrap_text("a supercalifragilistic b", 6.0, char_width);
        assert_eq!(lines, vec!["a", "superc", "alifra", "gilist", "ic b"]);
    }

    #[test]
    fn characters_wider_than_the_column_still_progress() {
        let lines = wrap_text("abc", 0.5, char_width);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn blank_text_has_no_lines() {
        assert!(wrap_text("   ", 10.0, char_width).is_empty());
        assert_eq!(row_height(0), 6.0);
    }

    #[test]
    fn row_height_grows_with_lines() {
        assert_eq!(row_height(1), 7.0);
        assert_eq!(row_height(3), 17.0);
    }

    #[test]
    fn break_only_when_required_space_overflows() {
        let mut surface = PdfSurface::new(PageFormat::a4());
        let mut layout = Layout::new(&mut surface);
        layout.set_cursor(270.0);
        assert!(!layout.ensure_space(12.0));
        assert!(layout.ensure_space(12.5));
        assert_eq!(layout.cursor(), 15.0);
        drop(layout);
        assert_eq!(surface.pages().len(), 2);
        let stamps: Vec<_> = surface.pages()[0].strings().collect();
        assert_eq!(stamps, vec!["Page 1"]);
    }

    #[test]
    fn continuation_header_opens_the_next_page() {
        let mut surface = PdfSurface::new(PageFormat::a4());
        let mut layout = Layout::new(&mut surface);
        layout.set_continuation_header(Some(header()));
        layout.set_cursor(280.0);
        assert!(layout.ensure_space(7.0));
        assert_eq!(layout.cursor(), 23.0);
        layout.set_continuation_header(None);
        layout.set_cursor(280.0);
        assert!(layout.ensure_space(7.0));
        assert_eq!(layout.cursor(), 15.0);
        drop(layout);

        let second = &surface.pages()[1];
        assert!(matches!(second.commands.first(), Some(Command::SetFillColor(_))));
        assert_eq!(second.strings().next(), Some("Item Name"));
        assert_eq!(surface.pages()[2].strings().count(), 0);
    }

    #[test]
    fn oversized_block_does_not_leave_a_header_only_page() {
        let mut surface = PdfSurface::new(PageFormat::a4());
        let mut layout = Layout::new(&mut surface);
        layout.set_continuation_header(Some(header()));
        layout.set_cursor(200.0);
        assert!(layout.ensure_space(300.0));
        assert_eq!(layout.cursor(), 23.0);
        assert!(!layout.ensure_space(300.0));
        layout.advance(1.0);
        assert!(layout.ensure_space(300.0));
        drop(layout);
        assert_eq!(surface.pages().len(), 3);
    }

    #[test]
    fn last_page_is_stamped_after_the_fact() {
        let mut surface = PdfSurface::new(PageFormat::a4());
        let mut layout = Layout::new(&mut surface);
        layout.set_cursor(290.0);
        layout.ensure_space(1.0);
        layout.surface().set_page(0);
        layout.stamp_last_page();
        drop(layout);
        assert_eq!(surface.current_page(), 1);
        assert_eq!(surface.pages()[1].strings().collect::<Vec<_>>(), vec!["Page 2"]);
    }

    #[test]
    fn only_even_ordinals_are_striped() {
        let mut surface = PdfSurface::new(PageFormat::a4());
        let mut layout = Layout::new(&mut surface);
        layout.stripe(0, 20.0, 170.0, 7.0);
        layout.stripe(1, 20.0, 170.0, 7.0);
        drop(layout);
        let rects = surface.pages()[0]
            .commands
            .iter()
            .filter(|cmd| matches!(cmd, Command::DrawRect { .. }))
            .count();
        assert_eq!(rects, 1);
    }

    proptest! {
        #[test]
        fn wrapping_preserves_text_and_width(
            words in prop::collection::vec("[a-zA-Z0-9]{1,14}", 0..24),
            gaps in prop::collection::vec(" {1,3}", 24),
            max_width in 1.0f32..40.0,
        ) {
            let mut text = String::new();
            for (word, gap) in words.iter().zip(gaps.iter()) {
                text.push_str(gap);
                text.push_str(word);
            }
            let lines = wrap_text(&text, max_width, char_width);
            for line in &lines {
                prop_assert!(char_width(line) <= max_width);
            }
            let squash = |s: &str| s.split_whitespace().collect::<String>();
            prop_assert_eq!(squash(&lines.join(" ")), squash(&text));
            if words.iter().all(|word| char_width(word) <= max_width) {
                let rejoined = lines.join(" ");
                prop_assert_eq!(
                    rejoined.split_whitespace().collect::<Vec<_>>(),
                    text.split_whitespace().collect::<Vec<_>>()
                );
            }
        }
    }
}
