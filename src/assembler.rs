//! Draws a reservation confirmation onto a render surface.
//!
//! Page one carries the brand header, the identifier block and the two info
//! boxes at fixed positions. The order table, totals, policy notice and footer
//! flow from there through [`Layout`], which owns every page-break decision.

use crate::capability::{Raster, RenderSurface, Stroke, TextAlign, TextStyle};
use crate::font::FontFace;
use crate::format::{
    CurrencyStyle, display_identifier, format_arrival_date, format_currency,
    format_generated_at, safe_text, safe_text_or_na,
};
use crate::layout::{Layout, ROW_LINE_HEIGHT, TableHeader, ZEBRA_FILL, row_height};
use crate::model::{OrderLine, ReservationRecord};
use crate::totals::{OrderTotals, RunningTotals};
use crate::types::{Color, Rect};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub const BRAND: &str = "DINE24";
pub const UNKNOWN_ITEM: &str = "Unknown Item";
pub const POLICY_TEXT: &str =
    "Dining duration: 1 hour from service start. Extended time may incur a 15% charge.";

const GOLD: Color = Color::rgb8(184, 134, 11);
const PALE: Color = ZEBRA_FILL;
const TAGLINE: Color = Color::rgb8(146, 64, 14);
const HAIRLINE: Color = Color::rgb8(200, 200, 200);
const POLICY_FILL: Color = Color::rgb8(255, 248, 220);
const POLICY_BORDER: Color = Color::rgb8(255, 193, 7);

const HEADER_BAND_HEIGHT: f32 = 40.0;
const FOOTER_BAND_HEIGHT: f32 = 20.0;
const INFO_TITLE_Y: f32 = 72.0;
const ORDER_TOP: f32 = 125.0;
const CODE_IMAGE_MM: f32 = 35.0;
const CODE_IMAGE_TOP: f32 = 50.0;
const NAME_COLUMN_WIDTH: f32 = 50.0;
const TABLE_HEADER_HEIGHT: f32 = 8.0;
const ROW_GAP: f32 = 2.0;
const TOTALS_RULE_STEP: f32 = 7.0;
const SUBTOTAL_STEP: f32 = 6.0;
const TAX_STEP: f32 = 8.0;
/// Half the height of the box around the grand total baseline.
const GRAND_TOTAL_BOX_HALF: f32 = 5.0;
/// Everything the totals block draws below its starting cursor.
const TOTALS_BLOCK_HEIGHT: f32 =
    TOTALS_RULE_STEP + SUBTOTAL_STEP + TAX_STEP + GRAND_TOTAL_BOX_HALF;
const POLICY_MIN_HEIGHT: f32 = 16.0;

/// Everything the drawing needs besides the record itself.
#[derive(Debug, Clone)]
pub struct ReceiptContext {
    pub generated_at: DateTime<Utc>,
    pub time_zone: Tz,
    pub currency_style: CurrencyStyle,
    /// Pre-rendered code image; `None` omits the code block.
    pub code_image: Option<Raster>,
}

impl ReceiptContext {
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            time_zone: chrono_tz::Asia::Kolkata,
            currency_style: CurrencyStyle::default(),
            code_image: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositionSummary {
    pub pages: usize,
    pub identifier: String,
    /// `None` when the order had no lines and no table was drawn.
    pub totals: Option<OrderTotals>,
    pub code_image_placed: bool,
}

/// Payload encoded into the code image.
pub fn code_payload(identifier: &str) -> String {
    format!("{BRAND}-{identifier}")
}

fn style(face: FontFace, size: f32, color: Color) -> TextStyle {
    TextStyle::new(face, size, color)
}

fn body() -> TextStyle {
    style(FontFace::Regular, 10.0, Color::BLACK)
}

fn section_title() -> TextStyle {
    style(FontFace::Bold, 14.0, GOLD)
}

pub fn compose<S: RenderSurface + ?Sized>(
    surface: &mut S,
    record: &ReservationRecord,
    lines: &[OrderLine],
    context: &ReceiptContext,
) -> CompositionSummary {
    let mut layout = Layout::new(surface);
    draw_header_band(&mut layout, context);
    draw_title(&mut layout);

    let identifier = display_identifier(record.id.as_deref(), context.generated_at);
    let code_image_placed = match &context.code_image {
        Some(raster) => {
            draw_code_block(&mut layout, raster, &identifier);
            true
        }
        None => false,
    };

    draw_customer_box(&mut layout, record);
    draw_reservation_box(&mut layout, record);

    layout.set_cursor(ORDER_TOP);
    let totals = if lines.is_empty() {
        None
    } else {
        Some(draw_order_table(&mut layout, lines, context.currency_style))
    };
    draw_policy(&mut layout);
    draw_footer(&mut layout);
    layout.stamp_last_page();

    CompositionSummary {
        pages: layout.surface().page_count(),
        identifier,
        totals,
        code_image_placed,
    }
}

fn draw_header_band<S: RenderSurface + ?Sized>(layout: &mut Layout<'_, S>, context: &ReceiptContext) {
    let format = layout.format();
    let center = format.width / 2.0;
    let surface = layout.surface();
    surface.fill_rect(Rect::new(0.0, 0.0, format.width, HEADER_BAND_HEIGHT), PALE);
    surface.place_text(
        BRAND,
        center,
        20.0,
        style(FontFace::Bold, 28.0, GOLD),
        TextAlign::Center,
    );
    surface.place_text(
        "Premium Royal Dining Experience",
        center,
        30.0,
        style(FontFace::Italic, 12.0, TAGLINE),
        TextAlign::Center,
    );
    let generated = format!(
        "Generated: {}",
        format_generated_at(context.generated_at, context.time_zone)
    );
    surface.place_text(
        &generated,
        format.right_edge(),
        45.0,
        style(FontFace::Regular, 9.0, Color::BLACK),
        TextAlign::Right,
    );
}

fn draw_title<S: RenderSurface + ?Sized>(layout: &mut Layout<'_, S>) {
    let format = layout.format();
    let (left, right) = (format.margins.left, format.right_edge());
    let surface = layout.surface();
    surface.place_text(
        "RESERVATION CONFIRMATION",
        format.width / 2.0,
        55.0,
        style(FontFace::Bold, 18.0, GOLD),
        TextAlign::Center,
    );
    surface.stroke_line((left, 60.0), (right, 60.0), Stroke::new(GOLD, 2.0));
    surface.stroke_line((left, 62.0), (right, 62.0), Stroke::new(GOLD, 0.5));
}

fn draw_code_block<S: RenderSurface + ?Sized>(
    layout: &mut Layout<'_, S>,
    raster: &Raster,
    identifier: &str,
) {
    let right = layout.format().right_edge();
    let surface = layout.surface();
    surface.place_image(
        raster,
        Rect::new(right - CODE_IMAGE_MM, CODE_IMAGE_TOP, CODE_IMAGE_MM, CODE_IMAGE_MM),
    );
    surface.place_text(
        &format!("ID: {identifier}"),
        right - CODE_IMAGE_MM / 2.0,
        90.0,
        style(FontFace::Bold, 8.0, Color::BLACK),
        TextAlign::Center,
    );
}

/// A titled, bordered box of label/value rows.
struct InfoBox {
    title: &'static str,
    frame: Rect,
    first_baseline: f32,
    label_x: f32,
    value_x: f32,
    /// Values wider than this wrap onto following baselines.
    value_width: Option<f32>,
    rows: [(&'static str, String); 4],
}

impl InfoBox {
    fn draw<S: RenderSurface + ?Sized>(&self, layout: &mut Layout<'_, S>) {
        let value_lines: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|(_, value)| match self.value_width {
                Some(width) => layout.wrap(value, width, body()),
                None => vec![value.clone()],
            })
            .collect();

        let surface = layout.surface();
        surface.place_text(
            self.title,
            self.frame.x,
            INFO_TITLE_Y,
            section_title(),
            TextAlign::Left,
        );
        surface.fill_rect(self.frame, PALE);
        surface.stroke_rect(self.frame, Stroke::new(GOLD, 0.5));

        let label_style = style(FontFace::Bold, 10.0, Color::BLACK);
        let last = self.rows.len() - 1;
        for (i, ((label, _), lines)) in self.rows.iter().zip(&value_lines).enumerate() {
            let baseline = self.first_baseline + i as f32 * 6.0;
            surface.place_text(label, self.label_x, baseline, label_style, TextAlign::Left);
            for (n, line) in lines.iter().enumerate() {
                let y = baseline + n as f32 * ROW_LINE_HEIGHT;
                surface.place_text(line, self.value_x, y, body(), TextAlign::Left);
            }
            if i < last {
                surface.stroke_line(
                    (self.frame.x + 2.0, baseline + 2.0),
                    (self.frame.x + self.frame.width - 2.0, baseline + 2.0),
                    Stroke::new(HAIRLINE, 0.5),
                );
            }
        }
    }
}

fn draw_customer_box<S: RenderSurface + ?Sized>(layout: &mut Layout<'_, S>, record: &ReservationRecord) {
    let left = layout.format().margins.left;
    let top = INFO_TITLE_Y + 8.0;
    InfoBox {
        title: "CUSTOMER INFORMATION",
        frame: Rect::new(left, top, 85.0, 30.0),
        first_baseline: top + 6.0,
        label_x: left + 5.0,
        value_x: left + 30.0,
        value_width: Some(50.0),
        rows: [
            ("Name:", safe_text_or_na(record.full_name.as_deref())),
            ("Email:", safe_text_or_na(record.email.as_deref())),
            ("Phone:", safe_text_or_na(record.phone.as_deref())),
            ("Purpose:", safe_text_or_na(record.purpose.as_deref())),
        ],
    }
    .draw(layout);
}

fn draw_reservation_box<S: RenderSurface + ?Sized>(
    layout: &mut Layout<'_, S>,
    record: &ReservationRecord,
) {
    let x = layout.format().margins.left + 90.0;
    let top = INFO_TITLE_Y + 10.0;
    InfoBox {
        title: "RESERVATION DETAILS",
        frame: Rect::new(x, top, 75.0, 30.0),
        first_baseline: top + 5.0,
        label_x: x + 5.0,
        value_x: x + 30.0,
        value_width: None,
        rows: [
            ("Date:", format_arrival_date(record.arrival_date.as_deref())),
            ("Time:", safe_text_or_na(record.arrival_time.as_deref())),
            ("Table:", safe_text_or_na(record.table_number.as_deref())),
            ("Guests:", safe_text_or_na(record.num_people.as_deref())),
        ],
    }
    .draw(layout);
}

fn order_header(left: f32, width: f32) -> TableHeader {
    TableHeader {
        x: left,
        width,
        height: TABLE_HEADER_HEIGHT,
        fill: GOLD,
        style: style(FontFace::Bold, 10.0, Color::WHITE),
        baseline: 5.0,
        cells: vec![
            ("Item Name".to_string(), left + 5.0),
            ("Qty".to_string(), left + 100.0),
            ("Price".to_string(), left + 120.0),
            ("Total".to_string(), left + 160.0),
        ],
    }
}

fn draw_order_table<S: RenderSurface + ?Sized>(
    layout: &mut Layout<'_, S>,
    lines: &[OrderLine],
    currency: CurrencyStyle,
) -> OrderTotals {
    let format = layout.format();
    let left = format.margins.left;
    let right = format.right_edge();
    let width = format.content_width();

    let y = layout.cursor();
    layout
        .surface()
        .place_text("ORDER SUMMARY", left, y, section_title(), TextAlign::Left);
    layout.advance(10.0);

    let header = order_header(left, width);
    let y = layout.cursor();
    header.draw(layout.surface(), y);
    layout.advance(header.height);
    layout.set_continuation_header(Some(header));

    let mut totals = RunningTotals::new();
    for (ordinal, line) in lines.iter().enumerate() {
        let line_total = totals.add(line);
        let name = safe_text(line.name.as_deref(), UNKNOWN_ITEM);
        let name_lines = layout.wrap(&name, NAME_COLUMN_WIDTH, body());
        let height = row_height(name_lines.len());

        layout.ensure_space(height + ROW_GAP);
        layout.stripe(ordinal, left, width, height);

        let baseline = layout.cursor() + 4.0;
        let surface = layout.surface();
        for (n, text) in name_lines.iter().enumerate() {
            let y = baseline + n as f32 * ROW_LINE_HEIGHT;
            surface.place_text(text, left + 5.0, y, body(), TextAlign::Left);
        }
        surface.place_text(
            &line.effective_quantity().to_string(),
            left + 100.0,
            baseline,
            body(),
            TextAlign::Left,
        );
        surface.place_text(
            &format_currency(line.unit_price(), currency),
            left + 120.0,
            baseline,
            body(),
            TextAlign::Left,
        );
        surface.place_text(
            &format_currency(line_total, currency),
            right,
            baseline,
            body(),
            TextAlign::Right,
        );
        layout.advance(height);
    }
    layout.set_continuation_header(None);

    let summary = totals.summary();
    layout.ensure_space(TOTALS_BLOCK_HEIGHT);
    let label_x = left + 120.0;
    let y = layout.cursor();
    layout
        .surface()
        .stroke_line((label_x, y + 1.0), (right, y + 1.0), Stroke::new(GOLD, 1.0));
    layout.advance(TOTALS_RULE_STEP);

    let rows = [
        ("Subtotal:", summary.subtotal, SUBTOTAL_STEP),
        ("GST (18%):", summary.tax, TAX_STEP),
    ];
    for (label, amount, step) in rows {
        let y = layout.cursor();
        let surface = layout.surface();
        surface.place_text(label, label_x, y, body(), TextAlign::Left);
        surface.place_text(
            &format_currency(amount, currency),
            right,
            y,
            body(),
            TextAlign::Right,
        );
        layout.advance(step);
    }

    let y = layout.cursor();
    let emphasis = style(FontFace::Bold, 12.0, GOLD);
    let surface = layout.surface();
    surface.place_text("GRAND TOTAL:", label_x, y, emphasis, TextAlign::Left);
    surface.place_text(
        &format_currency(summary.grand_total, currency),
        right,
        y,
        emphasis,
        TextAlign::Right,
    );
    let box_x = left + 115.0;
    surface.stroke_rect(
        Rect::new(
            box_x,
            y - GRAND_TOTAL_BOX_HALF,
            right - box_x,
            2.0 * GRAND_TOTAL_BOX_HALF,
        ),
        Stroke::new(GOLD, 2.0),
    );
    summary
}

fn draw_policy<S: RenderSurface + ?Sized>(layout: &mut Layout<'_, S>) {
    let format = layout.format();
    let left = format.margins.left;
    let width = format.content_width();
    let text_lines = layout.wrap(POLICY_TEXT, width - 10.0, body());
    let height = (10.0 + text_lines.len().saturating_sub(1) as f32 * ROW_LINE_HEIGHT + 6.0)
        .max(POLICY_MIN_HEIGHT);

    layout.advance(20.0);
    layout.ensure_space(height);

    let top = layout.cursor();
    let frame = Rect::new(left, top, width, height);
    let surface = layout.surface();
    surface.fill_rect(frame, POLICY_FILL);
    surface.stroke_rect(frame, Stroke::new(POLICY_BORDER, 0.5));
    surface.place_text(
        "IMPORTANT DINING POLICY",
        left + 5.0,
        top + 5.0,
        style(FontFace::Bold, 10.0, GOLD),
        TextAlign::Left,
    );
    for (n, line) in text_lines.iter().enumerate() {
        let y = top + 10.0 + n as f32 * ROW_LINE_HEIGHT;
        surface.place_text(line, left + 5.0, y, body(), TextAlign::Left);
    }
    layout.advance(height + 10.0);
}

fn draw_footer<S: RenderSurface + ?Sized>(layout: &mut Layout<'_, S>) {
    let format = layout.format();
    // The band occupies the bottom of the page; the cursor must sit above it.
    layout.ensure_space((FOOTER_BAND_HEIGHT - format.margins.bottom).max(0.0));

    let center = format.width / 2.0;
    let surface = layout.surface();
    surface.fill_rect(
        Rect::new(0.0, format.height - FOOTER_BAND_HEIGHT, format.width, FOOTER_BAND_HEIGHT),
        GOLD,
    );
    surface.place_text(
        &format!("Thank you for choosing {BRAND}!"),
        center,
        format.height - 12.0,
        style(FontFace::Bold, 14.0, Color::WHITE),
        TextAlign::Center,
    );
    surface.place_text(
        "Contact: +91 98765 43210 | Email: info@dine24.com | www.dine24.com",
        center,
        format.height - 6.0,
        style(FontFace::Regular, 9.0, Color::WHITE),
        TextAlign::Center,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Command, Page};
    use crate::engine::PdfSurface;
    use crate::types::{PageFormat, Pt};
    use chrono::TimeZone;
    use image::{DynamicImage, GrayImage};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    fn context() -> ReceiptContext {
        ReceiptContext::new(Utc.with_ymd_and_hms(2026, 10, 18, 10, 15, 0).unwrap())
    }

    fn record() -> ReservationRecord {
        ReservationRecord {
            id: Some("a1b2c3d4-e5f6".into()),
            full_name: Some("Asha Verma".into()),
            email: Some("asha@example.com".into()),
            phone: Some("+91 90000 00000".into()),
            purpose: Some("Anniversary".into()),
            arrival_date: Some("2026-10-24".into()),
            arrival_time: Some("19:30".into()),
            table_number: Some("7".into()),
            num_people: Some("2".into()),
        }
    }

    fn dishes(count: usize) -> Vec<OrderLine> {
        (1..=count)
            .map(|n| OrderLine::new(format!("Dish {n}"), dec("100"), 1))
            .collect()
    }

    fn render(
        record: &ReservationRecord,
        lines: &[OrderLine],
        context: &ReceiptContext,
    ) -> (PdfSurface, CompositionSummary) {
        let mut surface = PdfSurface::new(PageFormat::a4());
        let summary = compose(&mut surface, record, lines, context);
        (surface, summary)
    }

    fn strings(page: &Page) -> Vec<&str> {
        page.strings().collect()
    }

    fn all_strings(surface: &PdfSurface) -> Vec<&str> {
        surface.pages().iter().flat_map(|page| page.strings()).collect()
    }

    fn has_image(page: &Page) -> bool {
        page.commands
            .iter()
            .any(|cmd| matches!(cmd, Command::DrawImage { .. }))
    }

    #[test]
    fn single_page_receipt_carries_every_section() {
        let lines = [
            OrderLine::new("Paneer Tikka", dec("250"), 2),
            OrderLine::new("Naan", dec("40"), 4),
        ];
        let (surface, summary) = render(&record(), &lines, &context());
        assert_eq!(summary.pages, 1);
        assert_eq!(summary.identifier, "A1B2C3D4");
        assert_eq!(
            summary.totals,
            Some(OrderTotals {
                subtotal: dec("660"),
                tax: dec("118.80"),
                grand_total: dec("778.80"),
            })
        );

        let text = strings(&surface.pages()[0]);
        for expected in [
            "DINE24",
            "Premium Royal Dining Experience",
            "Generated: 18/10/2026, 03:45 pm",
            "RESERVATION CONFIRMATION",
            "Asha Verma",
            "24/10/2026",
            "ORDER SUMMARY",
            "Item Name",
            "Paneer Tikka",
            "Rs. 250.00",
            "Rs. 500.00",
            "Rs. 660.00",
            "GST (18%):",
            "Rs. 118.80",
            "GRAND TOTAL:",
            "Rs. 778.80",
            "IMPORTANT DINING POLICY",
            POLICY_TEXT,
            "Thank you for choosing DINE24!",
            "Page 1",
        ] {
            assert!(text.contains(&expected), "missing {expected:?}");
        }
    }

    #[test]
    fn one_overflow_yields_two_pages_with_redrawn_header() {
        let lines = dishes(30);
        let (surface, summary) = render(&record(), &lines, &context());
        assert_eq!(summary.pages, 2);

        let first = strings(&surface.pages()[0]);
        let carried = first
            .iter()
            .filter(|s| s.starts_with("Dish "))
            .count();
        assert!(carried < 30);

        let second = strings(&surface.pages()[1]);
        assert_eq!(&second[..4], &["Item Name", "Qty", "Price", "Total"]);
        assert_eq!(second[4], format!("Dish {}", carried + 1));
        assert!(matches!(
            surface.pages()[1].commands.first(),
            Some(Command::SetFillColor(_))
        ));
    }

    #[test]
    fn every_page_is_numbered_once() {
        for count in [0, 1, 30, 60, 120] {
            let (surface, summary) = render(&record(), &dishes(count), &context());
            assert_eq!(summary.pages, surface.pages().len());
            for (index, page) in surface.pages().iter().enumerate() {
                let stamps: Vec<_> = page
                    .strings()
                    .filter(|s| s.starts_with("Page "))
                    .collect();
                assert_eq!(stamps, vec![format!("Page {}", index + 1)], "{count} lines");
            }
        }
        let (_, summary) = render(&record(), &dishes(60), &context());
        assert_eq!(summary.pages, 3);
    }

    #[test]
    fn continuation_header_stops_at_the_totals() {
        // 36 rows end page two close to the bottom, pushing the totals over.
        let lines = dishes(19 + 36);
        let (surface, summary) = render(&record(), &lines, &context());
        assert_eq!(summary.pages, 3);
        let third = strings(&surface.pages()[2]);
        assert!(!third.contains(&"Item Name"));
        assert_eq!(third[0], "Subtotal:");
    }

    /// Lowest point reached by a body element on the page, in mm. The footer
    /// band spans the full page width from x = 0 and is left out, as are the
    /// footer and page-number strings.
    fn lowest_body_extent(page: &Page) -> f32 {
        let footer_text = |text: &str| {
            ["Page ", "Thank you", "Contact:"]
                .iter()
                .any(|prefix| text.starts_with(prefix))
        };
        page.commands
            .iter()
            .filter_map(|cmd| match cmd {
                Command::DrawRect { x, y, height, .. } | Command::StrokeRect { x, y, height, .. }
                    if *x > Pt::ZERO =>
                {
                    Some((*y + *height).to_mm())
                }
                Command::DrawString { y, text, .. } if !footer_text(text.as_str()) => {
                    Some(y.to_mm())
                }
                _ => None,
            })
            .fold(0.0, f32::max)
    }

    #[test]
    fn nothing_but_the_footer_crosses_the_bottom_margin() {
        let bottom = PageFormat::a4().printable_bottom();
        for count in 1..=40 {
            let (surface, _) = render(&record(), &dishes(count), &context());
            for (index, page) in surface.pages().iter().enumerate() {
                let lowest = lowest_body_extent(page);
                assert!(
                    lowest <= bottom + 0.01,
                    "{count} lines, page {}: reached {lowest}mm",
                    index + 1
                );
            }
        }
    }

    #[test]
    fn totals_move_whole_to_the_next_page() {
        // 17 rows leave 20mm above the margin, short of the full totals block.
        let (surface, summary) = render(&record(), &dishes(17), &context());
        assert_eq!(summary.pages, 2);
        let second = strings(&surface.pages()[1]);
        assert_eq!(second[0], "Subtotal:");
        assert!(second.contains(&"GRAND TOTAL:"));
        assert!(!strings(&surface.pages()[0]).contains(&"Subtotal:"));
    }

    #[test]
    fn row_taller_than_a_page_is_placed_once() {
        let name = vec!["biryani"; 400].join(" ");
        let lines = [OrderLine::new(name, dec("450"), 1)];
        let (surface, summary) = render(&record(), &lines, &context());
        assert_eq!(summary.pages, 3);
        assert!(!strings(&surface.pages()[0]).iter().any(|s| s.starts_with("biryani")));
        let second = strings(&surface.pages()[1]);
        assert_eq!(&second[..4], &["Item Name", "Qty", "Price", "Total"]);
        assert!(second[4].starts_with("biryani"));
        assert_eq!(strings(&surface.pages()[2])[0], "Subtotal:");
    }

    #[test]
    fn missing_fields_render_as_not_available() {
        let bare = ReservationRecord {
            id: Some("zz9".into()),
            ..ReservationRecord::default()
        };
        let (surface, summary) = render(&bare, &[], &context());
        assert_eq!(summary.identifier, "ZZ9");
        assert_eq!(summary.totals, None);

        let text = all_strings(&surface);
        assert_eq!(text.iter().filter(|s| **s == "N/A").count(), 8);
        assert!(!text.contains(&"ORDER SUMMARY"));
        for s in &text {
            assert!(!s.contains("null") && !s.contains("undefined"), "{s:?}");
        }
    }

    #[test]
    fn line_fallbacks_apply() {
        let line = OrderLine {
            name: None,
            price: Some(dec("80")),
            offer_price: Some(dec("60")),
            quantity: None,
        };
        let (surface, summary) = render(&record(), &[line], &context());
        assert_eq!(summary.totals.map(|t| t.subtotal), Some(dec("60")));
        let text = strings(&surface.pages()[0]);
        assert!(text.contains(&UNKNOWN_ITEM));
        assert!(text.contains(&"1"));
        assert!(text.contains(&"Rs. 60.00"));
    }

    #[test]
    fn long_names_wrap_inside_the_row() {
        let name = "Slow cooked Awadhi mutton biryani with saffron rice and mint raita";
        let (surface, _) = render(&record(), &[OrderLine::new(name, dec("450"), 1)], &context());
        let text = strings(&surface.pages()[0]);
        let fragments: Vec<&str> = text
            .iter()
            .copied()
            .filter(|s| name.contains(*s) && s.len() > 3)
            .collect();
        assert!(fragments.len() > 1);
        assert_eq!(fragments.join(" "), name);
    }

    #[test]
    fn code_block_only_with_an_image() {
        let (surface, summary) = render(&record(), &dishes(2), &context());
        assert!(!summary.code_image_placed);
        assert!(!has_image(&surface.pages()[0]));
        assert!(!strings(&surface.pages()[0]).iter().any(|s| s.starts_with("ID: ")));

        let raster = Raster::from_image(&DynamicImage::ImageLuma8(GrayImage::new(70, 70))).unwrap();
        let mut with_code = context();
        with_code.code_image = Some(raster);
        let (surface, summary) = render(&record(), &dishes(2), &with_code);
        assert!(summary.code_image_placed);
        assert!(has_image(&surface.pages()[0]));
        assert!(strings(&surface.pages()[0]).contains(&"ID: A1B2C3D4"));
    }

    #[test]
    fn glyph_currency_style_is_honoured() {
        let mut ctx = context();
        ctx.currency_style = CurrencyStyle::Glyph;
        let (surface, _) = render(&record(), &dishes(1), &ctx);
        assert!(strings(&surface.pages()[0]).contains(&"\u{20B9}100.00"));
    }

    #[test]
    fn payload_is_namespaced() {
        assert_eq!(code_payload("A1B2C3D4"), "DINE24-A1B2C3D4");
    }
}
