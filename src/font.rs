use crate::types::Pt;

// Advance widths (1/1000 em) for WinAnsi 0x20..=0x7E, taken from the Adobe
// core-font AFM files.
#[rustfmt::skip]
const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

/// Width used for characters outside the table (and for unknown fonts, per em).
const FALLBACK_EM_RATIO: f32 = 0.6;

/// Built-in Times faces used by the receipt layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

impl FontFace {
    /// PDF base-14 font name.
    pub fn base_font(self) -> &'static str {
        match self {
            FontFace::Regular => "Times-Roman",
            FontFace::Bold => "Times-Bold",
            FontFace::Italic => "Times-Italic",
        }
    }

    pub fn from_base_font(name: &str) -> Option<Self> {
        match name {
            "Times-Roman" => Some(FontFace::Regular),
            "Times-Bold" => Some(FontFace::Bold),
            "Times-Italic" => Some(FontFace::Italic),
            _ => None,
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            FontFace::Bold => &TIMES_BOLD_WIDTHS,
            // Italic advances differ by a few units at most; roman metrics keep
            // wrapping conservative enough for single-line captions.
            FontFace::Regular | FontFace::Italic => &TIMES_ROMAN_WIDTHS,
        }
    }

    fn advance(self, ch: char) -> u16 {
        let code = ch as u32;
        if (0x20..=0x7E).contains(&code) {
            self.widths()[(code - 0x20) as usize]
        } else {
            (FALLBACK_EM_RATIO * 1000.0) as u16
        }
    }
}

pub(crate) fn measure_text_width(name: &str, font_size: Pt, text: &str) -> Pt {
    let Some(face) = FontFace::from_base_font(name) else {
        let char_width = (font_size * FALLBACK_EM_RATIO).max(Pt::from_f32(1.0));
        return char_width * (text.chars().count() as i32);
    };
    let units: u32 = text.chars().map(|ch| u32::from(face.advance(ch))).sum();
    font_size * (units as f32 / 1000.0)
}
