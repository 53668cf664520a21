use fixed::types::I32F32;

const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Fixed-point PDF user-space length (1/72 inch), stored with milli-point precision.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Pt(I32F32);

impl Pt {
    pub const ZERO: Pt = Pt(I32F32::from_bits(0));

    pub fn from_f32(value: f32) -> Pt {
        if !value.is_finite() {
            return Pt::ZERO;
        }
        let milli = (value as f64 * 1000.0).round();
        let milli = milli.clamp(i64::MIN as f64, i64::MAX as f64) as i64;
        Pt::from_milli_i64(milli)
    }

    /// Converts a document-unit length (millimetres) into points.
    pub fn from_mm(value: f32) -> Pt {
        Pt::from_f32(value * POINTS_PER_MM)
    }

    pub fn to_f32(self) -> f32 {
        self.0.to_num()
    }

    pub fn to_mm(self) -> f32 {
        self.to_f32() / POINTS_PER_MM
    }

    pub fn to_milli_i64(self) -> i64 {
        let bits = self.0.to_bits() as i128;
        let denom = 1i128 << 32;
        let scaled = bits * 1000;
        let adj = if scaled >= 0 { denom / 2 } else { -denom / 2 };
        let milli = (scaled + adj) / denom;
        milli.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    pub fn from_milli_i64(milli: i64) -> Pt {
        let denom = 1i128 << 32;
        let milli = milli as i128;
        let adj = if milli >= 0 { 500 } else { -500 };
        let bits = (milli * denom + adj) / 1000;
        let bits = bits.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
        Pt(I32F32::from_bits(bits))
    }

    pub fn max(self, other: Pt) -> Pt {
        if self >= other { self } else { other }
    }
}

impl std::ops::Add for Pt {
    type Output = Pt;
    fn add(self, rhs: Pt) -> Pt {
        Pt::from_milli_i64(self.to_milli_i64().saturating_add(rhs.to_milli_i64()))
    }
}

impl std::ops::Sub for Pt {
    type Output = Pt;
    fn sub(self, rhs: Pt) -> Pt {
        Pt::from_milli_i64(self.to_milli_i64().saturating_sub(rhs.to_milli_i64()))
    }
}

impl std::ops::Mul<f32> for Pt {
    type Output = Pt;
    fn mul(self, rhs: f32) -> Pt {
        if !rhs.is_finite() {
            return Pt::ZERO;
        }
        Pt::from_f32(self.to_f32() * rhs)
    }
}

impl std::ops::Mul<i32> for Pt {
    type Output = Pt;
    fn mul(self, rhs: i32) -> Pt {
        Pt::from_milli_i64(self.to_milli_i64().saturating_mul(rhs as i64))
    }
}

/// Page size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: Pt,
    pub height: Pt,
}

impl Size {
    pub fn a4() -> Self {
        Self::from_mm(210.0, 297.0)
    }

    pub fn from_mm(width_mm: f32, height_mm: f32) -> Self {
        Self {
            width: Pt::from_mm(width_mm),
            height: Pt::from_mm(height_mm),
        }
    }
}

/// Page geometry in document units (millimetres). Layout code works in these
/// units; the PDF surface converts to points at the drawing boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFormat {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
}

impl PageFormat {
    /// A4 portrait with 20 mm side margins and 15 mm top/bottom margins.
    pub fn a4() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margins: Margins {
                top: 15.0,
                right: 20.0,
                bottom: 15.0,
                left: 20.0,
            },
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margins.left - self.margins.right
    }

    /// Lowest y a cursor may reach before a page break is required.
    pub fn printable_bottom(&self) -> f32 {
        self.height - self.margins.bottom
    }

    pub fn right_edge(&self) -> f32 {
        self.width - self.margins.right
    }

    pub fn size(&self) -> Size {
        Size::from_mm(self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Rectangle in document units, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }
}
