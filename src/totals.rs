use crate::format::round_money;
use crate::model::OrderLine;
use rust_decimal::Decimal;

/// GST applied to the order subtotal.
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Subtotal accumulated line by line; tax and grand total derive from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningTotals {
    subtotal: Decimal,
    lines: usize,
}

impl RunningTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the line and returns its total.
    pub fn add(&mut self, line: &OrderLine) -> Decimal {
        let total = line.line_total();
        self.subtotal += total;
        self.lines += 1;
        total
    }

    pub fn line_count(&self) -> usize {
        self.lines
    }

    /// Exact, unrounded.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    pub fn tax(&self) -> Decimal {
        round_money(self.subtotal * TAX_RATE)
    }

    pub fn grand_total(&self) -> Decimal {
        round_money(self.subtotal + self.tax())
    }

    pub fn summary(&self) -> OrderTotals {
        OrderTotals {
            subtotal: self.subtotal(),
            tax: self.tax(),
            grand_total: self.grand_total(),
        }
    }
}

impl<'a> FromIterator<&'a OrderLine> for RunningTotals {
    fn from_iter<I: IntoIterator<Item = &'a OrderLine>>(iter: I) -> Self {
        let mut totals = RunningTotals::new();
        for line in iter {
            totals.add(line);
        }
        totals
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub grand_total: Decimal,
}
