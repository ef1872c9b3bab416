/// Currencies displayed without minor units.
const ZERO_DECIMAL_CURRENCIES: [&str; 4] = ["XAF", "XOF", "JPY", "KRW"];

/// Formats amounts for display in the dashboard.
///
/// Full format groups thousands with a space and appends the currency code:
/// `1 250 000 XAF`, `1 234.50 EUR`. Compact format is meant for axis ticks:
/// `1.2M`, `350K`, `900`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormatter {
    code: String,
    decimals: usize,
}

impl CurrencyFormatter {
    /// Formatter for `code`, with 0 decimals for XAF-like currencies and 2
    /// otherwise.
    pub fn new(code: &str) -> Self {
        let code = code.trim().to_uppercase();
        let decimals = if ZERO_DECIMAL_CURRENCIES.contains(&code.as_str()) {
            0
        } else {
            2
        };
        Self { code, decimals }
    }

    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn decimals(&self) -> usize {
        self.decimals
    }

    /// `1250000.0` → `"1 250 000 XAF"`. Non-finite amounts format as zero.
    pub fn format(&self, amount: f64) -> String {
        format!("{} {}", self.format_number(amount), self.code)
    }

    /// Grouped number without the currency code.
    pub fn format_number(&self, amount: f64) -> String {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        let digits = format!("{:.*}", self.decimals, amount.abs());
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (digits.as_str(), None),
        };

        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        let is_zero = digits.chars().all(|c| c == '0' || c == '.');
        if amount < 0.0 && !is_zero {
            out.push('-');
        }
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                out.push(' ');
            }
            out.push(c);
        }
        if let Some(frac) = frac_part {
            out.push('.');
            out.push_str(frac);
        }
        out
    }

    /// Short axis label: `1_200_000.0` → `"1.2M"`, `350_000.0` → `"350K"`.
    pub fn format_compact(&self, value: f64) -> String {
        let value = if value.is_finite() { value } else { 0.0 };
        let abs = value.abs();
        let sign = if value < 0.0 { "-" } else { "" };
        let (scaled, suffix) = if abs >= 1e9 {
            (abs / 1e9, "B")
        } else if abs >= 1e6 {
            (abs / 1e6, "M")
        } else if abs >= 1e3 {
            (abs / 1e3, "K")
        } else {
            return format!("{sign}{abs:.0}");
        };
        let text = format!("{scaled:.1}");
        let text = text.strip_suffix(".0").unwrap_or(&text);
        format!("{sign}{text}{suffix}")
    }
}

impl Default for CurrencyFormatter {
    fn default() -> Self {
        Self::new("XAF")
    }
}
