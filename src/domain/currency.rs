use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Currency text formatting: whole units, grouped thousands, trailing symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub thousands_separator: char,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "zł".to_string(),
            thousands_separator: ',',
        }
    }
}

impl CurrencyFormat {
    pub fn new(symbol: &str, thousands_separator: char) -> Self {
        Self {
            symbol: symbol.to_string(),
            thousands_separator,
        }
    }

    /// Formats `value` as e.g. `450,000 zł`.
    ///
    /// Rounds half to even, so 2.5 becomes 2 and 3.5 becomes 4.
    pub fn format(&self, value: f64) -> String {
        let Some(amount) = Decimal::from_f64(value) else {
            // NaN, infinities and magnitudes beyond Decimal's range
            return format!("{:.0} {}", value, self.symbol);
        };

        let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
        let digits = rounded.abs().trunc().to_string();
        let grouped = group_thousands(&digits, self.thousands_separator);

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        if self.symbol.is_empty() {
            format!("{}{}", sign, grouped)
        } else {
            format!("{}{} {}", sign, grouped, self.symbol)
        }
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}
