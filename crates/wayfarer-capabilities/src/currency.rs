use std::collections::HashMap;

/// Built-in exchange rates, expressed as units of the currency per USD.
/// Rough figures; override via `[currency.rates]` in the config for accuracy.
const BUILTIN_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("JPY", 155.0),
    ("CHF", 0.88),
    ("CAD", 1.37),
    ("AUD", 1.52),
    ("CNY", 7.25),
    ("INR", 83.5),
    ("BRL", 5.45),
    ("MXN", 17.1),
    ("SEK", 10.6),
    ("NOK", 10.7),
    ("DKK", 6.86),
    ("THB", 36.5),
];

/// Table-driven currency conversion used by the budget planner.
#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    rates: HashMap<String, f64>,
}

impl CurrencyConverter {
    pub fn new() -> Self {
        Self {
            rates: BUILTIN_RATES
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
        }
    }

    /// Built-in table with config overrides applied on top.
    pub fn with_overrides(overrides: &HashMap<String, f64>) -> Self {
        let mut converter = Self::new();
        for (code, rate) in overrides {
            converter.rates.insert(code.trim().to_uppercase(), *rate);
        }
        converter
    }

    /// Convert an amount between two currencies. `None` when either code is
    /// unknown; callers treat that as a soft failure, not an abort.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Option<f64> {
        let from_rate = self.rates.get(&from.trim().to_uppercase())?;
        let to_rate = self.rates.get(&to.trim().to_uppercase())?;
        Some(amount / from_rate * to_rate)
    }
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_conversion() {
        let converter = CurrencyConverter::new();
        assert_eq!(converter.convert(100.0, "USD", "usd"), Some(100.0));
    }

    #[test]
    fn eur_to_usd_uses_table() {
        let converter = CurrencyConverter::new();
        let usd = converter.convert(92.0, "EUR", "USD").unwrap();
        assert!((usd - 100.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_currency_is_none() {
        let converter = CurrencyConverter::new();
        assert_eq!(converter.convert(10.0, "XXX", "USD"), None);
        assert_eq!(converter.convert(10.0, "USD", "XXX"), None);
    }

    #[test]
    fn overrides_win_over_builtins() {
        let mut overrides = HashMap::new();
        overrides.insert("eur".to_string(), 2.0);
        let converter = CurrencyConverter::with_overrides(&overrides);
        assert_eq!(converter.convert(1.0, "USD", "EUR"), Some(2.0));
    }
}
