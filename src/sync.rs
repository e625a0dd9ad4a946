//! Linked numeric swap fields
//!
//! The swap form exposes two numeric inputs, amount and price. A valid
//! edit to either one re-derives the other through a single
//! multiply-then-divide pass, and any input that is not a plain digit
//! string is ignored without comment.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    /// Plain digit strings only: no sign, no decimal point, no exponent
    static ref DIGITS: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

/// Mutually consistent (amount, price) pair
///
/// Both values start at 1. A valid edit sets the edited field to the
/// absolute value of the parsed number and recomputes the other as
/// `(new * other) / other`. The division is carried out literally:
/// when the other field holds zero, the recomputed value is NaN, and
/// callers see that NaN.
#[derive(Debug, Clone, Copy)]
pub struct SyncedAmount {
    amount: f64,
    price: f64,
}

impl SyncedAmount {
    pub fn new() -> Self {
        Self {
            amount: 1.0,
            price: 1.0,
        }
    }

    /// Apply an edit to the amount field; returns whether it was accepted
    pub fn on_amount_changed(&mut self, raw: &str) -> bool {
        let num = match Self::parse_digits(raw) {
            Some(n) => n,
            None => return false,
        };

        self.amount = num;
        self.price = (num * self.price) / self.price;
        true
    }

    /// Apply an edit to the price field; returns whether it was accepted
    pub fn on_price_changed(&mut self, raw: &str) -> bool {
        let num = match Self::parse_digits(raw) {
            Some(n) => n,
            None => return false,
        };

        self.price = num;
        self.amount = (num * self.amount) / self.amount;
        true
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    fn parse_digits(raw: &str) -> Option<f64> {
        if !DIGITS.is_match(raw) {
            debug!("ignoring non-numeric field edit: {:?}", raw);
            return None;
        }

        match raw.parse::<f64>() {
            Ok(n) => Some(n.abs()),
            Err(_) => None,
        }
    }
}

impl Default for SyncedAmount {
    fn default() -> Self {
        Self::new()
    }
}

/// Form state backing the swap surface
///
/// Alongside the synchronized pair, the form retains the raw text last
/// typed into the price field: the price input doubles as the transfer
/// destination, and the destination is whatever the user typed there,
/// whether or not the synchronizer accepted it as a number.
#[derive(Debug, Clone)]
pub struct SwapForm {
    synced: SyncedAmount,
    destination: String,
}

impl SwapForm {
    pub fn new() -> Self {
        Self {
            synced: SyncedAmount::new(),
            destination: String::new(),
        }
    }

    /// Edit the amount field; returns whether the edit was accepted
    pub fn set_amount(&mut self, raw: &str) -> bool {
        self.synced.on_amount_changed(raw)
    }

    /// Edit the price field; returns whether the edit was accepted
    ///
    /// The raw text is retained as the destination either way.
    pub fn set_price(&mut self, raw: &str) -> bool {
        self.destination = raw.to_string();
        self.synced.on_price_changed(raw)
    }

    pub fn amount(&self) -> f64 {
        self.synced.amount()
    }

    pub fn price(&self) -> f64 {
        self.synced.price()
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }
}

impl Default for SwapForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_one_one() {
        let synced = SyncedAmount::new();
        assert_eq!(synced.amount(), 1.0);
        assert_eq!(synced.price(), 1.0);
    }

    #[test]
    fn valid_amount_edit_sets_parsed_value() {
        let mut synced = SyncedAmount::new();
        assert!(synced.on_amount_changed("4"));
        assert_eq!(synced.amount(), 4.0);

        assert!(synced.on_amount_changed("007"));
        assert_eq!(synced.amount(), 7.0);
    }

    #[test]
    fn recompute_echoes_new_value_through_other_field() {
        let mut synced = SyncedAmount::new();
        synced.on_price_changed("10");
        synced.on_amount_changed("2");
        assert_eq!(synced.amount(), 2.0);
        assert_eq!(synced.price(), (2.0 * 10.0) / 10.0);

        synced.on_amount_changed("4");
        assert_eq!(synced.amount(), 4.0);
        assert_eq!(synced.price(), (4.0 * 2.0) / 2.0);
    }

    #[test]
    fn price_edit_is_symmetric() {
        let mut synced = SyncedAmount::new();
        synced.on_amount_changed("2");
        synced.on_price_changed("7");
        assert_eq!(synced.price(), 7.0);
        assert_eq!(synced.amount(), (7.0 * 2.0) / 2.0);
    }

    #[test]
    fn invalid_edits_leave_state_untouched() {
        let mut synced = SyncedAmount::new();
        synced.on_amount_changed("3");
        assert_eq!((synced.amount(), synced.price()), (3.0, 3.0));

        for raw in ["", "4.5", "-3", "1e5", "abc", "12a", " 12", "+7", "0x10"] {
            assert!(!synced.on_amount_changed(raw), "accepted {:?}", raw);
            assert!(!synced.on_price_changed(raw), "accepted {:?}", raw);
            assert_eq!(synced.amount(), 3.0);
            assert_eq!(synced.price(), 3.0);
        }
    }

    #[test]
    fn zero_cross_field_produces_nan() {
        let mut synced = SyncedAmount::new();
        synced.on_price_changed("0");
        assert_eq!(synced.price(), 0.0);
        assert_eq!(synced.amount(), 0.0);

        synced.on_amount_changed("5");
        assert_eq!(synced.amount(), 5.0);
        assert!(synced.price().is_nan());
    }

    #[test]
    fn form_retains_raw_destination_text() {
        let mut form = SwapForm::new();

        assert!(!form.set_price("0x00a329c0648769a73afac7f9381e08fb43dbea72"));
        assert_eq!(
            form.destination(),
            "0x00a329c0648769a73afac7f9381e08fb43dbea72"
        );
        assert_eq!(form.price(), 1.0);

        assert!(form.set_price("12"));
        assert_eq!(form.destination(), "12");
        assert_eq!(form.price(), 12.0);
    }

    #[test]
    fn form_starts_with_empty_destination() {
        let form = SwapForm::new();
        assert_eq!(form.destination(), "");
    }
}
