use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Money in hundredths of a unit. Signed so the same type carries balance deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f64", from = "f64")]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_cents(cents: i64) -> Self {
        Amount(cents)
    }

    pub const fn from_units(units: i64) -> Self {
        Amount(units * 100)
    }

    pub fn from_f64(value: f64) -> Self {
        Amount((value * 100.0).round() as i64)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `max(0, self)`
    pub fn clamp_non_negative(self) -> Self {
        Amount(self.0.max(0))
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount::from_f64(value)
    }
}

impl From<Amount> for f64 {
    fn from(amount: Amount) -> Self {
        amount.as_f64()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// Payout multiplier in hundredths, e.g. `250` is 2.50x.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f64", from = "f64")]
pub struct Multiplier(u32);

impl Multiplier {
    pub const ZERO: Multiplier = Multiplier(0);
    pub const ONE: Multiplier = Multiplier(100);

    pub const fn from_hundredths(hundredths: u32) -> Self {
        Multiplier(hundredths)
    }

    pub const fn whole(times: u32) -> Self {
        Multiplier(times * 100)
    }

    /// Rounds to two decimals; negative input saturates at zero.
    pub fn from_f64(value: f64) -> Self {
        Multiplier((value * 100.0).round().max(0.0) as u32)
    }

    pub fn hundredths(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Payout for `bet`, rounded half up to the cent.
    pub fn apply(self, bet: Amount) -> Amount {
        let scaled = bet.cents().saturating_mul(self.0 as i64).saturating_add(50);
        Amount::from_cents(scaled.div_euclid(100))
    }
}

impl From<f64> for Multiplier {
    fn from(value: f64) -> Self {
        Multiplier::from_f64(value)
    }
}

impl From<Multiplier> for f64 {
    fn from(multiplier: Multiplier) -> Self {
        multiplier.as_f64()
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}x", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Amount::from_cents(10050), "100.50")]
    #[case(Amount::from_cents(5), "0.05")]
    #[case(Amount::from_cents(-250), "-2.50")]
    #[case(Amount::ZERO, "0.00")]
    fn test_amount_display(#[case] amount: Amount, #[case] expected: &str) {
        assert_eq!(expected, amount.to_string());
    }

    #[test]
    fn test_amount_serializes_as_decimal_number() -> eyre::Result<()> {
        let json = serde_json::to_string(&Amount::from_cents(100050))?;
        assert_eq!("1000.5", json);
        let amount: Amount = serde_json::from_str("100.0")?;
        assert_eq!(Amount::from_units(100), amount);
        Ok(())
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Amount::ZERO, Amount::from_cents(-1).clamp_non_negative());
        assert_eq!(Amount::from_cents(1), Amount::from_cents(1).clamp_non_negative());
    }

    #[test]
    fn test_multiplier_apply() {
        let bet = Amount::from_units(10);
        assert_eq!(Amount::from_units(25), Multiplier::from_f64(2.5).apply(bet));
        assert_eq!(Amount::from_units(100), Multiplier::whole(10).apply(bet));
        assert_eq!(Amount::ZERO, Multiplier::ZERO.apply(bet));
    }

    #[rstest]
    #[case(Amount::from_cents(333), Multiplier::from_hundredths(199), Amount::from_cents(663))]
    #[case(Amount::from_cents(101), Multiplier::from_hundredths(257), Amount::from_cents(260))]
    #[case(Amount::from_cents(1), Multiplier::from_hundredths(150), Amount::from_cents(2))]
    #[case(Amount::from_cents(1), Multiplier::from_hundredths(149), Amount::from_cents(1))]
    fn test_multiplier_apply_rounds_to_cent(
        #[case] bet: Amount,
        #[case] multiplier: Multiplier,
        #[case] payout: Amount,
    ) {
        assert_eq!(payout, multiplier.apply(bet));
    }

    #[test]
    fn test_multiplier_rounds_to_two_decimals() {
        assert_eq!(Multiplier::from_hundredths(257), Multiplier::from_f64(2.5678));
        assert_eq!("2.57x", Multiplier::from_f64(2.5678).to_string());
    }
}
