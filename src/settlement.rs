use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::Charge;

/// manual adjustments applied when settling a rental
///
/// Chot is a bonus credited on top of the rent and is always added to the
/// collected amount; deduction and ghata reduce it. Ledgers that subtract
/// chot invert the operator's intent — the sign is pinned by a dedicated
/// test below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Adjustments {
    pub deduction: Charge,
    pub ghata: Charge,
    pub chot: Money,
}

impl Adjustments {
    pub fn none() -> Self {
        Self::default()
    }
}

/// final collected amount for a rental
///
/// A manual override, when present, replaces the computed base rent.
/// The result is floored at zero; adjustments can never push a settlement
/// negative.
pub fn final_amount(base_rent: Money, manual_override: Option<Money>, adj: &Adjustments) -> Money {
    let effective_base = manual_override.unwrap_or(base_rent);
    (effective_base - adj.deduction.amount - adj.ghata.amount + adj.chot).max(Money::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adj(deduction: i64, ghata: i64, chot: i64) -> Adjustments {
        Adjustments {
            deduction: Charge::new(Money::from_major(deduction), None),
            ghata: Charge::new(Money::from_major(ghata), None),
            chot: Money::from_major(chot),
        }
    }

    #[test]
    fn test_no_adjustments_passes_base_through() {
        let base = Money::from_major(1200);
        assert_eq!(final_amount(base, None, &Adjustments::none()), base);
    }

    #[test]
    fn test_worked_settlement_scenario() {
        // 1200 rent, 200 deducted, 50 chot bonus, no ghata -> 1050
        let got = final_amount(Money::from_major(1200), None, &adj(200, 0, 50));
        assert_eq!(got, Money::from_major(1050));
    }

    #[test]
    fn chot_is_added_never_subtracted() {
        let base = Money::from_major(1000);
        let with_chot = final_amount(base, None, &adj(0, 0, 50));
        assert_eq!(with_chot, Money::from_major(1050));
        assert!(with_chot > base, "a chot bonus must increase the settlement");
    }

    #[test]
    fn test_ghata_reduces_settlement() {
        let got = final_amount(Money::from_major(1000), None, &adj(0, 300, 0));
        assert_eq!(got, Money::from_major(700));
    }

    #[test]
    fn test_manual_override_replaces_base() {
        let got = final_amount(
            Money::from_major(1200),
            Some(Money::from_major(900)),
            &adj(100, 0, 0),
        );
        assert_eq!(got, Money::from_major(800));
    }

    #[test]
    fn test_never_negative() {
        let got = final_amount(Money::from_major(100), None, &adj(500, 500, 0));
        assert_eq!(got, Money::ZERO);

        let got = final_amount(Money::ZERO, None, &adj(1, 0, 0));
        assert_eq!(got, Money::ZERO);
    }

    #[test]
    fn test_clamp_applies_after_chot() {
        // deduction swamps the base but chot pulls the raw result back
        // above zero before the floor applies
        let got = final_amount(Money::from_major(100), None, &adj(150, 0, 75));
        assert_eq!(got, Money::from_major(25));
    }

    #[test]
    fn test_idempotent() {
        let a = adj(200, 100, 50);
        let first = final_amount(Money::from_major(1200), None, &a);
        let second = final_amount(Money::from_major(1200), None, &a);
        assert_eq!(first, second);
    }
}
