//! Distance-tiered delivery pricing.

use serde::{Deserialize, Serialize};

/// One tier of the price table: distances up to and including `max_km` cost `price`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingRule {
    pub max_km: f64,
    pub price: f64,
}

impl PricingRule {
    pub const fn new(max_km: f64, price: f64) -> Self {
        Self { max_km, price }
    }
}

/// Tier used when a rule is added from the settings screen.
pub const NEW_RULE: PricingRule = PricingRule::new(999.0, 0.0);

/// Returns the price for a straight-line distance.
///
/// Scans `rules` in the given order and returns the first rule whose
/// `max_km` covers the distance. When nothing matches, the last rule's price
/// applies. An empty table prices everything at zero.
pub fn price_for(distance_m: f64, rules: &[PricingRule]) -> f64 {
    let Some(last) = rules.last() else {
        tracing::warn!("pricing table is empty, delivery priced at zero");
        return 0.0;
    };

    let distance_km = distance_m / 1000.0;
    rules
        .iter()
        .find(|rule| distance_km <= rule.max_km)
        .unwrap_or(last)
        .price
}

/// Editable price table kept in ascending `max_km` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    rules: Vec<PricingRule>,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::new(vec![
            PricingRule::new(3.0, 1.0),
            PricingRule::new(6.0, 2.0),
            PricingRule::new(10.0, 4.0),
            PricingRule::new(9999.0, 6.0),
        ])
    }
}

impl PricingTable {
    pub fn new(rules: Vec<PricingRule>) -> Self {
        let mut table = Self { rules };
        table.sort();
        table
    }

    pub fn rules(&self) -> &[PricingRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn price_for(&self, distance_m: f64) -> f64 {
        price_for(distance_m, &self.rules)
    }

    /// Appends the default new tier and returns the table's rules.
    pub fn add_rule(&mut self) -> &[PricingRule] {
        self.insert(NEW_RULE)
    }

    pub fn insert(&mut self, rule: PricingRule) -> &[PricingRule] {
        self.rules.push(rule);
        self.sort();
        &self.rules
    }

    /// Replaces the rule at `index`. Returns `false` when out of bounds.
    pub fn update(&mut self, index: usize, rule: PricingRule) -> bool {
        let Some(slot) = self.rules.get_mut(index) else {
            return false;
        };
        *slot = rule;
        self.sort();
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<PricingRule> {
        (index < self.rules.len()).then(|| self.rules.remove(index))
    }

    fn sort(&mut self) {
        // stable, so equal bounds keep insertion order
        self.rules.sort_by(|a, b| a.max_km.total_cmp(&b.max_km));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn km(value: f64) -> f64 {
        value * 1000.0
    }

    #[test]
    fn test_default_tiers() {
        let table = PricingTable::default();
        assert_eq!(table.price_for(km(2.0)), 1.0);
        assert_eq!(table.price_for(km(5.0)), 2.0);
        assert_eq!(table.price_for(km(9.0)), 4.0);
        assert_eq!(table.price_for(km(50.0)), 6.0);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let table = PricingTable::default();
        assert_eq!(table.price_for(km(3.0)), 1.0);
        assert_eq!(table.price_for(km(3.0001)), 2.0);
        assert_eq!(table.price_for(0.0), 1.0);
    }

    #[test]
    fn test_fallback_is_last_rule_not_zero() {
        let rules = [PricingRule::new(3.0, 1.0), PricingRule::new(6.0, 2.5)];
        assert_eq!(price_for(km(100.0), &rules), 2.5);
    }

    #[test]
    fn test_scans_in_given_order() {
        let rules = [PricingRule::new(10.0, 4.0), PricingRule::new(3.0, 1.0)];
        assert_eq!(price_for(km(2.0), &rules), 4.0);
    }

    #[test]
    fn test_empty_table_prices_zero() {
        assert_eq!(price_for(km(5.0), &[]), 0.0);
        let table = PricingTable::new(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.price_for(km(5.0)), 0.0);
    }

    #[test]
    fn test_table_keeps_ascending_order() {
        let mut table = PricingTable::new(vec![PricingRule::new(10.0, 4.0), PricingRule::new(3.0, 1.0)]);
        assert_eq!(table.rules()[0].max_km, 3.0);

        table.add_rule();
        assert_eq!(table.rules().last(), Some(&NEW_RULE));

        table.insert(PricingRule::new(1.0, 0.5));
        assert_eq!(table.rules()[0], PricingRule::new(1.0, 0.5));
        assert_eq!(table.price_for(km(0.5)), 0.5);
    }

    #[test]
    fn test_update_and_remove() {
        let mut table = PricingTable::default();
        assert!(table.update(0, PricingRule::new(2.0, 1.5)));
        assert_eq!(table.price_for(km(2.5)), 2.0);
        assert!(!table.update(42, PricingRule::new(1.0, 1.0)));

        let removed = table.remove(3);
        assert_eq!(removed, Some(PricingRule::new(9999.0, 6.0)));
        // 10 km tier is now the catch-all
        assert_eq!(table.price_for(km(50.0)), 4.0);
        assert_eq!(table.remove(10), None);
    }
}
