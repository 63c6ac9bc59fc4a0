//! Notional USD valuation of mixed cash + resource bundles.
//!
//! A bank record moves cash plus up to eleven commodity kinds. The pollers
//! compare bundles against USD floors, so everything is collapsed to a
//! single notional value using the market price map fetched once per cycle.

use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Food,
    Munitions,
    Steel,
    Oil,
    Aluminum,
    Uranium,
    Gasoline,
    Coal,
    Iron,
    Bauxite,
    Lead,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 11] = [
        ResourceKind::Food,
        ResourceKind::Munitions,
        ResourceKind::Steel,
        ResourceKind::Oil,
        ResourceKind::Aluminum,
        ResourceKind::Uranium,
        ResourceKind::Gasoline,
        ResourceKind::Coal,
        ResourceKind::Iron,
        ResourceKind::Bauxite,
        ResourceKind::Lead,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Food => "food",
            ResourceKind::Munitions => "munitions",
            ResourceKind::Steel => "steel",
            ResourceKind::Oil => "oil",
            ResourceKind::Aluminum => "aluminum",
            ResourceKind::Uranium => "uranium",
            ResourceKind::Gasoline => "gasoline",
            ResourceKind::Coal => "coal",
            ResourceKind::Iron => "iron",
            ResourceKind::Bauxite => "bauxite",
            ResourceKind::Lead => "lead",
        }
    }

    pub fn from_str(s: &str) -> Option<ResourceKind> {
        ResourceKind::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

pub type PriceMap = HashMap<ResourceKind, f64>;

/// Cash plus commodity quantities from a single transaction.
#[derive(Clone, Debug, Default)]
pub struct ResourceBundle {
    pub cash: f64,
    pub quantities: HashMap<ResourceKind, f64>,
}

impl ResourceBundle {
    pub fn with_cash(cash: f64) -> Self {
        Self {
            cash,
            quantities: HashMap::new(),
        }
    }

    pub fn set(mut self, kind: ResourceKind, qty: f64) -> Self {
        if qty != 0.0 {
            self.quantities.insert(kind, qty);
        }
        self
    }
}

/// Sums cash and priced commodities into a USD-equivalent value.
///
/// A resource with no entry in the price map contributes zero; the price
/// feed is best-effort and a hole in it must never block a cycle. The
/// result stays unrounded so repeated computation does not compound
/// rounding error; round only at comparison/fingerprint points.
pub fn notional_usd(bundle: &ResourceBundle, prices: &PriceMap) -> f64 {
    let mut total = bundle.cash;
    for (kind, qty) in &bundle.quantities {
        if let Some(price) = prices.get(kind) {
            total += qty * price;
        }
    }
    total
}

/// Whole-USD rounding used at comparison and fingerprint points.
pub fn round_usd(value: f64) -> i64 {
    value.round() as i64
}
