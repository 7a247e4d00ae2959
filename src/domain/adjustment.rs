// Demand adjustment factors - structured signed fractions
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TOTAL_ADJUSTMENT: &str = "total_adjustment";
pub const PRICE_ADJUSTMENT: &str = "price_adjustment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increase,
    Decrease,
    Flat,
}

/// A signed adjustment, stored as a non-negative fraction plus a direction.
/// `0.12` with `Increase` means "+12%".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Adjustment {
    pub magnitude: f64,
    pub direction: Direction,
}

impl Adjustment {
    pub fn from_fraction(value: f64) -> Self {
        let direction = if value > 0.0 {
            Direction::Increase
        } else if value < 0.0 {
            Direction::Decrease
        } else {
            Direction::Flat
        };
        Self {
            magnitude: value.abs(),
            direction,
        }
    }

    pub fn signed(&self) -> f64 {
        match self.direction {
            Direction::Increase => self.magnitude,
            Direction::Decrease => -self.magnitude,
            Direction::Flat => 0.0,
        }
    }

    /// Parse the service's formatted factors.
    ///
    /// Accepts `"+12%"`, `"-0.20 (-20.0%)"` and bare fractions like `"+0.15"`.
    /// When both a fraction and a parenthesised percentage are present the
    /// fraction wins, since it carries more precision.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let head = match raw.find('(') {
            Some(idx) => raw[..idx].trim(),
            None => raw,
        };

        if let Some(percent) = head.strip_suffix('%') {
            let value: f64 = percent.trim().parse().ok()?;
            return value.is_finite().then(|| Self::from_fraction(value / 100.0));
        }

        let value: f64 = head.parse().ok()?;
        value.is_finite().then(|| Self::from_fraction(value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedAdjustment {
    pub name: String,
    pub adjustment: Adjustment,
}

/// Adjustment factors in the order the service reported them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AdjustmentBreakdown(Vec<NamedAdjustment>);

impl AdjustmentBreakdown {
    pub fn get(&self, name: &str) -> Option<Adjustment> {
        self.0
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.adjustment)
    }

    pub fn total(&self) -> Option<Adjustment> {
        self.get(TOTAL_ADJUSTMENT)
    }

    pub fn price(&self) -> Option<Adjustment> {
        self.get(PRICE_ADJUSTMENT)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedAdjustment> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for Adjustment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Adjustment::from_fraction(value)),
            Raw::Text(text) => Adjustment::parse(&text)
                .ok_or_else(|| de::Error::custom(format!("invalid adjustment factor {:?}", text))),
        }
    }
}

impl<'de> Deserialize<'de> for AdjustmentBreakdown {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BreakdownVisitor;

        impl<'de> Visitor<'de> for BreakdownVisitor {
            type Value = AdjustmentBreakdown;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of factor names to adjustments")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, adjustment)) = map.next_entry::<String, Adjustment>()? {
                    entries.push(NamedAdjustment { name, adjustment });
                }
                Ok(AdjustmentBreakdown(entries))
            }
        }

        deserializer.deserialize_map(BreakdownVisitor)
    }
}
