use super::domain::{Item, WeightUnit};

const GRAMS_PER_KILOGRAM: f64 = 1000.0;
const GRAMS_PER_OUNCE: f64 = 28.3495;
const GRAMS_PER_POUND: f64 = 453.592;

const fn grams_per_unit(unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Grams => 1.0,
        WeightUnit::Kilograms => GRAMS_PER_KILOGRAM,
        WeightUnit::Ounces => GRAMS_PER_OUNCE,
        WeightUnit::Pounds => GRAMS_PER_POUND,
    }
}

/// Convert a weight between mass units by pivoting through grams.
pub fn convert_weight(weight: f64, from: WeightUnit, to: WeightUnit) -> f64 {
    if from == to {
        return weight;
    }
    let grams = weight * grams_per_unit(from);
    grams / grams_per_unit(to)
}

/// Total weight of a set of items expressed in `target`, counting each item's
/// quantity. Items keep their own units; mixed-unit bags are expected.
pub fn total_kit_weight(items: &[Item], target: WeightUnit) -> f64 {
    items
        .iter()
        .map(|item| convert_weight(item.weight * f64::from(item.quantity), item.weight_unit, target))
        .sum()
}

/// Render a weight for display with two decimal places and the unit symbol.
/// Rounding happens here only; stored values stay at full precision.
pub fn format_weight(weight: f64, unit: WeightUnit) -> String {
    format!("{weight:.2} {}", unit.symbol())
}
