use serde::{Deserialize, Serialize};

/// Fraction of body weight treated as the maximum safe carry load.
pub const MAX_LOAD_FRACTION: f64 = 0.2;

/// Carry-load severity relative to the 20% guideline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyBand {
    Safe,
    Moderate,
    Caution,
    Unsafe,
}

impl SafetyBand {
    pub const fn label(self) -> &'static str {
        match self {
            SafetyBand::Safe => "safe",
            SafetyBand::Moderate => "moderate",
            SafetyBand::Caution => "caution",
            SafetyBand::Unsafe => "unsafe",
        }
    }

    pub const fn advisory(self) -> &'static str {
        match self {
            SafetyBand::Safe => "The bag weight is well within the safe range.",
            SafetyBand::Moderate => "The bag weight is moderate but safe.",
            SafetyBand::Caution => "The bag weight is approaching your recommended maximum.",
            SafetyBand::Unsafe => {
                "The bag weight exceeds the recommended maximum for your body weight."
            }
        }
    }
}

/// Assessment of a packed bag against the carrier's body weight. Both weights
/// are in kilograms. The percentage is relative to the maximum safe load, not
/// to body weight, and is deliberately left uncapped above 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightSafetyResult {
    #[serde(rename = "status")]
    pub band: SafetyBand,
    pub message: &'static str,
    pub percentage: f64,
}

/// Band the total bag weight against `MAX_LOAD_FRACTION` of body weight.
/// Returns `None` when body weight is absent or non-positive, in which case
/// no assessment is possible.
pub fn weight_safety(total_bag_weight: f64, user_weight: Option<f64>) -> Option<WeightSafetyResult> {
    let user_weight = user_weight?;
    if user_weight <= 0.0 {
        return None;
    }

    let max_safe_weight = user_weight * MAX_LOAD_FRACTION;
    let percentage = total_bag_weight / max_safe_weight * 100.0;

    let band = if total_bag_weight <= max_safe_weight * 0.5 {
        SafetyBand::Safe
    } else if total_bag_weight <= max_safe_weight * 0.8 {
        SafetyBand::Moderate
    } else if total_bag_weight <= max_safe_weight {
        SafetyBand::Caution
    } else {
        SafetyBand::Unsafe
    };

    Some(WeightSafetyResult {
        band,
        message: band.advisory(),
        percentage,
    })
}
