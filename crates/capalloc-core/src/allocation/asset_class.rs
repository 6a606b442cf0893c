use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CapAllocError;

/// Number of asset classes in every allocation vector.
pub const ASSET_COUNT: usize = 5;

/// The five asset classes, in vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    Taux,
    #[serde(rename = "Actions_cotees")]
    ActionsCotees,
    #[serde(rename = "Actions_non_cotees")]
    ActionsNonCotees,
    Immobilier,
    Cash,
}

impl AssetClass {
    pub const ALL: [AssetClass; ASSET_COUNT] = [
        AssetClass::Taux,
        AssetClass::ActionsCotees,
        AssetClass::ActionsNonCotees,
        AssetClass::Immobilier,
        AssetClass::Cash,
    ];

    /// Position of this class in weight and assumption vectors.
    pub fn index(self) -> usize {
        match self {
            AssetClass::Taux => 0,
            AssetClass::ActionsCotees => 1,
            AssetClass::ActionsNonCotees => 2,
            AssetClass::Immobilier => 3,
            AssetClass::Cash => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AssetClass::Taux => "Taux",
            AssetClass::ActionsCotees => "Actions_cotees",
            AssetClass::ActionsNonCotees => "Actions_non_cotees",
            AssetClass::Immobilier => "Immobilier",
            AssetClass::Cash => "Cash",
        }
    }

    /// Rate instruments and cash form the sleeve backing the guaranteed yield.
    pub fn is_guaranteed(self) -> bool {
        matches!(self, AssetClass::Taux | AssetClass::Cash)
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetClass {
    type Err = CapAllocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        AssetClass::ALL
            .into_iter()
            .find(|a| a.name().to_lowercase() == normalized)
            .ok_or_else(|| {
                CapAllocError::invalid(
                    "asset_class",
                    format!(
                        "Unknown asset class '{}'. Use: Taux, Actions_cotees, \
                         Actions_non_cotees, Immobilier, Cash",
                        s
                    ),
                )
            })
    }
}
