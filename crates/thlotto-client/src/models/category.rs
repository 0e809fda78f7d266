use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// The six prize classes that carry full six-digit numbers.
///
/// Keys follow the upstream API ids, including its `prizeForth` spelling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Serialize, Deserialize,
)]
pub enum PrizeCategory {
    #[strum(to_string = "prizeFirst")]
    #[serde(rename = "prizeFirst")]
    First,
    #[strum(to_string = "prizeFirstNear")]
    #[serde(rename = "prizeFirstNear")]
    FirstNear,
    #[strum(to_string = "prizeSecond")]
    #[serde(rename = "prizeSecond")]
    Second,
    #[strum(to_string = "prizeThird")]
    #[serde(rename = "prizeThird")]
    Third,
    #[strum(to_string = "prizeForth")]
    #[serde(rename = "prizeForth")]
    Fourth,
    #[strum(to_string = "prizeFifth")]
    #[serde(rename = "prizeFifth")]
    Fifth,
}

impl PrizeCategory {
    pub const ALL: [Self; 6] = [
        Self::First,
        Self::FirstNear,
        Self::Second,
        Self::Third,
        Self::Fourth,
        Self::Fifth,
    ];

    /// The category whose draw count is the dataset's clock.
    pub const CANONICAL: Self = Self::First;

    /// Key used by the API and the dataset file.
    pub fn key(&self) -> &'static str {
        match self {
            Self::First => "prizeFirst",
            Self::FirstNear => "prizeFirstNear",
            Self::Second => "prizeSecond",
            Self::Third => "prizeThird",
            Self::Fourth => "prizeForth",
            Self::Fifth => "prizeFifth",
        }
    }

    /// Official Thai name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::First => "รางวัลที่ 1",
            Self::FirstNear => "รางวัลข้างเคียงรางวัลที่ 1",
            Self::Second => "รางวัลที่ 2",
            Self::Third => "รางวัลที่ 3",
            Self::Fourth => "รางวัลที่ 4",
            Self::Fifth => "รางวัลที่ 5",
        }
    }

    /// Reward per ticket in baht, as published.
    pub fn reward(&self) -> &'static str {
        match self {
            Self::First => "6000000",
            Self::FirstNear => "100000",
            Self::Second => "200000",
            Self::Third => "80000",
            Self::Fourth => "40000",
            Self::Fifth => "20000",
        }
    }
}

impl FromStr for PrizeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| format!("Invalid prize category: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator as _;

    use super::*;

    #[test]
    fn display_matches_key() {
        for category in PrizeCategory::iter() {
            assert_eq!(category.to_string(), category.key());
            assert_eq!(category.key().parse::<PrizeCategory>(), Ok(category));
        }
    }

    #[test]
    fn unknown_ids_are_rejected() {
        assert!("prizeFourth".parse::<PrizeCategory>().is_err());
        assert!("runningNumberFrontThree".parse::<PrizeCategory>().is_err());
    }

    #[test]
    fn all_lists_every_variant_once() {
        assert_eq!(PrizeCategory::iter().count(), PrizeCategory::ALL.len());
    }
}
