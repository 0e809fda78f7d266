use thlotto_combora::LottoNumber;

use crate::api::LottoPayload;
use crate::models::{DrawDate, PrizeCategory};

/// The recognised, non-empty categories of one fetched draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawFragments {
    pub date: DrawDate,
    /// Date text as the source printed it.
    pub source_date: String,
    pub categories: Vec<(PrizeCategory, Vec<String>)>,
}

impl DrawFragments {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Keep the six full-number categories, canonicalise their numbers and drop
/// anything left empty. Running-number prizes and unknown ids are ignored.
pub fn extract(date: DrawDate, payload: &LottoPayload) -> DrawFragments {
    let mut categories: Vec<(PrizeCategory, Vec<String>)> = Vec::new();

    for prize in &payload.prizes {
        let Ok(category) = prize.id.parse::<PrizeCategory>() else {
            log::trace!("Ignoring prize {} for {date}", prize.id);
            continue;
        };
        if categories.iter().any(|(c, _)| *c == category) {
            log::warn!("Duplicate {category} in response for {date}, keeping the first");
            continue;
        }

        let numbers: Vec<String> = prize
            .number
            .iter()
            .filter_map(|raw| match raw.parse::<LottoNumber>() {
                Ok(n) => Some(n.to_canonical()),
                Err(e) => {
                    log::warn!("Dropping malformed number {raw:?} in {category} for {date}: {e}");
                    None
                }
            })
            .collect();

        if !numbers.is_empty() {
            categories.push((category, numbers));
        }
    }

    categories.sort_by_key(|(c, _)| *c);
    DrawFragments {
        date,
        source_date: payload.date.clone(),
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RawPrize;

    fn prize(id: &str, numbers: &[&str]) -> RawPrize {
        RawPrize {
            id: id.to_owned(),
            number: numbers.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    #[test]
    fn keeps_only_known_non_empty_categories() -> anyhow::Result<()> {
        let payload = LottoPayload {
            date: "16 ธันวาคม 2568".to_owned(),
            prizes: vec![
                prize("prizeSecond", &["222222"]),
                prize("prizeFirst", &["123456"]),
                prize("prizeThird", &[]),
                prize("runningNumberBackTwo", &["56"]),
            ],
        };
        let fragments = extract(DrawDate::new(16, 12, 2568)?, &payload);
        assert_eq!(
            fragments.categories,
            [
                (PrizeCategory::First, vec!["123456".to_owned()]),
                (PrizeCategory::Second, vec!["222222".to_owned()]),
            ]
        );
        assert_eq!(fragments.source_date, "16 ธันวาคม 2568");
        Ok(())
    }

    #[test]
    fn numbers_are_canonicalised() -> anyhow::Result<()> {
        let payload = LottoPayload {
            date: String::new(),
            prizes: vec![prize("prizeFifth", &["5", " 012345 ", "xx", "1234567"])],
        };
        let fragments = extract(DrawDate::new(1, 12, 2568)?, &payload);
        assert_eq!(
            fragments.categories,
            [(
                PrizeCategory::Fifth,
                vec!["000005".to_owned(), "012345".to_owned()]
            )]
        );
        Ok(())
    }

    #[test]
    fn all_malformed_is_empty() -> anyhow::Result<()> {
        let payload = LottoPayload {
            date: String::new(),
            prizes: vec![prize("prizeFirst", &["abc"]), prize("prizeFirstNear", &[])],
        };
        assert!(extract(DrawDate::new(1, 12, 2568)?, &payload).is_empty());
        Ok(())
    }
}
