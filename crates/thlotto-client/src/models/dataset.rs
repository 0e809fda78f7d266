use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thlotto_combora::LottoNumber;

use super::{DrawDate, DrawRecord, PrizeCategory};
use crate::store::StoreError;

/// Draw history of one prize category, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraws {
    pub name: String,
    pub reward: String,
    #[serde(default)]
    pub draws: Vec<DrawRecord>,
}

impl CategoryDraws {
    pub fn empty(category: PrizeCategory) -> Self {
        Self {
            name: category.name().to_owned(),
            reward: category.reward().to_owned(),
            draws: Vec::new(),
        }
    }

    pub fn contains_date(&self, date: &str) -> bool {
        self.draws.iter().any(|d| d.date == date)
    }

    pub fn latest(&self) -> Option<&DrawRecord> {
        self.draws.first()
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// Index that keeps the sequence newest-first. A record whose date
    /// cannot be parsed goes to the front.
    fn insert_position(&self, record: &DrawRecord) -> usize {
        let Some(new_date) = record.draw_date() else {
            return 0;
        };
        self.draws
            .iter()
            .position(|d| d.draw_date().is_none_or(|existing| existing < new_date))
            .unwrap_or(self.draws.len())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Oldest draw of the canonical category.
    pub from: Option<String>,
    /// Newest draw of the canonical category.
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_draws: usize,
    #[serde(default)]
    pub date_range: DateRange,
}

/// Every known draw, grouped by prize category.
///
/// Serialises to the on-disk shape: `metadata` plus one key per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(rename = "prizeFirst", default = "empty_first")]
    prize_first: CategoryDraws,
    #[serde(rename = "prizeFirstNear", default = "empty_first_near")]
    prize_first_near: CategoryDraws,
    #[serde(rename = "prizeSecond", default = "empty_second")]
    prize_second: CategoryDraws,
    #[serde(rename = "prizeThird", default = "empty_third")]
    prize_third: CategoryDraws,
    #[serde(rename = "prizeForth", default = "empty_fourth")]
    prize_fourth: CategoryDraws,
    #[serde(rename = "prizeFifth", default = "empty_fifth")]
    prize_fifth: CategoryDraws,
    /// Bumped on every mutation so derived indexes can tell they are stale.
    #[serde(skip)]
    revision: u64,
}

fn empty_first() -> CategoryDraws {
    CategoryDraws::empty(PrizeCategory::First)
}
fn empty_first_near() -> CategoryDraws {
    CategoryDraws::empty(PrizeCategory::FirstNear)
}
fn empty_second() -> CategoryDraws {
    CategoryDraws::empty(PrizeCategory::Second)
}
fn empty_third() -> CategoryDraws {
    CategoryDraws::empty(PrizeCategory::Third)
}
fn empty_fourth() -> CategoryDraws {
    CategoryDraws::empty(PrizeCategory::Fourth)
}
fn empty_fifth() -> CategoryDraws {
    CategoryDraws::empty(PrizeCategory::Fifth)
}

impl Default for Dataset {
    fn default() -> Self {
        Self::empty()
    }
}

/// Where a number was drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawHit {
    pub category: PrizeCategory,
    pub date: String,
}

impl Dataset {
    /// All six categories present, no draws, zeroed metadata.
    pub fn empty() -> Self {
        Self {
            metadata: Metadata::default(),
            prize_first: empty_first(),
            prize_first_near: empty_first_near(),
            prize_second: empty_second(),
            prize_third: empty_third(),
            prize_fourth: empty_fourth(),
            prize_fifth: empty_fifth(),
            revision: 0,
        }
    }

    pub fn category(&self, category: PrizeCategory) -> &CategoryDraws {
        match category {
            PrizeCategory::First => &self.prize_first,
            PrizeCategory::FirstNear => &self.prize_first_near,
            PrizeCategory::Second => &self.prize_second,
            PrizeCategory::Third => &self.prize_third,
            PrizeCategory::Fourth => &self.prize_fourth,
            PrizeCategory::Fifth => &self.prize_fifth,
        }
    }

    fn category_mut(&mut self, category: PrizeCategory) -> &mut CategoryDraws {
        match category {
            PrizeCategory::First => &mut self.prize_first,
            PrizeCategory::FirstNear => &mut self.prize_first_near,
            PrizeCategory::Second => &mut self.prize_second,
            PrizeCategory::Third => &mut self.prize_third,
            PrizeCategory::Fourth => &mut self.prize_fourth,
            PrizeCategory::Fifth => &mut self.prize_fifth,
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = (PrizeCategory, &CategoryDraws)> {
        PrizeCategory::ALL.into_iter().map(|c| (c, self.category(c)))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Draws recorded in the canonical category.
    pub fn total_draws(&self) -> usize {
        self.category(PrizeCategory::CANONICAL).len()
    }

    /// Dedup oracle: linear scan of one category.
    pub fn contains_date(&self, category: PrizeCategory, date: &str) -> bool {
        self.category(category).contains_date(date)
    }

    /// True if any category already holds a draw for `date`.
    pub fn has_draw(&self, date: DrawDate) -> bool {
        let key = date.to_string();
        PrizeCategory::ALL
            .into_iter()
            .any(|c| self.contains_date(c, &key))
    }

    /// Insert one record keeping newest-first order and refresh metadata.
    /// A date already present in the category is rejected untouched.
    pub fn append(
        &mut self,
        category: PrizeCategory,
        record: DrawRecord,
    ) -> Result<(), StoreError> {
        if self.contains_date(category, &record.date) {
            log::error!(
                "Refusing to append duplicate draw {} to {category}",
                record.date
            );
            return Err(StoreError::DuplicateDate {
                category,
                date: record.date,
            });
        }

        let draws = self.category_mut(category);
        let idx = draws.insert_position(&record);
        draws.draws.insert(idx, record);

        self.touch();
        Ok(())
    }

    /// Commit every category fragment of one draw date, or none of them.
    /// Returns how many category records were added.
    pub fn append_draw(
        &mut self,
        date: DrawDate,
        fragments: Vec<(PrizeCategory, Vec<String>)>,
    ) -> Result<usize, StoreError> {
        let key = date.to_string();
        if let Some((category, _)) = fragments
            .iter()
            .find(|(category, _)| self.contains_date(*category, &key))
        {
            log::error!("Refusing to append draw {key}: {category} already has it");
            return Err(StoreError::DuplicateDate {
                category: *category,
                date: key,
            });
        }
        if let Some((idx, (category, _))) = fragments
            .iter()
            .enumerate()
            .find(|(idx, (category, _))| fragments[..*idx].iter().any(|(c, _)| c == category))
        {
            log::error!("Refusing to append draw {key}: {category} given twice (fragment {idx})");
            return Err(StoreError::DuplicateDate {
                category: *category,
                date: key,
            });
        }

        let mut added = 0;
        for (category, numbers) in fragments {
            if numbers.is_empty() {
                continue;
            }
            self.append(category, DrawRecord::new(date, numbers))?;
            added += 1;
        }
        Ok(added)
    }

    /// Most recent record of a category.
    pub fn latest(&self, category: PrizeCategory) -> Option<&DrawRecord> {
        self.category(category).latest()
    }

    /// Every (category, date) where `number` was drawn, compared in
    /// canonical form.
    pub fn find_number(&self, number: LottoNumber) -> Vec<DrawHit> {
        self.categories()
            .flat_map(|(category, draws)| {
                draws
                    .draws
                    .iter()
                    .filter(move |record| {
                        record
                            .numbers
                            .iter()
                            .any(|raw| raw.parse::<LottoNumber>().is_ok_and(|n| n == number))
                    })
                    .map(move |record| DrawHit {
                        category,
                        date: record.date.clone(),
                    })
            })
            .collect()
    }

    /// First-prize draw matching `number`, if any.
    pub fn first_prize_match(&self, number: LottoNumber) -> Option<DrawHit> {
        self.find_number(number)
            .into_iter()
            .find(|hit| hit.category == PrizeCategory::First)
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.refresh_metadata();
    }

    /// Recompute metadata from the canonical category.
    pub fn refresh_metadata(&mut self) {
        let canonical = self.category(PrizeCategory::CANONICAL);
        let total_draws = canonical.len();
        let date_range = DateRange {
            from: canonical.draws.last().map(|d| d.date.clone()),
            to: canonical.draws.first().map(|d| d.date.clone()),
        };
        self.metadata = Metadata {
            generated_at: Some(Utc::now()),
            total_draws,
            date_range,
        };
    }
}
