pub mod category;
pub mod dataset;
pub mod draw;

pub use category::PrizeCategory;
pub use dataset::{CategoryDraws, Dataset, DateRange, DrawHit, Metadata};
pub use draw::{BUDDHIST_ERA_OFFSET, DrawDate, DrawDateError, DrawRecord};
