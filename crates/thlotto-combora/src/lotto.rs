mod bits;
mod number;

pub use bits::HistoricalSet;
pub use number::{LottoNumber, NUMBER_SPACE, NUMBER_WIDTH, NumberError};
