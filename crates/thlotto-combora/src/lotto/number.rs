use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;
use std::str::FromStr;

/// Size of the six-digit number space, `000000..=999999`.
pub const NUMBER_SPACE: u32 = 1_000_000;

/// Number of digits in the canonical rendering.
pub const NUMBER_WIDTH: usize = 6;

/// A lottery number in `0..NUMBER_SPACE`.
///
/// Always rendered as the canonical zero-padded six-digit string, so `"5"`
/// and `"000005"` parse to the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LottoNumber(u32);

impl LottoNumber {
    pub fn new(value: u32) -> Result<Self, NumberError> {
        if value >= NUMBER_SPACE {
            return Err(NumberError::OutOfRange(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Position of this number in the number space, used as a bit index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Inverse of [`Self::index`] for indices produced by the set.
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < NUMBER_SPACE as usize, "index {index} out of range");
        Self(index as u32)
    }

    /// Canonical zero-padded six-digit form.
    pub fn to_canonical(self) -> String {
        format!("{:0width$}", self.0, width = NUMBER_WIDTH)
    }
}

impl Display for LottoNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0width$}", self.0, width = NUMBER_WIDTH)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumberError {
    #[error("Lottery number is empty")]
    Empty,
    #[error("Lottery number contains a non-digit character: {0:?}")]
    NonDigit(String),
    #[error("Lottery number {0} is out of range (000000-999999)")]
    OutOfRange(String),
}

impl FromStr for LottoNumber {
    type Err = NumberError;

    /// Accepts any run of ASCII digits, surrounding whitespace ignored.
    /// Leading zeros are insignificant, so short forms such as `"5"` are
    /// normalised rather than rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NumberError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NumberError::NonDigit(s.to_owned()));
        }

        let significant = s.trim_start_matches('0');
        if significant.len() > NUMBER_WIDTH {
            return Err(NumberError::OutOfRange(s.to_owned()));
        }

        let value = significant
            .bytes()
            .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
        Self::new(value)
    }
}

impl TryFrom<&str> for LottoNumber {
    type Error = NumberError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LottoNumber> for String {
    fn from(number: LottoNumber) -> Self {
        number.to_canonical()
    }
}

impl Serialize for LottoNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical())
    }
}

impl<'de> Deserialize<'de> for LottoNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
