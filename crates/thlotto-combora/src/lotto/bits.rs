use super::{LottoNumber, NUMBER_SPACE};

const WORD_BITS: usize = u64::BITS as usize;
const WORDS: usize = (NUMBER_SPACE as usize).div_ceil(WORD_BITS);

/// Membership set over the whole six-digit number space.
///
/// One bit per number: bit `n` is set when `n` has been drawn.
/// 1,000,000 bits fit in 125 KB, so the set is always allocated at full
/// width and `contains` is a single word lookup.
#[derive(Clone, PartialEq, Eq)]
pub struct HistoricalSet {
    words: Box<[u64]>,
    len: usize,
}

impl HistoricalSet {
    pub fn new() -> Self {
        Self {
            words: vec![0u64; WORDS].into_boxed_slice(),
            len: 0,
        }
    }

    /// Every number in the space. Mostly useful to exercise saturation.
    pub fn saturated() -> Self {
        let mut words = vec![u64::MAX; WORDS];
        let tail = NUMBER_SPACE as usize % WORD_BITS;
        if tail != 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << tail) - 1;
            }
        }
        Self {
            words: words.into_boxed_slice(),
            len: NUMBER_SPACE as usize,
        }
    }

    /// Insert a number, returning `true` if it was not present yet.
    pub fn insert(&mut self, number: LottoNumber) -> bool {
        let (word, mask) = Self::locate(number);
        let fresh = self.words[word] & mask == 0;
        if fresh {
            self.words[word] |= mask;
            self.len += 1;
        }
        fresh
    }

    pub fn contains(&self, number: LottoNumber) -> bool {
        let (word, mask) = Self::locate(number);
        self.words[word] & mask != 0
    }

    /// Membership by raw string; the input is normalised first, so `"5"`
    /// hits the entry for `000005`. Malformed input is never a member.
    pub fn contains_str(&self, raw: &str) -> bool {
        raw.parse::<LottoNumber>()
            .map(|n| self.contains(n))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Numbers never drawn.
    pub fn remaining(&self) -> usize {
        NUMBER_SPACE as usize - self.len
    }

    pub fn is_saturated(&self) -> bool {
        self.remaining() == 0
    }

    /// Drawn numbers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = LottoNumber> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &bits)| {
            let mut bits = bits;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let offset = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(LottoNumber::from_index(w * WORD_BITS + offset))
            })
        })
    }

    fn locate(number: LottoNumber) -> (usize, u64) {
        let idx = number.index();
        (idx / WORD_BITS, 1u64 << (idx % WORD_BITS))
    }
}

impl Default for HistoricalSet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HistoricalSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoricalSet")
            .field("len", &self.len)
            .field("remaining", &self.remaining())
            .finish()
    }
}

impl FromIterator<LottoNumber> for HistoricalSet {
    fn from_iter<I: IntoIterator<Item = LottoNumber>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<LottoNumber> for HistoricalSet {
    fn extend<I: IntoIterator<Item = LottoNumber>>(&mut self, iter: I) {
        for number in iter {
            self.insert(number);
        }
    }
}
