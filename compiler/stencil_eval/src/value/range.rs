//! Integer ranges produced by `a..b` and `a..<b`.

/// A stepped integer sequence. Counts down when `start > end`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RangeValue {
    pub start: i64,
    pub end: i64,
    pub inclusive: bool,
}

impl RangeValue {
    pub fn new(start: i64, end: i64, inclusive: bool) -> Self {
        RangeValue {
            start,
            end,
            inclusive,
        }
    }

    fn descending(&self) -> bool {
        self.start > self.end
    }

    pub fn len(&self) -> usize {
        let distance = (i128::from(self.end) - i128::from(self.start)).unsigned_abs();
        let count = if self.inclusive {
            distance + 1
        } else {
            distance
        };
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<i64> {
        if index >= self.len() {
            return None;
        }
        let offset = i128::try_from(index).ok()?;
        let value = if self.descending() {
            i128::from(self.start) - offset
        } else {
            i128::from(self.start) + offset
        };
        i64::try_from(value).ok()
    }

    pub fn contains(&self, value: i64) -> bool {
        let (low, high) = if self.descending() {
            (self.end, self.start)
        } else {
            (self.start, self.end)
        };
        if self.inclusive {
            (low..=high).contains(&value)
        } else if self.descending() {
            value > low && value <= high
        } else {
            value >= low && value < high
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        (0..self.len()).map_while(move |index| self.get(index))
    }
}
