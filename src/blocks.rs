use std::fmt;

use crate::error::{DumpError, Result};

/// A closed interval `[start, end]` of 1-based spot indices.
///
/// Blocks produced by [`split`] for more workers than spots have `end < start`
/// for every block but the last. Such a block is passed to the dump tool as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pub start: u64,
    pub end: u64,
}

impl Block {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of spots covered; zero for an inverted block.
    pub fn len(&self) -> u64 {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

// Split [start, end] into `pieces` sequential blocks of floor(total / pieces)
// spots each, the last block also taking the remainder.
pub fn split(start: u64, end: u64, pieces: usize) -> Result<Vec<Block>> {
    if pieces == 0 {
        return Err(DumpError::InvalidRange("cannot split into 0 blocks".into()));
    }
    if start == 0 {
        return Err(DumpError::InvalidRange("spot ids start at 1".into()));
    }
    if start > end {
        return Err(DumpError::InvalidRange(format!(
            "start {start} is past end {end}"
        )));
    }

    let total = end - start + 1;
    let n = pieces as u64;
    let base = total / n;

    let mut blocks = Vec::with_capacity(pieces);
    let mut next = start;
    for i in 0..n {
        // start >= 1, so this never underflows even when base == 0
        let mut block = Block::new(next, next + base - 1);
        if i == n - 1 {
            block.end += total % n;
        }
        blocks.push(block);
        next += base;
    }
    Ok(blocks)
}
