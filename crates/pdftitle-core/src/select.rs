//! Title selection algorithms.
//!
//! Each algorithm picks, orders and concatenates a subset of a page's
//! [`Block`]s into a raw title candidate:
//!
//! - [`Algorithm::Original`]: the top-most block at the largest size.
//! - [`Algorithm::Max2`]: the leading run of blocks in the two largest size
//!   bands, in rendering order.
//! - [`Algorithm::Eliot`]: every block in chosen size ranks, in reading order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::block::Block;
use crate::error::TitleError;

/// A title selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Algorithm {
    #[default]
    Original,
    Max2,
    Eliot,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Original, Algorithm::Max2, Algorithm::Eliot];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Original => "original",
            Algorithm::Max2 => "max2",
            Algorithm::Eliot => "eliot",
        }
    }

    /// Runs this algorithm. `ranks` is only read by [`Algorithm::Eliot`].
    pub fn select(&self, blocks: &[Block], ranks: &[usize]) -> Result<String, TitleError> {
        match self {
            Algorithm::Original => select_original(blocks),
            Algorithm::Max2 => select_max2(blocks),
            Algorithm::Eliot => select_eliot(blocks, ranks),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = TitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|algo| algo.as_str() == s)
            .ok_or_else(|| TitleError::UnsupportedAlgorithm(s.to_string()))
    }
}

fn max_size(blocks: &[Block]) -> Result<f64, TitleError> {
    blocks
        .iter()
        .map(|b| b.size)
        .reduce(f64::max)
        .ok_or(TitleError::NoBlocks)
}

/// Distinct block sizes, largest first.
pub fn distinct_sizes(blocks: &[Block]) -> Vec<f64> {
    let mut sizes: Vec<f64> = blocks.iter().map(|b| b.size).collect();
    sizes.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    sizes.dedup();
    sizes
}

/// The first top-most block among those drawn at the largest size, trimmed.
pub fn select_original(blocks: &[Block]) -> Result<String, TitleError> {
    let max_size = max_size(blocks)?;
    let largest: Vec<&Block> = blocks.iter().filter(|b| b.size == max_size).collect();
    let max_y = largest
        .iter()
        .map(|b| b.y)
        .reduce(f64::max)
        .ok_or(TitleError::NoBlocks)?;
    largest
        .into_iter()
        .find(|b| b.y == max_y)
        .map(|b| b.text().trim().to_string())
        .ok_or(TitleError::NoBlocks)
}

/// Blocks in rendering order from the first largest-size block through the
/// first block of a second size, continuing while blocks stay in either band.
pub fn select_max2(blocks: &[Block]) -> Result<String, TitleError> {
    let max_size = max_size(blocks)?;
    let mut selected: Vec<&Block> = Vec::new();
    let mut second: Option<f64> = None;

    for block in blocks {
        match second {
            None => {
                if block.size == max_size {
                    selected.push(block);
                } else if !selected.is_empty() {
                    selected.push(block);
                    second = Some(block.size);
                }
            }
            Some(max2) => {
                if block.size == max_size || block.size == max2 {
                    selected.push(block);
                } else {
                    break;
                }
            }
        }
    }

    Ok(selected.iter().map(|b| b.text()).collect())
}

/// All blocks whose size is at one of `ranks` (0 = largest), re-sorted
/// top-to-bottom then left-to-right.
///
/// Fails with [`TitleError::InvalidRank`] when a rank exceeds the number of
/// distinct sizes on the page.
pub fn select_eliot(blocks: &[Block], ranks: &[usize]) -> Result<String, TitleError> {
    if blocks.is_empty() {
        return Err(TitleError::NoBlocks);
    }
    let sizes = distinct_sizes(blocks);

    let mut selected: Vec<&Block> = Vec::new();
    for &rank in ranks {
        let size = *sizes.get(rank).ok_or(TitleError::InvalidRank {
            rank,
            available: sizes.len(),
        })?;
        selected.extend(blocks.iter().filter(|b| b.size == size));
    }

    selected.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    Ok(selected.iter().map(|b| b.text()).collect())
}
