// Randomized grouping: uniform shuffle plus chunking into fixed-size groups.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Smallest permitted group size.
pub const MIN_GROUP_SIZE: usize = 2;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("group size must be at least 2, got {size}")]
    InvalidGroupSize { size: usize },

    #[error("cannot partition an empty roster")]
    EmptyRoster,
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A numbered subset of the roster produced by partitioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Sequential id, starting at 1 in the order groups are produced.
    pub id: usize,
    pub members: Vec<String>,
}

// ---------------------------------------------------------------------------
// Partitioning
// ---------------------------------------------------------------------------

/// Partition `names` into groups of `group_size`.
///
/// Shuffles a copy of the roster with Fisher-Yates so every permutation is
/// equally likely, then slices it into consecutive chunks. Every group has
/// exactly `group_size` members except possibly the last, which holds the
/// remainder. Together the groups cover the roster exactly once.
pub fn partition(
    names: &[String],
    group_size: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Group>, GroupError> {
    if group_size < MIN_GROUP_SIZE {
        return Err(GroupError::InvalidGroupSize { size: group_size });
    }
    if names.is_empty() {
        return Err(GroupError::EmptyRoster);
    }

    let mut shuffled = names.to_vec();
    shuffled.shuffle(rng);

    let groups = shuffled
        .chunks(group_size)
        .enumerate()
        .map(|(index, chunk)| Group {
            id: index + 1,
            members: chunk.to_vec(),
        })
        .collect();

    Ok(groups)
}

/// How many groups a partition of `roster_size` names into groups of
/// `group_size` would produce: `ceil(roster_size / group_size)`.
///
/// Display-only; a zero `group_size` yields 0 rather than dividing by zero
/// (real sizes are validated by `partition`).
pub fn estimate_group_count(roster_size: usize, group_size: usize) -> usize {
    if group_size == 0 {
        return 0;
    }
    roster_size.div_ceil(group_size)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
