//! Group-count selection and window slicing.

use crate::error::{Result, SolverError};

use super::stratum::SizeRange;

/// Picks how many groups `units` items form under a size range.
///
/// Starts from `units / ideal` and resolves the remainder:
/// - exact fit keeps the quotient;
/// - a fixed size (`min == ideal == max`) with a remainder is fatal;
/// - grow-only ranges keep the quotient and absorb the remainder;
/// - shrink-only ranges add one group;
/// - otherwise the remainder decides: a group is added when the leftover
///   (`ideal - r`) is smaller than the overflow (`r`), and the exact-half
///   tie keeps the smaller group count.
///
/// The chosen count must satisfy `g·min <= units <= g·max`.
pub(crate) fn group_count(stratum: &str, units: usize, size: &SizeRange) -> Result<usize> {
    let g = units / size.ideal;
    let r = units % size.ideal;

    let groups = if r == 0 {
        g
    } else if size.min == size.ideal && size.ideal == size.max {
        return Err(SolverError::ExactSizeMismatch {
            stratum: stratum.to_owned(),
            size: size.ideal,
            units,
        });
    } else if size.min == size.ideal {
        // Groups may only grow: distribute the remainder into the
        // existing groups.
        g
    } else if size.ideal == size.max {
        // Groups may only shrink: the remainder opens a new group.
        g + 1
    } else if size.ideal - r < r {
        g + 1
    } else {
        g
    };

    if groups * size.min > units || units > groups * size.max {
        return Err(SolverError::InfeasibleSizing {
            stratum: stratum.to_owned(),
            units,
            groups,
            min: size.min,
            max: size.max,
        });
    }
    Ok(groups)
}

/// Slices `units` items into `groups` near-equal contiguous window sizes.
/// The first `units % groups` windows take the extra item.
pub(crate) fn window_sizes(units: usize, groups: usize) -> Vec<usize> {
    let base = units / groups;
    let extra = units % groups;
    (0..groups)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}
