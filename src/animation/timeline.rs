//! Alignment of independent frame timelines.
//!
//! Binary transforms combine two animations whose frames change at unrelated instants. The
//! merged timeline has one entry per instant at which either input changes frame, with the
//! shorter input looped until the longer one ends.

use crate::animation::frame::durations;
use crate::foundation::error::{EmoteError, EmoteResult};

/// One step of a merged timeline: the output frame ending at `timestamp_ms` shows frame
/// `index_a` of the first input and frame `index_b` of the second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergedEntry {
    pub timestamp_ms: i64,
    pub index_a: usize,
    pub index_b: usize,
}

/// Merge two timestamp series, looping the one that ends first.
///
/// Index pairs in the output always follow the argument order, whichever series drives.
pub fn merge_timelines(a: &[i64], b: &[i64]) -> EmoteResult<Vec<MergedEntry>> {
    check_series(a)?;
    check_series(b)?;

    if a[a.len() - 1] < b[b.len() - 1] {
        let mut merged = merge_driven(b, a)?;
        for e in &mut merged {
            std::mem::swap(&mut e.index_a, &mut e.index_b);
        }
        return Ok(merged);
    }

    merge_driven(a, b)
}

/// `first` must end no earlier than `second`.
fn merge_driven(first: &[i64], second: &[i64]) -> EmoteResult<Vec<MergedEntry>> {
    if second == [0] {
        return Ok(first
            .iter()
            .enumerate()
            .map(|(i, &t)| MergedEntry {
                timestamp_ms: t,
                index_a: i,
                index_b: 0,
            })
            .collect());
    }

    let overflow = || EmoteError::invalid_argument("looped timeline overflows i64");
    let second_last = second[second.len() - 1];
    let mut out = Vec::with_capacity(first.len() + second.len());
    let (mut i, mut j) = (0usize, 0usize);
    let mut second_offset = 0i64;

    while i < first.len() {
        let t_first = first[i];
        let t_second = second[j].checked_add(second_offset).ok_or_else(overflow)?;
        let entry = MergedEntry {
            timestamp_ms: t_first.min(t_second),
            index_a: i,
            index_b: j,
        };

        if t_first <= t_second {
            i += 1;
        }
        if t_first >= t_second {
            j += 1;
            if j == second.len() {
                j = 0;
                second_offset = second_offset
                    .checked_add(second_last)
                    .ok_or_else(overflow)?;
            }
        }
        out.push(entry);
    }

    Ok(out)
}

fn check_series(ts: &[i64]) -> EmoteResult<()> {
    let Some(&first) = ts.first() else {
        return Err(EmoteError::EmptyTimeSeries);
    };
    if first < 0 || ts.windows(2).any(|w| w[1] <= w[0]) {
        return Err(EmoteError::invalid_argument(
            "time series must be non-negative and strictly increasing",
        ));
    }
    if ts.len() > 1 && first == 0 {
        return Err(EmoteError::invalid_argument(
            "only a single-frame still may end at timestamp 0",
        ));
    }
    Ok(())
}

/// Timestamps of the same frames played back-to-front: new frame `i` lasts as long as original
/// frame `n - 1 - i`.
pub fn reverse_timeline(timestamps: &[i64]) -> EmoteResult<Vec<i64>> {
    if timestamps.is_empty() {
        return Err(EmoteError::EmptyTimeSeries);
    }

    let mut acc = 0i64;
    Ok(durations(timestamps)
        .into_iter()
        .rev()
        .map(|d| {
            acc += d;
            acc
        })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
