//! Named time ranges and their resolution against the host timeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransferError};

/// Inclusive `[start, end]` frame interval.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FrameRange {
    pub start: f64,
    pub end: f64,
}

impl FrameRange {
    /// Build a range; bounds are swapped if given out of order.
    pub fn new(start: f64, end: f64) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Policy naming which host range a capture walks.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RangeSelector {
    AnimationRange,
    PlaybackRange,
    #[default]
    SelectedKeyRange,
}

impl RangeSelector {
    pub const ALL: [RangeSelector; 3] = [
        RangeSelector::AnimationRange,
        RangeSelector::PlaybackRange,
        RangeSelector::SelectedKeyRange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeSelector::AnimationRange => "animation_range",
            RangeSelector::PlaybackRange => "playback_range",
            RangeSelector::SelectedKeyRange => "selected_key_range",
        }
    }
}

impl fmt::Display for RangeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeSelector {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self> {
        RangeSelector::ALL
            .into_iter()
            .find(|sel| sel.as_str() == s)
            .ok_or_else(|| TransferError::InvalidRangeSelector {
                selector: s.to_string(),
            })
    }
}

/// Host timeline ranges.
pub trait RangeProvider {
    /// Full animation start/end of the scene.
    fn animation_range(&self) -> FrameRange;
    /// Current playback min/max.
    fn playback_range(&self) -> FrameRange;
    /// Range highlighted on the time slider.
    fn selected_key_range(&self) -> FrameRange;
}

/// Resolve a selector to concrete bounds.
pub fn resolve<P: RangeProvider + ?Sized>(selector: RangeSelector, provider: &P) -> FrameRange {
    let range = match selector {
        RangeSelector::AnimationRange => provider.animation_range(),
        RangeSelector::PlaybackRange => provider.playback_range(),
        RangeSelector::SelectedKeyRange => provider.selected_key_range(),
    };
    FrameRange::new(range.start, range.end)
}

/// Resolve a selector given by name, failing on unknown names.
pub fn resolve_named<P: RangeProvider + ?Sized>(selector: &str, provider: &P) -> Result<FrameRange> {
    let selector: RangeSelector = selector.parse()?;
    Ok(resolve(selector, provider))
}

/// Whole frames of `range`, split into consecutive chunks of `frequency` frames.
///
/// Bounds are truncated toward zero. Frames run from `trunc(start)` up to but
/// excluding `trunc(end + frequency)`, so the chunk holding `end` is padded past
/// it (1..=7 by 3 gives `[7, 8, 9]` last).
pub fn frame_chunks(range: FrameRange, frequency: u32) -> Result<Vec<Vec<i64>>> {
    if frequency == 0 {
        return Err(TransferError::InvalidFrequency { frequency });
    }
    let step = i64::from(frequency);
    let first = range.start.trunc() as i64;
    let stop = (range.end + f64::from(frequency)).trunc() as i64;
    Ok((first..stop)
        .step_by(frequency as usize)
        .map(|chunk_start| (chunk_start..(chunk_start + step).min(stop)).collect())
        .collect())
}

/// Keep at most one time per `frequency`-frame chunk of `range` (the earliest).
///
/// `times` must be ascending. Times outside the range are dropped.
pub fn thin_to_frequency(times: &[f64], range: FrameRange, frequency: u32) -> Result<Vec<f64>> {
    if frequency == 0 {
        return Err(TransferError::InvalidFrequency { frequency });
    }
    if frequency == 1 {
        return Ok(times.iter().copied().filter(|t| range.contains(*t)).collect());
    }
    // Same chunk grid as `frame_chunks`.
    let origin = range.start.trunc();
    let step = frequency as f64;
    let mut kept = Vec::new();
    let mut last_chunk: Option<i64> = None;
    for &t in times.iter().filter(|t| range.contains(**t)) {
        let chunk = ((t - origin) / step).floor() as i64;
        if last_chunk != Some(chunk) {
            kept.push(t);
            last_chunk = Some(chunk);
        }
    }
    Ok(kept)
}
