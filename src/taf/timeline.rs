//! Hourly forecast timeline synthesis
//!
//! Every hour of the validity window is resolved independently from a
//! fresh copy of the base state:
//! 1. persistent (BECMG) groups that started at or before the hour
//! 2. temporary (TEMPO/PROB) groups whose window contains the hour
//! 3. optional mist inference for reduced visibility without weather
//!
//! Groups are applied in ascending start order with [`partial_merge`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::decode::{ValidPeriod, WeatherToken};
use crate::models::{
    ChangeGroup, ForecastFragment, ForecastState, MAX_VISIBILITY_M, TimelineSegment, TimelineSlot,
};

/// Lower bound (inclusive) of the visibility band implying mist, metres
pub const MIST_VISIBILITY_MIN_M: u32 = 1000;
/// Upper bound (exclusive) of the visibility band implying mist, metres
pub const MIST_VISIBILITY_MAX_M: u32 = 5000;

/// Timeline synthesis switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineOptions {
    /// Add an implied mist token to hours with reduced visibility and no
    /// reported weather
    pub infer_mist: bool,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self { infer_mist: true }
    }
}

/// Hour boundaries from `start` (inclusive) to `end` (exclusive).
/// A missing or inverted window yields no hours.
#[must_use]
pub fn hour_range(period: &ValidPeriod) -> Vec<DateTime<Utc>> {
    let (Some(start), Some(end)) = (period.start, period.end) else {
        return Vec::new();
    };

    std::iter::successors(Some(start), |cursor| cursor.checked_add_signed(Duration::hours(1)))
        .take_while(|cursor| *cursor < end)
        .collect()
}

/// Apply a fragment on top of a resolved state.
///
/// Wind and visibility replace when stated. Weather and cloud lists replace
/// wholesale only when the fragment touched them. A CAVOK fragment resets
/// the state last so it wins over every other field.
#[must_use]
pub fn partial_merge(state: &ForecastState, fragment: &ForecastFragment) -> ForecastState {
    let mut next = state.clone();

    if let Some(wind) = &fragment.wind {
        next.wind = Some(wind.clone());
    }

    if let Some(visibility) = fragment.visibility {
        next.visibility = Some(visibility);
        if visibility != MAX_VISIBILITY_M {
            next.cavok = false;
        }
    }

    if fragment.weather.is_touched() {
        next.weather = fragment.weather.to_vec();
        if !fragment.cavok {
            next.cavok = false;
        }
    }

    if fragment.clouds.is_touched() {
        next.clouds = fragment.clouds.to_vec();
        next.cavok = false;
        next.nsc = fragment.nsc;
    }

    if fragment.cavok {
        next.reset_to_cavok();
    }

    next
}

/// Add implied mist when the state is not CAVOK, carries no weather and
/// visibility lies in the mist band
pub fn infer_mist(state: &mut ForecastState) {
    let in_band = state
        .visibility
        .is_some_and(|v| (MIST_VISIBILITY_MIN_M..MIST_VISIBILITY_MAX_M).contains(&v));

    if !state.cavok && state.weather.is_empty() && in_band {
        state.weather.push(WeatherToken::mist());
    }
}

/// Resolve the state for the hour starting at `time`
#[must_use]
pub fn resolve_hour(
    base: &ForecastState,
    groups: &[ChangeGroup],
    time: DateTime<Utc>,
    options: &TimelineOptions,
) -> ForecastState {
    let persistent = groups.iter().filter(|g| g.kind.is_persistent());
    let temporary = groups.iter().filter(|g| g.kind.is_temporary());

    let mut state = persistent
        .chain(temporary)
        .filter(|group| group.applies_at(time))
        .fold(base.clone(), |state, group| {
            trace!(%time, kind = group.kind.label(), "Applying change group");
            partial_merge(&state, &group.fragment)
        });

    if options.infer_mist {
        infer_mist(&mut state);
    }

    state
}

/// Build one slot per hour of `period`. `groups` must be sorted by start.
#[instrument(skip_all, fields(groups = groups.len()))]
#[must_use]
pub fn synthesize(
    base: &ForecastState,
    groups: &[ChangeGroup],
    period: &ValidPeriod,
    options: &TimelineOptions,
) -> Vec<TimelineSlot> {
    let hours = hour_range(period);
    if hours.is_empty() {
        debug!("Validity window missing or empty, no timeline");
    }

    hours
        .into_iter()
        .map(|time| TimelineSlot::from_state(time, resolve_hour(base, groups, time, options)))
        .collect()
}

/// Group consecutive slots with equal keys into runs
#[must_use]
pub fn segment_timeline<K, F>(slots: &[TimelineSlot], key: F) -> Vec<TimelineSegment<K>>
where
    K: PartialEq,
    F: Fn(&TimelineSlot) -> K,
{
    let mut segments: Vec<TimelineSegment<K>> = Vec::new();

    for (index, slot) in slots.iter().enumerate() {
        let value = key(slot);
        match segments.last_mut() {
            Some(segment) if segment.value == value => segment.hour_count += 1,
            _ => segments.push(TimelineSegment {
                value,
                start_index: index,
                hour_count: 1,
            }),
        }
    }

    segments
}
