//! Rhythm schedule generation
//!
//! A chart is generated once per session from the difficulty profile and
//! is immutable afterwards: `{time, category}` entries in ascending time
//! order, closed by a single `End` sentinel. The spawner reads it through
//! a cursor; nothing else touches it.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::RhythmProfile;

/// Lead-in silence before the first beat
pub const CHART_START_DELAY_MS: f32 = 2000.0;
/// Gap between the last beat and the end sentinel
pub const CHART_END_PADDING_MS: f32 = 2000.0;
/// Probability that a rolled note is a Don rather than a Ka
const DON_WEIGHT: f64 = 0.55;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteKind {
    Don,
    Ka,
    /// Terminal sentinel; ends the session once all live notes resolve
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartNote {
    pub time_ms: f32,
    pub kind: NoteKind,
}

fn roll_kind(rng: &mut Pcg32, don_weight: f64) -> NoteKind {
    if rng.random_bool(don_weight) {
        NoteKind::Don
    } else {
        NoteKind::Ka
    }
}

/// Generate a chart from the profile's density bands.
///
/// Per beat, one roll against the cumulative probability bands decides
/// the density: quarter (one note), eighth (two notes half a beat apart)
/// or sixteenth (four notes a quarter beat apart); the remainder is a
/// rest. The running clock advances by the tempo-derived beat interval.
pub fn generate(profile: &RhythmProfile, rng: &mut Pcg32) -> Vec<ChartNote> {
    let beat = profile.beat_interval_ms();
    let mut chart = Vec::new();
    let mut time = CHART_START_DELAY_MS;

    for _ in 0..profile.length_beats {
        let r: f32 = rng.random();
        let kind = roll_kind(rng, DON_WEIGHT);

        if r < profile.prob_quarter {
            chart.push(ChartNote { time_ms: time, kind });
        } else if r < profile.prob_quarter + profile.prob_eighth {
            chart.push(ChartNote { time_ms: time, kind });
            chart.push(ChartNote {
                time_ms: time + beat / 2.0,
                kind: roll_kind(rng, 0.5),
            });
        } else if r < profile.prob_quarter + profile.prob_eighth + profile.prob_sixteenth {
            for j in 0..4 {
                chart.push(ChartNote {
                    time_ms: time + (beat / 4.0) * j as f32,
                    kind: roll_kind(rng, 0.5),
                });
            }
        }

        time += beat;
    }

    chart.push(ChartNote {
        time_ms: time + CHART_END_PADDING_MS,
        kind: NoteKind::End,
    });
    chart
}
