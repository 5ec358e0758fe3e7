use serde::Serialize;

/// Gap to a theoretical reference pace after each retained lap.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CumulativeDelta {
    pub lap_number: u32,
    /// Positive when the driver is ahead of the reference pace.
    pub delta_s: f64,
}

fn is_valid(lap_time: Option<f64>) -> bool {
    matches!(lap_time, Some(t) if t.is_finite() && t > 0.)
}

/// Replaces missing or non-positive interior laps with the average of their
/// neighbours.
///
/// Single forward pass: a lap repaired earlier in the pass is used with its
/// repaired value when it neighbours the next one. The first and last laps are
/// never touched. A missing neighbour leaves the lap missing, while a
/// non-positive neighbour is averaged in as is (`[90, -1, -1, 92]` repairs
/// the second lap to 44.5).
pub fn repair_interior_laps(lap_times: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut repaired = lap_times.to_vec();
    if repaired.len() < 3 {
        return repaired;
    }
    for i in 1..repaired.len() - 1 {
        if !is_valid(repaired[i]) {
            repaired[i] = match (repaired[i - 1], repaired[i + 1]) {
                (Some(prev), Some(next)) if prev.is_finite() && next.is_finite() => {
                    Some((prev + next) / 2.)
                }
                _ => None,
            };
        }
    }
    repaired
}

/// Seconds gained or lost against `reference_pace_s` per lap.
///
/// `laps` holds `(lap_number, lap_time)` in running order. Laps still invalid
/// after [`repair_interior_laps`] are dropped along with their lap number, and
/// the i-th retained lap is compared with `reference_pace_s * i`.
pub fn cumulative_delta(laps: &[(u32, Option<f64>)], reference_pace_s: f64) -> Vec<CumulativeDelta> {
    let times = laps.iter().map(|(_, t)| *t).collect::<Vec<_>>();
    let repaired = repair_interior_laps(&times);

    let mut elapsed = 0.;
    laps.iter()
        .zip(repaired)
        .filter_map(|((lap_number, _), time)| match time {
            Some(t) if is_valid(Some(t)) => Some((*lap_number, t)),
            _ => None,
        })
        .enumerate()
        .map(|(idx, (lap_number, time))| {
            elapsed += time;
            CumulativeDelta {
                lap_number,
                delta_s: reference_pace_s * (idx + 1) as f64 - elapsed,
            }
        })
        .collect()
}
