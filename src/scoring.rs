//! # Scoring Engine
//! Pure, deterministic mapping `(load, reps, rir)` → stimulus / fatigue / ratio / verdict.
//! No I/O, no logging, no shared state; safe to call from any thread.
//!
//! Pipeline (after clamping):
//! 1. e1RM           = load * (1 + (reps + rir) / 30)
//! 2. relative int.  = min(load / max(1e-6, e1RM), 0.98)
//! 3. effective reps = clamp(min(reps, 5 - rir), 0, reps)
//! 4. load factor    = linear ramp 0 → 1 between 30 % and 50 % relative intensity
//! 5. stimulus       = effective reps * load factor
//! 6. fatigue        = 0.5 + reps * relInt^1.25
//! 7. warm-up (reps < 3 or relInt < 0.30) zeroes stimulus and fatigue
//! 8. ratio          = stimulus / fatigue (0 when fatigue is 0)
//!
//! Classification always uses the unrounded ratio; rounding to 2 dp happens last.

use serde::{Deserialize, Deserializer, Serialize};

use crate::verdict::Verdict;

pub const MAX_REPS: u32 = 40;
pub const MAX_RIR: f64 = 6.0;

pub const EFFECTIVE_REP_WINDOW: f64 = 5.0;
pub const MIN_LOAD_THRESHOLD: f64 = 0.30;
pub const FULL_LOAD_THRESHOLD: f64 = 0.50;
pub const REL_INT_CAP: f64 = 0.98;
pub const BASE_SET_COST: f64 = 0.5;
pub const FATIGUE_EXPONENT: f64 = 1.25;
pub const WARMUP_MIN_REPS: u32 = 3;

pub const GREAT_MIN: f64 = 0.80;
pub const GOOD_MIN: f64 = 0.50;
pub const MEH_MIN: f64 = 0.30;

/// Set as submitted by the user. Missing or `null` fields read as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSetInput {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub load: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub reps: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub rir: f64,
}

fn null_as_zero<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(de)?.unwrap_or(0.0))
}

impl RawSetInput {
    pub fn new(load: f64, reps: f64, rir: f64) -> Self {
        Self { load, reps, rir }
    }
}

/// Bounds-enforced set: `load >= 0`, `0 <= reps <= 40`, `0 <= rir <= 6`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClampedSetInput {
    pub load: f64,
    pub reps: u32,
    pub rir: f64,
}

impl ClampedSetInput {
    pub fn from_raw(raw: &RawSetInput) -> Self {
        let load = finite_or_zero(raw.load).max(0.0);
        let reps = finite_or_zero(raw.reps)
            .round()
            .clamp(0.0, MAX_REPS as f64) as u32;
        let rir = finite_or_zero(raw.rir).clamp(0.0, MAX_RIR);
        Self { load, reps, rir }
    }

    /// Degenerate sets short-circuit to `ignored` before any math.
    pub fn is_degenerate(&self) -> bool {
        self.load <= 0.0 || self.reps == 0
    }
}

/// NaN and infinities carry no usable magnitude.
fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Final, display-rounded result of scoring one set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub ratio: f64,
    pub stimulus: f64,
    pub fatigue: f64,
    pub verdict: Verdict,
}

impl ScoringResult {
    pub fn ignored() -> Self {
        Self {
            ratio: 0.0,
            stimulus: 0.0,
            fatigue: 0.0,
            verdict: Verdict::Ignored,
        }
    }
}

/// Unrounded intermediates of the pipeline, for explainability and aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SetBreakdown {
    pub clamped: ClampedSetInput,
    pub e1rm: f64,
    pub rel_int: f64,
    pub eff_reps: f64,
    pub load_factor: f64,
    pub stimulus: f64,
    pub fatigue: f64,
    pub ratio: f64,
    pub warmup: bool,
    pub verdict: Verdict,
}

impl SetBreakdown {
    fn degenerate(clamped: ClampedSetInput) -> Self {
        Self {
            clamped,
            e1rm: 0.0,
            rel_int: 0.0,
            eff_reps: 0.0,
            load_factor: 0.0,
            stimulus: 0.0,
            fatigue: 0.0,
            ratio: 0.0,
            warmup: false,
            verdict: Verdict::Ignored,
        }
    }

    /// Round the outward-facing numbers to 2 dp; the verdict is already fixed.
    pub fn rounded(&self) -> ScoringResult {
        ScoringResult {
            ratio: round2(self.ratio),
            stimulus: round2(self.stimulus),
            fatigue: round2(self.fatigue),
            verdict: self.verdict,
        }
    }
}

/// Score a raw set. Never fails; bad input is clamped or routed to `ignored`.
pub fn score_set(raw: &RawSetInput) -> ScoringResult {
    breakdown(raw).rounded()
}

/// Same pipeline as [`score_set`] but keeps every unrounded intermediate.
pub fn breakdown(raw: &RawSetInput) -> SetBreakdown {
    let set = ClampedSetInput::from_raw(raw);
    if set.is_degenerate() {
        return SetBreakdown::degenerate(set);
    }

    let reps = set.reps as f64;

    let e1rm = set.load * (1.0 + (reps + set.rir) / 30.0);
    let rel_int = (set.load / e1rm.max(1e-6)).min(REL_INT_CAP);
    let eff_reps = reps.min(EFFECTIVE_REP_WINDOW - set.rir).clamp(0.0, reps);
    let load_factor = load_factor(rel_int);

    let raw_stimulus = eff_reps * load_factor;
    let raw_fatigue = BASE_SET_COST + reps * rel_int.powf(FATIGUE_EXPONENT);

    let warmup = set.reps < WARMUP_MIN_REPS || rel_int < MIN_LOAD_THRESHOLD;
    let (stimulus, fatigue) = if warmup {
        (0.0, 0.0)
    } else {
        (raw_stimulus, raw_fatigue)
    };

    let ratio = if fatigue > 0.0 { stimulus / fatigue } else { 0.0 };
    let verdict = if warmup {
        Verdict::Ignored
    } else {
        classify_ratio(ratio)
    };

    SetBreakdown {
        clamped: set,
        e1rm,
        rel_int,
        eff_reps,
        load_factor,
        stimulus,
        fatigue,
        ratio,
        warmup,
        verdict,
    }
}

/// Piecewise-linear load effectiveness in [0, 1].
pub fn load_factor(rel_int: f64) -> f64 {
    if rel_int <= MIN_LOAD_THRESHOLD {
        0.0
    } else if rel_int >= FULL_LOAD_THRESHOLD {
        1.0
    } else {
        (rel_int - MIN_LOAD_THRESHOLD) / (FULL_LOAD_THRESHOLD - MIN_LOAD_THRESHOLD)
    }
}

/// Tier a (non-warm-up) ratio. Top-down, first match wins.
pub fn classify_ratio(ratio: f64) -> Verdict {
    if ratio >= GREAT_MIN {
        Verdict::Great
    } else if ratio >= GOOD_MIN {
        Verdict::Good
    } else if ratio >= MEH_MIN {
        Verdict::Meh
    } else {
        Verdict::Costly
    }
}

#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn typical_working_set_is_meh() {
        let b = breakdown(&RawSetInput::new(100.0, 8.0, 2.0));
        assert!(approx(b.e1rm, 133.333, 1e-3), "e1rm {}", b.e1rm);
        assert!(approx(b.rel_int, 0.75, 1e-9));
        assert!(approx(b.eff_reps, 3.0, 1e-9));
        assert!(approx(b.load_factor, 1.0, 1e-9));
        assert!(approx(b.stimulus, 3.0, 1e-9));
        // 0.5 + 8 * 0.75^1.25
        let expected_fatigue = 0.5 + 8.0 * 0.75f64.powf(1.25);
        assert!(approx(b.fatigue, expected_fatigue, 1e-9));
        assert!(!b.warmup);
        assert_eq!(b.verdict, Verdict::Meh);

        let r = b.rounded();
        assert!(approx(r.fatigue, 6.08, 1e-9), "fatigue {}", r.fatigue);
        assert!(approx(r.ratio, 0.49, 1e-9), "ratio {}", r.ratio);
        assert_eq!(r.stimulus, 3.0);
    }

    #[test]
    fn null_fields_read_as_zero() {
        let raw: RawSetInput =
            serde_json::from_str(r#"{"load":null,"reps":8,"rir":null}"#).unwrap();
        assert_eq!(raw, RawSetInput::new(0.0, 8.0, 0.0));
        assert_eq!(score_set(&raw), ScoringResult::ignored());
    }

    #[test]
    fn zero_load_is_ignored() {
        let r = score_set(&RawSetInput::new(0.0, 8.0, 2.0));
        assert_eq!(r, ScoringResult::ignored());
    }

    #[test]
    fn low_rep_set_is_warmup() {
        let b = breakdown(&RawSetInput::new(60.0, 2.0, 5.0));
        assert!(b.warmup);
        let r = b.rounded();
        assert_eq!(r.stimulus, 0.0);
        assert_eq!(r.fatigue, 0.0);
        assert_eq!(r.ratio, 0.0);
        assert_eq!(r.verdict, Verdict::Ignored);
    }

    #[test]
    fn inputs_are_clamped() {
        let c = ClampedSetInput::from_raw(&RawSetInput::new(-5.0, 55.4, 9.0));
        assert_eq!(c.load, 0.0);
        assert_eq!(c.reps, 40);
        assert_eq!(c.rir, 6.0);

        let c = ClampedSetInput::from_raw(&RawSetInput::new(50.0, 7.5, -1.0));
        assert_eq!(c.reps, 8);
        assert_eq!(c.rir, 0.0);
    }

    #[test]
    fn non_finite_numbers_become_zero() {
        let r = score_set(&RawSetInput::new(f64::NAN, 8.0, 2.0));
        assert_eq!(r.verdict, Verdict::Ignored);

        let r = score_set(&RawSetInput::new(100.0, 8.0, f64::INFINITY));
        assert!(r.ratio.is_finite());
        assert_ne!(r.verdict, Verdict::Ignored);
    }

    #[test]
    fn high_rir_does_not_go_negative() {
        // rir 6 -> window 5 - 6 < 0, effective reps clamp to 0.
        let b = breakdown(&RawSetInput::new(100.0, 10.0, 6.0));
        assert_eq!(b.eff_reps, 0.0);
        assert_eq!(b.stimulus, 0.0);
        assert!(b.fatigue > 0.0);
        assert_eq!(b.verdict, Verdict::Costly);
    }

    #[test]
    fn close_to_failure_low_reps_is_great() {
        // 5 reps @ rir 0: eff reps 5, relInt = 1/(1+5/30) = 0.857
        let b = breakdown(&RawSetInput::new(80.0, 5.0, 0.0));
        assert_eq!(b.eff_reps, 5.0);
        assert!(b.ratio >= GREAT_MIN, "ratio {}", b.ratio);
        assert_eq!(b.verdict, Verdict::Great);
    }

    #[test]
    fn load_factor_ramp() {
        assert_eq!(load_factor(0.10), 0.0);
        assert_eq!(load_factor(0.30), 0.0);
        assert!(approx(load_factor(0.40), 0.5, 1e-9));
        assert_eq!(load_factor(0.50), 1.0);
        assert_eq!(load_factor(0.98), 1.0);
    }

    #[test]
    fn tier_boundaries_are_inclusive_from_below() {
        assert_eq!(classify_ratio(0.80), Verdict::Great);
        assert_eq!(classify_ratio(0.7999), Verdict::Good);
        assert_eq!(classify_ratio(0.50), Verdict::Good);
        assert_eq!(classify_ratio(0.4999), Verdict::Meh);
        assert_eq!(classify_ratio(0.30), Verdict::Meh);
        assert_eq!(classify_ratio(0.2999), Verdict::Costly);
        assert_eq!(classify_ratio(0.0), Verdict::Costly);
        assert_eq!(classify_ratio(12.0), Verdict::Great);
    }

    #[test]
    fn verdict_uses_unrounded_ratio() {
        // ratio ~0.493 sits just under the `good` floor.
        let b = breakdown(&RawSetInput::new(100.0, 8.0, 2.0));
        assert!(b.ratio < GOOD_MIN);
        assert_eq!(b.verdict, Verdict::Meh);
    }

    #[test]
    fn scoring_is_deterministic() {
        let raw = RawSetInput::new(102.5, 9.0, 1.5);
        let a = score_set(&raw);
        let b = score_set(&raw);
        assert_eq!(a.ratio.to_bits(), b.ratio.to_bits());
        assert_eq!(a.stimulus.to_bits(), b.stimulus.to_bits());
        assert_eq!(a.fatigue.to_bits(), b.fatigue.to_bits());
        assert_eq!(a.verdict, b.verdict);
    }

    #[test]
    fn missing_json_fields_default_to_zero() {
        let raw: RawSetInput = serde_json::from_str(r#"{"load": 80}"#).unwrap();
        assert_eq!(raw.reps, 0.0);
        assert_eq!(score_set(&raw).verdict, Verdict::Ignored);
    }
}
