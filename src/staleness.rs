//! Release freshness score.

use chrono::{DateTime, Utc};

pub const DEFAULT_TARGET_INTERVAL_DAYS: f64 = 1.;

const SECS_PER_DAY: f64 = 86_400.;

// Bounds that keep the score representable, i.e. above zero.
const MAX_DAYS_AGO: f64 = 1e12;
const MIN_TARGET_INTERVAL_DAYS: f64 = 1e-6;

/// Staleness of a project whose last release was at `last_release`, measured
/// now. See [`staleness_at`].
pub fn staleness(last_release: DateTime<Utc>, target_interval_days: f64) -> f64 {
    staleness_at(last_release, Utc::now(), target_interval_days)
}

/// Scores how fresh a release is, in `(0, 1]`.
///
/// `1` means just released; the score decays towards `0` as days pass, slower
/// for projects expected to release less often. A release dated after `now`
/// counts as just released. A non-positive target falls back to one day.
pub fn staleness_at(
    last_release: DateTime<Utc>,
    now: DateTime<Utc>,
    target_interval_days: f64,
) -> f64 {
    let elapsed = now.signed_duration_since(last_release);
    let days_ago = elapsed.num_milliseconds() as f64 / 1000. / SECS_PER_DAY;
    staleness_for_days(days_ago, target_interval_days)
}

/// [`staleness_at`] over fractional days.
///
/// Ages beyond a trillion days score as that age, and positive targets under a
/// millionth of a day as that target.
pub fn staleness_for_days(days_ago: f64, target_interval_days: f64) -> f64 {
    let days_ago = if days_ago.is_nan() { 0. } else { days_ago.clamp(0., MAX_DAYS_AGO) };
    let target = if target_interval_days.is_finite() && target_interval_days > 0. {
        target_interval_days.max(MIN_TARGET_INTERVAL_DAYS)
    } else {
        DEFAULT_TARGET_INTERVAL_DAYS
    };
    // shapes a 1/(sqrt(x)+1)-like curve, stretched by the release target
    let coeff = 1. / (2.4 * target.powf(0.7));
    1. / ((coeff * days_ago + 1.) * (coeff * days_ago.sqrt() + 1.))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    fn inputs(days: u32, target: u16) -> (f64, f64) {
        // keeps days under ~a century and targets within (0, 65.5]
        let days = (days % 36_500) as f64 / 1.7;
        let target = (target as f64 + 1.) / 1000.;
        (days, target * 65.)
    }

    #[quickcheck]
    fn prop_score_is_bounded(days: u32, target: u16) -> bool {
        let (days, target) = inputs(days, target);
        let x = staleness_for_days(days, target);
        x > 0. && x <= 1.
    }

    #[quickcheck]
    fn prop_score_decreases_with_age(days: u32, extra: u16, target: u16) -> TestResult {
        if extra == 0 {
            return TestResult::discard();
        }
        let (days, target) = inputs(days, target);
        let later = days + extra as f64 / 10.;
        let older = staleness_for_days(later, target);
        let newer = staleness_for_days(days, target);
        TestResult::from_bool(older < newer)
    }

    #[quickcheck]
    fn prop_longer_target_decays_slower(days: u32, target: u16) -> TestResult {
        let (days, target) = inputs(days, target);
        if days == 0. {
            return TestResult::discard();
        }
        let slow = staleness_for_days(days, target * 2.);
        let fast = staleness_for_days(days, target);
        TestResult::from_bool(slow > fast)
    }

    #[quickcheck]
    fn prop_score_is_bounded_for_any_input(days: f64, target: f64) -> bool {
        let x = staleness_for_days(days, target);
        x > 0. && x <= 1.
    }

    #[test]
    fn test_extreme_inputs_stay_above_zero() {
        assert!(staleness_for_days(1e300, 1.) > 0.);
        assert!(staleness_for_days(f64::INFINITY, 1.) > 0.);
        assert!(staleness_for_days(f64::MAX, f64::MIN_POSITIVE) > 0.);
        assert_eq!(staleness_for_days(f64::NEG_INFINITY, 1.), 1.);
        assert_eq!(staleness_for_days(1e300, 1.), staleness_for_days(MAX_DAYS_AGO, 1.));
    }

    #[test]
    fn test_fresh_release_scores_one() {
        assert_eq!(staleness_for_days(0., 1.), 1.);
        assert_eq!(staleness_for_days(0., 30.), 1.);
        let now = Utc::now();
        assert_eq!(staleness_at(now, now, 7.), 1.);
    }

    #[test]
    fn test_old_release_approaches_zero() {
        assert!(staleness_for_days(1e6, 1.) < 1e-4);
        assert!(staleness_for_days(1e12, 30.) > 0.);
    }

    #[test]
    fn test_known_values() {
        // coeff = 1 / 2.4 for the default target
        let x = staleness_for_days(2.4, 1.);
        let expected = 1. / (2. * (2.4f64.sqrt() / 2.4 + 1.));
        assert!((x - expected).abs() < 1e-12);
    }

    #[test]
    fn test_future_release_is_clamped() {
        let now = Utc::now();
        assert_eq!(staleness_at(now + Duration::days(3), now, 1.), 1.);
        assert_eq!(staleness_for_days(-0.5, 1.), 1.);
    }

    #[test]
    fn test_invalid_target_falls_back_to_default() {
        let x = staleness_for_days(5., DEFAULT_TARGET_INTERVAL_DAYS);
        assert_eq!(staleness_for_days(5., 0.), x);
        assert_eq!(staleness_for_days(5., -3.), x);
        assert_eq!(staleness_for_days(5., f64::NAN), x);
    }

    #[test]
    fn test_staleness_uses_wall_clock() {
        let week_ago = Utc::now() - Duration::days(7);
        let x = staleness(week_ago, 1.);
        let expected = staleness_for_days(7., 1.);
        assert!((x - expected).abs() < 1e-3);
    }
}
