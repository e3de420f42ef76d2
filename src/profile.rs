//! Profiles: how target concurrency evolves over the course of a run
//!
//! A profile is a pure function of elapsed time: given how long the run has
//! been going, it answers how many scenario invocations should be in flight.
//! The executor's controller samples it once per tick and reconciles the live
//! worker count toward the answer.
//!
//! Five shapes are provided, each a small validated struct:
//!
//! | kind       | shape                                                        |
//! |------------|--------------------------------------------------------------|
//! | [`Constant`] | `base` for the whole run                                   |
//! | [`RampUp`]   | linear from `base` toward `peak`                           |
//! | [`Spike`]    | `peak` inside a window, `base` outside it                  |
//! | [`Wave`]     | sinusoid between `base` and `peak`, `frequency` full cycles |
//! | [`Step`]     | `steps` equal plateaus climbing from `base` to `peak`       |
//!
//! Every profile returns `0` once `elapsed >= total_duration()`.
//!
//! Profiles can be built directly through their constructors or from a
//! serializable [`ProfileConfig`] with [`build_profile`]. Either path validates
//! up front, so a constructed profile can always be evaluated without panics.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use onda::profile::{ConcurrencyProfile, RampUp};
//!
//! let ramp = RampUp::new(0, 100, Duration::from_secs(10)).unwrap();
//! assert_eq!(ramp.concurrency(Duration::ZERO), 0);
//! assert_eq!(ramp.concurrency(Duration::from_secs(5)), 50);
//! assert_eq!(ramp.concurrency(Duration::from_secs(10)), 0);
//! ```
use std::{f64::consts::TAU, fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Maps elapsed run time to a target number of concurrent invocations.
///
/// Implementations must be deterministic and cheap: the controller calls
/// `concurrency` on every tick.
pub trait ConcurrencyProfile: Send + Sync {
    /// Target concurrency `elapsed` into the run. Must be `0` once
    /// `elapsed >= self.total_duration()`.
    fn concurrency(&self, elapsed: Duration) -> usize;

    /// Length of the run this profile describes.
    fn total_duration(&self) -> Duration;
}

/// Position of `elapsed` inside `duration` as a value in `[0.0, 1.0)`.
///
/// Callers check `elapsed < duration` first, which also rules out a zero
/// `duration`.
fn progress(elapsed: Duration, duration: Duration) -> f64 {
    elapsed.as_secs_f64() / duration.as_secs_f64()
}

fn check_duration(duration: Duration) -> Result<(), ConfigurationError> {
    if duration.is_zero() {
        return Err(ConfigurationError::invalid(
            "duration",
            "must be greater than zero",
        ));
    }
    Ok(())
}

fn check_monotonic(base: usize, peak: usize) -> Result<(), ConfigurationError> {
    if peak < base {
        return Err(ConfigurationError::invalid(
            "peak_concurrency",
            format!("must be >= base concurrency ({base}), got {peak}"),
        ));
    }
    Ok(())
}

/// Fixed concurrency for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constant {
    base: usize,
    duration: Duration,
}

impl Constant {
    pub fn new(base: usize, duration: Duration) -> Result<Self, ConfigurationError> {
        check_duration(duration)?;
        Ok(Self { base, duration })
    }
}

impl ConcurrencyProfile for Constant {
    fn concurrency(&self, elapsed: Duration) -> usize {
        if elapsed >= self.duration {
            return 0;
        }
        self.base
    }

    fn total_duration(&self) -> Duration {
        self.duration
    }
}

/// Linear ramp: `base + floor((peak - base) * elapsed / duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampUp {
    base: usize,
    peak: usize,
    duration: Duration,
}

impl RampUp {
    /// Requires `peak >= base`.
    pub fn new(base: usize, peak: usize, duration: Duration) -> Result<Self, ConfigurationError> {
        check_duration(duration)?;
        check_monotonic(base, peak)?;
        Ok(Self {
            base,
            peak,
            duration,
        })
    }
}

impl ConcurrencyProfile for RampUp {
    fn concurrency(&self, elapsed: Duration) -> usize {
        if elapsed >= self.duration {
            return 0;
        }
        let span = (self.peak - self.base) as f64;
        self.base + (span * progress(elapsed, self.duration)).floor() as usize
    }

    fn total_duration(&self) -> Duration {
        self.duration
    }
}

/// `peak` while `start <= elapsed < start + length`, `base` otherwise.
///
/// `peak` may be lower than `base`, which turns the spike into a dip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spike {
    base: usize,
    peak: usize,
    duration: Duration,
    start: Duration,
    length: Duration,
}

impl Spike {
    pub fn new(
        base: usize,
        peak: usize,
        duration: Duration,
        start: Duration,
        length: Duration,
    ) -> Result<Self, ConfigurationError> {
        check_duration(duration)?;
        if start > duration {
            return Err(ConfigurationError::invalid(
                "spike_start",
                format!("{start:?} lies past the run duration {duration:?}"),
            ));
        }
        match start.checked_add(length) {
            Some(end) if end <= duration => {}
            _ => {
                return Err(ConfigurationError::invalid(
                    "spike_duration",
                    format!("spike of {length:?} starting at {start:?} overruns {duration:?}"),
                ))
            }
        }
        Ok(Self {
            base,
            peak,
            duration,
            start,
            length,
        })
    }
}

impl ConcurrencyProfile for Spike {
    fn concurrency(&self, elapsed: Duration) -> usize {
        if elapsed >= self.duration {
            return 0;
        }
        if elapsed >= self.start && elapsed < self.start + self.length {
            self.peak
        } else {
            self.base
        }
    }

    fn total_duration(&self) -> Duration {
        self.duration
    }
}

/// Sinusoid oscillating between `base` and `peak`:
///
/// ```text
/// base + floor((peak - base) * (0.5 + 0.5 * sin(2π * frequency * elapsed / duration)))
/// ```
///
/// The run starts at the midpoint and completes `frequency` full cycles.
/// `peak < base` is accepted and inverts the wave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wave {
    base: usize,
    peak: usize,
    duration: Duration,
    frequency: f64,
}

impl Wave {
    pub fn new(
        base: usize,
        peak: usize,
        duration: Duration,
        frequency: f64,
    ) -> Result<Self, ConfigurationError> {
        check_duration(duration)?;
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(ConfigurationError::invalid(
                "frequency",
                format!("must be a finite number of cycles > 0, got {frequency}"),
            ));
        }
        Ok(Self {
            base,
            peak,
            duration,
            frequency,
        })
    }
}

impl ConcurrencyProfile for Wave {
    fn concurrency(&self, elapsed: Duration) -> usize {
        if elapsed >= self.duration {
            return 0;
        }
        let phase = TAU * self.frequency * progress(elapsed, self.duration);
        let level = 0.5 + 0.5 * phase.sin();
        let delta = ((self.peak as f64 - self.base as f64) * level).floor();
        (self.base as f64 + delta).max(0.0) as usize
    }

    fn total_duration(&self) -> Duration {
        self.duration
    }
}

/// `steps` equal-width plateaus. Bucket `i` (0-based) holds
/// `base + ceil((peak - base) * (i + 1) / steps)`, so the last plateau is
/// exactly `peak`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    base: usize,
    peak: usize,
    duration: Duration,
    steps: u32,
}

impl Step {
    /// Requires `steps > 0` and `peak >= base`.
    pub fn new(
        base: usize,
        peak: usize,
        duration: Duration,
        steps: u32,
    ) -> Result<Self, ConfigurationError> {
        check_duration(duration)?;
        if steps == 0 {
            return Err(ConfigurationError::invalid("steps", "must be at least 1"));
        }
        check_monotonic(base, peak)?;
        Ok(Self {
            base,
            peak,
            duration,
            steps,
        })
    }
}

impl ConcurrencyProfile for Step {
    fn concurrency(&self, elapsed: Duration) -> usize {
        if elapsed >= self.duration {
            return 0;
        }
        let steps = u128::from(self.steps);
        // integer bucketing keeps plateau edges exact
        let bucket = (elapsed.as_nanos() * steps / self.duration.as_nanos()).min(steps - 1);
        let span = (self.peak - self.base) as u128;
        let rise = (span * (bucket + 1)).div_ceil(steps);
        self.base + rise as usize
    }

    fn total_duration(&self) -> Duration {
        self.duration
    }
}

/// Discriminant of [`LoadProfile`], also the `kind` tag of [`ProfileConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Constant,
    RampUp,
    Spike,
    Wave,
    Step,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::RampUp => "ramp_up",
            Self::Spike => "spike",
            Self::Wave => "wave",
            Self::Step => "step",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any of the built-in profile shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadProfile {
    Constant(Constant),
    RampUp(RampUp),
    Spike(Spike),
    Wave(Wave),
    Step(Step),
}

impl LoadProfile {
    pub fn kind(&self) -> ProfileKind {
        match self {
            Self::Constant(_) => ProfileKind::Constant,
            Self::RampUp(_) => ProfileKind::RampUp,
            Self::Spike(_) => ProfileKind::Spike,
            Self::Wave(_) => ProfileKind::Wave,
            Self::Step(_) => ProfileKind::Step,
        }
    }

    fn as_dyn(&self) -> &dyn ConcurrencyProfile {
        match self {
            Self::Constant(p) => p,
            Self::RampUp(p) => p,
            Self::Spike(p) => p,
            Self::Wave(p) => p,
            Self::Step(p) => p,
        }
    }
}

impl ConcurrencyProfile for LoadProfile {
    fn concurrency(&self, elapsed: Duration) -> usize {
        self.as_dyn().concurrency(elapsed)
    }

    fn total_duration(&self) -> Duration {
        self.as_dyn().total_duration()
    }
}

macro_rules! impl_from_shape {
    ($($shape:ident),*) => {
        $(
            impl From<$shape> for LoadProfile {
                fn from(value: $shape) -> Self {
                    Self::$shape(value)
                }
            }
        )*
    };
}

impl_from_shape!(Constant, RampUp, Spike, Wave, Step);

/// Flat, serializable description of a profile.
///
/// Durations are expressed in milliseconds. Kind-specific fields are optional
/// at the serde level and checked by [`build_profile`].
///
/// ```rust
/// use onda::profile::{build_profile, ProfileConfig, ProfileKind};
///
/// let config = ProfileConfig {
///     kind: ProfileKind::Step,
///     base_concurrency: 0,
///     peak_concurrency: Some(40),
///     duration_ms: 60_000,
///     steps: Some(4),
///     ..ProfileConfig::default()
/// };
/// let profile = build_profile(&config).unwrap();
/// assert_eq!(profile.kind(), ProfileKind::Step);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    pub kind: ProfileKind,
    #[serde(default)]
    pub base_concurrency: usize,
    /// Ignored by `constant`, required by every other kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_concurrency: Option<usize>,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spike_start_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spike_duration_ms: Option<u64>,
    /// Full cycles over the run, `wave` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            kind: ProfileKind::Constant,
            base_concurrency: 0,
            peak_concurrency: None,
            duration_ms: 0,
            spike_start_ms: None,
            spike_duration_ms: None,
            frequency: None,
            steps: None,
        }
    }
}

impl ProfileConfig {
    fn require<T: Copy>(&self, value: Option<T>, field: &'static str) -> Result<T, ConfigurationError> {
        value.ok_or(ConfigurationError::Missing {
            field,
            kind: self.kind.as_str(),
        })
    }
}

/// Validate `config` and build the matching [`LoadProfile`].
///
/// Fails with a [`ConfigurationError`] naming the first invalid or missing
/// field. Building twice from the same config yields identical profiles.
pub fn build_profile(config: &ProfileConfig) -> Result<LoadProfile, ConfigurationError> {
    let base = config.base_concurrency;
    let duration = Duration::from_millis(config.duration_ms);

    let profile: LoadProfile = match config.kind {
        ProfileKind::Constant => Constant::new(base, duration)?.into(),
        ProfileKind::RampUp => {
            let peak = config.require(config.peak_concurrency, "peak_concurrency")?;
            RampUp::new(base, peak, duration)?.into()
        }
        ProfileKind::Spike => {
            let peak = config.require(config.peak_concurrency, "peak_concurrency")?;
            let start = config.require(config.spike_start_ms, "spike_start")?;
            let length = config.require(config.spike_duration_ms, "spike_duration")?;
            Spike::new(
                base,
                peak,
                duration,
                Duration::from_millis(start),
                Duration::from_millis(length),
            )?
            .into()
        }
        ProfileKind::Wave => {
            let peak = config.require(config.peak_concurrency, "peak_concurrency")?;
            let frequency = config.require(config.frequency, "frequency")?;
            Wave::new(base, peak, duration, frequency)?.into()
        }
        ProfileKind::Step => {
            let peak = config.require(config.peak_concurrency, "peak_concurrency")?;
            let steps = config.require(config.steps, "steps")?;
            Step::new(base, peak, duration, steps)?.into()
        }
    };
    Ok(profile)
}

impl TryFrom<&ProfileConfig> for LoadProfile {
    type Error = ConfigurationError;

    fn try_from(value: &ProfileConfig) -> Result<Self, Self::Error> {
        build_profile(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn all_kinds() -> Vec<LoadProfile> {
        vec![
            Constant::new(5, secs(10)).unwrap().into(),
            RampUp::new(2, 12, secs(10)).unwrap().into(),
            Spike::new(1, 20, secs(10), secs(2), secs(3)).unwrap().into(),
            Wave::new(10, 50, secs(10), 2.0).unwrap().into(),
            Step::new(0, 100, secs(10), 4).unwrap().into(),
        ]
    }

    #[test]
    fn every_kind_is_zero_from_the_end_of_the_run() {
        for profile in all_kinds() {
            let end = profile.total_duration();
            for extra in [0, 1, 100, 60_000] {
                assert_eq!(
                    profile.concurrency(end + ms(extra)),
                    0,
                    "{} not zero at {:?}",
                    profile.kind(),
                    end + ms(extra)
                );
            }
        }
    }

    #[test]
    fn zero_duration_returns_zero_without_panicking() {
        let d = Duration::ZERO;
        let profiles: Vec<LoadProfile> = vec![
            Constant { base: 3, duration: d }.into(),
            RampUp { base: 1, peak: 9, duration: d }.into(),
            Spike { base: 1, peak: 9, duration: d, start: d, length: d }.into(),
            Wave { base: 1, peak: 9, duration: d, frequency: 1.0 }.into(),
            Step { base: 1, peak: 9, duration: d, steps: 3 }.into(),
        ];
        for profile in profiles {
            assert_eq!(profile.concurrency(Duration::ZERO), 0);
        }
    }

    mod constant {
        use super::*;

        #[test]
        fn holds_base() {
            let p = Constant::new(5, secs(1)).unwrap();
            assert_eq!(p.concurrency(Duration::ZERO), 5);
            assert_eq!(p.concurrency(ms(999)), 5);
            assert_eq!(p.concurrency(secs(1)), 0);
        }

        #[test]
        fn rejects_zero_duration() {
            let err = Constant::new(5, Duration::ZERO).unwrap_err();
            assert_eq!(err.field(), "duration");
        }
    }

    mod ramp_up {
        use super::*;

        #[test]
        fn starts_at_base_and_approaches_peak() {
            let p = RampUp::new(2, 12, secs(10)).unwrap();
            assert_eq!(p.concurrency(Duration::ZERO), 2);
            assert_eq!(p.concurrency(secs(5)), 7);
            let last = p.concurrency(secs(10) - ms(1));
            assert!((11..=12).contains(&last), "got {last}");
        }

        #[test]
        fn is_non_decreasing() {
            let p = RampUp::new(0, 37, secs(3)).unwrap();
            let mut prev = 0;
            for t in (0..3000).step_by(7) {
                let c = p.concurrency(ms(t));
                assert!(c >= prev);
                prev = c;
            }
        }

        #[test]
        fn rejects_peak_below_base() {
            let err = RampUp::new(10, 5, secs(1)).unwrap_err();
            assert_eq!(err.field(), "peak_concurrency");
        }
    }

    mod spike {
        use super::*;

        #[test]
        fn peak_only_inside_window() {
            let p = Spike::new(1, 20, secs(10), secs(2), secs(3)).unwrap();
            assert_eq!(p.concurrency(Duration::ZERO), 1);
            assert_eq!(p.concurrency(ms(1999)), 1);
            assert_eq!(p.concurrency(secs(2)), 20);
            assert_eq!(p.concurrency(ms(3500)), 20);
            assert_eq!(p.concurrency(ms(4999)), 20);
            assert_eq!(p.concurrency(secs(5)), 1);
            assert_eq!(p.concurrency(ms(9999)), 1);
        }

        #[test]
        fn peak_below_base_is_a_dip() {
            let p = Spike::new(30, 4, secs(10), secs(1), secs(1)).unwrap();
            assert_eq!(p.concurrency(ms(500)), 30);
            assert_eq!(p.concurrency(ms(1500)), 4);
            assert_eq!(p.concurrency(ms(2500)), 30);
        }

        #[test]
        fn window_may_touch_the_end() {
            let p = Spike::new(1, 9, secs(10), secs(8), secs(2)).unwrap();
            assert_eq!(p.concurrency(ms(9999)), 9);
        }

        #[test]
        fn rejects_window_overrunning_duration() {
            let err = Spike::new(1, 9, secs(10), secs(8), secs(3)).unwrap_err();
            assert_eq!(err.field(), "spike_duration");

            let err = Spike::new(1, 9, secs(10), secs(11), Duration::ZERO).unwrap_err();
            assert_eq!(err.field(), "spike_start");
        }
    }

    mod wave {
        use super::*;

        #[test]
        fn oscillates_between_base_and_peak() {
            let p = Wave::new(10, 50, secs(10), 2.0).unwrap();
            let values: Vec<usize> = (0..10_000).step_by(10).map(|t| p.concurrency(ms(t))).collect();
            let min = *values.iter().min().unwrap();
            let max = *values.iter().max().unwrap();
            assert!(min >= 10 && min <= 11, "min {min}");
            assert!(max >= 49 && max <= 50, "max {max}");
            // midpoint at the start of the run
            assert_eq!(p.concurrency(Duration::ZERO), 30);
            // quarter of the first period is the crest
            assert_eq!(p.concurrency(ms(1250)), 50);
        }

        #[test]
        fn repeats_every_period() {
            // duration / frequency
            let period = secs(5);
            let p = Wave::new(0, 100, secs(10), 2.0).unwrap();
            for t in (0..5000).step_by(125) {
                let a = p.concurrency(ms(t)) as i64;
                let b = p.concurrency(ms(t) + period) as i64;
                // sin(x) and sin(x + 2π) differ in the last ulp
                assert!((a - b).abs() <= 1, "t={t}ms: {a} vs {b}");
            }
        }

        #[test]
        fn inverted_wave_stays_in_range() {
            let p = Wave::new(40, 8, secs(4), 1.0).unwrap();
            for t in (0..4000).step_by(5) {
                let c = p.concurrency(ms(t));
                assert!((8..=40).contains(&c), "t={t}ms gave {c}");
            }
        }

        #[test]
        fn vanishing_frequency_sits_at_the_midpoint() {
            let p = Wave::new(0, 10, secs(1), 1e-300).unwrap();
            for t in (0..1000).step_by(50) {
                assert_eq!(p.concurrency(ms(t)), 5);
            }
            assert_eq!(p.concurrency(secs(1)), 0);
        }

        #[test]
        fn rejects_non_positive_frequency() {
            for f in [0.0, -1.0, f64::NAN, f64::INFINITY] {
                let err = Wave::new(0, 10, secs(1), f).unwrap_err();
                assert_eq!(err.field(), "frequency");
            }
        }
    }

    mod step {
        use super::*;

        #[test]
        fn plateaus_land_on_peak() {
            let p = Step::new(0, 100, secs(10), 4).unwrap();
            assert_eq!(p.concurrency(Duration::ZERO), 25);
            assert_eq!(p.concurrency(ms(2499)), 25);
            assert_eq!(p.concurrency(ms(2500)), 50);
            assert_eq!(p.concurrency(ms(5000)), 75);
            assert_eq!(p.concurrency(ms(9999)), 100);
        }

        #[test]
        fn non_decreasing_with_exactly_steps_levels() {
            let p = Step::new(3, 17, secs(7), 5).unwrap();
            let mut levels: Vec<usize> = Vec::new();
            for t in (0..7000).step_by(10) {
                let c = p.concurrency(ms(t));
                match levels.last() {
                    Some(&last) => {
                        assert!(c >= last);
                        if c != last {
                            levels.push(c);
                        }
                    }
                    None => levels.push(c),
                }
            }
            assert_eq!(levels.len(), 5, "{levels:?}");
            assert_eq!(*levels.last().unwrap(), 17);
        }

        #[test]
        fn rejects_zero_steps_and_descending_levels() {
            assert_eq!(Step::new(0, 10, secs(1), 0).unwrap_err().field(), "steps");
            assert_eq!(
                Step::new(10, 0, secs(1), 2).unwrap_err().field(),
                "peak_concurrency"
            );
        }
    }

    mod config {
        use super::*;

        #[test]
        fn parses_and_builds_spike() {
            let json = r#"{
                "kind": "spike",
                "base_concurrency": 2,
                "peak_concurrency": 40,
                "duration_ms": 10000,
                "spike_start_ms": 4000,
                "spike_duration_ms": 1000
            }"#;
            let config: ProfileConfig = serde_json::from_str(json).unwrap();
            let profile = build_profile(&config).unwrap();
            assert_eq!(profile.kind(), ProfileKind::Spike);
            assert_eq!(profile.total_duration(), secs(10));
            assert_eq!(profile.concurrency(ms(4500)), 40);
            assert_eq!(profile.concurrency(ms(5500)), 2);
        }

        #[test]
        fn unknown_kind_and_fields_are_rejected() {
            let bad_kind = r#"{ "kind": "sawtooth", "duration_ms": 10 }"#;
            assert!(serde_json::from_str::<ProfileConfig>(bad_kind).is_err());

            let bad_field = r#"{ "kind": "constant", "duration_ms": 10, "rps": 3 }"#;
            assert!(serde_json::from_str::<ProfileConfig>(bad_field).is_err());
        }

        #[test]
        fn missing_kind_specific_field_is_named() {
            let config = ProfileConfig {
                kind: ProfileKind::Wave,
                base_concurrency: 1,
                peak_concurrency: Some(5),
                duration_ms: 1000,
                ..ProfileConfig::default()
            };
            let err = build_profile(&config).unwrap_err();
            assert_eq!(
                err,
                ConfigurationError::Missing {
                    field: "frequency",
                    kind: "wave"
                }
            );
            assert_eq!(err.to_string(), "missing `frequency` for wave profile");
        }

        #[test]
        fn zero_duration_is_rejected() {
            let config = ProfileConfig {
                kind: ProfileKind::Constant,
                base_concurrency: 1,
                ..ProfileConfig::default()
            };
            assert_eq!(build_profile(&config).unwrap_err().field(), "duration");
        }

        #[test]
        fn building_twice_gives_identical_functions() {
            let config = ProfileConfig {
                kind: ProfileKind::Wave,
                base_concurrency: 3,
                peak_concurrency: Some(90),
                duration_ms: 30_000,
                frequency: Some(3.5),
                ..ProfileConfig::default()
            };
            let a = build_profile(&config).unwrap();
            let b = LoadProfile::try_from(&config).unwrap();
            assert_eq!(a, b);
            for t in (0..31_000).step_by(37) {
                assert_eq!(a.concurrency(ms(t)), b.concurrency(ms(t)));
            }
        }
    }
}
