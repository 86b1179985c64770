#[cfg(test)]
#[path = "../../tests/unit/heuristics/parameter_test.rs"]
mod parameter_test;

use crate::utils::{Float, GenericResult};
use serde::{Deserialize, Serialize};

/// Specifies how an adaptive parameter changes its value over the search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveParameterSettings {
    /// An initial value.
    pub start: i32,
    /// An amount of non improving iterations after which the value is changed.
    pub delta_after_iterations: i32,
    /// A step added to the value.
    pub delta: i32,
    /// A minimum value.
    pub min: i32,
    /// A maximum value.
    pub max: i32,
    /// Resets value to start on improvement.
    pub snap_back_after_improvement: bool,
    /// Reverses direction when value reaches one of the bounds.
    pub zigzag: bool,
}

/// An integer parameter which can adapt its value based on the search progress.
#[derive(Clone, Debug)]
pub struct SolveParameter {
    kind: ParameterKind,
    value: i32,
}

#[derive(Clone, Debug)]
enum ParameterKind {
    Constant,
    Adaptive { settings: SolveParameterSettings, start_delta: i32, delta: i32, iterations: i32 },
}

impl SolveParameter {
    /// Creates a parameter which never changes its value.
    pub fn constant(value: i32) -> Self {
        Self { kind: ParameterKind::Constant, value }
    }

    /// Creates an adaptive parameter.
    pub fn new(settings: SolveParameterSettings) -> GenericResult<Self> {
        if settings.delta_after_iterations < 0 {
            return Err(format!(
                "delta after iterations must not be negative, got {}",
                settings.delta_after_iterations
            )
            .into());
        }

        if settings.start < settings.min {
            return Err(format!("start value {} must be not less than min value {}", settings.start, settings.min).into());
        }

        if settings.start > settings.max {
            return Err(
                format!("start value {} must be not greater than max value {}", settings.start, settings.max).into()
            );
        }

        let delta = match settings.delta {
            delta if settings.start == settings.max && delta > 0 => -delta,
            delta if settings.start == settings.min && delta < 0 => -delta,
            delta => delta,
        };

        let value = settings.start;

        Ok(Self { kind: ParameterKind::Adaptive { settings, start_delta: delta, delta, iterations: 0 }, value })
    }

    /// Returns current value.
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Updates the value using the score change of the last iteration.
    /// Negative delta score means an improvement.
    pub fn update(&mut self, delta_score: Float) {
        let ParameterKind::Adaptive { settings, start_delta, delta, iterations } = &mut self.kind else {
            return;
        };

        if delta_score < 0. {
            *iterations = 0;
            if settings.snap_back_after_improvement && self.value != settings.start {
                *delta = *start_delta;
                self.value = settings.start;
            }
            return;
        }

        *iterations += 1;
        if *iterations <= settings.delta_after_iterations {
            return;
        }

        let is_outbound = (self.value >= settings.max && *delta > 0) || (self.value <= settings.min && *delta < 0);
        if settings.zigzag && is_outbound {
            *delta = -*delta;
        }

        *iterations = 0;
        self.value = (self.value + *delta).clamp(settings.min, settings.max);
    }
}
