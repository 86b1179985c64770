#[cfg(test)]
#[path = "../../../tests/unit/models/problem/time_dependent_test.rs"]
mod time_dependent_test;

use crate::models::common::{DAY, Duration, MINUTE, Timestamp, is_minute_aligned};
use crate::models::problem::{Expression, Stop, VehicleType, next_expression_index};
use crate::utils::{Float, GenericResult};
use std::sync::Arc;

/// A maximum distance between the earliest and the latest interval boundary.
const MAX_HORIZON: Duration = 7. * DAY;

#[derive(Clone)]
struct IntervalElement {
    start: Timestamp,
    end: Timestamp,
    expression: Arc<dyn Expression>,
    is_default: bool,
    next: Option<usize>,
}

/// A duration expression which value depends on the departure time.
///
/// The time axis is covered by a linked list of half open intervals, each controlled by its own
/// expression. Initially, the whole axis is controlled by the default expression. A travel which
/// crosses interval boundaries is evaluated proportionally: the part of the travel done within an
/// interval is scaled by that interval expression.
#[derive(Clone)]
pub struct TimeDependentExpression {
    index: usize,
    name: String,
    default: Arc<dyn Expression>,
    elements: Vec<IntervalElement>,
    head: usize,
    lookup: Vec<usize>,
    earliest: Option<Timestamp>,
    latest: Option<Timestamp>,
    expressions: Vec<Arc<dyn Expression>>,
    satisfies_triangle_inequality: bool,
}

impl TimeDependentExpression {
    /// Creates a new instance of `TimeDependentExpression` with given default expression.
    pub fn new(default: Arc<dyn Expression>) -> GenericResult<Self> {
        if default.has_negative_values() {
            return Err(format!("default expression '{}' has negative values", default.name()).into());
        }

        let element =
            IntervalElement { start: 0., end: Float::MAX, expression: default.clone(), is_default: true, next: None };

        Ok(Self {
            index: next_expression_index(),
            name: format!("time dependent {}", default.name()),
            default,
            elements: vec![element],
            head: 0,
            lookup: Vec::default(),
            earliest: None,
            latest: None,
            expressions: Vec::default(),
            satisfies_triangle_inequality: false,
        })
    }

    /// Returns the default expression.
    pub fn default_expression(&self) -> &Arc<dyn Expression> {
        &self.default
    }

    /// Returns all non default expressions in order of registration, each one only once.
    pub fn expressions(&self) -> &[Arc<dyn Expression>] {
        self.expressions.as_slice()
    }

    /// Returns true if at least one interval has its own expression.
    pub fn is_dependent_on_time(&self) -> bool {
        !self.expressions.is_empty()
    }

    /// Returns true if expression is declared to satisfy triangle inequality.
    pub fn satisfies_triangle_inequality(&self) -> bool {
        self.satisfies_triangle_inequality
    }

    /// Declares whether expression satisfies triangle inequality.
    pub fn set_satisfies_triangle_inequality(&mut self, satisfies: bool) {
        self.satisfies_triangle_inequality = satisfies;
    }

    /// Sets an expression applied for departures within `[start, end)`.
    pub fn set_expression(&mut self, start: Timestamp, end: Timestamp, expression: Arc<dyn Expression>) -> GenericResult<()> {
        if start < 0. {
            return Err(format!("start {start} is before epoch").into());
        }

        if start > end {
            return Err(format!("start {start} is after end {end}").into());
        }

        if !is_minute_aligned(start) || !is_minute_aligned(end) {
            return Err(format!("interval [{start}, {end}) is not on minute boundaries").into());
        }

        if expression.has_negative_values() {
            return Err(format!("expression '{}' has negative values", expression.name()).into());
        }

        let earliest = self.earliest.map_or(start, |earliest| earliest.min(start));
        let latest = self.latest.map_or(end, |latest| latest.max(end));
        if latest - earliest > MAX_HORIZON {
            return Err(format!("intervals span from {earliest} till {latest}, which is more than 7 days").into());
        }

        if let Some(other) = self.elements.iter().find(|e| !e.is_default && start < e.end && e.start < end) {
            return Err(format!(
                "interval [{start}, {end}) overlaps with interval [{}, {}) of '{}'",
                other.start,
                other.end,
                other.expression.name()
            )
            .into());
        }

        let container = self
            .elements
            .iter()
            .position(|e| e.is_default && e.start <= start && end <= e.end)
            .ok_or_else(|| format!("cannot find default interval which contains [{start}, {end})"))?;

        let old_end = self.elements[container].end;
        let old_next = self.elements[container].next;

        let inserted = self.elements.len();
        let right = inserted + 1;

        self.elements.push(IntervalElement { start, end, expression: expression.clone(), is_default: false, next: Some(right) });
        self.elements.push(IntervalElement {
            start: end,
            end: old_end,
            expression: self.default.clone(),
            is_default: true,
            next: old_next,
        });

        let left = &mut self.elements[container];
        left.end = start;
        left.next = Some(inserted);

        if !self.expressions.iter().any(|e| e.index() == expression.index()) {
            self.expressions.push(expression);
        }

        self.earliest = Some(earliest);
        self.latest = Some(latest);
        self.rebuild_lookup();

        Ok(())
    }

    /// Returns the expression applied at given time.
    pub fn expression_at_time(&self, time: Timestamp) -> &Arc<dyn Expression> {
        &self.elements[self.element_index_at(time)].expression
    }

    /// Returns the duration of travel started at given time.
    pub fn value_at_time(
        &self,
        time: Timestamp,
        vehicle_type: Option<&VehicleType>,
        from: Option<&Stop>,
        to: Option<&Stop>,
    ) -> Duration {
        self.value_at_value(time, vehicle_type, from, to)
    }

    /// Returns the duration of travel started at given time, a travel which crosses interval
    /// boundaries consumes the remainder proportionally in the following intervals.
    pub fn value_at_value(
        &self,
        departure: Timestamp,
        vehicle_type: Option<&VehicleType>,
        from: Option<&Stop>,
        to: Option<&Stop>,
    ) -> Duration {
        let element = &self.elements[self.element_index_at(departure)];
        let value = element.expression.value(vehicle_type, from, to);

        if value == 0. {
            return 0.;
        }

        assert!(value > 0., "time dependent expression '{}' returned negative value {value}", self.name);

        let mut fraction = (element.end - departure) / value;
        if fraction >= 1. {
            return value;
        }

        let mut duration = value * fraction;
        let mut next = element.next;

        while let Some(index) = next {
            let element = &self.elements[index];
            let required = (1. - fraction) * element.expression.value(vehicle_type, from, to);

            if required == 0. {
                return duration;
            }

            let can = (element.end - element.start) / required;
            if can >= 1. {
                return duration + required;
            }

            duration += can * required;
            fraction += can * (1. - fraction);
            next = element.next;
        }

        duration
    }

    fn element_index_at(&self, time: Timestamp) -> usize {
        match (self.earliest, self.latest) {
            (Some(earliest), _) if time < earliest => self.head,
            (_, Some(latest)) if time >= latest => self.tail(),
            (Some(earliest), Some(_)) => {
                let slot = ((time - earliest) / MINUTE).floor() as usize;
                self.lookup.get(slot).copied().unwrap_or_else(|| self.tail())
            }
            _ => self.head,
        }
    }

    fn tail(&self) -> usize {
        let mut current = self.head;
        while let Some(next) = self.elements[current].next {
            current = next;
        }

        current
    }

    fn rebuild_lookup(&mut self) {
        let (Some(earliest), Some(latest)) = (self.earliest, self.latest) else {
            self.lookup.clear();
            return;
        };

        let size = ((latest - earliest) / MINUTE).ceil() as usize;
        let mut lookup = vec![self.head; size];

        let mut current = Some(self.head);
        while let Some(index) = current {
            let element = &self.elements[index];
            let from = element.start.max(earliest);
            let to = element.end.min(latest);

            let mut minute = from;
            while minute < to {
                let slot = ((minute - earliest) / MINUTE).floor() as usize;
                if let Some(entry) = lookup.get_mut(slot) {
                    *entry = index;
                }
                minute += MINUTE;
            }

            current = element.next;
        }

        self.lookup = lookup;
    }
}

impl Expression for TimeDependentExpression {
    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the default expression value.
    ///
    /// # Panics
    /// Panics if the expression depends on time: [`TimeDependentExpression::value_at_time`] has to
    /// be used instead.
    fn value(&self, vehicle_type: Option<&VehicleType>, from: Option<&Stop>, to: Option<&Stop>) -> Float {
        assert!(!self.is_dependent_on_time(), "time dependent expression '{}' is evaluated without time", self.name);

        self.default.value(vehicle_type, from, to)
    }

    fn has_positive_values(&self) -> bool {
        self.default.has_positive_values() || self.expressions.iter().any(|e| e.has_positive_values())
    }

    fn has_negative_values(&self) -> bool {
        false
    }
}
