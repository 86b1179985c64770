#[cfg(test)]
#[path = "../../../tests/unit/models/problem/expressions_test.rs"]
mod expressions_test;

use crate::models::common::Location;
use crate::models::problem::{Stop, VehicleType};
use crate::utils::{Float, GenericResult};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

static EXPRESSION_INDEX: AtomicUsize = AtomicUsize::new(0);

/// Returns a new globally unique expression index.
pub fn next_expression_index() -> usize {
    EXPRESSION_INDEX.fetch_add(1, Ordering::Relaxed)
}

/// Specifies which arguments an expression depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    /// Returns the same value for any arguments.
    Constant,
    /// Depends only on the destination stop.
    Stop,
    /// Depends only on the vehicle type.
    VehicleType,
    /// Depends on the pair of stops or on several arguments.
    Composite,
}

/// A cost function evaluated on a transition `from -> to` made by a vehicle of a given type.
///
/// Each expression has a unique index which is used to cache its values in a solution.
pub trait Expression: Send + Sync {
    /// Returns a unique index of this expression.
    fn index(&self) -> usize;

    /// Returns a name of the expression.
    fn name(&self) -> &str;

    /// Returns the value for the transition.
    fn value(&self, vehicle_type: Option<&VehicleType>, from: Option<&Stop>, to: Option<&Stop>) -> Float;

    /// Returns true if expression can produce positive values.
    fn has_positive_values(&self) -> bool;

    /// Returns true if expression can produce negative values.
    fn has_negative_values(&self) -> bool;

    /// Returns a kind of arguments the expression depends on.
    fn kind(&self) -> ExpressionKind {
        ExpressionKind::Composite
    }
}

/// An expression which returns the same value everywhere.
pub struct ConstantExpression {
    index: usize,
    name: String,
    value: Float,
}

impl ConstantExpression {
    /// Creates a new instance of `ConstantExpression`.
    pub fn new(name: &str, value: Float) -> Self {
        Self { index: next_expression_index(), name: name.to_string(), value }
    }

    /// Returns the constant value.
    pub fn constant(&self) -> Float {
        self.value
    }
}

impl Expression for ConstantExpression {
    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn value(&self, _: Option<&VehicleType>, _: Option<&Stop>, _: Option<&Stop>) -> Float {
        self.value
    }

    fn has_positive_values(&self) -> bool {
        self.value > 0.
    }

    fn has_negative_values(&self) -> bool {
        self.value < 0.
    }

    fn kind(&self) -> ExpressionKind {
        ExpressionKind::Constant
    }
}

/// An expression which is defined by the destination stop, stops without explicit value get the
/// default one.
pub struct StopExpression {
    index: usize,
    name: String,
    default: Float,
    values: FxHashMap<usize, Float>,
}

impl StopExpression {
    /// Creates a new instance of `StopExpression`.
    pub fn new(name: &str, default: Float) -> Self {
        Self { index: next_expression_index(), name: name.to_string(), default, values: FxHashMap::default() }
    }

    /// Sets a value for the stop with given index.
    pub fn set_value(&mut self, stop: usize, value: Float) {
        self.values.insert(stop, value);
    }

    /// Returns a value of the stop with given index.
    pub fn stop_value(&self, stop: usize) -> Float {
        self.values.get(&stop).copied().unwrap_or(self.default)
    }

    /// Returns the default value.
    pub fn default_value(&self) -> Float {
        self.default
    }
}

impl Expression for StopExpression {
    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn value(&self, _: Option<&VehicleType>, _: Option<&Stop>, to: Option<&Stop>) -> Float {
        to.map_or(self.default, |to| self.stop_value(to.index))
    }

    fn has_positive_values(&self) -> bool {
        self.default > 0. || self.values.values().any(|&v| v > 0.)
    }

    fn has_negative_values(&self) -> bool {
        self.default < 0. || self.values.values().any(|&v| v < 0.)
    }

    fn kind(&self) -> ExpressionKind {
        ExpressionKind::Stop
    }
}

/// An expression which is defined by the vehicle type.
pub struct VehicleTypeExpression {
    index: usize,
    name: String,
    default: Float,
    values: FxHashMap<usize, Float>,
}

impl VehicleTypeExpression {
    /// Creates a new instance of `VehicleTypeExpression`.
    pub fn new(name: &str, default: Float) -> Self {
        Self { index: next_expression_index(), name: name.to_string(), default, values: FxHashMap::default() }
    }

    /// Sets a value for the vehicle type with given index.
    pub fn set_value(&mut self, vehicle_type: usize, value: Float) {
        self.values.insert(vehicle_type, value);
    }

    /// Returns a value for the vehicle type with given index.
    pub fn vehicle_type_value(&self, vehicle_type: usize) -> Float {
        self.values.get(&vehicle_type).copied().unwrap_or(self.default)
    }
}

impl Expression for VehicleTypeExpression {
    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn value(&self, vehicle_type: Option<&VehicleType>, _: Option<&Stop>, _: Option<&Stop>) -> Float {
        vehicle_type.map_or(self.default, |vt| self.vehicle_type_value(vt.index))
    }

    fn has_positive_values(&self) -> bool {
        self.default > 0. || self.values.values().any(|&v| v > 0.)
    }

    fn has_negative_values(&self) -> bool {
        self.default < 0. || self.values.values().any(|&v| v < 0.)
    }

    fn kind(&self) -> ExpressionKind {
        ExpressionKind::VehicleType
    }
}

/// A sparse expression defined on pairs of stops.
pub struct FromToExpression {
    index: usize,
    name: String,
    default: Float,
    values: FxHashMap<(usize, usize), Float>,
}

impl FromToExpression {
    /// Creates a new instance of `FromToExpression`.
    pub fn new(name: &str, default: Float) -> Self {
        Self { index: next_expression_index(), name: name.to_string(), default, values: FxHashMap::default() }
    }

    /// Sets a value for the pair of stops.
    pub fn set_value(&mut self, from: usize, to: usize, value: Float) {
        self.values.insert((from, to), value);
    }
}

impl Expression for FromToExpression {
    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn value(&self, _: Option<&VehicleType>, from: Option<&Stop>, to: Option<&Stop>) -> Float {
        match (from, to) {
            (Some(from), Some(to)) => self.values.get(&(from.index, to.index)).copied().unwrap_or(self.default),
            _ => self.default,
        }
    }

    fn has_positive_values(&self) -> bool {
        self.default > 0. || self.values.values().any(|&v| v > 0.)
    }

    fn has_negative_values(&self) -> bool {
        self.default < 0. || self.values.values().any(|&v| v < 0.)
    }
}

/// A sum of several expressions.
pub struct SumExpression {
    index: usize,
    name: String,
    expressions: Vec<Arc<dyn Expression>>,
}

impl SumExpression {
    /// Creates a new instance of `SumExpression`.
    pub fn new(name: &str, expressions: Vec<Arc<dyn Expression>>) -> Self {
        Self { index: next_expression_index(), name: name.to_string(), expressions }
    }
}

impl Expression for SumExpression {
    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn value(&self, vehicle_type: Option<&VehicleType>, from: Option<&Stop>, to: Option<&Stop>) -> Float {
        self.expressions.iter().map(|e| e.value(vehicle_type, from, to)).sum()
    }

    fn has_positive_values(&self) -> bool {
        self.expressions.iter().any(|e| e.has_positive_values())
    }

    fn has_negative_values(&self) -> bool {
        self.expressions.iter().any(|e| e.has_negative_values())
    }
}

/// An expression multiplied by a constant factor.
pub struct TermExpression {
    index: usize,
    name: String,
    factor: Float,
    expression: Arc<dyn Expression>,
}

impl TermExpression {
    /// Creates a new instance of `TermExpression`.
    pub fn new(factor: Float, expression: Arc<dyn Expression>) -> Self {
        let name = format!("{factor} * {}", expression.name());
        Self { index: next_expression_index(), name, factor, expression }
    }
}

impl Expression for TermExpression {
    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn value(&self, vehicle_type: Option<&VehicleType>, from: Option<&Stop>, to: Option<&Stop>) -> Float {
        self.factor * self.expression.value(vehicle_type, from, to)
    }

    fn has_positive_values(&self) -> bool {
        (self.factor > 0. && self.expression.has_positive_values())
            || (self.factor < 0. && self.expression.has_negative_values())
    }

    fn has_negative_values(&self) -> bool {
        (self.factor > 0. && self.expression.has_negative_values())
            || (self.factor < 0. && self.expression.has_positive_values())
    }

    fn kind(&self) -> ExpressionKind {
        self.expression.kind()
    }
}

/// Dispatches evaluation to a per vehicle type expression, falls back to the default one.
pub struct VehicleTypeDispatchExpression {
    index: usize,
    name: String,
    default: Arc<dyn Expression>,
    expressions: FxHashMap<usize, Arc<dyn Expression>>,
}

impl VehicleTypeDispatchExpression {
    /// Creates a new instance of `VehicleTypeDispatchExpression`.
    pub fn new(name: &str, default: Arc<dyn Expression>) -> Self {
        Self { index: next_expression_index(), name: name.to_string(), default, expressions: FxHashMap::default() }
    }

    /// Sets an expression used for the vehicle type with given index.
    pub fn set_expression(&mut self, vehicle_type: usize, expression: Arc<dyn Expression>) {
        self.expressions.insert(vehicle_type, expression);
    }

    fn all(&self) -> impl Iterator<Item = &Arc<dyn Expression>> {
        std::iter::once(&self.default).chain(self.expressions.values())
    }
}

impl Expression for VehicleTypeDispatchExpression {
    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn value(&self, vehicle_type: Option<&VehicleType>, from: Option<&Stop>, to: Option<&Stop>) -> Float {
        vehicle_type
            .and_then(|vt| self.expressions.get(&vt.index))
            .unwrap_or(&self.default)
            .value(vehicle_type, from, to)
    }

    fn has_positive_values(&self) -> bool {
        self.all().any(|e| e.has_positive_values())
    }

    fn has_negative_values(&self) -> bool {
        self.all().any(|e| e.has_negative_values())
    }
}

/// A great circle distance between stop locations in meters.
pub struct HaversineExpression {
    index: usize,
}

impl HaversineExpression {
    /// Creates a new instance of `HaversineExpression`.
    pub fn new() -> Self {
        Self { index: next_expression_index() }
    }

    /// Returns distance between two locations.
    pub fn distance(&self, from: &Location, to: &Location) -> Float {
        from.haversine_distance(to)
    }
}

impl Default for HaversineExpression {
    fn default() -> Self {
        Self::new()
    }
}

impl Expression for HaversineExpression {
    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        "haversine"
    }

    fn value(&self, _: Option<&VehicleType>, from: Option<&Stop>, to: Option<&Stop>) -> Float {
        match (from, to) {
            (Some(from), Some(to)) => self.distance(&from.location, &to.location),
            _ => 0.,
        }
    }

    fn has_positive_values(&self) -> bool {
        true
    }

    fn has_negative_values(&self) -> bool {
        false
    }
}

/// Converts a distance expression into a duration using a constant speed in meters per second.
pub struct DistanceDurationExpression {
    index: usize,
    name: String,
    distance: Arc<dyn Expression>,
    speed: Float,
}

impl DistanceDurationExpression {
    /// Creates a new instance of `DistanceDurationExpression`, speed has to be positive.
    pub fn new(name: &str, distance: Arc<dyn Expression>, speed: Float) -> GenericResult<Self> {
        if !speed.is_finite() || speed <= 0. {
            return Err(format!("speed must be positive and finite, got {speed}").into());
        }

        Ok(Self { index: next_expression_index(), name: name.to_string(), distance, speed })
    }
}

impl Expression for DistanceDurationExpression {
    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn value(&self, vehicle_type: Option<&VehicleType>, from: Option<&Stop>, to: Option<&Stop>) -> Float {
        self.distance.value(vehicle_type, from, to) / self.speed
    }

    fn has_positive_values(&self) -> bool {
        self.distance.has_positive_values()
    }

    fn has_negative_values(&self) -> bool {
        self.distance.has_negative_values()
    }
}
