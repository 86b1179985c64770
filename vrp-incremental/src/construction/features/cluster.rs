//! Keeps stops of a vehicle close to each other.
//!
//! A centroid of a vehicle is the mean location of its stops with known locations. Used as a
//! constraint, a plan unit cannot be added to a vehicle when any of its stops is closer to the
//! centroid of another non empty vehicle. Used as an objective, the compactness of non empty
//! vehicles is minimized: the sum of squared distances in meters between stops and the centroid.

#[cfg(test)]
#[path = "../../../tests/unit/construction/features/cluster_test.rs"]
mod cluster_test;

use super::*;

/// Specifies which synthetic vehicle stops contribute to the centroid and the compactness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClusterOptions {
    /// Includes the vehicle start.
    pub include_first: bool,
    /// Includes the vehicle end.
    pub include_last: bool,
}

/// A running centroid of a vehicle up to the stop.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClusterCentroid {
    lon_sum: Float,
    lat_sum: Float,
    count: usize,
    /// A compactness of the vehicle, only set at the vehicle end of the objective data.
    pub compactness: Float,
}

impl ClusterCentroid {
    /// Returns the centroid location, `None` if no stop contributes to it.
    pub fn location(&self) -> Option<Location> {
        (self.count > 0).then(|| {
            let count = self.count as Float;
            Location::new(self.lon_sum / count, self.lat_sum / count)
        })
    }

    fn with(&self, location: Location) -> Self {
        Self {
            lon_sum: self.lon_sum + location.lon,
            lat_sum: self.lat_sum + location.lat,
            count: self.count + 1,
            compactness: 0.,
        }
    }
}

/// Creates a constraint which assigns plan units to the vehicle with the nearest centroid.
pub fn create_cluster_constraint(key: StopDataKey, options: ClusterOptions) -> GenericResult<Box<dyn Constraint>> {
    Ok(Box::new(ClusterConstraint { centroids: Centroids { key, options } }))
}

/// Creates an objective which minimizes the compactness of vehicles.
pub fn create_cluster_objective(key: StopDataKey, options: ClusterOptions) -> GenericResult<Box<dyn Objective>> {
    Ok(Box::new(ClusterObjective { centroids: Centroids { key, options } }))
}

struct Centroids {
    key: StopDataKey,
    options: ClusterOptions,
}

impl Centroids {
    fn location_of(&self, stop: &Stop) -> Option<Location> {
        let is_included = match stop.role {
            StopRole::First => self.options.include_first,
            StopRole::Last => self.options.include_last,
            StopRole::Regular => true,
        };

        (is_included && stop.location.is_valid()).then_some(stop.location)
    }

    fn centroid_at(&self, stop: SolutionStop<'_>) -> ClusterCentroid {
        stop.data::<ClusterCentroid>(self.key).cloned().unwrap_or_default()
    }

    fn locations<'a>(&'a self, vehicle: SolutionVehicle<'a>) -> impl Iterator<Item = Location> + 'a {
        vehicle.stops().filter_map(|stop| self.location_of(stop.model_stop()))
    }

    fn update(&self, stop: SolutionStop<'_>, with_compactness: bool) -> ClusterCentroid {
        let previous = if stop.is_first() { ClusterCentroid::default() } else { self.centroid_at(stop.previous()) };
        let mut centroid = match self.location_of(stop.model_stop()) {
            Some(location) => previous.with(location),
            None => ClusterCentroid { compactness: 0., ..previous },
        };

        if with_compactness && stop.is_last() {
            centroid.compactness = centroid
                .location()
                .map_or(0., |center| compactness(center, self.locations(stop.vehicle())));
        }

        centroid
    }
}

fn compactness(center: Location, locations: impl Iterator<Item = Location>) -> Float {
    locations.map(|location| center.haversine_distance(&location).powi(2)).sum()
}

struct ClusterConstraint {
    centroids: Centroids,
}

impl Constraint for ClusterConstraint {
    fn name(&self) -> &str {
        "cluster"
    }

    fn estimation_cost(&self) -> Cost {
        Cost::LinearVehicle
    }

    fn stop_data_key(&self) -> Option<StopDataKey> {
        Some(self.centroids.key)
    }

    fn update_stop_data(&self, stop: SolutionStop<'_>) -> GenericResult<Option<Box<dyn StopData>>> {
        Ok(Some(Box::new(self.centroids.update(stop, false))))
    }

    fn estimate_is_violated(&self, move_stops: &MoveStops, solution: &Solution) -> ViolationEstimate {
        let vehicle = move_stops.vehicle(solution);
        if vehicle.is_empty() {
            return (false, no_positions_hint());
        }

        let Some(center) = self.centroids.centroid_at(vehicle.last()).location() else {
            return (false, no_positions_hint());
        };

        let others = solution
            .vehicles()
            .filter(|other| other.index() != vehicle.index() && !other.is_empty())
            .filter_map(|other| self.centroids.centroid_at(other.last()).location())
            .collect::<Vec<_>>();

        let is_violated = move_stops
            .positions()
            .iter()
            .filter_map(|position| self.centroids.location_of(solution.model().stop(position.stop)))
            .any(|location| {
                let distance = center.haversine_distance(&location);
                others.iter().any(|other| other.haversine_distance(&location) < distance)
            });

        if is_violated { (true, skip_vehicle_hint()) } else { (false, no_positions_hint()) }
    }
}

struct ClusterObjective {
    centroids: Centroids,
}

impl Objective for ClusterObjective {
    fn name(&self) -> &str {
        "cluster"
    }

    fn stop_data_key(&self) -> Option<StopDataKey> {
        Some(self.centroids.key)
    }

    fn update_stop_data(&self, stop: SolutionStop<'_>) -> GenericResult<Option<Box<dyn StopData>>> {
        Ok(Some(Box::new(self.centroids.update(stop, true))))
    }

    fn estimate_delta_value(&self, move_stops: &MoveStops, solution: &Solution) -> Float {
        let vehicle = move_stops.vehicle(solution);
        let current = self.centroids.centroid_at(vehicle.last());

        let added = move_stops
            .positions()
            .iter()
            .filter_map(|position| self.centroids.location_of(solution.model().stop(position.stop)))
            .collect::<Vec<_>>();
        if added.is_empty() && !vehicle.is_empty() {
            return 0.;
        }

        let centroid = added.iter().fold(current.clone(), |centroid, &location| centroid.with(location));
        let new_value = centroid.location().map_or(0., |center| {
            compactness(center, self.centroids.locations(vehicle).chain(added.iter().copied()))
        });
        let old_value = if vehicle.is_empty() { 0. } else { current.compactness };

        new_value - old_value
    }

    fn value(&self, solution: &Solution) -> Float {
        solution
            .vehicles()
            .filter(|vehicle| !vehicle.is_empty())
            .map(|vehicle| self.centroids.centroid_at(vehicle.last()).compactness)
            .sum()
    }
}
