//! A constraint which does not allow to mix different items in a vehicle.
//!
//! Each stop can load or unload a named item. A vehicle carries one item at a time: another item
//! can be loaded only when the vehicle is empty. Loads and unloads of a plan unit net to zero.

#[cfg(test)]
#[path = "../../../tests/unit/construction/features/no_mix_test.rs"]
mod no_mix_test;

use super::*;
use rustc_hash::FxHashMap;

/// An item loaded by a stop with positive quantity or unloaded with negative one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MixItem {
    /// A name of the item.
    pub name: String,
    /// A quantity change.
    pub quantity: i64,
}

/// A content of a vehicle after the stop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MixContent {
    /// An index of carried item name, `None` for an empty vehicle.
    pub item: Option<usize>,
    /// A carried quantity.
    pub quantity: i64,
    /// Set if the stop loads a different item into a non empty vehicle or unloads more than carried.
    pub is_violated: bool,
}

impl MixContent {
    fn empty() -> Self {
        Self { item: None, quantity: 0, is_violated: false }
    }
}

/// Creates a no mix constraint from items of stops given by stop index.
pub fn create_no_mix_constraint(
    name: &str,
    key: StopDataKey,
    items: FxHashMap<usize, MixItem>,
) -> GenericResult<Box<dyn Constraint>> {
    let mut names: Vec<String> = vec![];
    let items = items
        .into_iter()
        .map(|(stop, item)| {
            if item.quantity == 0 {
                return Err(format!("item '{}' of stop {stop} has zero quantity", item.name).into());
            }

            let index = names.iter().position(|name| *name == item.name).unwrap_or_else(|| {
                names.push(item.name.clone());
                names.len() - 1
            });

            Ok((stop, (index, item.quantity)))
        })
        .collect::<GenericResult<FxHashMap<_, _>>>()?;

    let has_loads = items.values().any(|&(_, quantity)| quantity > 0);
    let has_unloads = items.values().any(|&(_, quantity)| quantity < 0);
    if has_loads != has_unloads {
        return Err("items must be both loaded and unloaded or not used at all".into());
    }

    Ok(Box::new(NoMixConstraint { name: name.to_string(), key, names, items, has_items: vec![] }))
}

struct NoMixConstraint {
    name: String,
    key: StopDataKey,
    names: Vec<String>,
    items: FxHashMap<usize, (usize, i64)>,
    has_items: Vec<bool>,
}

impl NoMixConstraint {
    fn apply(&self, content: &MixContent, stop: usize) -> MixContent {
        match self.items.get(&stop) {
            Some(&(item, quantity)) if quantity > 0 => MixContent {
                item: Some(item),
                quantity: content.quantity + quantity,
                is_violated: content.quantity != 0 && content.item != Some(item),
            },
            Some(&(item, quantity)) => {
                let is_violated = content.item != Some(item) || content.quantity < -quantity;
                let quantity = (content.quantity + quantity).max(0);

                MixContent { item: if quantity == 0 { None } else { content.item }, quantity, is_violated }
            }
            None => MixContent { item: content.item, quantity: content.quantity, is_violated: false },
        }
    }

    fn content_at(&self, stop: SolutionStop<'_>) -> MixContent {
        stop.data::<MixContent>(self.key).cloned().unwrap_or_else(MixContent::empty)
    }

    fn validate_unit(&self, model: &Model, unit: &PlanStopsUnit) -> GenericResult<()> {
        let items = unit.stops.iter().filter_map(|stop| self.items.get(stop)).collect::<Vec<_>>();

        if let Some((first, _)) = items.first() {
            if let Some((other, _)) = items.iter().find(|(item, _)| item != first) {
                return Err(format!(
                    "items of stops of the same plan unit must have the same name, got '{}' and '{}'",
                    self.names[*first], self.names[*other]
                )
                .into());
            }
        }

        let delta = items.iter().map(|(_, quantity)| quantity).sum::<i64>();
        if delta != 0 {
            let stops = unit.stops.iter().map(|&stop| model.stop(stop).id.as_str()).collect::<Vec<_>>().join(", ");
            return Err(format!("quantities of plan unit with stops [{stops}] must sum to zero, got {delta}").into());
        }

        Ok(())
    }
}

impl Constraint for NoMixConstraint {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn lock(&mut self, model: &Model) -> GenericResult<()> {
        if let Some(stop) = self.items.keys().find(|&&stop| stop >= model.stops().len() || !model.stop(stop).is_regular())
        {
            return Err(format!("items can be set only for regular stops, got stop {stop}").into());
        }

        model.plan_units().iter().filter_map(|unit| unit.as_stops()).try_for_each(|unit| self.validate_unit(model, unit))?;

        self.has_items = model
            .plan_units()
            .iter()
            .map(|unit| unit.as_stops().is_some_and(|unit| unit.stops.iter().any(|stop| self.items.contains_key(stop))))
            .collect();

        Ok(())
    }

    fn estimation_cost(&self) -> Cost {
        Cost::LinearStop
    }

    fn stop_data_key(&self) -> Option<StopDataKey> {
        Some(self.key)
    }

    fn update_stop_data(&self, stop: SolutionStop<'_>) -> GenericResult<Option<Box<dyn StopData>>> {
        let content =
            if stop.is_first() { MixContent::empty() } else { self.apply(&self.content_at(stop.previous()), stop.index()) };

        Ok(Some(Box::new(content)))
    }

    fn estimate_is_violated(&self, move_stops: &MoveStops, solution: &Solution) -> ViolationEstimate {
        if !self.has_items[move_stops.plan_unit()] {
            return (false, no_positions_hint());
        }

        let mut generator = move_stops.stops(solution, false, false);
        let Some(previous) = generator.next() else {
            return (false, no_positions_hint());
        };

        let mut content = self.content_at(previous);
        for stop in generator {
            content = self.apply(&content, stop.index());
            if content.is_violated {
                return (true, no_positions_hint());
            }
        }

        (false, no_positions_hint())
    }

    fn does_stop_have_violations(&self, stop: SolutionStop<'_>) -> bool {
        stop.is_planned() && self.content_at(stop).is_violated
    }
}
