//! In-memory counters of one counting session.
//!
//! A [`Tally`] belongs to exactly one (operator, route) session. Nothing in
//! here touches storage: the tally only becomes durable when it is passed to
//! [`Engine::commit`](crate::Engine::commit), which resets it on success.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    Category, CategoryOrigin, CategoryRegistry, EngineError, LedgerKey, ResultEngine,
    util::normalize_required_name,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increase,
    Decrease,
}

/// Session counters. Counts are never negative and `running_total` is always
/// the sum of all counts.
#[derive(Clone, Debug)]
pub struct Tally {
    operator: String,
    route: String,
    registry: CategoryRegistry,
    counts: HashMap<String, u64>,
    running_total: u64,
    dirty: bool,
}

impl Tally {
    /// Start a session for `operator` on `route`, every base category at zero.
    pub fn start(operator: &str, route: &str) -> ResultEngine<Self> {
        let operator = normalize_required_name(operator, "operator")?;
        let route = normalize_required_name(route, "route")?;
        let registry = CategoryRegistry::new();
        let counts = registry.iter().map(|c| (c.name, 0)).collect();

        Ok(Self {
            operator,
            route,
            registry,
            counts,
            running_total: 0,
            dirty: false,
        })
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn ledger_key(&self) -> LedgerKey {
        LedgerKey::new(&self.operator, &self.route)
    }

    /// Register an ad hoc category, visible at count zero.
    pub fn register_category(&mut self, name: &str) -> ResultEngine<Category> {
        let category = self.registry.register(name)?;
        self.counts.insert(category.name.clone(), 0);
        Ok(category)
    }

    /// Move `category` one step in `direction` and return its new count.
    ///
    /// Decreasing a category already at zero leaves both the count and the
    /// running total untouched and is not an error.
    pub fn adjust(&mut self, category: &str, direction: Direction) -> ResultEngine<u64> {
        let count = self
            .counts
            .get_mut(category)
            .ok_or_else(|| EngineError::UnknownCategory(category.to_string()))?;

        match direction {
            Direction::Increase => {
                *count += 1;
                self.running_total += 1;
            }
            Direction::Decrease => {
                if *count > 0 {
                    *count -= 1;
                    self.running_total -= 1;
                }
            }
        }

        self.dirty = true;
        Ok(*count)
    }

    pub fn count(&self, category: &str) -> Option<u64> {
        self.counts.get(category).copied()
    }

    pub fn running_total(&self) -> u64 {
        self.running_total
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Categories with a positive count, in registry order.
    pub fn pending(&self) -> Vec<(Category, u64)> {
        self.registry
            .iter()
            .filter_map(|category| {
                let count = self.counts.get(&category.name).copied().unwrap_or(0);
                (count > 0).then_some((category, count))
            })
            .collect()
    }

    /// Zero every counter, keeping ad hoc categories registered.
    pub fn reset(&mut self) {
        self.counts.values_mut().for_each(|count| *count = 0);
        self.running_total = 0;
        self.dirty = false;
    }

    pub fn view(&self) -> TallyView {
        let categories = self
            .registry
            .iter()
            .map(|category| CategoryCount {
                count: self.counts.get(&category.name).copied().unwrap_or(0),
                name: category.name,
                origin: category.origin,
            })
            .collect();

        TallyView {
            operator: self.operator.clone(),
            route: self.route.clone(),
            categories,
            running_total: self.running_total,
            dirty: self.dirty,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub origin: CategoryOrigin,
    pub count: u64,
}

/// Read-only picture of a [`Tally`] for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyView {
    pub operator: String,
    pub route: String,
    pub categories: Vec<CategoryCount>,
    pub running_total: u64,
    pub dirty: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BASE_CATEGORIES;

    fn tally() -> Tally {
        Tally::start("ana", "north").unwrap()
    }

    #[test]
    fn start_zeroes_base_categories() {
        let tally = tally();
        assert_eq!(tally.running_total(), 0);
        assert!(!tally.is_dirty());
        assert!(tally.pending().is_empty());
        for name in BASE_CATEGORIES {
            assert_eq!(tally.count(name), Some(0));
        }
    }

    #[test]
    fn start_trims_names() {
        let tally = Tally::start(" ana ", "north ").unwrap();
        assert_eq!(tally.operator(), "ana");
        assert_eq!(tally.route(), "north");
    }

    #[test]
    #[should_panic(expected = "EmptyName(\"route\")")]
    fn fail_start_without_route() {
        Tally::start("ana", "  ").unwrap();
    }

    #[test]
    fn increase_and_decrease() {
        let mut tally = tally();
        assert_eq!(tally.adjust("Autos", Direction::Increase).unwrap(), 1);
        assert_eq!(tally.adjust("Autos", Direction::Increase).unwrap(), 2);
        assert_eq!(tally.adjust("Motos", Direction::Increase).unwrap(), 1);
        assert_eq!(tally.adjust("Autos", Direction::Decrease).unwrap(), 1);

        assert_eq!(tally.running_total(), 2);
        assert!(tally.is_dirty());
    }

    #[test]
    fn decrease_at_zero_is_noop() {
        let mut tally = tally();
        tally.adjust("Motos", Direction::Increase).unwrap();

        assert_eq!(tally.adjust("Autos", Direction::Decrease).unwrap(), 0);
        assert_eq!(tally.count("Autos"), Some(0));
        assert_eq!(tally.running_total(), 1);
    }

    #[test]
    fn running_total_tracks_applied_steps() {
        let mut tally = tally();
        let steps = [
            Direction::Decrease,
            Direction::Increase,
            Direction::Increase,
            Direction::Decrease,
            Direction::Decrease,
            Direction::Decrease,
            Direction::Increase,
        ];

        let mut expected: u64 = 0;
        for step in steps {
            let before = tally.count("Bus").unwrap();
            let after = tally.adjust("Bus", step).unwrap();
            match step {
                Direction::Increase => expected += 1,
                Direction::Decrease if before > 0 => expected -= 1,
                Direction::Decrease => assert_eq!(after, 0),
            }
            assert_eq!(tally.running_total(), expected);
            assert_eq!(after, expected);
        }
    }

    #[test]
    #[should_panic(expected = "UnknownCategory(\"Carretas\")")]
    fn fail_adjust_unknown() {
        let mut tally = tally();
        tally.adjust("Carretas", Direction::Increase).unwrap();
    }

    #[test]
    fn adjust_registered_ad_hoc() {
        let mut tally = tally();
        tally.register_category("Carretas").unwrap();
        assert_eq!(tally.count("Carretas"), Some(0));
        assert_eq!(tally.adjust("Carretas", Direction::Decrease).unwrap(), 0);
        assert_eq!(tally.adjust("Carretas", Direction::Increase).unwrap(), 1);
    }

    #[test]
    fn pending_follows_registry_order() {
        let mut tally = tally();
        tally.register_category("Carretas").unwrap();
        tally.adjust("Carretas", Direction::Increase).unwrap();
        tally.adjust("Motos", Direction::Increase).unwrap();
        tally.adjust("Autos", Direction::Increase).unwrap();

        let names: Vec<String> = tally.pending().into_iter().map(|(c, _)| c.name).collect();
        assert_eq!(names, vec!["Autos", "Motos", "Carretas"]);
    }

    #[test]
    fn reset_keeps_ad_hoc() {
        let mut tally = tally();
        tally.register_category("Carretas").unwrap();
        tally.adjust("Carretas", Direction::Increase).unwrap();
        tally.adjust("Autos", Direction::Increase).unwrap();

        tally.reset();

        assert_eq!(tally.running_total(), 0);
        assert_eq!(tally.count("Carretas"), Some(0));
        assert_eq!(tally.count("Autos"), Some(0));
        assert!(tally.pending().is_empty());
        assert!(!tally.is_dirty());
    }

    #[test]
    fn view_lists_every_category() {
        let mut tally = tally();
        tally.register_category("Carretas").unwrap();
        tally.adjust("Carretas", Direction::Increase).unwrap();

        let view = tally.view();
        assert_eq!(view.categories.len(), BASE_CATEGORIES.len() + 1);
        let last = view.categories.last().unwrap();
        assert_eq!(last.name, "Carretas");
        assert_eq!(last.origin, CategoryOrigin::AdHoc);
        assert_eq!(last.count, 1);
        assert_eq!(view.running_total, 1);
    }
}
