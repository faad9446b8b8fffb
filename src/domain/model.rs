use chrono::DateTime;
use chrono_tz::Tz;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// A dish with its price in minor currency units (cents), when one is printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meal {
    pub name: String,
    pub price: Option<u32>,
}

/// Meals of one day, bucketed by meal type.
///
/// Meal types keep the order in which they were first seen in the sheet so
/// renderers produce stable columns. Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meals {
    order: Vec<String>,
    buckets: HashMap<String, Vec<Meal>>,
}

impl Meals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, meal_type: &str, meal: Meal) {
        match self.buckets.get_mut(meal_type) {
            Some(bucket) => bucket.push(meal),
            None => {
                self.order.push(meal_type.to_string());
                self.buckets.insert(meal_type.to_string(), vec![meal]);
            }
        }
    }

    pub fn get(&self, meal_type: &str) -> Option<&[Meal]> {
        self.buckets.get(meal_type).map(Vec::as_slice)
    }

    pub fn meal_types(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Meal])> {
        self.order
            .iter()
            .filter_map(|t| self.buckets.get(t).map(|m| (t.as_str(), m.as_slice())))
    }

    /// Number of meal types.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Serialize for Meals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for (meal_type, meals) in self.iter() {
            map.serialize_entry(meal_type, meals)?;
        }
        map.end()
    }
}

/// One calendar day of the menu. `end` is the last nanosecond of the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Day {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub meals: Meals,
}

impl Day {
    pub fn contains(&self, now: &DateTime<Tz>) -> bool {
        self.start <= *now && *now <= self.end
    }
}
