use crate::api::Food;
use std::sync::Arc;

/// Ordered collection of dishes shown by the dashboard.
///
/// The collection is immutable: every mutation returns a new collection and leaves the receiver
/// untouched, so holders of an older snapshot never see it change. Snapshots are cheap to clone
/// and [`FoodCollection::ptr_eq`] tells whether two of them are the very same sequence.
#[derive(Debug, Clone, Default)]
pub struct FoodCollection {
    foods: Arc<[Food]>,
}

impl FoodCollection {
    /// Build a collection from a freshly listed set of dishes, last write wins.
    ///
    /// Ids are expected to be unique. Should the backend return duplicates, the first one is
    /// kept and the others are dropped.
    pub fn replace_all(foods: Vec<Food>) -> FoodCollection {
        let mut unique: Vec<Food> = Vec::with_capacity(foods.len());
        for food in foods {
            if unique.iter().any(|f| f.id == food.id) {
                log::warn!("Dropping duplicate food id {} from listing", food.id);
            } else {
                unique.push(food);
            }
        }
        FoodCollection {
            foods: unique.into(),
        }
    }

    /// New collection with `food` added at the end
    pub fn append(&self, food: Food) -> FoodCollection {
        let mut foods = self.foods.to_vec();
        foods.push(food);
        FoodCollection {
            foods: foods.into(),
        }
    }

    /// New collection where the entry with the same id as `updated` is replaced by it.
    ///
    /// Order is preserved. Without a matching entry, the result equals the receiver.
    pub fn replace_by_id(&self, updated: Food) -> FoodCollection {
        if !self.contains(updated.id) {
            log::warn!("Cannot replace food {}: not in the collection", updated.id);
        }
        FoodCollection {
            foods: self
                .foods
                .iter()
                .map(|f| if f.id == updated.id { updated.clone() } else { f.clone() })
                .collect(),
        }
    }

    /// New collection without the entry with the given id, remaining order preserved
    pub fn remove_by_id(&self, id: u32) -> FoodCollection {
        if !self.contains(id) {
            log::warn!("Cannot remove food {}: not in the collection", id);
        }
        FoodCollection {
            foods: self.foods.iter().filter(|f| f.id != id).cloned().collect(),
        }
    }

    pub fn get(&self, id: u32) -> Option<&Food> {
        self.foods.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Food> {
        self.foods.iter()
    }

    pub fn as_slice(&self) -> &[Food] {
        &self.foods
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    /// Whether both collections are the same snapshot, not merely equal
    pub fn ptr_eq(&self, other: &FoodCollection) -> bool {
        Arc::ptr_eq(&self.foods, &other.foods)
    }
}

impl PartialEq for FoodCollection {
    fn eq(&self, other: &Self) -> bool {
        self.foods == other.foods
    }
}

impl<'a> IntoIterator for &'a FoodCollection {
    type Item = &'a Food;
    type IntoIter = std::slice::Iter<'a, Food>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
