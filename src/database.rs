use crate::api::{Food, FoodInput, NewFood};
use crate::errors::Result;
use serde::Deserialize;

pub mod sqlite;

/// Trait hiding the storage behind the local food service
///
/// There is a mock for unit tests and an SQLite implementation for the server binary. The trait
/// allows to swap one for the other without touching the rest of the code.
pub trait FoodDatabase {
    /// All dishes, in insertion order
    fn list_foods(&self) -> Result<Vec<Food>>;

    /// The dish with the given id, or a NotFound error
    fn get_food(&self, id: u32) -> Result<Food>;

    /// Store a new dish and return it with its freshly assigned id
    fn insert_food(&mut self, food: &NewFood) -> Result<Food>;

    /// Overwrite every field of the dish with the given id
    ///
    /// Returns the stored record, or a NotFound error if there is no such dish
    fn update_food(&mut self, id: u32, input: &FoodInput, available: bool) -> Result<Food>;

    /// Remove the dish with the given id, returning it, or a NotFound error
    fn delete_food(&mut self, id: u32) -> Result<Food>;
}

/// Contents of a seed file: either a bare array of dishes, or an object with a `foods` array as
/// used by json-server style fake APIs. Ids in the file are ignored, new ones are assigned.
#[derive(Deserialize)]
#[serde(untagged)]
enum Seed {
    Foods(Vec<NewFood>),
    Db { foods: Vec<NewFood> },
}

/// Insert every dish of a JSON seed document, returning how many were inserted
pub fn seed(db: &mut dyn FoodDatabase, json: &str) -> Result<usize> {
    let foods = match serde_json::from_str::<Seed>(json)? {
        Seed::Foods(foods) | Seed::Db { foods } => foods,
    };
    for food in &foods {
        db.insert_food(food)?;
    }
    Ok(foods.len())
}

pub mod mock {
    use super::*;
    use crate::errors::Error;

    /// In-memory storage keeping dishes in a vector
    #[derive(Default)]
    pub struct MockDB {
        foods: Vec<Food>,
        last_id: u32,
    }

    fn not_found(id: u32) -> Error {
        Error::NotFound(format!("No food with id {}", id))
    }

    impl FoodDatabase for MockDB {
        fn list_foods(&self) -> Result<Vec<Food>> {
            Ok(self.foods.clone())
        }

        fn get_food(&self, id: u32) -> Result<Food> {
            self.foods
                .iter()
                .find(|food| food.id == id)
                .cloned()
                .ok_or_else(|| not_found(id))
        }

        fn insert_food(&mut self, food: &NewFood) -> Result<Food> {
            self.last_id += 1;
            let food = Food {
                id: self.last_id,
                name: food.input.name.clone(),
                image: food.input.image.clone(),
                price: food.input.price.clone(),
                description: food.input.description.clone(),
                available: food.available,
            };
            self.foods.push(food.clone());
            Ok(food)
        }

        fn update_food(&mut self, id: u32, input: &FoodInput, available: bool) -> Result<Food> {
            let food = self
                .foods
                .iter_mut()
                .find(|food| food.id == id)
                .ok_or_else(|| not_found(id))?;
            *food = Food { available, ..food.merged(input) };
            Ok(food.clone())
        }

        fn delete_food(&mut self, id: u32) -> Result<Food> {
            let index = self
                .foods
                .iter()
                .position(|food| food.id == id)
                .ok_or_else(|| not_found(id))?;
            Ok(self.foods.remove(index))
        }
    }
}
