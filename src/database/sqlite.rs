use crate::api::{Food, FoodInput, NewFood, Price};
use crate::database::FoodDatabase;
use crate::errors::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Contains the SQL queries used to interact with the database
pub mod sql_queries {
    // Prices are kept as their JSON encoding so that strings and numbers survive the round trip
    pub const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS foods (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        image TEXT NOT NULL,
        price TEXT NOT NULL,
        description TEXT NOT NULL,
        available INTEGER NOT NULL
    )";

    pub const INSERT_FOOD: &str =
        "INSERT INTO foods (name, image, price, description, available) VALUES (?1, ?2, ?3, ?4, ?5)";
    pub const SELECT_FOODS: &str =
        "SELECT id, name, image, price, description, available FROM foods ORDER BY id";
    pub const SELECT_FOOD: &str =
        "SELECT id, name, image, price, description, available FROM foods WHERE id = ?1";
    pub const UPDATE_FOOD: &str = "UPDATE foods SET name = ?2, image = ?3, price = ?4, description = ?5, available = ?6 WHERE id = ?1";
    pub const DELETE_FOOD: &str = "DELETE FROM foods WHERE id = ?1";
}

/// SQLite-backed storage for the local food service
pub struct SQLiteConnection {
    conn: Connection,
}

impl SQLiteConnection {
    /// Create a new empty in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute(sql_queries::CREATE_TABLE, [])?;
        Ok(SQLiteConnection { conn })
    }
}

/// Raw columns of a row, decoded into a Food once outside of rusqlite's closure
type FoodRow = (u32, String, String, String, String, bool);

fn read_row(row: &Row) -> rusqlite::Result<FoodRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn into_food((id, name, image, price, description, available): FoodRow) -> Result<Food> {
    Ok(Food {
        id,
        name,
        image,
        price: serde_json::from_str::<Price>(&price)?,
        description,
        available,
    })
}

fn not_found(id: u32) -> Error {
    Error::NotFound(format!("No food with id {}", id))
}

impl FoodDatabase for SQLiteConnection {
    fn list_foods(&self) -> Result<Vec<Food>> {
        self.conn
            .prepare(sql_queries::SELECT_FOODS)?
            .query_map([], read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(into_food)
            .collect()
    }

    fn get_food(&self, id: u32) -> Result<Food> {
        let row = self
            .conn
            .query_row(sql_queries::SELECT_FOOD, params![id], read_row)
            .optional()?
            .ok_or_else(|| not_found(id))?;
        into_food(row)
    }

    fn insert_food(&mut self, food: &NewFood) -> Result<Food> {
        self.conn.execute(
            sql_queries::INSERT_FOOD,
            params![
                food.input.name,
                food.input.image,
                serde_json::to_string(&food.input.price)?,
                food.input.description,
                food.available
            ],
        )?;
        let id = u32::try_from(self.conn.last_insert_rowid())
            .map_err(|err| Error::BadRequest(format!("Food id out of range: {}", err)))?;
        self.get_food(id)
    }

    fn update_food(&mut self, id: u32, input: &FoodInput, available: bool) -> Result<Food> {
        let changed = self.conn.execute(
            sql_queries::UPDATE_FOOD,
            params![
                id,
                input.name,
                input.image,
                serde_json::to_string(&input.price)?,
                input.description,
                available
            ],
        )?;
        if changed == 0 {
            return Err(not_found(id));
        }
        self.get_food(id)
    }

    fn delete_food(&mut self, id: u32) -> Result<Food> {
        let food = self.get_food(id)?;
        self.conn.execute(sql_queries::DELETE_FOOD, params![id])?;
        Ok(food)
    }
}
