// This file contains the basic types used to communicate through the API
use serde::{Deserialize, Serialize};

/// Price of a dish, kept exactly as the backend sent it.
///
/// The resource stores prices as free-form values, so both `"19.90"` and `19.9` are valid and
/// are written back in the shape they came in. Numbers keep their JSON representation, so `25`
/// stays `25` and large integers are not rounded through a float.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Price {
    Number(serde_json::Number),
    Text(String),
}

impl Default for Price {
    fn default() -> Self {
        Price::Text(String::new())
    }
}

impl From<&str> for Price {
    fn from(value: &str) -> Self {
        Price::Text(value.to_string())
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Price::Number(n) => write!(f, "{}", n),
            Price::Text(s) => write!(f, "{}", s),
        }
    }
}

fn default_available() -> bool {
    true
}

/// A dish, as returned by the API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Food {
    /// Unique ID, given by the server on creation
    pub id: u32,
    pub name: String,
    /// URL of the picture
    pub image: String,
    pub price: Price,
    pub description: String,
    /// Whether the dish can currently be ordered. Servers omitting it mean `true`.
    #[serde(default = "default_available")]
    pub available: bool,
}

impl Food {
    /// Shallow merge of a form submission over this record.
    ///
    /// Every form field replaces the stored one; `id` and `available` are not part of the form
    /// and carry over unchanged.
    pub fn merged(&self, input: &FoodInput) -> Food {
        Food {
            id: self.id,
            name: input.name.clone(),
            image: input.image.clone(),
            price: input.price.clone(),
            description: input.description.clone(),
            available: self.available,
        }
    }

    /// The editable part of this record, used to pre-fill the edit form
    pub fn to_input(&self) -> FoodInput {
        FoodInput {
            name: self.name.clone(),
            image: self.image.clone(),
            price: self.price.clone(),
            description: self.description.clone(),
        }
    }
}

impl std::fmt::Display for Food {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} ({}){}",
            self.id,
            self.name,
            self.price,
            if self.available { "" } else { " [unavailable]" }
        )
    }
}

/// Fields a user fills in when adding or editing a dish
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FoodInput {
    pub name: String,
    pub image: String,
    pub price: Price,
    pub description: String,
}

/// Body of a create request
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewFood {
    #[serde(flatten)]
    pub input: FoodInput,
    #[serde(default = "default_available")]
    pub available: bool,
}

impl From<FoodInput> for NewFood {
    /// New dishes always start out available, whatever the form said
    fn from(input: FoodInput) -> Self {
        NewFood {
            input,
            available: true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pizza() -> Food {
        Food {
            id: 1,
            name: "Pizza".to_string(),
            image: "http://img/pizza.png".to_string(),
            price: Price::from("19.90"),
            description: "Cheese".to_string(),
            available: false,
        }
    }

    #[test]
    fn test_price_accepts_strings_and_numbers() {
        let text: Price = serde_json::from_str("\"9.90\"").unwrap();
        assert_eq!(text, Price::Text("9.90".to_string()));

        let number: Price = serde_json::from_str("9.9").unwrap();
        assert_eq!(number, Price::Number(serde_json::Number::from_f64(9.9).unwrap()));
        assert_eq!(serde_json::to_string(&number).unwrap(), "9.9");
    }

    #[test]
    fn test_numeric_prices_are_written_back_unchanged() {
        for price in ["25", "9007199254740993", "-3", "12.50e1"] {
            let parsed: Price = serde_json::from_str(price).unwrap();
            let expected = serde_json::from_str::<serde_json::Number>(price)
                .unwrap()
                .to_string();
            assert_eq!(serde_json::to_string(&parsed).unwrap(), expected);
        }

        let food: Food = serde_json::from_str(
            r#"{"id": 1, "name": "Pizza", "image": "", "price": 25, "description": "", "available": true}"#,
        )
        .unwrap();
        assert_eq!(food.price.to_string(), "25");
        let json = serde_json::to_string(&food).unwrap();
        assert!(json.contains(r#""price":25,"#), "{}", json);

        let big: Price = serde_json::from_str("9007199254740993").unwrap();
        assert_eq!(serde_json::to_string(&big).unwrap(), "9007199254740993");
    }

    #[test]
    fn test_numeric_price_survives_flattened_body() {
        let body: NewFood = serde_json::from_str(
            r#"{"name": "Pizza", "image": "", "price": 9007199254740993, "description": ""}"#,
        )
        .unwrap();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["price"].to_string(), "9007199254740993");
    }

    #[test]
    fn test_missing_available_defaults_to_true() {
        let food: Food = serde_json::from_str(
            r#"{"id": 4, "name": "Soup", "image": "", "price": "5", "description": ""}"#,
        )
        .unwrap();
        assert!(food.available);
    }

    #[test]
    fn test_merge_keeps_id_and_availability() {
        let input = FoodInput {
            name: "Pizza Deluxe".to_string(),
            image: "x".to_string(),
            price: Price::from("25.00"),
            description: "y".to_string(),
        };

        let merged = pizza().merged(&input);

        assert_eq!(merged.id, 1);
        assert!(!merged.available);
        assert_eq!(merged.name, "Pizza Deluxe");
        assert_eq!(merged.price, Price::from("25.00"));
        assert_eq!(merged.to_input(), input);
    }

    #[test]
    fn test_new_food_is_flat_and_available() {
        let body = NewFood::from(pizza().to_input());
        let json: serde_json::Value = serde_json::to_value(&body).unwrap();

        assert_eq!(json["name"], "Pizza");
        assert_eq!(json["price"], "19.90");
        assert_eq!(json["available"], true);
        assert!(json.get("id").is_none());
        assert!(json.get("input").is_none());
    }
}
