use crate::api::{Food, FoodInput, NewFood};
use crate::database::FoodDatabase;
use crate::errors::{Error, Result};
use crate::http::{Request, Response};
use crate::routes::*;
use serde::Deserialize;

/// Build the router serving the `/foods` resource
pub fn create_http_router() -> Result<HttpRouter> {
    let mut router = HttpRouter::new()?;

    router.add_route("GET", endpoints::FOODS, list_foods);
    router.add_route("POST", endpoints::FOODS, create_food);
    router.add_route("GET", endpoints::FOOD_BY_ID, get_food);
    router.add_route("PUT", endpoints::FOOD_BY_ID, update_food);
    router.add_route("DELETE", endpoints::FOOD_BY_ID, delete_food);

    Ok(router)
}

/// Body accepted by PUT. Clients send back full records, but the id in the path is the one
/// that counts, and a missing `available` keeps the stored value.
#[derive(Deserialize)]
struct FoodUpdate {
    #[serde(flatten)]
    input: FoodInput,
    available: Option<bool>,
}

fn food_id(params: &HttpParams) -> Result<u32> {
    params
        .get(params::FOOD_ID)
        .ok_or_else(|| Error::BadRequest("Missing food id".to_string()))
        .and_then(|id| {
            id.parse::<u32>()
                .map_err(|err| Error::BadRequest(format!("Invalid food id '{}': {}", id, err)))
        })
}

fn food_body(food: &Food) -> Result<String> {
    Ok(serde_json::to_string(food)?)
}

fn list_foods(_: Request, _: HttpParams, db: &mut dyn FoodDatabase) -> Result<Response> {
    let foods = db.list_foods()?;
    Ok(Response::ok_with_body(serde_json::to_string(&foods)?))
}

fn get_food(_: Request, params: HttpParams, db: &mut dyn FoodDatabase) -> Result<Response> {
    let food = db.get_food(food_id(&params)?)?;
    Ok(Response::ok_with_body(food_body(&food)?))
}

fn create_food(request: Request, _: HttpParams, db: &mut dyn FoodDatabase) -> Result<Response> {
    let new_food: NewFood = serde_json::from_str(&request.body)?;
    let food = db.insert_food(&new_food)?;
    log::info!("Created {}", food);
    Ok(Response::created(food_body(&food)?))
}

fn update_food(request: Request, params: HttpParams, db: &mut dyn FoodDatabase) -> Result<Response> {
    let id = food_id(&params)?;
    let update: FoodUpdate = serde_json::from_str(&request.body)?;
    let available = match update.available {
        Some(available) => available,
        None => db.get_food(id)?.available,
    };
    let food = db.update_food(id, &update.input, available)?;
    log::info!("Updated {}", food);
    Ok(Response::ok_with_body(food_body(&food)?))
}

fn delete_food(_: Request, params: HttpParams, db: &mut dyn FoodDatabase) -> Result<Response> {
    let food = db.delete_food(food_id(&params)?)?;
    log::info!("Deleted {}", food);
    Ok(Response::ok())
}
