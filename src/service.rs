use crate::api::{Food, NewFood};
use crate::errors;
use crate::http::{send_once, Response, DEFAULT_TIMEOUT};
use crate::routes::{food_by_id, paths};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Failure of a call to the remote food service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request could not be sent or the response could not be read
    #[error("Transport error: {0}")]
    Transport(#[from] errors::Error),
    /// The service answered with a non-2xx status
    #[error("Service answered {0}: {1}")]
    Status(u16, String),
    /// The service answered 2xx with a body that is not the expected JSON
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// The REST resource holding the menu.
///
/// `Send + Sync` so the dashboard can be driven from several threads at once.
pub trait FoodService: Send + Sync {
    /// `GET /foods`
    fn list(&self) -> ServiceResult<Vec<Food>>;

    /// `POST /foods`, returning the created record with its id
    fn create(&self, food: &NewFood) -> ServiceResult<Food>;

    /// `PUT /foods/{id}` with a full record, returning the stored record
    fn update(&self, id: u32, food: &Food) -> ServiceResult<Food>;

    /// `DELETE /foods/{id}`. The response body is ignored.
    fn delete(&self, id: u32) -> ServiceResult<()>;
}

/// [`FoodService`] over HTTP, one connection per call
pub struct HttpFoodService {
    address: String,
    base_path: String,
    timeout: Duration,
}

impl HttpFoodService {
    /// `address` is `<host>:<port>`, `base_path` is prepended to every resource path (give an
    /// empty string when the resource is served at the root)
    pub fn new(address: &str, base_path: &str) -> Self {
        HttpFoodService {
            address: address.to_string(),
            base_path: base_path.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Give up on a call once the server stays silent for `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn call(&self, method: &str, path: &str, body: &str) -> ServiceResult<Response> {
        let endpoint = format!("{}{}", self.base_path, path);
        let response = send_once(&self.address, self.timeout, method, &endpoint, body)?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(ServiceError::Status(
                response.status.unwrap_or(0),
                response.body,
            ))
        }
    }

    fn call_json<T: DeserializeOwned>(&self, method: &str, path: &str, body: &str) -> ServiceResult<T> {
        let response = self.call(method, path, body)?;
        Ok(serde_json::from_str(&response.body)?)
    }
}

impl FoodService for HttpFoodService {
    fn list(&self) -> ServiceResult<Vec<Food>> {
        self.call_json("GET", paths::FOODS, "")
    }

    fn create(&self, food: &NewFood) -> ServiceResult<Food> {
        self.call_json("POST", paths::FOODS, &serde_json::to_string(food)?)
    }

    fn update(&self, id: u32, food: &Food) -> ServiceResult<Food> {
        self.call_json("PUT", &food_by_id(id), &serde_json::to_string(food)?)
    }

    fn delete(&self, id: u32) -> ServiceResult<()> {
        self.call("DELETE", &food_by_id(id), "").map(|_| ())
    }
}
