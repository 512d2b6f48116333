use std::collections::HashMap;

use crate::database::FoodDatabase;
use crate::errors::{Error, Result};
use crate::http::{Request, Response};
use matchit::Router;

/// Utility macro generating a constant for the HTTP endpoint, and associate it with
/// an identifier. Matchit requires both
macro_rules! make_paths {
    ($($name:ident: $path:expr,)*) => {
        pub mod paths {
            $(
                pub const $name: &str = $path;
            )*
        }
        pub mod endpoints {
            $(
                pub const $name: &str = stringify!($name);
            )*
        }
    }
}

make_paths! {
    FOODS: "/foods",
    FOOD_BY_ID: "/foods/{food_id}",
}

/// Utility to add a list of paths to the router automatically
macro_rules! add_path {
    ($router:ident $(, $path:ident)*) => {
        $(
            $router.insert(paths::$path, endpoints::$path)?;
        )*
    }
}

/// Names of the parameters in the HTTP paths, used to extract them
/// from the parameters inside of request handling
pub mod params {
    /// Key of food ids in HTTP paths
    pub const FOOD_ID: &str = "food_id";
}

/// Return the HTTP path for a food based on its id
pub fn food_by_id(food_id: u32) -> String {
    paths::FOOD_BY_ID.replace("{food_id}", &food_id.to_string())
}

// spurious warning, I am using this in tests
#[allow(unused_macros)]
/// Utility to create easily hashmaps of parameters for testing
macro_rules! make_params {
    () => {
        std::collections::HashMap::new()
    };
    ($name:ident: $value:expr $(, $name2:ident: $value2:expr)* ) => {
        {
            let mut map = std::collections::HashMap::new();
            map.insert($crate::routes::params::$name.to_string(), $value.to_string());
            $(
                map.insert($crate::routes::params::$name2.to_string(), $value2.to_string());
            )*
            map
        }
    }
}

#[allow(unused_imports)]
pub(crate) use make_params;

/// Create a new router with the paths defined in this module
///
/// Errors from this functions are programming errors, most likely steming from a
/// misuse of matchit
fn new_router() -> Result<Router<&'static str>> {
    let mut router = Router::new();
    add_path!(router, FOODS, FOOD_BY_ID);
    Ok(router)
}

/// Type of the object containing the HTTP path parameters passed to handlers
pub type HttpParams = HashMap<String, String>;
/// Type of the function that handles HTTP requests
pub type HttpHandler = fn(Request, HttpParams, &mut dyn FoodDatabase) -> Result<Response>;

/// The router is in charge of taking in raw HTTP requests and to dispatch them to
/// the appropriate handler function.
pub struct HttpRouter {
    routes: Router<&'static str>,
    handlers: HashMap<&'static str, HashMap<&'static str, HttpHandler>>,
}

impl HttpRouter {
    /// Creates a new empty router
    ///
    /// Although the matchit router is not empty, there are no methods associated
    /// to the routes yet, so no request can be processed
    /// Errors in this function are programming errors.
    pub fn new() -> Result<Self> {
        let routes = new_router()?;
        Ok(HttpRouter {
            routes,
            handlers: HashMap::new(),
        })
    }

    /// Add a new route to the router
    pub fn add_route(&mut self, method: &'static str, route: &'static str, handler: HttpHandler) {
        self.handlers
            .entry(route)
            .or_default()
            .insert(method, handler);
    }

    /// Sends a request to the appropriate handler if it exists
    ///
    /// If there is a route matching the request, its handler will be called and the result of the
    /// function will be the result of the handler. Unknown paths yield Error::NotFound, known
    /// paths without a handler for the method yield Error::MethodNotAllowed.
    ///
    /// Checking that all parameters are presents and that the body is correct is the
    /// responsibility of the handler
    pub fn route(&self, request: Request, db: &mut dyn FoodDatabase) -> Result<Response> {
        // Query strings are not part of the route
        let path = request.path.split('?').next().unwrap_or("");
        let route = self
            .routes
            .at(path)
            .map_err(|err| Error::NotFound(format!("{}: {}", path, err)))?;
        let method_to_handler = self.handlers.get(route.value).ok_or_else(|| {
            Error::NotFound(format!(
                "No method associated to this route: {}",
                route.value
            ))
        })?;
        let handler = method_to_handler
            .get(request.method.as_str())
            .ok_or_else(|| {
                Error::MethodNotAllowed(format!(
                    "No handler for {} {}",
                    request.method.as_str(),
                    route.value
                ))
            })?;

        let params: HttpParams = route
            .params
            .iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        handler(request, params, db)
    }

    /// Route a request and turn any error into the matching error response
    pub fn respond(&self, request: Request, db: &mut dyn FoodDatabase) -> Response {
        match self.route(request, db) {
            Ok(response) => response,
            Err(err) => {
                let status = err.status();
                if status >= 500 {
                    log::error!("{}", err);
                } else {
                    log::debug!("{}", err);
                }
                Response::error(status)
            }
        }
    }
}
