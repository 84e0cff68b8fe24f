use std::collections::HashMap;

use http::Method;

use super::error::ApiError;

const COLLECTION_METHODS: &str = "GET, POST";
const ITEM_METHODS: &str = "GET, PUT, DELETE";

/// The operations exposed under `/users`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ListUsers,
    CreateUser,
    GetUser(i32),
    UpdateUser(i32),
    DeleteUser(i32),
}

impl Route {
    /// Maps a request onto a route. The path is matched first, then the
    /// method within it.
    ///
    /// `shape` is the API Gateway resource template (`/users/{id}`) when the
    /// integration supplies one, otherwise the concrete request path.
    pub fn resolve(
        method: &Method,
        shape: &str,
        path_parameters: &HashMap<String, String>,
    ) -> Result<Self, ApiError> {
        let segments: Vec<&str> = shape.trim_matches('/').split('/').collect();
        match segments.as_slice() {
            ["users"] => match *method {
                Method::GET => Ok(Route::ListUsers),
                Method::POST => Ok(Route::CreateUser),
                _ => Err(ApiError::MethodNotAllowed {
                    allow: COLLECTION_METHODS,
                }),
            },
            ["users", segment] => {
                let make = match *method {
                    Method::GET => Route::GetUser,
                    Method::PUT => Route::UpdateUser,
                    Method::DELETE => Route::DeleteUser,
                    _ => {
                        return Err(ApiError::MethodNotAllowed {
                            allow: ITEM_METHODS,
                        })
                    }
                };
                let raw = match path_parameters.get("id") {
                    Some(id) => id.as_str(),
                    None if *segment == "{id}" => {
                        return Err(ApiError::BadRequest("User ID is required".to_string()))
                    }
                    None => *segment,
                };
                parse_id(raw).map(make)
            }
            _ => Err(ApiError::RouteNotFound),
        }
    }
}

fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("User ID must be an integer".to_string()))
}
