//! CRUD over the `users` table behind an API Gateway REST proxy integration.

use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use http::StatusCode;
use lambda_runtime::{tracing, Error, LambdaEvent};
use serde::de::DeserializeOwned;

use crate::db::{with_session, ConnectionFactory};
use crate::users::{NewUser, UserChanges, UserRepository};

pub mod error;
mod response;
pub mod routes;

pub use error::ApiError;
pub use routes::Route;

fn parse_body<T: DeserializeOwned>(request: &ApiGatewayProxyRequest) -> Result<T, ApiError> {
    let body = match request.body.as_deref() {
        Some(body) if !body.trim().is_empty() => body,
        _ => "{}",
    };
    serde_json::from_str(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))
}

async fn dispatch(
    request: &ApiGatewayProxyRequest,
    db: &dyn ConnectionFactory,
) -> Result<ApiGatewayProxyResponse, ApiError> {
    let shape = request
        .resource
        .as_deref()
        .or(request.path.as_deref())
        .unwrap_or_default();
    let route = Route::resolve(&request.http_method, shape, &request.path_parameters)?;
    tracing::debug!(?route, "Resolved route");

    let response = match route {
        Route::ListUsers => {
            let users = with_session(db, |txn| {
                Box::pin(async move { UserRepository::new(txn).list().await })
            })
            .await?;
            response::json(StatusCode::OK, &users)?
        }
        Route::CreateUser => {
            let new_user: NewUser = parse_body(request)?;
            new_user.validate()?;
            let user = with_session(db, |txn| {
                Box::pin(async move { UserRepository::new(txn).create(new_user).await })
            })
            .await?;
            tracing::info!(user_id = user.id, "Created user");
            response::json(StatusCode::CREATED, &user)?
        }
        Route::GetUser(id) => {
            let user = with_session(db, |txn| {
                Box::pin(async move { UserRepository::new(txn).get_by_id(id).await })
            })
            .await?
            .ok_or(ApiError::UserNotFound)?;
            response::json(StatusCode::OK, &user)?
        }
        Route::UpdateUser(id) => {
            let changes: UserChanges = parse_body(request)?;
            changes.validate()?;
            let user = with_session(db, |txn| {
                Box::pin(async move { UserRepository::new(txn).update(id, changes).await })
            })
            .await?
            .ok_or(ApiError::UserNotFound)?;
            tracing::info!(user_id = user.id, "Updated user");
            response::json(StatusCode::OK, &user)?
        }
        Route::DeleteUser(id) => {
            let deleted = with_session(db, |txn| {
                Box::pin(async move { UserRepository::new(txn).delete(id).await })
            })
            .await?;
            if !deleted {
                return Err(ApiError::UserNotFound);
            }
            tracing::info!(user_id = id, "Deleted user");
            response::message(StatusCode::OK, "User deleted successfully")
        }
    };
    Ok(response)
}

pub async fn function_handler(
    event: LambdaEvent<ApiGatewayProxyRequest>,
    db: &dyn ConnectionFactory,
) -> Result<ApiGatewayProxyResponse, Error> {
    let LambdaEvent {
        payload: request,
        context,
    } = event;
    tracing::info!(
        method = %request.http_method,
        path = request.path.as_deref().unwrap_or_default(),
        "Received request"
    );

    let response = match dispatch(&request, db).await {
        Ok(response) => response,
        Err(e) => e.into_response(&context.request_id),
    };
    Ok(response)
}
