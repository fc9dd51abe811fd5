use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(err) = err.find::<ApiErrorCode>() {
        let json = warp::reply::json(&ApiResponse::<()>::err(err, err.to_string()));
        Ok(warp::reply::with_status(json, err.status()))
    } else if err.is_not_found() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            &ApiErrorCode::NotFound,
            ApiErrorCode::NotFound.to_string(),
        ));
        Ok(warp::reply::with_status(json, StatusCode::NOT_FOUND))
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        let code = ApiErrorCode::InvalidInput(e.to_string());
        let json = warp::reply::json(&ApiResponse::<()>::err(&code, code.to_string()));
        Ok(warp::reply::with_status(json, StatusCode::BAD_REQUEST))
    } else if err.find::<warp::reject::MissingHeader>().is_some() {
        let code = ApiErrorCode::InvalidToken;
        let json = warp::reply::json(&ApiResponse::<()>::err(&code, code.to_string()));
        Ok(warp::reply::with_status(json, code.status()))
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            &ApiErrorCode::NotFound,
            ApiErrorCode::NotFound.to_string(),
        ));
        Ok(warp::reply::with_status(json, StatusCode::METHOD_NOT_ALLOWED))
    } else {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            &ApiErrorCode::InternalError,
            format!("Unhandled error: {:?}", err),
        ));
        Ok(warp::reply::with_status(
            json,
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiErrorCode {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Account is not active")]
    AccountDisabled,
    #[error("Username already taken")]
    UserNameTaken,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("No such route")]
    NotFound,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn name(&self) -> &'static str {
        match self {
            ApiErrorCode::InvalidInput(_) => "InvalidInput",
            ApiErrorCode::InvalidCredentials => "InvalidCredentials",
            ApiErrorCode::AccountDisabled => "AccountDisabled",
            ApiErrorCode::UserNameTaken => "UserNameTaken",
            ApiErrorCode::EmailTaken => "EmailTaken",
            ApiErrorCode::InvalidToken => "InvalidToken",
            ApiErrorCode::TokenExpired => "TokenExpired",
            ApiErrorCode::NotFound => "NotFound",
            ApiErrorCode::InternalError => "InternalError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiErrorCode::InvalidCredentials
            | ApiErrorCode::InvalidToken
            | ApiErrorCode::TokenExpired => StatusCode::UNAUTHORIZED,
            ApiErrorCode::AccountDisabled => StatusCode::FORBIDDEN,
            ApiErrorCode::UserNameTaken | ApiErrorCode::EmailTaken => StatusCode::CONFLICT,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidInput(msg) => ApiErrorCode::InvalidInput(msg),
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::AccountDisabled => ApiErrorCode::AccountDisabled,
            AuthError::UserNameTaken => ApiErrorCode::UserNameTaken,
            AuthError::EmailTaken => ApiErrorCode::EmailTaken,
            AuthError::TokenInvalid => ApiErrorCode::InvalidToken,
            AuthError::TokenExpired => ApiErrorCode::TokenExpired,
            // The bearer's account no longer exists.
            AuthError::Identity(IdentityError::NotFound { .. }) => ApiErrorCode::InvalidToken,
            AuthError::Identity(e) => ApiErrorCode::internal(e),
            AuthError::Store(e) => ApiErrorCode::internal(e),
            AuthError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::LookupColumn;
    use crate::domain_port::StoreError;

    #[test]
    fn auth_errors_map_to_client_codes() {
        let cases = [
            (AuthError::InvalidCredentials, "InvalidCredentials", 401),
            (AuthError::AccountDisabled, "AccountDisabled", 403),
            (AuthError::UserNameTaken, "UserNameTaken", 409),
            (AuthError::EmailTaken, "EmailTaken", 409),
            (AuthError::TokenInvalid, "InvalidToken", 401),
            (AuthError::TokenExpired, "TokenExpired", 401),
            (AuthError::InvalidInput("short".into()), "InvalidInput", 400),
        ];
        for (error, name, status) in cases {
            let code = ApiErrorCode::from(error);
            assert_eq!(code.name(), name);
            assert_eq!(code.status().as_u16(), status);
        }
    }

    #[test]
    fn vanished_subject_is_an_invalid_token() {
        let code = ApiErrorCode::from(AuthError::Identity(IdentityError::NotFound {
            column: LookupColumn::Email,
            identifier: "gone@test.com".into(),
        }));
        assert_eq!(code, ApiErrorCode::InvalidToken);
    }

    #[test]
    fn store_failures_do_not_leak() {
        let code = ApiErrorCode::from(AuthError::Store(StoreError::Connection(
            "mysql://secret@db".into(),
        )));
        assert_eq!(code, ApiErrorCode::InternalError);
        assert_eq!(code.to_string(), "Internal error");
    }
}
