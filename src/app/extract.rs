//! Extractors whose rejections render as `{"detail": ...}` like every other error.

use crate::utils::error::AppError;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON request body. Undecodable data is a 422, malformed syntax a 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Path parameters. Values that fail to parse are a 400.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);

/// Query string. Values that fail to parse are a 400.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);
