//! Request extractors.

use axum::extract::FromRequest;

use crate::http::error::AppError;

/// `axum::Json` whose rejections render through [`AppError`] as 400s.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
