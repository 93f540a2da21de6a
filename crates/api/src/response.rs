//! The `{ "data": … }` envelope every successful JSON response uses.

use serde::Serialize;

/// Success envelope. Errors use `{ "error", "code" }` instead (see
/// [`crate::error::AppError`]).
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
