// Shelfmark
// Copyright 2025 The Shelfmark Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! API to replace the details of a book in the catalog.

use super::api_books_post::{BookRequest, BookResponse};
use crate::driver::Driver;
use crate::model::{BookId, Caller};
use axum::Json;
use axum::extract::{Path, State};
use shelfmark_core::rest::RestError;

/// PUT handler for this API.  The incoming details replace the stored ones wholesale, so any
/// field left out of the request is cleared.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    caller: Caller,
    Path(id): Path<String>,
    Json(request): Json<BookRequest>,
) -> Result<Json<BookResponse>, RestError> {
    let id = id.parse::<BookId>()?;
    let details = request.details()?;
    let book = driver.update_book(caller, id, details).await?;
    Ok(Json(BookResponse { message: "Book updated successfully".to_owned(), book }))
}
