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

//! API to add a book to the calling user's wishlist.

use crate::driver::Driver;
use crate::model::{BookId, Caller};
use crate::rest::httputils::MessageResponse;
use axum::extract::{Path, State};
use axum::{Json, http};
use shelfmark_core::rest::{EmptyBody, RestError};

/// PUT handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    caller: Caller,
    Path(book_id): Path<String>,
    _: EmptyBody,
) -> Result<(http::StatusCode, Json<MessageResponse>), RestError> {
    let book_id = book_id.parse::<BookId>()?;
    driver.add_to_wishlist(caller, book_id).await?;
    let response = MessageResponse { message: "Book added to wishlist".to_owned() };
    Ok((http::StatusCode::CREATED, Json(response)))
}
