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

//! API to list the calling user's wishlist.

use crate::driver::Driver;
use crate::model::{Book, Caller, Page};
use crate::rest::httputils::{PageQuery, page_request};
use axum::Json;
use axum::extract::{Query, State};
use shelfmark_core::rest::{EmptyBody, RestError};

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    caller: Caller,
    Query(query): Query<PageQuery>,
    _: EmptyBody,
) -> Result<Json<Page<Book>>, RestError> {
    let page = page_request(&query)?;
    Ok(Json(driver.list_wishlist(caller, page).await?))
}
