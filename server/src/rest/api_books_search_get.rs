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

//! API to search the book catalog.
//!
//! The contract matches the plain listing API except that at least one filter is required,
//! which lets clients distinguish "browse everything" from a search that lost its terms.

use crate::driver::Driver;
use crate::model::{Book, BookSort, Page, PageRequest};
use crate::rest::httputils::{BooksQuery, book_filters};
use axum::Json;
use axum::extract::{Query, State};
use shelfmark_core::rest::{EmptyBody, RestError};

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Query(query): Query<BooksQuery>,
    _: EmptyBody,
) -> Result<Json<Page<Book>>, RestError> {
    let filters = book_filters(&query)?;
    let sort = BookSort::from_query(query.sort_by.as_deref(), query.sort_order.as_deref());
    let page = PageRequest::from_query(query.page.as_deref(), query.limit.as_deref())?;
    Ok(Json(driver.search_books(filters, sort, page).await?))
}
