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

//! Utilities to deal with the identity headers and the query parameters shared by the APIs.

use crate::model::{BookFilters, Caller, PageRequest, UserId, UserRole, parse_rating_bound};
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use shelfmark_core::rest::{RestError, RestResult, get_unique_header};

/// Header carrying the id of the account the request runs as.
pub(crate) const CALLER_ID_HEADER: &str = "x-caller-id";

/// Header carrying the role of the account the request runs as.
pub(crate) const CALLER_ROLE_HEADER: &str = "x-caller-role";

/// Extracts the identity header `name` as text, failing if it is absent or unreadable.
///
/// `display` is the canonical spelling of the header used in error messages.
fn get_identity_header<'a>(
    parts: &'a Parts,
    name: &'static str,
    display: &'static str,
) -> RestResult<&'a str> {
    let value = match get_unique_header(&parts.headers, name) {
        Ok(Some(value)) => value,
        Ok(None) => return Err(RestError::Unauthorized(format!("Missing {} header", display))),
        Err(e) => return Err(RestError::Unauthorized(e.to_string())),
    };

    match value.to_str() {
        Ok(value) => Ok(value),
        Err(e) => {
            Err(RestError::Unauthorized(format!("Bad encoding in {} header: {}", display, e)))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = get_identity_header(parts, CALLER_ID_HEADER, "X-Caller-Id")?;
        let id = match id.parse::<UserId>() {
            Ok(id) => id,
            Err(e) => {
                return Err(RestError::Unauthorized(format!("Invalid X-Caller-Id header: {}", e)));
            }
        };

        let role = get_identity_header(parts, CALLER_ROLE_HEADER, "X-Caller-Role")?;
        let role = match role.parse::<UserRole>() {
            Ok(role) => role,
            Err(e) => {
                return Err(RestError::Unauthorized(format!(
                    "Invalid X-Caller-Role header: {}",
                    e
                )));
            }
        };

        Ok(Caller::new(id, role))
    }
}

/// Message returned by the server after an operation with no other content to report.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize, Eq, PartialEq))]
pub(crate) struct MessageResponse {
    /// Human-readable confirmation of what happened.
    pub(crate) message: String,
}

/// Pagination query parameters accepted by the listing APIs.
#[derive(Default, Deserialize)]
pub(crate) struct PageQuery {
    /// 1-based page to return, as a raw string.
    pub(crate) page: Option<String>,

    /// Maximum number of items per page, as a raw string.
    pub(crate) limit: Option<String>,
}

/// Validates the pagination parameters in `query`.
pub(crate) fn page_request(query: &PageQuery) -> RestResult<PageRequest> {
    Ok(PageRequest::from_query(query.page.as_deref(), query.limit.as_deref())?)
}

/// Query parameters accepted by the catalog listing and search APIs.
///
/// All values come in as raw strings and are validated here, so that a bad parameter turns
/// into one of our errors instead of a rejection of the framework.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BooksQuery {
    /// 1-based page to return, as a raw string.
    pub(crate) page: Option<String>,

    /// Maximum number of items per page, as a raw string.
    pub(crate) limit: Option<String>,

    /// Free-text term to look for in titles, authors, ISBNs and descriptions.
    pub(crate) search: Option<String>,

    /// Exact genre to restrict the listing to.
    pub(crate) genre: Option<String>,

    /// Author fragment to restrict the listing to.
    pub(crate) author: Option<String>,

    /// Key to sort the listing by.
    pub(crate) sort_by: Option<String>,

    /// Direction to sort the listing in.
    pub(crate) sort_order: Option<String>,

    /// Inclusive lower bound on the average rating, as a raw string.
    pub(crate) min_rating: Option<String>,

    /// Inclusive upper bound on the average rating, as a raw string.
    pub(crate) max_rating: Option<String>,
}

/// Discards blank query parameters and trims the rest.
fn trimmed(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Builds the catalog filters described by `query`.
pub(crate) fn book_filters(query: &BooksQuery) -> RestResult<BookFilters> {
    let mut filters = BookFilters::default();
    if let Some(search) = trimmed(&query.search) {
        filters = filters.with_search(search);
    }
    if let Some(genre) = trimmed(&query.genre) {
        filters = filters.with_genre(genre);
    }
    if let Some(author) = trimmed(&query.author) {
        filters = filters.with_author(author);
    }
    if let Some(raw) = trimmed(&query.min_rating) {
        filters = filters.with_min_rating(parse_rating_bound("minRating", raw)?);
    }
    if let Some(raw) = trimmed(&query.max_rating) {
        filters = filters.with_max_rating(parse_rating_bound("maxRating", raw)?);
    }

    if let (Some(min), Some(max)) = (filters.min_rating(), filters.max_rating()) {
        if min > max {
            return Err(RestError::InvalidRequest("minRating cannot exceed maxRating".to_owned()));
        }
    }

    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http;
    use axum::routing::get;
    use shelfmark_core::rest::testutils::*;

    /// Echoes the extracted caller so that the tests can observe the extraction outcome.
    async fn probe(caller: Caller) -> String {
        format!("{}:{}", caller.id(), caller.role())
    }

    fn app() -> Router {
        Router::new().route("/probe", get(probe))
    }

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/probe".to_owned())
    }

    #[tokio::test]
    async fn test_caller_ok() {
        OneShotBuilder::new(app(), route())
            .with_header(CALLER_ID_HEADER, "3")
            .with_header(CALLER_ROLE_HEADER, "admin")
            .send_empty()
            .await
            .expect_text("^3:admin$")
            .await;
    }

    #[tokio::test]
    async fn test_caller_headers_are_case_insensitive() {
        OneShotBuilder::new(app(), route())
            .with_header("X-Caller-Id", "8")
            .with_header("X-Caller-Role", "user")
            .send_empty()
            .await
            .expect_text("^8:user$")
            .await;
    }

    #[tokio::test]
    async fn test_caller_missing_id() {
        OneShotBuilder::new(app(), route())
            .with_header(CALLER_ROLE_HEADER, "user")
            .send_empty()
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("Missing X-Caller-Id header")
            .await;
    }

    #[tokio::test]
    async fn test_caller_missing_role() {
        OneShotBuilder::new(app(), route())
            .with_header(CALLER_ID_HEADER, "3")
            .send_empty()
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("Missing X-Caller-Role header")
            .await;
    }

    #[tokio::test]
    async fn test_caller_bad_id() {
        for id in ["0", "-1", "abc", "1.2"] {
            OneShotBuilder::new(app(), route())
                .with_header(CALLER_ID_HEADER, id)
                .with_header(CALLER_ROLE_HEADER, "user")
                .send_empty()
                .await
                .expect_status(http::StatusCode::UNAUTHORIZED)
                .expect_error("Invalid X-Caller-Id header")
                .await;
        }
    }

    #[tokio::test]
    async fn test_caller_bad_role() {
        OneShotBuilder::new(app(), route())
            .with_header(CALLER_ID_HEADER, "3")
            .with_header(CALLER_ROLE_HEADER, "root")
            .send_empty()
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("Invalid X-Caller-Role header: Unknown role root")
            .await;
    }

    #[tokio::test]
    async fn test_caller_duplicate_header() {
        OneShotBuilder::new(app(), route())
            .with_header(CALLER_ID_HEADER, "3")
            .with_header(CALLER_ID_HEADER, "4")
            .with_header(CALLER_ROLE_HEADER, "user")
            .send_empty()
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("cannot have more than one value")
            .await;
    }

    #[test]
    fn test_book_filters_drops_blanks_and_trims() {
        let query = BooksQuery {
            search: Some("  dune ".to_owned()),
            genre: Some("   ".to_owned()),
            author: Some("herbert".to_owned()),
            ..Default::default()
        };
        let filters = book_filters(&query).unwrap();
        assert_eq!(Some("dune"), filters.search());
        assert_eq!(None, filters.genre());
        assert_eq!(Some("herbert"), filters.author());
    }

    #[test]
    fn test_book_filters_rating_bounds_ok() {
        let query = BooksQuery {
            min_rating: Some("1.5".to_owned()),
            max_rating: Some("4".to_owned()),
            ..Default::default()
        };
        let filters = book_filters(&query).unwrap();
        assert_eq!(Some(1.5), filters.min_rating());
        assert_eq!(Some(4.0), filters.max_rating());
    }

    #[test]
    fn test_book_filters_rating_bounds_inverted() {
        let query = BooksQuery {
            min_rating: Some("4".to_owned()),
            max_rating: Some("2".to_owned()),
            ..Default::default()
        };
        match book_filters(&query) {
            Err(RestError::InvalidRequest(msg)) => {
                assert_eq!("minRating cannot exceed maxRating", msg)
            }
            e => panic!("{:?}", e),
        }
    }

    #[test]
    fn test_book_filters_bad_bound() {
        let query = BooksQuery { min_rating: Some("abc".to_owned()), ..Default::default() };
        match book_filters(&query) {
            Err(RestError::InvalidRequest(msg)) => {
                assert_eq!("minRating must be a number between 0 and 5", msg)
            }
            e => panic!("{:?}", e),
        }
    }

    #[test]
    fn test_page_request_passthrough() {
        let query = PageQuery { page: Some("2".to_owned()), limit: Some("5".to_owned()) };
        let request = page_request(&query).unwrap();
        assert_eq!(2, request.page());
        assert_eq!(5, request.limit());

        let query = PageQuery { page: Some("zero".to_owned()), limit: None };
        match page_request(&query) {
            Err(RestError::InvalidRequest(msg)) => {
                assert_eq!("Invalid page zero: must be a positive integer", msg)
            }
            e => panic!("{:?}", e),
        }
    }
}
