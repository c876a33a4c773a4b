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

//! Pagination data types shared by all listing operations.

use derive_getters::Getters;
use derive_more::Constructor;
use serde::Serialize;
use shelfmark_core::model::{ModelError, ModelResult};

/// Number of items per page when the request does not say otherwise.
pub(crate) const DEFAULT_LIMIT: u32 = 20;

/// Maximum number of items per page.  Larger requests are capped, not rejected.
pub(crate) const MAX_LIMIT: u32 = 100;

/// A validated page/limit pair from a listing request.
#[derive(Clone, Copy)]
#[cfg_attr(test, derive(Debug, Eq, PartialEq))]
pub(crate) struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Creates a request for a known-good page and limit.
    pub(crate) fn new(page: u32, limit: u32) -> Self {
        debug_assert!(page >= 1 && limit >= 1);
        Self { page, limit }
    }

    /// Interprets the raw `page` and `limit` query parameters.
    ///
    /// Missing values fall back to the first page with `DEFAULT_LIMIT` items.  Values that are
    /// not positive integers are rejected, and limits beyond `MAX_LIMIT` are capped.
    pub(crate) fn from_query(page: Option<&str>, limit: Option<&str>) -> ModelResult<Self> {
        let page = match page {
            Some(raw) => match raw.parse::<u32>() {
                Ok(page) if page >= 1 => page,
                _ => {
                    return Err(ModelError(format!(
                        "Invalid page {}: must be a positive integer",
                        raw
                    )));
                }
            },
            None => 1,
        };

        let limit = match limit {
            Some(raw) => match raw.parse::<u32>() {
                Ok(limit) if limit >= 1 => limit.min(MAX_LIMIT),
                _ => {
                    return Err(ModelError(format!(
                        "Invalid limit {}: must be a positive integer",
                        raw
                    )));
                }
            },
            None => DEFAULT_LIMIT,
        };

        Ok(Self { page, limit })
    }

    pub(crate) fn page(&self) -> u32 {
        self.page
    }

    pub(crate) fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the number of rows the database has to skip to reach this page.
    pub(crate) fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

/// Pagination details attached to every listing response.
#[derive(Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, serde::Deserialize, Eq, PartialEq))]
#[serde(rename_all = "camelCase")]
pub(crate) struct Pagination {
    /// 1-based number of the returned page.
    page: u32,

    /// Maximum number of items in the returned page.
    limit: u32,

    /// Total number of items across all pages.
    total: i64,

    /// Total number of pages at the current limit.
    total_pages: i64,

    /// Whether a later page exists.
    has_next: bool,

    /// Whether an earlier page exists.
    has_prev: bool,
}

impl Pagination {
    /// Computes the pagination details for `total` items viewed through `request`.
    pub(crate) fn new(request: &PageRequest, total: i64) -> Self {
        let limit = i64::from(request.limit());
        let total_pages = (total + limit - 1) / limit;
        Self {
            page: request.page(),
            limit: request.limit(),
            total,
            total_pages,
            has_next: i64::from(request.page()) < total_pages,
            has_prev: request.page() > 1,
        }
    }
}

/// One page of results plus the details needed to fetch the rest.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, serde::Deserialize, PartialEq))]
pub(crate) struct Page<T> {
    /// Items that fall within the requested page.
    items: Vec<T>,

    /// Position of this page within the full result set.
    pagination: Pagination,
}
