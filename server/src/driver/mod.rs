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

//! Business logic for the book-review service.
//!
//! All authorization decisions happen in this layer: the REST layer only establishes who the
//! caller is, and the database layer trusts whatever it is given.

use crate::db;
use crate::model::{Book, BookId, Review, ReviewId, User, UserId};
use shelfmark_core::clocks::Clock;
use shelfmark_core::db::{Db, DbError, Executor};
use shelfmark_core::driver::{DriverError, DriverResult};
use std::sync::Arc;

mod books;
mod reviews;
mod stats;
#[cfg(test)]
mod testutils;
mod users;
mod wishlist;

/// Maximum number of books returned by a related-books query.
const RELATED_BOOKS_LIMIT: i64 = 5;

/// Number of latest reviews included in a book review summary.
const RECENT_REVIEWS_LIMIT: u32 = 5;

/// Number of accounts included in the most-active-reviewers ranking.
const TOP_REVIEWERS_LIMIT: i64 = 10;

/// Length in days of the window used to count recent reviews in the service statistics.
const RECENT_REVIEWS_DAYS: i64 = 30;

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": they start and commit a
/// transaction when they need one, so it is incorrect for the caller to compose two separate
/// calls.  For this reason, these operations consume the driver.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// Clock instance to obtain the current time.
    clock: Arc<dyn Clock + Send + Sync>,
}

impl Driver {
    /// Creates a new driver backed by the given dependencies.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { db, clock }
    }
}

/// Fetches the book `id`, mapping its absence to a message that names the book.
async fn get_existing_book(ex: &mut Executor, id: BookId) -> DriverResult<Book> {
    match db::get_book(ex, id).await {
        Ok(book) => Ok(book),
        Err(DbError::NotFound) => Err(DriverError::NotFound(format!("Book {} not found", id))),
        Err(e) => Err(e.into()),
    }
}

/// Fetches the review `id`, mapping its absence to a message that names the review.
async fn get_existing_review(ex: &mut Executor, id: ReviewId) -> DriverResult<Review> {
    match db::get_review(ex, id).await {
        Ok(review) => Ok(review),
        Err(DbError::NotFound) => Err(DriverError::NotFound(format!("Review {} not found", id))),
        Err(e) => Err(e.into()),
    }
}

/// Fetches the user `id`, mapping its absence to a message that names the user.
async fn get_existing_user(ex: &mut Executor, id: UserId) -> DriverResult<User> {
    match db::get_user(ex, id).await {
        Ok(user) => Ok(user),
        Err(DbError::NotFound) => Err(DriverError::NotFound(format!("User {} not found", id))),
        Err(e) => Err(e.into()),
    }
}
