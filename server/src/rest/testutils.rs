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

//! Test utilities for the REST API.

use crate::db;
use crate::driver::Driver;
use crate::model::{BookDetails, BookId, Caller, Rating, ReviewId, User, UserId, UserRole};
use crate::rest::app;
use crate::rest::httputils::{CALLER_ID_HEADER, CALLER_ROLE_HEADER};
use axum::Router;
use shelfmark_core::clocks::testutils::SettableClock;
use shelfmark_core::db::{Db, DbError, Executor};
use shelfmark_core::model::{EmailAddress, Username};
use shelfmark_core::rest::testutils::OneShotBuilder;
use std::sync::Arc;
use time::OffsetDateTime;
use time::macros::datetime;

/// Time at which the test clock starts.
pub(crate) const TEST_START: OffsetDateTime = datetime!(2024-06-10 14:30:00 UTC);

/// State of a running test.
pub(crate) struct TestContext {
    /// The database that backs the app, for direct manipulation.
    db: Arc<dyn Db + Send + Sync>,

    /// The app under test.
    app: Router,
}

impl TestContext {
    /// Initializes an app instance backed by an in-memory database and a clock frozen at
    /// `TEST_START`.
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::from(shelfmark_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let driver = Driver::new(db.clone(), Arc::from(SettableClock::new(TEST_START)));
        let app = app(driver);
        TestContext { db, app }
    }

    /// Gets a clone of the app router.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and transforms it into the app router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Gets a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Syntactic sugar to insert a user behind the driver's back.
    pub(crate) async fn create_test_user(&self, username: &str, role: UserRole) -> User {
        let username = Username::new(username).unwrap();
        let email = EmailAddress::new(format!("{}@example.com", username.as_str())).unwrap();
        db::create_user(&mut self.ex().await, &username, &email, role, TEST_START).await.unwrap()
    }

    /// Syntactic sugar to insert a user and express it as a `Caller`.
    pub(crate) async fn create_test_caller(&self, username: &str, role: UserRole) -> Caller {
        let user = self.create_test_user(username, role).await;
        Caller::new(*user.id(), role)
    }

    /// Syntactic sugar to insert a book with placeholder details.
    pub(crate) async fn create_test_book(&self, title: &str) -> BookId {
        let details =
            BookDetails::new(title, "Unnamed Author", None, None, None, None, None).unwrap();
        db::create_book(&mut self.ex().await, &details, TEST_START).await.unwrap()
    }

    /// Syntactic sugar to insert a review without a comment.
    pub(crate) async fn create_test_review(
        &self,
        book_id: BookId,
        user_id: UserId,
        rating: i16,
    ) -> ReviewId {
        let rating = Rating::new(rating).unwrap();
        db::create_review(&mut self.ex().await, book_id, user_id, rating, None, TEST_START)
            .await
            .unwrap()
    }

    /// Checks if the book `id` exists by directly querying the backing database.
    pub(crate) async fn book_exists(&self, id: BookId) -> bool {
        match db::get_book(&mut self.ex().await, id).await {
            Ok(_) => true,
            Err(DbError::NotFound) => false,
            Err(e) => panic!("{:?}", e),
        }
    }

    /// Checks if the review `id` exists by directly querying the backing database.
    pub(crate) async fn review_exists(&self, id: ReviewId) -> bool {
        match db::get_review(&mut self.ex().await, id).await {
            Ok(_) => true,
            Err(DbError::NotFound) => false,
            Err(e) => panic!("{:?}", e),
        }
    }

    /// Checks if the user `id` exists by directly querying the backing database.
    pub(crate) async fn user_exists(&self, id: UserId) -> bool {
        match db::get_user(&mut self.ex().await, id).await {
            Ok(_) => true,
            Err(DbError::NotFound) => false,
            Err(e) => panic!("{:?}", e),
        }
    }

    /// Counts the wishlist entries of `user_id` by directly querying the backing database.
    pub(crate) async fn count_wishlist(&self, user_id: UserId) -> i64 {
        db::count_wishlist(&mut self.ex().await, user_id).await.unwrap()
    }
}

/// Extends `OneShotBuilder` with a helper to impersonate a caller.
pub(crate) trait WithCaller {
    /// Adds the identity headers for `caller` to the outgoing request.
    fn with_caller(self, caller: &Caller) -> Self;
}

impl WithCaller for OneShotBuilder {
    fn with_caller(self, caller: &Caller) -> Self {
        self.with_header(CALLER_ID_HEADER, caller.id().to_string())
            .with_header(CALLER_ROLE_HEADER, caller.role().as_str())
    }
}
