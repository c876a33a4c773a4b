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

//! Utilities to write driver tests.

use crate::db;
use crate::driver::Driver;
use crate::model::{BookDetails, BookId, Caller, Rating, ReviewId, User, UserId, UserRole};
use shelfmark_core::clocks::Clock;
use shelfmark_core::clocks::testutils::SettableClock;
use shelfmark_core::db::{Db, Executor};
use shelfmark_core::model::{EmailAddress, Username};
use std::sync::Arc;
use time::macros::datetime;

/// State of a running test.
pub(crate) struct TestContext {
    /// The database that backs the driver, kept to inspect state behind its back.
    db: Arc<dyn Db + Send + Sync>,

    /// The clock that backs the driver, kept to manipulate the current time.
    clock: Arc<SettableClock>,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes a driver backed by an in-memory database and a settable clock.
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::from(shelfmark_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let clock = Arc::from(SettableClock::new(datetime!(2024-06-10 14:30:00 UTC)));
        let driver = Driver::new(db.clone(), clock.clone());
        TestContext { db, clock, driver }
    }

    /// Gets a copy of the driver in this test context.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Gets the settable clock that feeds the driver.
    pub(crate) fn clock(&self) -> &SettableClock {
        &self.clock
    }

    /// Gets a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Syntactic sugar to insert a user behind the driver's back.
    pub(crate) async fn create_test_user(&self, username: &str, role: UserRole) -> User {
        let username = Username::new(username).unwrap();
        let email = EmailAddress::new(format!("{}@example.com", username.as_str())).unwrap();
        db::create_user(&mut self.ex().await, &username, &email, role, self.clock.now_utc())
            .await
            .unwrap()
    }

    /// Syntactic sugar to insert a user and build the caller identity it would present.
    pub(crate) async fn create_test_caller(&self, username: &str, role: UserRole) -> Caller {
        let user = self.create_test_user(username, role).await;
        Caller::new(*user.id(), role)
    }

    /// Syntactic sugar to insert a book with placeholder details.
    pub(crate) async fn create_test_book(&self, title: &str) -> BookId {
        let details =
            BookDetails::new(title, "Unnamed Author", None, None, None, None, None).unwrap();
        db::create_book(&mut self.ex().await, &details, self.clock.now_utc()).await.unwrap()
    }

    /// Syntactic sugar to insert a review without a comment.
    pub(crate) async fn create_test_review(
        &self,
        book_id: BookId,
        user_id: UserId,
        rating: i16,
    ) -> ReviewId {
        let rating = Rating::new(rating).unwrap();
        let now = self.clock.now_utc();
        db::create_review(&mut self.ex().await, book_id, user_id, rating, None, now).await.unwrap()
    }

    /// Runs a raw statement against the test database to simulate backend failures.
    pub(crate) async fn exec_raw(&self, sql: &str) {
        match &mut self.ex().await {
            Executor::Sqlite(ex) => {
                sqlx::query(sql).execute(ex.conn()).await.unwrap();
            }

            #[allow(unused)]
            _ => unreachable!(),
        }
    }
}
