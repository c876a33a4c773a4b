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

//! Extends the driver with the wishlist operations.
//!
//! The wishlist is strictly per-user: every operation acts on the calling user's own list,
//! so there is nothing to authorize beyond knowing who the caller is.

use crate::db;
use crate::driver::{Driver, get_existing_book};
use crate::model::{Book, BookId, Caller, Page, PageRequest, Pagination};
use shelfmark_core::db::DbError;
use shelfmark_core::driver::{DriverError, DriverResult};

impl Driver {
    /// Adds the book `book_id` to the calling user's wishlist.
    pub(crate) async fn add_to_wishlist(self, caller: Caller, book_id: BookId) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;

        get_existing_book(&mut ex, book_id).await?;

        let now = self.clock.now_utc();
        match db::add_to_wishlist(&mut ex, caller.id(), book_id, now).await {
            Ok(()) => Ok(()),
            Err(DbError::AlreadyExists) => Err(DriverError::AlreadyExists(format!(
                "Book {} is already in the wishlist",
                book_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes the book `book_id` from the calling user's wishlist.
    pub(crate) async fn remove_from_wishlist(
        self,
        caller: Caller,
        book_id: BookId,
    ) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;

        match db::remove_from_wishlist(&mut ex, caller.id(), book_id).await {
            Ok(()) => Ok(()),
            Err(DbError::NotFound) => Err(DriverError::NotFound(format!(
                "Book {} is not in the wishlist",
                book_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists the calling user's wishlist, most recently added first.
    pub(crate) async fn list_wishlist(
        self,
        caller: Caller,
        page: PageRequest,
    ) -> DriverResult<Page<Book>> {
        let mut ex = self.db.ex().await?;
        let total = db::count_wishlist(&mut ex, caller.id()).await?;
        let books = db::list_wishlist(&mut ex, caller.id(), &page).await?;
        Ok(Page::new(books, Pagination::new(&page, total)))
    }
}
