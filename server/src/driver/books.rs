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

//! Extends the driver with the book catalog operations.

use crate::db;
use crate::driver::{Driver, RELATED_BOOKS_LIMIT, get_existing_book};
use crate::model::{
    Book, BookDetails, BookFilters, BookId, BookSort, Caller, Page, PageRequest, Pagination,
};
use shelfmark_core::db::DbError;
use shelfmark_core::driver::{DriverError, DriverResult};
use time::OffsetDateTime;

/// Rejects callers that are not allowed to modify the catalog.
fn require_catalog_admin(caller: &Caller) -> DriverResult<()> {
    if !caller.is_admin() {
        return Err(DriverError::Forbidden(
            "Only administrators can modify the catalog".to_owned(),
        ));
    }
    Ok(())
}

/// Rejects details whose publication date is after `now`.
fn validate_published_date(details: &BookDetails, now: OffsetDateTime) -> DriverResult<()> {
    if let Some(date) = details.published_date() {
        if *date > now.date() {
            return Err(DriverError::InvalidInput(
                "Published date cannot be in the future".to_owned(),
            ));
        }
    }
    Ok(())
}

impl Driver {
    /// Adds a new book to the catalog on behalf of `caller`.
    pub(crate) async fn create_book(
        self,
        caller: Caller,
        details: BookDetails,
    ) -> DriverResult<Book> {
        require_catalog_admin(&caller)?;

        let now = self.clock.now_utc();
        validate_published_date(&details, now)?;

        let mut ex = self.db.ex().await?;

        if let Some(isbn) = details.isbn() {
            if db::find_book_id_by_isbn(&mut ex, isbn).await?.is_some() {
                return Err(DriverError::AlreadyExists(format!(
                    "A book with ISBN {} already exists",
                    isbn.as_str()
                )));
            }
        }

        let id = db::create_book(&mut ex, &details, now).await?;
        Ok(Book::with_details(id, &details, now))
    }

    /// Fetches the book `id` together with its review aggregates.
    pub(crate) async fn get_book(self, id: BookId) -> DriverResult<Book> {
        let mut ex = self.db.ex().await?;
        get_existing_book(&mut ex, id).await
    }

    /// Lists the catalog page selected by `filters`, `sort` and `page`.
    pub(crate) async fn list_books(
        self,
        filters: BookFilters,
        sort: BookSort,
        page: PageRequest,
    ) -> DriverResult<Page<Book>> {
        let mut ex = self.db.ex().await?;
        let total = db::count_books(&mut ex, &filters).await?;
        let books = db::list_books(&mut ex, &filters, &sort, &page).await?;
        Ok(Page::new(books, Pagination::new(&page, total)))
    }

    /// Searches the catalog, which requires at least one active filter.
    pub(crate) async fn search_books(
        self,
        filters: BookFilters,
        sort: BookSort,
        page: PageRequest,
    ) -> DriverResult<Page<Book>> {
        if filters.is_empty() {
            return Err(DriverError::InvalidInput(
                "At least one search filter must be supplied".to_owned(),
            ));
        }
        self.list_books(filters, sort, page).await
    }

    /// Replaces the details of the book `id` on behalf of `caller`.
    pub(crate) async fn update_book(
        self,
        caller: Caller,
        id: BookId,
        details: BookDetails,
    ) -> DriverResult<Book> {
        require_catalog_admin(&caller)?;

        let now = self.clock.now_utc();
        validate_published_date(&details, now)?;

        let mut ex = self.db.ex().await?;

        if let Some(isbn) = details.isbn() {
            match db::find_book_id_by_isbn(&mut ex, isbn).await? {
                Some(other) if other != id => {
                    return Err(DriverError::AlreadyExists(format!(
                        "A book with ISBN {} already exists",
                        isbn.as_str()
                    )));
                }
                _ => (),
            }
        }

        match db::update_book(&mut ex, id, &details, now).await {
            Ok(()) => (),
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound(format!("Book {} not found", id)));
            }
            Err(e) => return Err(e.into()),
        }

        Ok(db::get_book(&mut ex, id).await?)
    }

    /// Deletes the book `id` and everything that hangs off it on behalf of `caller`.
    pub(crate) async fn delete_book(self, caller: Caller, id: BookId) -> DriverResult<()> {
        require_catalog_admin(&caller)?;

        let mut tx = self.db.begin().await?;

        db::delete_reviews_by_book(tx.ex(), id).await?;
        db::delete_wishlist_by_book(tx.ex(), id).await?;
        match db::delete_book(tx.ex(), id).await {
            Ok(()) => (),
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound(format!("Book {} not found", id)));
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit().await?;
        Ok(())
    }

    /// Looks up books that share a genre with the book `id`, best rated first.
    pub(crate) async fn get_related_books(self, id: BookId) -> DriverResult<Vec<Book>> {
        let mut ex = self.db.ex().await?;
        let book = get_existing_book(&mut ex, id).await?;
        match book.genre() {
            Some(genre) => {
                Ok(db::get_related_books(&mut ex, id, genre, RELATED_BOOKS_LIMIT).await?)
            }
            None => Ok(vec![]),
        }
    }
}
