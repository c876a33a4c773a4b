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

//! Queries to manipulate per-user wishlists.
//!
//! Wishlist entries are plain (user, book) pairs, so the listing queries produce full `Book`
//! rows by reusing the column lists from the books queries.

#[cfg(feature = "postgres")]
use crate::db::books::PG_BOOK_COLUMNS;
#[cfg(any(feature = "sqlite", test))]
use crate::db::books::SQLITE_BOOK_COLUMNS;
use crate::model::{Book, BookId, PageRequest, UserId};
use futures::TryStreamExt;
#[cfg(feature = "postgres")]
use shelfmark_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use shelfmark_core::db::sqlite::{self, unpack_timestamp};
use shelfmark_core::db::{DbError, DbResult, Executor};
use sqlx::Row;
use time::OffsetDateTime;

/// Adds `book_id` to the wishlist of `user_id`.
///
/// Fails with `DbError::AlreadyExists` when the book is already on the wishlist.
pub(crate) async fn add_to_wishlist(
    ex: &mut Executor,
    user_id: UserId,
    book_id: BookId,
    now: OffsetDateTime,
) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str =
                "INSERT INTO wishlist (user_id, book_id, created_at) VALUES ($1, $2, $3)";
            sqlx::query(query_str)
                .bind(user_id.as_i64())
                .bind(book_id.as_i64())
                .bind(now)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (now_secs, now_nsecs) = unpack_timestamp(now);

            let query_str = "
                INSERT INTO wishlist (user_id, book_id, created_at_secs, created_at_nsecs)
                VALUES (?, ?, ?, ?)";
            sqlx::query(query_str)
                .bind(user_id.as_i64())
                .bind(book_id.as_i64())
                .bind(now_secs)
                .bind(now_nsecs)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(())
}

/// Removes `book_id` from the wishlist of `user_id`.
pub(crate) async fn remove_from_wishlist(
    ex: &mut Executor,
    user_id: UserId,
    book_id: BookId,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM wishlist WHERE user_id = $1 AND book_id = $2";
            let done = sqlx::query(query_str)
                .bind(user_id.as_i64())
                .bind(book_id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM wishlist WHERE user_id = ? AND book_id = ?";
            let done = sqlx::query(query_str)
                .bind(user_id.as_i64())
                .bind(book_id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}

/// Fetches one page of the books on the wishlist of `user_id`, most recently added first.
pub(crate) async fn list_wishlist(
    ex: &mut Executor,
    user_id: UserId,
    page: &PageRequest,
) -> DbResult<Vec<Book>> {
    let mut books = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = format!(
                "SELECT {}
                FROM wishlist w
                    JOIN books b ON b.id = w.book_id
                    LEFT JOIN reviews r ON r.book_id = b.id
                WHERE w.user_id = $1
                GROUP BY b.id, w.created_at
                ORDER BY w.created_at DESC, b.id ASC
                LIMIT $2 OFFSET $3",
                PG_BOOK_COLUMNS
            );
            let mut rows = sqlx::query(&query_str)
                .bind(user_id.as_i64())
                .bind(i64::from(page.limit()))
                .bind(page.offset())
                .fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                books.push(Book::try_from(row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = format!(
                "SELECT {}
                FROM wishlist w
                    JOIN books b ON b.id = w.book_id
                    LEFT JOIN reviews r ON r.book_id = b.id
                WHERE w.user_id = ?
                GROUP BY b.id, w.created_at_secs, w.created_at_nsecs
                ORDER BY w.created_at_secs DESC, w.created_at_nsecs DESC, b.id ASC
                LIMIT ? OFFSET ?",
                SQLITE_BOOK_COLUMNS
            );
            let mut rows = sqlx::query(&query_str)
                .bind(user_id.as_i64())
                .bind(i64::from(page.limit()))
                .bind(page.offset())
                .fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                books.push(Book::try_from(row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(books)
}

/// Counts the books on the wishlist of `user_id` across all pages.
pub(crate) async fn count_wishlist(ex: &mut Executor, user_id: UserId) -> DbResult<i64> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT COUNT(*) AS total FROM wishlist WHERE user_id = $1";
            let row = sqlx::query(query_str)
                .bind(user_id.as_i64())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("total").map_err(postgres::map_sqlx_error)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT COUNT(*) AS total FROM wishlist WHERE user_id = ?";
            let row = sqlx::query(query_str)
                .bind(user_id.as_i64())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("total").map_err(sqlite::map_sqlx_error)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Deletes all wishlist entries of `user_id`.  Deleting zero entries is not an error.
pub(crate) async fn delete_wishlist_by_user(ex: &mut Executor, user_id: UserId) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM wishlist WHERE user_id = $1";
            sqlx::query(query_str)
                .bind(user_id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM wishlist WHERE user_id = ?";
            sqlx::query(query_str)
                .bind(user_id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(())
}

/// Deletes all wishlist entries that refer to `book_id`.  Deleting zero entries is not an
/// error.
pub(crate) async fn delete_wishlist_by_book(ex: &mut Executor, book_id: BookId) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM wishlist WHERE book_id = $1";
            sqlx::query(query_str)
                .bind(book_id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM wishlist WHERE book_id = ?";
            sqlx::query(query_str)
                .bind(book_id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(())
}
