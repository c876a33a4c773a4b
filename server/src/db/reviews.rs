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

//! Queries to manipulate reviews.

use crate::model::{BookId, PageRequest, Rating, Review, ReviewId, UserId, UserReview};
use futures::TryStreamExt;
#[cfg(feature = "postgres")]
use shelfmark_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use shelfmark_core::db::sqlite::{self, build_timestamp, unpack_timestamp};
use shelfmark_core::db::{DbError, DbResult, Executor, ensure_one_upsert};
use shelfmark_core::model::Username;
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;
use time::OffsetDateTime;

/// Column list shared by all PostgreSQL queries that produce `Review` rows.  Requires the
/// reviews table to be aliased as `r` and the users table as `u`.
#[cfg(feature = "postgres")]
const PG_REVIEW_COLUMNS: &str =
    "r.id, r.book_id, r.user_id, u.username, r.rating, r.comment, r.created_at, r.updated_at";

/// Column list shared by all SQLite queries that produce `Review` rows.  Requires the reviews
/// table to be aliased as `r` and the users table as `u`.
#[cfg(any(feature = "sqlite", test))]
const SQLITE_REVIEW_COLUMNS: &str = "r.id, r.book_id, r.user_id, u.username, r.rating, r.comment,
    r.created_at_secs, r.created_at_nsecs, r.updated_at_secs, r.updated_at_nsecs";

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Review {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let book_id: i64 = row.try_get("book_id").map_err(postgres::map_sqlx_error)?;
        let user_id: i64 = row.try_get("user_id").map_err(postgres::map_sqlx_error)?;
        let username: String = row.try_get("username").map_err(postgres::map_sqlx_error)?;
        let rating: i16 = row.try_get("rating").map_err(postgres::map_sqlx_error)?;
        let comment: Option<String> = row.try_get("comment").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

        Ok(Review::new(
            ReviewId::from_db(id)?,
            BookId::from_db(book_id)?,
            UserId::from_db(user_id)?,
            Username::new(username)?,
            Rating::new(rating)?,
            comment,
            created_at,
            updated_at,
        ))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Review {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let book_id: i64 = row.try_get("book_id").map_err(sqlite::map_sqlx_error)?;
        let user_id: i64 = row.try_get("user_id").map_err(sqlite::map_sqlx_error)?;
        let username: String = row.try_get("username").map_err(sqlite::map_sqlx_error)?;
        let rating: i16 = row.try_get("rating").map_err(sqlite::map_sqlx_error)?;
        let comment: Option<String> = row.try_get("comment").map_err(sqlite::map_sqlx_error)?;
        let created_at_secs: i64 =
            row.try_get("created_at_secs").map_err(sqlite::map_sqlx_error)?;
        let created_at_nsecs: i64 =
            row.try_get("created_at_nsecs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_secs: i64 =
            row.try_get("updated_at_secs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_nsecs: i64 =
            row.try_get("updated_at_nsecs").map_err(sqlite::map_sqlx_error)?;

        Ok(Review::new(
            ReviewId::from_db(id)?,
            BookId::from_db(book_id)?,
            UserId::from_db(user_id)?,
            Username::new(username)?,
            Rating::new(rating)?,
            comment,
            build_timestamp(created_at_secs, created_at_nsecs)?,
            build_timestamp(updated_at_secs, updated_at_nsecs)?,
        ))
    }
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for UserReview {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let book_id: i64 = row.try_get("book_id").map_err(postgres::map_sqlx_error)?;
        let book_title: String = row.try_get("book_title").map_err(postgres::map_sqlx_error)?;
        let rating: i16 = row.try_get("rating").map_err(postgres::map_sqlx_error)?;
        let comment: Option<String> = row.try_get("comment").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

        Ok(UserReview::new(
            ReviewId::from_db(id)?,
            BookId::from_db(book_id)?,
            book_title,
            Rating::new(rating)?,
            comment,
            created_at,
            updated_at,
        ))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for UserReview {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let book_id: i64 = row.try_get("book_id").map_err(sqlite::map_sqlx_error)?;
        let book_title: String = row.try_get("book_title").map_err(sqlite::map_sqlx_error)?;
        let rating: i16 = row.try_get("rating").map_err(sqlite::map_sqlx_error)?;
        let comment: Option<String> = row.try_get("comment").map_err(sqlite::map_sqlx_error)?;
        let created_at_secs: i64 =
            row.try_get("created_at_secs").map_err(sqlite::map_sqlx_error)?;
        let created_at_nsecs: i64 =
            row.try_get("created_at_nsecs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_secs: i64 =
            row.try_get("updated_at_secs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_nsecs: i64 =
            row.try_get("updated_at_nsecs").map_err(sqlite::map_sqlx_error)?;

        Ok(UserReview::new(
            ReviewId::from_db(id)?,
            BookId::from_db(book_id)?,
            book_title,
            Rating::new(rating)?,
            comment,
            build_timestamp(created_at_secs, created_at_nsecs)?,
            build_timestamp(updated_at_secs, updated_at_nsecs)?,
        ))
    }
}

/// Records a new review of `book_id` by `user_id` and returns its id.
pub(crate) async fn create_review(
    ex: &mut Executor,
    book_id: BookId,
    user_id: UserId,
    rating: Rating,
    comment: Option<&str>,
    now: OffsetDateTime,
) -> DbResult<ReviewId> {
    let id = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO reviews (book_id, user_id, rating, comment, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(book_id.as_i64())
                .bind(user_id.as_i64())
                .bind(rating.as_i16())
                .bind(comment)
                .bind(now)
                .bind(now)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (now_secs, now_nsecs) = unpack_timestamp(now);

            let query_str = "
                INSERT INTO reviews (book_id, user_id, rating, comment,
                    created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(book_id.as_i64())
                .bind(user_id.as_i64())
                .bind(rating.as_i16())
                .bind(comment)
                .bind(now_secs)
                .bind(now_nsecs)
                .bind(now_secs)
                .bind(now_nsecs)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.last_insert_rowid()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    Ok(ReviewId::from_db(id)?)
}

/// Fetches the review with the given `id`, including the name of its author.
pub(crate) async fn get_review(ex: &mut Executor, id: ReviewId) -> DbResult<Review> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = format!(
                "SELECT {}
                FROM reviews r JOIN users u ON u.id = r.user_id
                WHERE r.id = $1",
                PG_REVIEW_COLUMNS
            );
            let row = sqlx::query(&query_str)
                .bind(id.as_i64())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            Review::try_from(row)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = format!(
                "SELECT {}
                FROM reviews r JOIN users u ON u.id = r.user_id
                WHERE r.id = ?",
                SQLITE_REVIEW_COLUMNS
            );
            let row = sqlx::query(&query_str)
                .bind(id.as_i64())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Review::try_from(row)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Looks up the id of the review that `user_id` wrote for `book_id`, if any.
pub(crate) async fn find_review_by_user_and_book(
    ex: &mut Executor,
    user_id: UserId,
    book_id: BookId,
) -> DbResult<Option<ReviewId>> {
    let id = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT id FROM reviews WHERE user_id = $1 AND book_id = $2";
            let maybe_row = sqlx::query(query_str)
                .bind(user_id.as_i64())
                .bind(book_id.as_i64())
                .fetch_optional(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            match maybe_row {
                Some(row) => Some(row.try_get::<i64, _>("id").map_err(postgres::map_sqlx_error)?),
                None => None,
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT id FROM reviews WHERE user_id = ? AND book_id = ?";
            let maybe_row = sqlx::query(query_str)
                .bind(user_id.as_i64())
                .bind(book_id.as_i64())
                .fetch_optional(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            match maybe_row {
                Some(row) => Some(row.try_get::<i64, _>("id").map_err(sqlite::map_sqlx_error)?),
                None => None,
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match id {
        Some(id) => Ok(Some(ReviewId::from_db(id)?)),
        None => Ok(None),
    }
}

/// Replaces the rating and comment of the review with the given `id`.
pub(crate) async fn update_review(
    ex: &mut Executor,
    id: ReviewId,
    rating: Rating,
    comment: Option<&str>,
    now: OffsetDateTime,
) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str =
                "UPDATE reviews SET rating = $1, comment = $2, updated_at = $3 WHERE id = $4";
            let done = sqlx::query(query_str)
                .bind(rating.as_i16())
                .bind(comment)
                .bind(now)
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            ensure_one_upsert(done.rows_affected())
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (now_secs, now_nsecs) = unpack_timestamp(now);

            let query_str = "
                UPDATE reviews SET rating = ?, comment = ?, updated_at_secs = ?,
                    updated_at_nsecs = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(rating.as_i16())
                .bind(comment)
                .bind(now_secs)
                .bind(now_nsecs)
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            ensure_one_upsert(done.rows_affected())
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Deletes the review with the given `id`.
pub(crate) async fn delete_review(ex: &mut Executor, id: ReviewId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM reviews WHERE id = $1";
            let done = sqlx::query(query_str)
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM reviews WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(id.as_i64())
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

/// Fetches one page of the reviews of `book_id`, newest first.
pub(crate) async fn list_reviews_by_book(
    ex: &mut Executor,
    book_id: BookId,
    page: &PageRequest,
) -> DbResult<Vec<Review>> {
    let mut reviews = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = format!(
                "SELECT {}
                FROM reviews r JOIN users u ON u.id = r.user_id
                WHERE r.book_id = $1
                ORDER BY r.created_at DESC, r.id DESC
                LIMIT $2 OFFSET $3",
                PG_REVIEW_COLUMNS
            );
            let mut rows = sqlx::query(&query_str)
                .bind(book_id.as_i64())
                .bind(i64::from(page.limit()))
                .bind(page.offset())
                .fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                reviews.push(Review::try_from(row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = format!(
                "SELECT {}
                FROM reviews r JOIN users u ON u.id = r.user_id
                WHERE r.book_id = ?
                ORDER BY r.created_at_secs DESC, r.created_at_nsecs DESC, r.id DESC
                LIMIT ? OFFSET ?",
                SQLITE_REVIEW_COLUMNS
            );
            let mut rows = sqlx::query(&query_str)
                .bind(book_id.as_i64())
                .bind(i64::from(page.limit()))
                .bind(page.offset())
                .fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                reviews.push(Review::try_from(row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(reviews)
}

/// Counts the reviews of `book_id` across all pages.
pub(crate) async fn count_reviews_by_book(ex: &mut Executor, book_id: BookId) -> DbResult<i64> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT COUNT(*) AS total FROM reviews WHERE book_id = $1";
            let row = sqlx::query(query_str)
                .bind(book_id.as_i64())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("total").map_err(postgres::map_sqlx_error)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT COUNT(*) AS total FROM reviews WHERE book_id = ?";
            let row = sqlx::query(query_str)
                .bind(book_id.as_i64())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("total").map_err(sqlite::map_sqlx_error)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Fetches one page of the reviews written by `user_id`, newest first, including the titles
/// of the reviewed books.
pub(crate) async fn list_reviews_by_user(
    ex: &mut Executor,
    user_id: UserId,
    page: &PageRequest,
) -> DbResult<Vec<UserReview>> {
    let mut reviews = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT r.id, r.book_id, b.title AS book_title, r.rating, r.comment,
                    r.created_at, r.updated_at
                FROM reviews r JOIN books b ON b.id = r.book_id
                WHERE r.user_id = $1
                ORDER BY r.created_at DESC, r.id DESC
                LIMIT $2 OFFSET $3";
            let mut rows = sqlx::query(query_str)
                .bind(user_id.as_i64())
                .bind(i64::from(page.limit()))
                .bind(page.offset())
                .fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                reviews.push(UserReview::try_from(row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT r.id, r.book_id, b.title AS book_title, r.rating, r.comment,
                    r.created_at_secs, r.created_at_nsecs, r.updated_at_secs, r.updated_at_nsecs
                FROM reviews r JOIN books b ON b.id = r.book_id
                WHERE r.user_id = ?
                ORDER BY r.created_at_secs DESC, r.created_at_nsecs DESC, r.id DESC
                LIMIT ? OFFSET ?";
            let mut rows = sqlx::query(query_str)
                .bind(user_id.as_i64())
                .bind(i64::from(page.limit()))
                .bind(page.offset())
                .fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                reviews.push(UserReview::try_from(row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(reviews)
}

/// Counts the reviews written by `user_id` across all pages.
pub(crate) async fn count_reviews_by_user(ex: &mut Executor, user_id: UserId) -> DbResult<i64> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT COUNT(*) AS total FROM reviews WHERE user_id = $1";
            let row = sqlx::query(query_str)
                .bind(user_id.as_i64())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("total").map_err(postgres::map_sqlx_error)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT COUNT(*) AS total FROM reviews WHERE user_id = ?";
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

/// Deletes all reviews of `book_id`.  Deleting zero reviews is not an error.
pub(crate) async fn delete_reviews_by_book(ex: &mut Executor, book_id: BookId) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM reviews WHERE book_id = $1";
            sqlx::query(query_str)
                .bind(book_id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM reviews WHERE book_id = ?";
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

/// Deletes all reviews written by `user_id`.  Deleting zero reviews is not an error.
pub(crate) async fn delete_reviews_by_user(ex: &mut Executor, user_id: UserId) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM reviews WHERE user_id = $1";
            sqlx::query(query_str)
                .bind(user_id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM reviews WHERE user_id = ?";
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
