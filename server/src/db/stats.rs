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

//! Queries to compute aggregate statistics over the reviews.

use crate::model::{BookId, TopReviewer, UserId, round2};
use futures::TryStreamExt;
#[cfg(feature = "postgres")]
use shelfmark_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use shelfmark_core::db::sqlite::{self, unpack_timestamp};
use shelfmark_core::db::{DbError, DbResult, Executor};
use shelfmark_core::model::Username;
use sqlx::Row;
use time::OffsetDateTime;

/// Computes the count, mean, minimum and maximum of the ratings of `book_id`.
///
/// The mean comes back rounded to two decimals.  All values are zero when the book has no
/// reviews.
pub(crate) async fn book_rating_stats(
    ex: &mut Executor,
    book_id: BookId,
) -> DbResult<(i64, f64, f64, f64)> {
    let row_stats = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT COUNT(*) AS review_count,
                    CAST(COALESCE(AVG(rating), 0) AS DOUBLE PRECISION) AS average_rating,
                    CAST(COALESCE(MIN(rating), 0) AS DOUBLE PRECISION) AS min_rating,
                    CAST(COALESCE(MAX(rating), 0) AS DOUBLE PRECISION) AS max_rating
                FROM reviews WHERE book_id = $1";
            let row = sqlx::query(query_str)
                .bind(book_id.as_i64())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            (
                row.try_get::<i64, _>("review_count").map_err(postgres::map_sqlx_error)?,
                row.try_get::<f64, _>("average_rating").map_err(postgres::map_sqlx_error)?,
                row.try_get::<f64, _>("min_rating").map_err(postgres::map_sqlx_error)?,
                row.try_get::<f64, _>("max_rating").map_err(postgres::map_sqlx_error)?,
            )
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT COUNT(*) AS review_count,
                    CAST(COALESCE(AVG(rating), 0) AS REAL) AS average_rating,
                    CAST(COALESCE(MIN(rating), 0) AS REAL) AS min_rating,
                    CAST(COALESCE(MAX(rating), 0) AS REAL) AS max_rating
                FROM reviews WHERE book_id = ?";
            let row = sqlx::query(query_str)
                .bind(book_id.as_i64())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            (
                row.try_get::<i64, _>("review_count").map_err(sqlite::map_sqlx_error)?,
                row.try_get::<f64, _>("average_rating").map_err(sqlite::map_sqlx_error)?,
                row.try_get::<f64, _>("min_rating").map_err(sqlite::map_sqlx_error)?,
                row.try_get::<f64, _>("max_rating").map_err(sqlite::map_sqlx_error)?,
            )
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    let (review_count, average_rating, min_rating, max_rating) = row_stats;
    Ok((review_count, round2(average_rating), min_rating, max_rating))
}

/// Computes the per-star review counts, either for one book or across the whole service.
pub(crate) async fn rating_histogram(
    ex: &mut Executor,
    book_id: Option<BookId>,
) -> DbResult<[i64; 5]> {
    let mut pairs = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = match book_id {
                Some(_) => {
                    "SELECT rating, COUNT(*) AS count FROM reviews WHERE book_id = $1
                        GROUP BY rating"
                }
                None => "SELECT rating, COUNT(*) AS count FROM reviews GROUP BY rating",
            };
            let mut query = sqlx::query(query_str);
            if let Some(book_id) = book_id {
                query = query.bind(book_id.as_i64());
            }
            let mut rows = query.fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                let rating: i16 = row.try_get("rating").map_err(postgres::map_sqlx_error)?;
                let count: i64 = row.try_get("count").map_err(postgres::map_sqlx_error)?;
                pairs.push((i64::from(rating), count));
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = match book_id {
                Some(_) => {
                    "SELECT rating, COUNT(*) AS count FROM reviews WHERE book_id = ?
                        GROUP BY rating"
                }
                None => "SELECT rating, COUNT(*) AS count FROM reviews GROUP BY rating",
            };
            let mut query = sqlx::query(query_str);
            if let Some(book_id) = book_id {
                query = query.bind(book_id.as_i64());
            }
            let mut rows = query.fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                let rating: i64 = row.try_get("rating").map_err(sqlite::map_sqlx_error)?;
                let count: i64 = row.try_get("count").map_err(sqlite::map_sqlx_error)?;
                pairs.push((rating, count));
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }

    let mut histogram = [0; 5];
    for (rating, count) in pairs {
        match rating {
            1..=5 => histogram[(rating - 1) as usize] = count,
            _ => {
                return Err(DbError::DataIntegrityError(format!(
                    "Review rating {} is out of range",
                    rating
                )));
            }
        }
    }
    Ok(histogram)
}

/// Computes the count and mean of all review ratings in the service.
///
/// The mean comes back rounded to two decimals and is zero when there are no reviews.
pub(crate) async fn global_rating_stats(ex: &mut Executor) -> DbResult<(i64, f64)> {
    let (total, average) = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT COUNT(*) AS total,
                    CAST(COALESCE(AVG(rating), 0) AS DOUBLE PRECISION) AS average_rating
                FROM reviews";
            let row = sqlx::query(query_str)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            (
                row.try_get::<i64, _>("total").map_err(postgres::map_sqlx_error)?,
                row.try_get::<f64, _>("average_rating").map_err(postgres::map_sqlx_error)?,
            )
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT COUNT(*) AS total,
                    CAST(COALESCE(AVG(rating), 0) AS REAL) AS average_rating
                FROM reviews";
            let row = sqlx::query(query_str)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            (
                row.try_get::<i64, _>("total").map_err(sqlite::map_sqlx_error)?,
                row.try_get::<f64, _>("average_rating").map_err(sqlite::map_sqlx_error)?,
            )
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    Ok((total, round2(average)))
}

/// Fetches the `limit` accounts with the most reviews, most prolific first.
pub(crate) async fn top_reviewers(ex: &mut Executor, limit: i64) -> DbResult<Vec<TopReviewer>> {
    let mut reviewers = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT u.id, u.username, COUNT(r.id) AS review_count
                FROM reviews r JOIN users u ON u.id = r.user_id
                GROUP BY u.id, u.username
                ORDER BY review_count DESC, u.id ASC
                LIMIT $1";
            let mut rows = sqlx::query(query_str).bind(limit).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
                let username: String = row.try_get("username").map_err(postgres::map_sqlx_error)?;
                let review_count: i64 =
                    row.try_get("review_count").map_err(postgres::map_sqlx_error)?;
                reviewers.push(TopReviewer::new(
                    UserId::from_db(id)?,
                    Username::new(username)?,
                    review_count,
                ));
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT u.id, u.username, COUNT(r.id) AS review_count
                FROM reviews r JOIN users u ON u.id = r.user_id
                GROUP BY u.id, u.username
                ORDER BY review_count DESC, u.id ASC
                LIMIT ?";
            let mut rows = sqlx::query(query_str).bind(limit).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
                let username: String = row.try_get("username").map_err(sqlite::map_sqlx_error)?;
                let review_count: i64 =
                    row.try_get("review_count").map_err(sqlite::map_sqlx_error)?;
                reviewers.push(TopReviewer::new(
                    UserId::from_db(id)?,
                    Username::new(username)?,
                    review_count,
                ));
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(reviewers)
}

/// Counts the reviews created at or after `cutoff`.
pub(crate) async fn count_reviews_since(
    ex: &mut Executor,
    cutoff: OffsetDateTime,
) -> DbResult<i64> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT COUNT(*) AS total FROM reviews WHERE created_at >= $1";
            let row = sqlx::query(query_str)
                .bind(cutoff)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("total").map_err(postgres::map_sqlx_error)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (cutoff_secs, cutoff_nsecs) = unpack_timestamp(cutoff);

            let query_str = "
                SELECT COUNT(*) AS total FROM reviews
                WHERE created_at_secs > ? OR (created_at_secs = ? AND created_at_nsecs >= ?)";
            let row = sqlx::query(query_str)
                .bind(cutoff_secs)
                .bind(cutoff_secs)
                .bind(cutoff_nsecs)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("total").map_err(sqlite::map_sqlx_error)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}
