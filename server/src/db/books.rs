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

//! Queries to manipulate the book catalog.
//!
//! Every query that produces `Book` rows joins the reviews table so that the aggregates come
//! back in the same round trip as the books themselves.

use crate::model::{
    Book, BookDetails, BookFilters, BookId, BookSort, BookSortKey, Isbn, PageRequest, SortOrder,
    round2,
};
#[cfg(any(feature = "sqlite", test))]
use crate::model::{format_date, parse_date};
use futures::TryStreamExt;
#[cfg(feature = "postgres")]
use shelfmark_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use shelfmark_core::db::sqlite::{self, build_timestamp, unpack_timestamp};
use shelfmark_core::db::{DbError, DbResult, Executor, ensure_one_upsert};
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;
use time::OffsetDateTime;

/// Column list shared by all PostgreSQL queries that produce `Book` rows.  Requires the books
/// table to be aliased as `b`, the reviews table as `r`, and the results to be grouped by the
/// book id.
#[cfg(feature = "postgres")]
pub(super) const PG_BOOK_COLUMNS: &str = "b.id, b.title, b.author, b.description, b.isbn, b.genre,
    b.published_date, b.cover_url, b.created_at, b.updated_at,
    CAST(COALESCE(AVG(r.rating), 0) AS DOUBLE PRECISION) AS average_rating,
    COUNT(r.id) AS review_count";

/// Column list shared by all SQLite queries that produce `Book` rows.  Requires the books
/// table to be aliased as `b`, the reviews table as `r`, and the results to be grouped by the
/// book id.
#[cfg(any(feature = "sqlite", test))]
pub(super) const SQLITE_BOOK_COLUMNS: &str = "b.id, b.title, b.author, b.description, b.isbn,
    b.genre,
    b.published_date, b.cover_url,
    b.created_at_secs, b.created_at_nsecs, b.updated_at_secs, b.updated_at_nsecs,
    CAST(COALESCE(AVG(r.rating), 0) AS REAL) AS average_rating,
    COUNT(r.id) AS review_count";

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Book {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let title: String = row.try_get("title").map_err(postgres::map_sqlx_error)?;
        let author: String = row.try_get("author").map_err(postgres::map_sqlx_error)?;
        let description: Option<String> =
            row.try_get("description").map_err(postgres::map_sqlx_error)?;
        let isbn: Option<String> = row.try_get("isbn").map_err(postgres::map_sqlx_error)?;
        let genre: Option<String> = row.try_get("genre").map_err(postgres::map_sqlx_error)?;
        let published_date: Option<time::Date> =
            row.try_get("published_date").map_err(postgres::map_sqlx_error)?;
        let cover_url: Option<String> =
            row.try_get("cover_url").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;
        let average_rating: f64 =
            row.try_get("average_rating").map_err(postgres::map_sqlx_error)?;
        let review_count: i64 =
            row.try_get("review_count").map_err(postgres::map_sqlx_error)?;

        let isbn = match isbn {
            Some(raw) => Some(Isbn::new(raw)?),
            None => None,
        };

        Ok(Book::new(
            BookId::from_db(id)?,
            title,
            author,
            description,
            isbn,
            genre,
            published_date,
            cover_url,
            round2(average_rating),
            review_count,
            created_at,
            updated_at,
        ))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Book {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let title: String = row.try_get("title").map_err(sqlite::map_sqlx_error)?;
        let author: String = row.try_get("author").map_err(sqlite::map_sqlx_error)?;
        let description: Option<String> =
            row.try_get("description").map_err(sqlite::map_sqlx_error)?;
        let isbn: Option<String> = row.try_get("isbn").map_err(sqlite::map_sqlx_error)?;
        let genre: Option<String> = row.try_get("genre").map_err(sqlite::map_sqlx_error)?;
        let published_date: Option<String> =
            row.try_get("published_date").map_err(sqlite::map_sqlx_error)?;
        let cover_url: Option<String> =
            row.try_get("cover_url").map_err(sqlite::map_sqlx_error)?;
        let created_at_secs: i64 =
            row.try_get("created_at_secs").map_err(sqlite::map_sqlx_error)?;
        let created_at_nsecs: i64 =
            row.try_get("created_at_nsecs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_secs: i64 =
            row.try_get("updated_at_secs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_nsecs: i64 =
            row.try_get("updated_at_nsecs").map_err(sqlite::map_sqlx_error)?;
        let average_rating: f64 =
            row.try_get("average_rating").map_err(sqlite::map_sqlx_error)?;
        let review_count: i64 = row.try_get("review_count").map_err(sqlite::map_sqlx_error)?;

        let isbn = match isbn {
            Some(raw) => Some(Isbn::new(raw)?),
            None => None,
        };
        let published_date = match published_date {
            Some(raw) => Some(parse_date(&raw)?),
            None => None,
        };

        Ok(Book::new(
            BookId::from_db(id)?,
            title,
            author,
            description,
            isbn,
            genre,
            published_date,
            cover_url,
            round2(average_rating),
            review_count,
            build_timestamp(created_at_secs, created_at_nsecs)?,
            build_timestamp(updated_at_secs, updated_at_nsecs)?,
        ))
    }
}

/// Builds the WHERE and HAVING clauses for `filters` with numbered placeholders starting at 1
/// and returns them together with the index of the next free placeholder.
///
/// The clauses come with a leading space and are empty when no filter needs them, so they can
/// be spliced into a query unconditionally.  `bind_filters_postgres` binds the values in the
/// order the placeholders were assigned here.
#[cfg(feature = "postgres")]
fn filters_sql_postgres(filters: &BookFilters) -> (String, String, usize) {
    let mut wheres = vec![];
    let mut havings = vec![];
    let mut next = 1;

    if filters.search().is_some() {
        wheres.push(format!(
            "(b.title ILIKE ${0} OR b.author ILIKE ${0} OR b.isbn ILIKE ${0}
                OR b.description ILIKE ${0})",
            next
        ));
        next += 1;
    }
    if filters.genre().is_some() {
        wheres.push(format!("b.genre = ${}", next));
        next += 1;
    }
    if filters.author().is_some() {
        wheres.push(format!("b.author ILIKE ${}", next));
        next += 1;
    }
    if filters.min_rating().is_some() {
        havings.push(format!("COALESCE(AVG(r.rating), 0) >= ${}", next));
        next += 1;
    }
    if filters.max_rating().is_some() {
        havings.push(format!("COALESCE(AVG(r.rating), 0) <= ${}", next));
        next += 1;
    }

    let where_sql =
        if wheres.is_empty() { String::new() } else { format!(" WHERE {}", wheres.join(" AND ")) };
    let having_sql = if havings.is_empty() {
        String::new()
    } else {
        format!(" HAVING {}", havings.join(" AND "))
    };
    (where_sql, having_sql, next)
}

/// Binds the values of `filters` in the order assigned by `filters_sql_postgres`.
#[cfg(feature = "postgres")]
fn bind_filters_postgres<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    filters: &'q BookFilters,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    if let Some(search) = filters.search() {
        query = query.bind(format!("%{}%", search));
    }
    if let Some(genre) = filters.genre() {
        query = query.bind(genre);
    }
    if let Some(author) = filters.author() {
        query = query.bind(format!("%{}%", author));
    }
    if let Some(min_rating) = filters.min_rating() {
        query = query.bind(min_rating);
    }
    if let Some(max_rating) = filters.max_rating() {
        query = query.bind(max_rating);
    }
    query
}

/// Builds the WHERE and HAVING clauses for `filters` in SQLite syntax.
///
/// The clauses come with a leading space and are empty when no filter needs them.
/// `bind_filters_sqlite` binds the values in the order the placeholders appear.
#[cfg(any(feature = "sqlite", test))]
fn filters_sql_sqlite(filters: &BookFilters) -> (String, String) {
    let mut wheres = vec![];
    let mut havings = vec![];

    if filters.search().is_some() {
        wheres.push(
            "(b.title LIKE ? OR b.author LIKE ? OR b.isbn LIKE ? OR b.description LIKE ?)"
                .to_owned(),
        );
    }
    if filters.genre().is_some() {
        wheres.push("b.genre = ?".to_owned());
    }
    if filters.author().is_some() {
        wheres.push("b.author LIKE ?".to_owned());
    }
    if filters.min_rating().is_some() {
        havings.push("COALESCE(AVG(r.rating), 0) >= ?".to_owned());
    }
    if filters.max_rating().is_some() {
        havings.push("COALESCE(AVG(r.rating), 0) <= ?".to_owned());
    }

    let where_sql =
        if wheres.is_empty() { String::new() } else { format!(" WHERE {}", wheres.join(" AND ")) };
    let having_sql = if havings.is_empty() {
        String::new()
    } else {
        format!(" HAVING {}", havings.join(" AND "))
    };
    (where_sql, having_sql)
}

/// Binds the values of `filters` in the order assigned by `filters_sql_sqlite`.
#[cfg(any(feature = "sqlite", test))]
fn bind_filters_sqlite<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    filters: &'q BookFilters,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    if let Some(search) = filters.search() {
        // The search pattern appears once per searched column.
        let pattern = format!("%{}%", search);
        query = query
            .bind(pattern.clone())
            .bind(pattern.clone())
            .bind(pattern.clone())
            .bind(pattern);
    }
    if let Some(genre) = filters.genre() {
        query = query.bind(genre);
    }
    if let Some(author) = filters.author() {
        query = query.bind(format!("%{}%", author));
    }
    if let Some(min_rating) = filters.min_rating() {
        query = query.bind(min_rating);
    }
    if let Some(max_rating) = filters.max_rating() {
        query = query.bind(max_rating);
    }
    query
}

/// Builds the ORDER BY expression for `sort` in PostgreSQL syntax.  The book id acts as the
/// final tiebreaker so that pagination sees a total order.
#[cfg(feature = "postgres")]
fn sort_sql_postgres(sort: &BookSort) -> String {
    let direction = match sort.order() {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    let column = match sort.key() {
        BookSortKey::Author => "b.author",
        BookSortKey::AverageRating => "average_rating",
        BookSortKey::CreatedAt => "b.created_at",
        BookSortKey::PublishedDate => "b.published_date",
        BookSortKey::ReviewCount => "review_count",
        BookSortKey::Title => "b.title",
    };
    format!("{} {}, b.id ASC", column, direction)
}

/// Builds the ORDER BY expression for `sort` in SQLite syntax.
#[cfg(any(feature = "sqlite", test))]
fn sort_sql_sqlite(sort: &BookSort) -> String {
    let direction = match sort.order() {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    let column = match sort.key() {
        BookSortKey::Author => "b.author",
        BookSortKey::AverageRating => "average_rating",
        BookSortKey::CreatedAt => {
            return format!(
                "b.created_at_secs {0}, b.created_at_nsecs {0}, b.id ASC",
                direction
            );
        }
        BookSortKey::PublishedDate => "b.published_date",
        BookSortKey::ReviewCount => "review_count",
        BookSortKey::Title => "b.title",
    };
    format!("{} {}, b.id ASC", column, direction)
}

/// Adds a new book to the catalog and returns its id.
pub(crate) async fn create_book(
    ex: &mut Executor,
    details: &BookDetails,
    now: OffsetDateTime,
) -> DbResult<BookId> {
    let id = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO books (
                    title, author, description, isbn, genre, published_date, cover_url,
                    created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(details.title())
                .bind(details.author())
                .bind(details.description().as_deref())
                .bind(details.isbn().as_ref().map(Isbn::as_str))
                .bind(details.genre().as_deref())
                .bind(*details.published_date())
                .bind(details.cover_url().as_deref())
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
                INSERT INTO books (
                    title, author, description, isbn, genre, published_date, cover_url,
                    created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(details.title())
                .bind(details.author())
                .bind(details.description().as_deref())
                .bind(details.isbn().as_ref().map(Isbn::as_str))
                .bind(details.genre().as_deref())
                .bind(details.published_date().map(format_date))
                .bind(details.cover_url().as_deref())
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

    Ok(BookId::from_db(id)?)
}

/// Fetches the book with the given `id` together with its review aggregates.
pub(crate) async fn get_book(ex: &mut Executor, id: BookId) -> DbResult<Book> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = format!(
                "SELECT {}
                FROM books b LEFT JOIN reviews r ON r.book_id = b.id
                WHERE b.id = $1
                GROUP BY b.id",
                PG_BOOK_COLUMNS
            );
            let row = sqlx::query(&query_str)
                .bind(id.as_i64())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            Book::try_from(row)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = format!(
                "SELECT {}
                FROM books b LEFT JOIN reviews r ON r.book_id = b.id
                WHERE b.id = ?
                GROUP BY b.id",
                SQLITE_BOOK_COLUMNS
            );
            let row = sqlx::query(&query_str)
                .bind(id.as_i64())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Book::try_from(row)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Looks up the id of the book holding `isbn`, if any.
pub(crate) async fn find_book_id_by_isbn(
    ex: &mut Executor,
    isbn: &Isbn,
) -> DbResult<Option<BookId>> {
    let id = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT id FROM books WHERE isbn = $1";
            let maybe_row = sqlx::query(query_str)
                .bind(isbn.as_str())
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
            let query_str = "SELECT id FROM books WHERE isbn = ?";
            let maybe_row = sqlx::query(query_str)
                .bind(isbn.as_str())
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
        Some(id) => Ok(Some(BookId::from_db(id)?)),
        None => Ok(None),
    }
}

/// Fetches the page of books selected by `filters`, `sort` and `page`.
pub(crate) async fn list_books(
    ex: &mut Executor,
    filters: &BookFilters,
    sort: &BookSort,
    page: &PageRequest,
) -> DbResult<Vec<Book>> {
    let mut books = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let (where_sql, having_sql, next) = filters_sql_postgres(filters);
            let query_str = format!(
                "SELECT {}
                FROM books b LEFT JOIN reviews r ON r.book_id = b.id{}
                GROUP BY b.id{}
                ORDER BY {}
                LIMIT ${} OFFSET ${}",
                PG_BOOK_COLUMNS,
                where_sql,
                having_sql,
                sort_sql_postgres(sort),
                next,
                next + 1
            );
            let query = bind_filters_postgres(sqlx::query(&query_str), filters)
                .bind(i64::from(page.limit()))
                .bind(page.offset());
            let mut rows = query.fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                books.push(Book::try_from(row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (where_sql, having_sql) = filters_sql_sqlite(filters);
            let query_str = format!(
                "SELECT {}
                FROM books b LEFT JOIN reviews r ON r.book_id = b.id{}
                GROUP BY b.id{}
                ORDER BY {}
                LIMIT ? OFFSET ?",
                SQLITE_BOOK_COLUMNS,
                where_sql,
                having_sql,
                sort_sql_sqlite(sort)
            );
            let query = bind_filters_sqlite(sqlx::query(&query_str), filters)
                .bind(i64::from(page.limit()))
                .bind(page.offset());
            let mut rows = query.fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                books.push(Book::try_from(row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(books)
}

/// Counts the books selected by `filters` across all pages.
pub(crate) async fn count_books(ex: &mut Executor, filters: &BookFilters) -> DbResult<i64> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let (where_sql, having_sql, _next) = filters_sql_postgres(filters);
            let query_str = format!(
                "SELECT COUNT(*) AS total FROM (
                    SELECT b.id
                    FROM books b LEFT JOIN reviews r ON r.book_id = b.id{}
                    GROUP BY b.id{}
                ) AS filtered",
                where_sql, having_sql
            );
            let row = bind_filters_postgres(sqlx::query(&query_str), filters)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("total").map_err(postgres::map_sqlx_error)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (where_sql, having_sql) = filters_sql_sqlite(filters);
            let query_str = format!(
                "SELECT COUNT(*) AS total FROM (
                    SELECT b.id
                    FROM books b LEFT JOIN reviews r ON r.book_id = b.id{}
                    GROUP BY b.id{}
                ) AS filtered",
                where_sql, having_sql
            );
            let row = bind_filters_sqlite(sqlx::query(&query_str), filters)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("total").map_err(sqlite::map_sqlx_error)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Fetches up to `limit` books sharing `genre` with the book `id`, best rated first.
pub(crate) async fn get_related_books(
    ex: &mut Executor,
    id: BookId,
    genre: &str,
    limit: i64,
) -> DbResult<Vec<Book>> {
    let mut books = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = format!(
                "SELECT {}
                FROM books b LEFT JOIN reviews r ON r.book_id = b.id
                WHERE b.genre = $1 AND b.id != $2
                GROUP BY b.id
                ORDER BY average_rating DESC, review_count DESC, b.id ASC
                LIMIT $3",
                PG_BOOK_COLUMNS
            );
            let mut rows = sqlx::query(&query_str)
                .bind(genre)
                .bind(id.as_i64())
                .bind(limit)
                .fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                books.push(Book::try_from(row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = format!(
                "SELECT {}
                FROM books b LEFT JOIN reviews r ON r.book_id = b.id
                WHERE b.genre = ? AND b.id != ?
                GROUP BY b.id
                ORDER BY average_rating DESC, review_count DESC, b.id ASC
                LIMIT ?",
                SQLITE_BOOK_COLUMNS
            );
            let mut rows = sqlx::query(&query_str)
                .bind(genre)
                .bind(id.as_i64())
                .bind(limit)
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

/// Replaces the details of the book with the given `id`.
pub(crate) async fn update_book(
    ex: &mut Executor,
    id: BookId,
    details: &BookDetails,
    now: OffsetDateTime,
) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE books SET title = $1, author = $2, description = $3, isbn = $4,
                    genre = $5, published_date = $6, cover_url = $7, updated_at = $8
                WHERE id = $9";
            let done = sqlx::query(query_str)
                .bind(details.title())
                .bind(details.author())
                .bind(details.description().as_deref())
                .bind(details.isbn().as_ref().map(Isbn::as_str))
                .bind(details.genre().as_deref())
                .bind(*details.published_date())
                .bind(details.cover_url().as_deref())
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
                UPDATE books SET title = ?, author = ?, description = ?, isbn = ?,
                    genre = ?, published_date = ?, cover_url = ?,
                    updated_at_secs = ?, updated_at_nsecs = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(details.title())
                .bind(details.author())
                .bind(details.description().as_deref())
                .bind(details.isbn().as_ref().map(Isbn::as_str))
                .bind(details.genre().as_deref())
                .bind(details.published_date().map(format_date))
                .bind(details.cover_url().as_deref())
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

/// Deletes the book with the given `id`, which must have no reviews or wishlist entries left.
pub(crate) async fn delete_book(ex: &mut Executor, id: BookId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM books WHERE id = $1";
            let done = sqlx::query(query_str)
                .bind(id.as_i64())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM books WHERE id = ?";
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
