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

//! Common tests for any database implementation.

use crate::db::*;
use crate::model::{
    Book, BookDetails, BookFilters, BookId, BookSort, Isbn, PageRequest, Rating, Review, ReviewId,
    TopReviewer, User, UserId, UserReview, UserRole,
};
use shelfmark_core::db::{Db, DbError, Executor};
use shelfmark_core::model::{EmailAddress, Username};
use std::sync::Arc;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

mod books;

/// Initializes an in-memory SQLite database with the Shelfmark schema.
pub(crate) async fn setup_sqlite() -> Arc<dyn Db + Send + Sync> {
    let db: Arc<dyn Db + Send + Sync> =
        Arc::from(shelfmark_core::db::sqlite::testutils::setup().await);
    init_schema(&mut db.ex().await.unwrap()).await.unwrap();
    db
}

/// Initializes the test PostgreSQL database with the Shelfmark schema.
#[cfg(feature = "postgres")]
pub(crate) async fn setup_postgres() -> Arc<dyn Db + Send + Sync> {
    let db: Arc<dyn Db + Send + Sync> =
        Arc::from(shelfmark_core::db::postgres::testutils::setup().await);
    init_schema(&mut db.ex().await.unwrap()).await.unwrap();
    db
}

/// Creates a regular user with mechanical details derived from `username`.
async fn make_user(ex: &mut Executor, username: &str, now: OffsetDateTime) -> User {
    let username = Username::new(username).unwrap();
    let email = EmailAddress::new(format!("{}@example.com", username.as_str())).unwrap();
    create_user(ex, &username, &email, UserRole::User, now).await.unwrap()
}

/// Creates a book with only a title and a placeholder author.
async fn make_book(ex: &mut Executor, title: &str, now: OffsetDateTime) -> BookId {
    let details = BookDetails::new(title, "Unnamed Author", None, None, None, None, None).unwrap();
    create_book(ex, &details, now).await.unwrap()
}

/// Creates a book by `author` in `genre` for the filtering tests.
async fn make_book_by(
    ex: &mut Executor,
    title: &str,
    author: &str,
    genre: &str,
    now: OffsetDateTime,
) -> BookId {
    let details = BookDetails::new(title, author, None, None, Some(genre), None, None).unwrap();
    create_book(ex, &details, now).await.unwrap()
}

/// Creates a review without a comment.
async fn make_review(
    ex: &mut Executor,
    book_id: BookId,
    user_id: UserId,
    rating: i16,
    now: OffsetDateTime,
) -> ReviewId {
    create_review(ex, book_id, user_id, Rating::new(rating).unwrap(), None, now).await.unwrap()
}

/// Extracts the ids of `books` to simplify order assertions.
fn book_ids(books: &[Book]) -> Vec<BookId> {
    books.iter().map(|b| *b.id()).collect()
}

/// Instantiates the database tests against the database returned by `setup`.
macro_rules! generate_db_tests [
    ( $setup:expr $(, #[$extra:meta])? ) => {
        shelfmark_core::db::testutils::generate_tests!(
            $( #[$extra], )?
            $setup,
            $crate::db::tests::users,
            test_users_create_and_get,
            test_users_create_duplicate,
            test_users_get_missing,
            test_users_find_ids,
            test_users_list_and_count,
            test_users_update,
            test_users_set_role,
            test_users_delete
        );

        shelfmark_core::db::testutils::generate_tests!(
            $( #[$extra], )?
            $setup,
            $crate::db::tests::books,
            test_books_create_and_get,
            test_books_get_missing,
            test_books_aggregates,
            test_books_find_id_by_isbn,
            test_books_update,
            test_books_delete,
            test_books_list_search,
            test_books_list_filters,
            test_books_list_rating_range,
            test_books_list_sort,
            test_books_list_pagination,
            test_books_related
        );

        shelfmark_core::db::testutils::generate_tests!(
            $( #[$extra], )?
            $setup,
            $crate::db::tests::reviews,
            test_reviews_create_and_get,
            test_reviews_duplicate_pair,
            test_reviews_update,
            test_reviews_delete,
            test_reviews_list_by_book,
            test_reviews_list_by_user,
            test_reviews_delete_by_book_and_user
        );

        shelfmark_core::db::testutils::generate_tests!(
            $( #[$extra], )?
            $setup,
            $crate::db::tests::stats,
            test_stats_book_rating_stats,
            test_stats_rating_histogram,
            test_stats_global_and_top_reviewers,
            test_stats_count_since
        );

        shelfmark_core::db::testutils::generate_tests!(
            $( #[$extra], )?
            $setup,
            $crate::db::tests::wishlist,
            test_wishlist_add_list_count,
            test_wishlist_add_duplicate,
            test_wishlist_remove,
            test_wishlist_delete_by_user_and_book
        );
    }
];

#[cfg(feature = "postgres")]
mod postgres {
    generate_db_tests!(
        crate::db::tests::setup_postgres().await,
        #[ignore = "Requires environment configuration and is expensive"]
    );
}

mod sqlite {
    generate_db_tests!(crate::db::tests::setup_sqlite().await);
}
