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

//! REST interface for the book-review service.

use crate::driver::Driver;
use axum::Router;

mod api_book_delete;
mod api_book_get;
mod api_book_put;
mod api_book_related_get;
mod api_book_reviews_get;
mod api_book_summary_get;
mod api_books_get;
mod api_books_post;
mod api_books_search_get;
mod api_review_delete;
mod api_review_put;
mod api_reviews_post;
mod api_reviews_stats_get;
mod api_user_delete;
mod api_user_get;
mod api_user_put;
mod api_user_reviews_get;
mod api_user_role_put;
mod api_users_get;
mod api_wishlist_delete;
mod api_wishlist_get;
mod api_wishlist_put;
mod httputils;
#[cfg(test)]
mod testutils;

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::{get, post, put};

    Router::new()
        .route("/api/v1/books", get(api_books_get::handler).post(api_books_post::handler))
        .route("/api/v1/books/search", get(api_books_search_get::handler))
        .route(
            "/api/v1/books/:id",
            get(api_book_get::handler)
                .put(api_book_put::handler)
                .delete(api_book_delete::handler),
        )
        .route("/api/v1/books/:id/related", get(api_book_related_get::handler))
        .route("/api/v1/books/:id/reviews", get(api_book_reviews_get::handler))
        .route("/api/v1/books/:id/summary", get(api_book_summary_get::handler))
        .route("/api/v1/reviews", post(api_reviews_post::handler))
        .route("/api/v1/reviews/stats", get(api_reviews_stats_get::handler))
        .route(
            "/api/v1/reviews/:id",
            put(api_review_put::handler).delete(api_review_delete::handler),
        )
        .route("/api/v1/users", get(api_users_get::handler))
        .route(
            "/api/v1/users/:id",
            get(api_user_get::handler).put(api_user_put::handler).delete(api_user_delete::handler),
        )
        .route("/api/v1/users/:id/reviews", get(api_user_reviews_get::handler))
        .route("/api/v1/users/:id/role", put(api_user_role_put::handler))
        .route("/api/v1/wishlist", get(api_wishlist_get::handler))
        .route(
            "/api/v1/wishlist/:book_id",
            put(api_wishlist_put::handler).delete(api_wishlist_delete::handler),
        )
        .with_state(driver)
}
