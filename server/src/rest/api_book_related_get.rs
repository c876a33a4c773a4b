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

//! API to suggest books related to a given one.

use crate::driver::Driver;
use crate::model::{Book, BookId};
use axum::Json;
use axum::extract::{Path, State};
use shelfmark_core::rest::{EmptyBody, RestError};

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<String>,
    _: EmptyBody,
) -> Result<Json<Vec<Book>>, RestError> {
    let id = id.parse::<BookId>()?;
    Ok(Json(driver.get_related_books(id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::model::{BookDetails, UserRole};
    use crate::rest::testutils::*;
    use axum::http;
    use shelfmark_core::rest::testutils::*;
    use shelfmark_core::test_payload_must_be_empty;

    fn route(id: &str) -> (http::Method, String) {
        (http::Method::GET, format!("/api/v1/books/{}/related", id))
    }

    /// Inserts a book in `genre` behind the driver's back.
    async fn genre_book(context: &TestContext, title: &str, genre: &str) -> BookId {
        let details =
            BookDetails::new(title, "Unnamed Author", None, None, Some(genre), None, None).unwrap();
        db::create_book(&mut context.ex().await, &details, TEST_START).await.unwrap()
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let user = context.create_test_user("reader", UserRole::User).await;
        let base = genre_book(&context, "Base", "Fantasy").await;
        let low = genre_book(&context, "Low", "Fantasy").await;
        let high = genre_book(&context, "High", "Fantasy").await;
        genre_book(&context, "Other", "Mystery").await;
        context.create_test_review(low, *user.id(), 2).await;
        context.create_test_review(high, *user.id(), 5).await;

        let related = OneShotBuilder::new(context.into_app(), route(&base.to_string()))
            .send_empty()
            .await
            .expect_json::<Vec<Book>>()
            .await;
        let ids: Vec<BookId> = related.iter().map(|book| *book.id()).collect();
        assert_eq!(vec![high, low], ids);
    }

    #[tokio::test]
    async fn test_no_genre_yields_nothing() {
        let context = TestContext::setup().await;

        let id = context.create_test_book("No genre").await;
        genre_book(&context, "Other", "Mystery").await;

        let related = OneShotBuilder::new(context.into_app(), route(&id.to_string()))
            .send_empty()
            .await
            .expect_json::<Vec<Book>>()
            .await;
        assert!(related.is_empty());
    }

    #[tokio::test]
    async fn test_missing() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route("3"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("Book 3 not found")
            .await;
    }

    test_payload_must_be_empty!(OneShotBuilder::new(
        TestContext::setup().await.into_app(),
        route("1")
    ));
}
