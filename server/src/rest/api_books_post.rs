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

//! API to add a book to the catalog.

use crate::driver::Driver;
use crate::model::{Book, BookDetails, Caller};
use axum::extract::State;
use axum::{Json, http};
use serde::{Deserialize, Serialize};
use shelfmark_core::rest::{RestError, RestResult};

/// Message sent to the server to add a book to the catalog or to replace an existing one.
///
/// All fields come in as raw strings and are validated into `BookDetails`, so that a bad
/// field turns into one of our errors instead of a rejection of the framework.
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookRequest {
    /// Title of the book.
    pub(crate) title: Option<String>,

    /// Author of the book.
    pub(crate) author: Option<String>,

    /// Free-form description of the book.
    pub(crate) description: Option<String>,

    /// ISBN of the book, with or without separators.
    pub(crate) isbn: Option<String>,

    /// Genre the book belongs to.
    pub(crate) genre: Option<String>,

    /// Date at which the book was published, as `YYYY-MM-DD`.
    pub(crate) published_date: Option<String>,

    /// URL of the cover image.
    pub(crate) cover_url: Option<String>,
}

impl BookRequest {
    /// Validates the fields of the request, treating missing fields as blank.
    pub(crate) fn details(&self) -> RestResult<BookDetails> {
        Ok(BookDetails::new(
            self.title.as_deref().unwrap_or(""),
            self.author.as_deref().unwrap_or(""),
            self.description.as_deref(),
            self.isbn.as_deref(),
            self.genre.as_deref(),
            self.published_date.as_deref(),
            self.cover_url.as_deref(),
        )?)
    }
}

/// Message returned by the server after a book mutation.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize, PartialEq))]
pub(crate) struct BookResponse {
    /// Human-readable confirmation of what happened.
    pub(crate) message: String,

    /// The book after the mutation.
    pub(crate) book: Book,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    caller: Caller,
    Json(request): Json<BookRequest>,
) -> Result<(http::StatusCode, Json<BookResponse>), RestError> {
    let details = request.details()?;
    let book = driver.create_book(caller, details).await?;
    let response = BookResponse { message: "Book created successfully".to_owned(), book };
    Ok((http::StatusCode::CREATED, Json(response)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::model::{UserId, UserRole};
    use crate::rest::testutils::*;
    use shelfmark_core::rest::testutils::*;
    use shelfmark_core::test_payload_must_be_json;

    fn route() -> (http::Method, String) {
        (http::Method::POST, "/api/v1/books".to_owned())
    }

    /// Returns a request with the minimal fields filled in.
    fn request(title: &str, isbn: Option<&str>) -> BookRequest {
        BookRequest {
            title: Some(title.to_owned()),
            author: Some("Frank Herbert".to_owned()),
            description: None,
            isbn: isbn.map(String::from),
            genre: None,
            published_date: None,
            cover_url: None,
        }
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let admin = context.create_test_caller("admin", UserRole::Admin).await;

        let response = OneShotBuilder::new(context.app(), route())
            .with_caller(&admin)
            .send_json(request("Dune", Some("978-0-441-17271-9")))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<BookResponse>()
            .await;
        assert_eq!("Book created successfully", response.message);
        assert_eq!("Dune", response.book.title());
        assert_eq!("9780441172719", response.book.isbn().as_ref().unwrap().as_str());
        assert_eq!(0.0, *response.book.average_rating());
        assert_eq!(TEST_START, *response.book.created_at());

        let stored = db::get_book(&mut context.ex().await, *response.book.id()).await.unwrap();
        assert_eq!(stored, response.book);
    }

    #[tokio::test]
    async fn test_not_admin() {
        let context = TestContext::setup().await;

        let reader = context.create_test_caller("reader", UserRole::User).await;

        OneShotBuilder::new(context.into_app(), route())
            .with_caller(&reader)
            .send_json(request("Dune", None))
            .await
            .expect_status(http::StatusCode::FORBIDDEN)
            .expect_error("Only administrators can modify the catalog")
            .await;
    }

    #[tokio::test]
    async fn test_missing_title() {
        let context = TestContext::setup().await;

        let admin = context.create_test_caller("admin", UserRole::Admin).await;

        let request = BookRequest {
            title: None,
            author: Some("Frank Herbert".to_owned()),
            description: None,
            isbn: None,
            genre: None,
            published_date: None,
            cover_url: None,
        };
        OneShotBuilder::new(context.into_app(), route())
            .with_caller(&admin)
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Title cannot be empty")
            .await;
    }

    #[tokio::test]
    async fn test_duplicate_isbn() {
        let context = TestContext::setup().await;

        let admin = context.create_test_caller("admin", UserRole::Admin).await;

        OneShotBuilder::new(context.app(), route())
            .with_caller(&admin)
            .send_json(request("Dune", Some("9780441172719")))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<BookResponse>()
            .await;

        OneShotBuilder::new(context.into_app(), route())
            .with_caller(&admin)
            .send_json(request("Dune, again", Some("978-0-441-17271-9")))
            .await
            .expect_status(http::StatusCode::CONFLICT)
            .expect_error("A book with ISBN 9780441172719 already exists")
            .await;
    }

    #[tokio::test]
    async fn test_unauthenticated() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route())
            .send_json(request("Dune", None))
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("Missing X-Caller-Id header")
            .await;
    }

    test_payload_must_be_json!(
        OneShotBuilder::new(TestContext::setup().await.into_app(), route())
            .with_caller(&Caller::new(UserId::from_db(1).unwrap(), UserRole::Admin))
    );
}
