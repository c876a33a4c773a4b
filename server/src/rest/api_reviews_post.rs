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

//! API to post a review of a book.

use crate::driver::Driver;
use crate::model::{BookId, Caller, Rating, Review};
use axum::extract::State;
use axum::{Json, http};
use serde::{Deserialize, Serialize};
use shelfmark_core::rest::{RestError, RestResult};

/// Message of a request to create a review.
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateReviewRequest {
    /// Identifier of the book under review.
    pub(crate) book_id: Option<i64>,

    /// Star rating to give the book, between 1 and 5.
    pub(crate) rating: Option<i16>,

    /// Free-form text to accompany the rating.
    pub(crate) comment: Option<String>,
}

/// Message of the response to review creation and edit requests.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize, PartialEq))]
pub(crate) struct ReviewResponse {
    /// Confirmation text for the operation.
    pub(crate) message: String,

    /// The review as stored.
    pub(crate) review: Review,
}

/// Validates the `rating` field of an incoming review request.
pub(super) fn parse_rating(rating: Option<i16>) -> RestResult<Rating> {
    match rating {
        Some(rating) => Ok(Rating::new(rating)?),
        None => Err(RestError::InvalidRequest("A rating is required".to_owned())),
    }
}

/// Strips surrounding whitespace off `comment` and turns blank comments into no comment.
pub(super) fn normalize_comment(comment: Option<String>) -> Option<String> {
    let comment = comment?;
    let trimmed = comment.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_owned()) }
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    caller: Caller,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(http::StatusCode, Json<ReviewResponse>), RestError> {
    let book_id = match request.book_id {
        Some(raw) => BookId::from_db(raw)?,
        None => return Err(RestError::InvalidRequest("A bookId is required".to_owned())),
    };
    let rating = parse_rating(request.rating)?;
    let comment = normalize_comment(request.comment);

    let review = driver.create_review(caller, book_id, rating, comment).await?;
    let response = ReviewResponse { message: "Review created successfully".to_owned(), review };
    Ok((http::StatusCode::CREATED, Json(response)))
}
