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

//! API to edit a previously posted review.

use super::api_reviews_post::{ReviewResponse, normalize_comment, parse_rating};
use crate::driver::Driver;
use crate::model::{Caller, ReviewId};
use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use shelfmark_core::rest::RestError;

/// Message of a request to edit a review.
#[derive(Deserialize, Serialize)]
pub(crate) struct UpdateReviewRequest {
    /// Replacement star rating, between 1 and 5.
    pub(crate) rating: Option<i16>,

    /// Replacement comment.  A missing or blank comment clears the stored one.
    pub(crate) comment: Option<String>,
}

/// PUT handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    caller: Caller,
    Path(id): Path<String>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>, RestError> {
    let id = id.parse::<ReviewId>()?;
    let rating = parse_rating(request.rating)?;
    let comment = normalize_comment(request.comment);

    let review = driver.update_review(caller, id, rating, comment).await?;
    Ok(Json(ReviewResponse { message: "Review updated successfully".to_owned(), review }))
}
