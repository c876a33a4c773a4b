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

//! The `Review` data types.

use crate::model::{BookId, ReviewId, UserId};
use derive_getters::Getters;
use derive_more::Constructor;
use serde::Serialize;
use shelfmark_core::model::{ModelError, ModelResult, Username};
use time::OffsetDateTime;

/// Star rating given to a book by a review.
///
/// Guaranteed to be within the 1 to 5 range.
#[derive(Clone, Copy, Serialize)]
#[cfg_attr(test, derive(Debug, serde::Deserialize, Eq, PartialEq))]
#[serde(transparent)]
pub(crate) struct Rating(i16);

impl Rating {
    /// Creates a new rating from an untrusted value, making sure it is in range.
    pub(crate) fn new(rating: i16) -> ModelResult<Self> {
        if !(1..=5).contains(&rating) {
            return Err(ModelError(format!("Rating {} must be between 1 and 5", rating)));
        }
        Ok(Self(rating))
    }

    /// Returns the integer representation of the rating for database queries.
    pub(crate) fn as_i16(&self) -> i16 {
        self.0
    }
}

/// Representation of a review, including the name of its author.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, serde::Deserialize, PartialEq))]
#[serde(rename_all = "camelCase")]
pub(crate) struct Review {
    /// Identifier of the review.
    id: ReviewId,

    /// Book the review refers to.
    book_id: BookId,

    /// Account that wrote the review.
    user_id: UserId,

    /// Name of the account that wrote the review.
    username: Username,

    /// Star rating given to the book.
    rating: Rating,

    /// Free-form opinion about the book, if any.
    comment: Option<String>,

    /// Time at which the review was created.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,

    /// Time at which the review was last modified.
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

/// Representation of a review as returned by per-user listings, including the title of the
/// book it refers to instead of the author details.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, serde::Deserialize, PartialEq))]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserReview {
    /// Identifier of the review.
    id: ReviewId,

    /// Book the review refers to.
    book_id: BookId,

    /// Title of the book the review refers to.
    book_title: String,

    /// Star rating given to the book.
    rating: Rating,

    /// Free-form opinion about the book, if any.
    comment: Option<String>,

    /// Time at which the review was created.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,

    /// Time at which the review was last modified.
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}
