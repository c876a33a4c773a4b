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

//! Aggregated review statistics data types.

use crate::model::{Review, UserId};
use derive_getters::Getters;
use derive_more::Constructor;
use serde::Serialize;
use shelfmark_core::model::Username;

/// Number of reviews at one star value, with its share of the total.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, serde::Deserialize, PartialEq))]
pub(crate) struct HistogramBucket {
    /// Star value this bucket counts.
    rating: i16,

    /// Number of reviews with this star value.
    count: i64,

    /// Share of the total review count, as a percentage rounded to one decimal.
    percentage: f64,
}

/// Builds the five-bucket rating histogram from the per-star `counts`.
///
/// When there are no reviews at all, every percentage is reported as zero.
pub(crate) fn build_histogram(counts: &[i64; 5]) -> Vec<HistogramBucket> {
    let total: i64 = counts.iter().sum();
    counts
        .iter()
        .enumerate()
        .map(|(i, count)| {
            let percentage = if total == 0 {
                0.0
            } else {
                round1(*count as f64 * 100.0 / total as f64)
            };
            HistogramBucket::new((i + 1) as i16, *count, percentage)
        })
        .collect()
}

/// Rounds `value` to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds `value` to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Review rollups for a single book.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, serde::Deserialize, PartialEq))]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookReviewSummary {
    /// Number of reviews on record for the book.
    review_count: i64,

    /// Mean of the review ratings, rounded to two decimals.
    average_rating: f64,

    /// Lowest rating on record, or zero when there are no reviews.
    min_rating: f64,

    /// Highest rating on record, or zero when there are no reviews.
    max_rating: f64,

    /// Review counts per star value.
    histogram: Vec<HistogramBucket>,

    /// The most recent reviews of the book, newest first.
    recent_reviews: Vec<Review>,
}

/// One entry in the most-active-reviewers ranking.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, serde::Deserialize, PartialEq))]
#[serde(rename_all = "camelCase")]
pub(crate) struct TopReviewer {
    /// Identifier of the account.
    user_id: UserId,

    /// Name the account goes by.
    username: Username,

    /// Number of reviews the account has written.
    review_count: i64,
}

/// Review rollups across the whole service.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, serde::Deserialize, PartialEq))]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewStats {
    /// Number of reviews on record.
    total_reviews: i64,

    /// Mean of all review ratings, rounded to two decimals.
    average_rating: f64,

    /// Review counts per star value.
    histogram: Vec<HistogramBucket>,

    /// Accounts that have written the most reviews, most prolific first.
    top_reviewers: Vec<TopReviewer>,

    /// Number of reviews created in the last 30 days.
    recent_review_count: i64,
}
