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

//! Data types to represent the book, review, user and wishlist domain.
//!
//! The types here are valid by construction: untrusted inputs only enter them through
//! fallible constructors or parsers, so the driver and database layers can take their
//! contents at face value.

mod book;
mod caller;
mod ids;
mod page;
mod review;
mod stats;
mod user;

pub(crate) use book::{
    Book, BookDetails, BookFilters, BookSort, BookSortKey, Isbn, SortOrder, format_date,
    parse_date, parse_rating_bound,
};
pub(crate) use caller::Caller;
pub(crate) use ids::{BookId, ReviewId, UserId};
pub(crate) use page::{Page, PageRequest, Pagination};
pub(crate) use review::{Rating, Review, UserReview};
pub(crate) use stats::{
    BookReviewSummary, HistogramBucket, ReviewStats, TopReviewer, build_histogram, round2,
};
pub(crate) use user::{User, UserRole};
