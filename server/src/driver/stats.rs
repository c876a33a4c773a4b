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

//! Extends the driver with the operations to compute review statistics.

use crate::db;
use crate::driver::{
    Driver, RECENT_REVIEWS_DAYS, RECENT_REVIEWS_LIMIT, TOP_REVIEWERS_LIMIT, get_existing_book,
};
use crate::model::{BookId, BookReviewSummary, PageRequest, ReviewStats, build_histogram};
use shelfmark_core::driver::DriverResult;
use time::Duration;

impl Driver {
    /// Computes the aggregate review figures for the book `book_id`.
    pub(crate) async fn book_review_summary(
        self,
        book_id: BookId,
    ) -> DriverResult<BookReviewSummary> {
        let mut ex = self.db.ex().await?;

        get_existing_book(&mut ex, book_id).await?;

        let (review_count, average_rating, min_rating, max_rating) =
            db::book_rating_stats(&mut ex, book_id).await?;
        let histogram = build_histogram(&db::rating_histogram(&mut ex, Some(book_id)).await?);
        let recent_reviews =
            db::list_reviews_by_book(&mut ex, book_id, &PageRequest::new(1, RECENT_REVIEWS_LIMIT))
                .await?;

        Ok(BookReviewSummary::new(
            review_count,
            average_rating,
            min_rating,
            max_rating,
            histogram,
            recent_reviews,
        ))
    }

    /// Computes the service-wide review statistics.
    pub(crate) async fn review_stats(self) -> DriverResult<ReviewStats> {
        let mut ex = self.db.ex().await?;

        let (total_reviews, average_rating) = db::global_rating_stats(&mut ex).await?;
        let histogram = build_histogram(&db::rating_histogram(&mut ex, None).await?);
        let top_reviewers = db::top_reviewers(&mut ex, TOP_REVIEWERS_LIMIT).await?;
        let cutoff = self.clock.now_utc() - Duration::days(RECENT_REVIEWS_DAYS);
        let recent_review_count = db::count_reviews_since(&mut ex, cutoff).await?;

        Ok(ReviewStats::new(
            total_reviews,
            average_rating,
            histogram,
            top_reviewers,
            recent_review_count,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::TestContext;
    use crate::model::{TopReviewer, UserRole};
    use shelfmark_core::driver::DriverError;
    use shelfmark_core::model::Username;
    use std::time::Duration;

    #[tokio::test]
    async fn test_book_review_summary_ok() {
        let context = TestContext::setup().await;
        let reader1 = context.create_test_caller("reader1", UserRole::User).await;
        let reader2 = context.create_test_caller("reader2", UserRole::User).await;
        let reader3 = context.create_test_caller("reader3", UserRole::User).await;
        let book_id = context.create_test_book("Dune").await;
        let other = context.create_test_book("Other").await;

        context.create_test_review(other, reader1.id(), 5).await;
        context.create_test_review(book_id, reader1.id(), 1).await;
        context.clock().advance(Duration::from_secs(10));
        context.create_test_review(book_id, reader2.id(), 2).await;
        context.clock().advance(Duration::from_secs(10));
        let newest = context.create_test_review(book_id, reader3.id(), 4).await;

        let summary = context.driver().book_review_summary(book_id).await.unwrap();
        assert_eq!(3, *summary.review_count());
        assert_eq!(2.33, *summary.average_rating());
        assert_eq!(1.0, *summary.min_rating());
        assert_eq!(4.0, *summary.max_rating());
        assert_eq!(1, *summary.histogram()[0].count());
        assert_eq!(1, *summary.histogram()[1].count());
        assert_eq!(0, *summary.histogram()[2].count());
        assert_eq!(1, *summary.histogram()[3].count());
        assert_eq!(0, *summary.histogram()[4].count());
        assert_eq!(33.3, *summary.histogram()[0].percentage());
        assert_eq!(3, summary.recent_reviews().len());
        assert_eq!(newest, *summary.recent_reviews()[0].id());
    }

    #[tokio::test]
    async fn test_book_review_summary_limits_recent() {
        let context = TestContext::setup().await;
        let book_id = context.create_test_book("Dune").await;

        let mut latest = None;
        for i in 0..7 {
            let user = context.create_test_user(&format!("reader{}", i), UserRole::User).await;
            context.clock().advance(Duration::from_secs(10));
            latest = Some(context.create_test_review(book_id, *user.id(), 3).await);
        }

        let summary = context.driver().book_review_summary(book_id).await.unwrap();
        assert_eq!(7, *summary.review_count());
        assert_eq!(RECENT_REVIEWS_LIMIT as usize, summary.recent_reviews().len());
        assert_eq!(latest.unwrap(), *summary.recent_reviews()[0].id());
    }

    #[tokio::test]
    async fn test_book_review_summary_empty() {
        let context = TestContext::setup().await;
        let book_id = context.create_test_book("Dune").await;

        let summary = context.driver().book_review_summary(book_id).await.unwrap();
        assert_eq!(0, *summary.review_count());
        assert_eq!(0.0, *summary.average_rating());
        assert_eq!(0.0, *summary.min_rating());
        assert_eq!(0.0, *summary.max_rating());
        for bucket in summary.histogram() {
            assert_eq!(0, *bucket.count());
            assert_eq!(0.0, *bucket.percentage());
        }
        assert!(summary.recent_reviews().is_empty());
    }

    #[tokio::test]
    async fn test_book_review_summary_missing() {
        let context = TestContext::setup().await;

        match context.driver().book_review_summary(BookId::from_db(11).unwrap()).await {
            Err(DriverError::NotFound(msg)) => assert_eq!("Book 11 not found", msg),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_review_stats_ok() {
        let context = TestContext::setup().await;
        let alice = context.create_test_user("alice", UserRole::User).await;
        let bob = context.create_test_user("bob", UserRole::User).await;
        let dune = context.create_test_book("Dune").await;
        let emma = context.create_test_book("Emma").await;

        context.create_test_review(dune, *alice.id(), 5).await;
        context.create_test_review(emma, *alice.id(), 4).await;
        context.clock().advance(Duration::from_secs(31 * 24 * 60 * 60));
        context.create_test_review(dune, *bob.id(), 2).await;

        let stats = context.driver().review_stats().await.unwrap();
        assert_eq!(3, *stats.total_reviews());
        assert_eq!(3.67, *stats.average_rating());
        assert_eq!(1, *stats.histogram()[1].count());
        assert_eq!(1, *stats.histogram()[3].count());
        assert_eq!(1, *stats.histogram()[4].count());
        let expected = vec![
            TopReviewer::new(*alice.id(), Username::from("alice"), 2),
            TopReviewer::new(*bob.id(), Username::from("bob"), 1),
        ];
        assert_eq!(expected, *stats.top_reviewers());
        assert_eq!(1, *stats.recent_review_count());
    }

    #[tokio::test]
    async fn test_review_stats_empty() {
        let context = TestContext::setup().await;

        let stats = context.driver().review_stats().await.unwrap();
        assert_eq!(0, *stats.total_reviews());
        assert_eq!(0.0, *stats.average_rating());
        assert!(stats.top_reviewers().is_empty());
        assert_eq!(0, *stats.recent_review_count());
    }
}
