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

//! Extends the driver with the review management operations.

use crate::db;
use crate::driver::{Driver, get_existing_book, get_existing_review};
use crate::model::{BookId, Caller, Page, PageRequest, Pagination, Rating, Review, ReviewId};
use shelfmark_core::db::DbError;
use shelfmark_core::driver::{DriverError, DriverResult};

impl Driver {
    /// Posts a review of the book `book_id` as the calling user.
    pub(crate) async fn create_review(
        self,
        caller: Caller,
        book_id: BookId,
        rating: Rating,
        comment: Option<String>,
    ) -> DriverResult<Review> {
        let mut ex = self.db.ex().await?;

        get_existing_book(&mut ex, book_id).await?;

        let now = self.clock.now_utc();
        let id = match db::create_review(
            &mut ex,
            book_id,
            caller.id(),
            rating,
            comment.as_deref(),
            now,
        )
        .await
        {
            Ok(id) => id,
            Err(DbError::AlreadyExists) => {
                return Err(DriverError::AlreadyExists(format!(
                    "Book {} was already reviewed by the caller",
                    book_id
                )));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(db::get_review(&mut ex, id).await?)
    }

    /// Replaces the rating and comment of the review `id`.
    ///
    /// Only the author may edit a review.  Administrators moderate by deletion, not by
    /// rewriting someone else's words.
    pub(crate) async fn update_review(
        self,
        caller: Caller,
        id: ReviewId,
        rating: Rating,
        comment: Option<String>,
    ) -> DriverResult<Review> {
        let mut ex = self.db.ex().await?;

        let review = get_existing_review(&mut ex, id).await?;
        if *review.user_id() != caller.id() {
            return Err(DriverError::Forbidden(
                "Only the author of a review can edit it".to_owned(),
            ));
        }

        let now = self.clock.now_utc();
        db::update_review(&mut ex, id, rating, comment.as_deref(), now).await?;
        Ok(db::get_review(&mut ex, id).await?)
    }

    /// Deletes the review `id` on behalf of its author or an administrator.
    pub(crate) async fn delete_review(self, caller: Caller, id: ReviewId) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;

        let review = get_existing_review(&mut ex, id).await?;
        if *review.user_id() != caller.id() && !caller.is_admin() {
            return Err(DriverError::Forbidden(
                "Only the author of a review or an administrator can delete it".to_owned(),
            ));
        }

        Ok(db::delete_review(&mut ex, id).await?)
    }

    /// Lists the reviews of the book `book_id`, newest first.
    pub(crate) async fn list_book_reviews(
        self,
        book_id: BookId,
        page: PageRequest,
    ) -> DriverResult<Page<Review>> {
        let mut ex = self.db.ex().await?;

        get_existing_book(&mut ex, book_id).await?;

        let total = db::count_reviews_by_book(&mut ex, book_id).await?;
        let reviews = db::list_reviews_by_book(&mut ex, book_id, &page).await?;
        Ok(Page::new(reviews, Pagination::new(&page, total)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::TestContext;
    use crate::model::UserRole;
    use std::time::Duration;
    use time::macros::datetime;

    #[tokio::test]
    async fn test_create_review_ok() {
        let context = TestContext::setup().await;
        let caller = context.create_test_caller("reader", UserRole::User).await;
        let book_id = context.create_test_book("Dune").await;

        let review = context
            .driver()
            .create_review(caller, book_id, Rating::new(4).unwrap(), Some("Loved it".to_owned()))
            .await
            .unwrap();
        assert_eq!(book_id, *review.book_id());
        assert_eq!(caller.id(), *review.user_id());
        assert_eq!("reader", review.username().as_str());
        assert_eq!(4, review.rating().as_i16());
        assert_eq!(Some("Loved it"), review.comment().as_deref());
        assert_eq!(datetime!(2024-06-10 14:30:00 UTC), *review.created_at());

        let stored = db::get_review(&mut context.ex().await, *review.id()).await.unwrap();
        assert_eq!(review, stored);
    }

    #[tokio::test]
    async fn test_create_review_missing_book() {
        let context = TestContext::setup().await;
        let caller = context.create_test_caller("reader", UserRole::User).await;

        let book_id = BookId::from_db(9).unwrap();
        match context.driver().create_review(caller, book_id, Rating::new(3).unwrap(), None).await {
            Err(DriverError::NotFound(msg)) => assert_eq!("Book 9 not found", msg),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_create_review_duplicate() {
        let context = TestContext::setup().await;
        let caller = context.create_test_caller("reader", UserRole::User).await;
        let book_id = context.create_test_book("Dune").await;

        context
            .driver()
            .create_review(caller, book_id, Rating::new(4).unwrap(), None)
            .await
            .unwrap();

        match context.driver().create_review(caller, book_id, Rating::new(5).unwrap(), None).await {
            Err(DriverError::AlreadyExists(msg)) => assert!(msg.contains("already reviewed")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_update_review_ok() {
        let context = TestContext::setup().await;
        let caller = context.create_test_caller("reader", UserRole::User).await;
        let book_id = context.create_test_book("Dune").await;

        let review = context
            .driver()
            .create_review(caller, book_id, Rating::new(2).unwrap(), Some("Meh".to_owned()))
            .await
            .unwrap();

        context.clock().advance(Duration::from_secs(60));
        let updated = context
            .driver()
            .update_review(caller, *review.id(), Rating::new(5).unwrap(), None)
            .await
            .unwrap();
        assert_eq!(5, updated.rating().as_i16());
        assert_eq!(None, updated.comment().as_deref());
        assert_eq!(datetime!(2024-06-10 14:30:00 UTC), *updated.created_at());
        assert_eq!(datetime!(2024-06-10 14:31:00 UTC), *updated.updated_at());

        let stored = db::get_review(&mut context.ex().await, *review.id()).await.unwrap();
        assert_eq!(updated, stored);
    }

    #[tokio::test]
    async fn test_update_review_not_author() {
        let context = TestContext::setup().await;
        let author = context.create_test_caller("author", UserRole::User).await;
        let other = context.create_test_caller("other", UserRole::User).await;
        let admin = context.create_test_caller("admin", UserRole::Admin).await;
        let book_id = context.create_test_book("Dune").await;

        let review = context
            .driver()
            .create_review(author, book_id, Rating::new(2).unwrap(), None)
            .await
            .unwrap();

        for caller in [other, admin] {
            match context
                .driver()
                .update_review(caller, *review.id(), Rating::new(5).unwrap(), None)
                .await
            {
                Err(DriverError::Forbidden(msg)) => assert!(msg.contains("author")),
                e => panic!("{:?}", e),
            }
        }

        let stored = db::get_review(&mut context.ex().await, *review.id()).await.unwrap();
        assert_eq!(2, stored.rating().as_i16());
    }

    #[tokio::test]
    async fn test_update_review_missing() {
        let context = TestContext::setup().await;
        let caller = context.create_test_caller("reader", UserRole::User).await;

        let id = ReviewId::from_db(7).unwrap();
        match context.driver().update_review(caller, id, Rating::new(5).unwrap(), None).await {
            Err(DriverError::NotFound(msg)) => assert_eq!("Review 7 not found", msg),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_delete_review_by_author() {
        let context = TestContext::setup().await;
        let caller = context.create_test_caller("reader", UserRole::User).await;
        let book_id = context.create_test_book("Dune").await;

        let review = context
            .driver()
            .create_review(caller, book_id, Rating::new(4).unwrap(), None)
            .await
            .unwrap();

        context.driver().delete_review(caller, *review.id()).await.unwrap();

        match db::get_review(&mut context.ex().await, *review.id()).await {
            Err(DbError::NotFound) => (),
            e => panic!("Review survived deletion: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_delete_review_by_admin() {
        let context = TestContext::setup().await;
        let author = context.create_test_caller("author", UserRole::User).await;
        let admin = context.create_test_caller("admin", UserRole::Admin).await;
        let book_id = context.create_test_book("Dune").await;

        let review = context
            .driver()
            .create_review(author, book_id, Rating::new(1).unwrap(), None)
            .await
            .unwrap();

        context.driver().delete_review(admin, *review.id()).await.unwrap();

        match db::get_review(&mut context.ex().await, *review.id()).await {
            Err(DbError::NotFound) => (),
            e => panic!("Review survived deletion: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_delete_review_not_author() {
        let context = TestContext::setup().await;
        let author = context.create_test_caller("author", UserRole::User).await;
        let other = context.create_test_caller("other", UserRole::User).await;
        let book_id = context.create_test_book("Dune").await;

        let review = context
            .driver()
            .create_review(author, book_id, Rating::new(4).unwrap(), None)
            .await
            .unwrap();

        match context.driver().delete_review(other, *review.id()).await {
            Err(DriverError::Forbidden(msg)) => assert!(msg.contains("author")),
            e => panic!("{:?}", e),
        }

        db::get_review(&mut context.ex().await, *review.id()).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_review_missing() {
        let context = TestContext::setup().await;
        let caller = context.create_test_caller("reader", UserRole::User).await;

        match context.driver().delete_review(caller, ReviewId::from_db(6).unwrap()).await {
            Err(DriverError::NotFound(msg)) => assert_eq!("Review 6 not found", msg),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_list_book_reviews_ok() {
        let context = TestContext::setup().await;
        let reader1 = context.create_test_caller("reader1", UserRole::User).await;
        let reader2 = context.create_test_caller("reader2", UserRole::User).await;
        let book_id = context.create_test_book("Dune").await;

        let first = context
            .driver()
            .create_review(reader1, book_id, Rating::new(3).unwrap(), None)
            .await
            .unwrap();
        context.clock().advance(Duration::from_secs(60));
        let second = context
            .driver()
            .create_review(reader2, book_id, Rating::new(5).unwrap(), None)
            .await
            .unwrap();

        let page = context
            .driver()
            .list_book_reviews(book_id, PageRequest::new(1, 20))
            .await
            .unwrap();
        assert_eq!(vec![second.clone(), first.clone()], *page.items());
        assert_eq!(2, *page.pagination().total());

        let page = context
            .driver()
            .list_book_reviews(book_id, PageRequest::new(2, 1))
            .await
            .unwrap();
        assert_eq!(1, page.items().len());
        assert_eq!(*first.id(), *page.items()[0].id());
    }

    #[tokio::test]
    async fn test_list_book_reviews_missing_book() {
        let context = TestContext::setup().await;

        let book_id = BookId::from_db(4).unwrap();
        match context.driver().list_book_reviews(book_id, PageRequest::new(1, 20)).await {
            Err(DriverError::NotFound(msg)) => assert_eq!("Book 4 not found", msg),
            e => panic!("{:?}", e),
        }
    }
}
