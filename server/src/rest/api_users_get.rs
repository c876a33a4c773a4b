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

//! API to list all user accounts.

use crate::driver::Driver;
use crate::model::{Caller, Page, User};
use crate::rest::httputils::{PageQuery, page_request};
use axum::Json;
use axum::extract::{Query, State};
use shelfmark_core::rest::{EmptyBody, RestError};

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    caller: Caller,
    Query(query): Query<PageQuery>,
    _: EmptyBody,
) -> Result<Json<Page<User>>, RestError> {
    let page = page_request(&query)?;
    Ok(Json(driver.list_users(caller, page).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{UserId, UserRole};
    use crate::rest::testutils::*;
    use axum::http;
    use shelfmark_core::rest::testutils::*;
    use shelfmark_core::test_payload_must_be_empty;

    fn route() -> (http::Method, &'static str) {
        (http::Method::GET, "/api/v1/users")
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let admin = context.create_test_caller("admin", UserRole::Admin).await;
        context.create_test_user("alice", UserRole::User).await;
        context.create_test_user("bob", UserRole::User).await;

        let page = OneShotBuilder::new(context.into_app(), route())
            .with_caller(&admin)
            .send_empty()
            .await
            .expect_json::<Page<User>>()
            .await;
        let names: Vec<&str> = page.items().iter().map(|user| user.username().as_str()).collect();
        assert_eq!(vec!["admin", "alice", "bob"], names);
        assert_eq!(3, *page.pagination().total());
    }

    #[tokio::test]
    async fn test_pagination() {
        let context = TestContext::setup().await;

        let admin = context.create_test_caller("admin", UserRole::Admin).await;
        context.create_test_user("alice", UserRole::User).await;
        context.create_test_user("bob", UserRole::User).await;

        let page = OneShotBuilder::new(context.into_app(), route())
            .with_caller(&admin)
            .with_query(&[("page", "2"), ("limit", "2")])
            .send_empty()
            .await
            .expect_json::<Page<User>>()
            .await;
        let names: Vec<&str> = page.items().iter().map(|user| user.username().as_str()).collect();
        assert_eq!(vec!["bob"], names);
        assert!(page.pagination().has_prev());
    }

    #[tokio::test]
    async fn test_not_admin() {
        let context = TestContext::setup().await;

        let reader = context.create_test_caller("reader", UserRole::User).await;

        OneShotBuilder::new(context.into_app(), route())
            .with_caller(&reader)
            .send_empty()
            .await
            .expect_status(http::StatusCode::FORBIDDEN)
            .expect_error("Only administrators can list accounts")
            .await;
    }

    #[tokio::test]
    async fn test_unauthenticated() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route())
            .send_empty()
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("Missing X-Caller-Id header")
            .await;
    }

    test_payload_must_be_empty!(
        OneShotBuilder::new(TestContext::setup().await.into_app(), route())
            .with_caller(&Caller::new(UserId::from_db(1).unwrap(), UserRole::Admin))
    );
}
