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

//! Extends the driver with the account management operations.

use crate::db;
use crate::driver::{Driver, get_existing_user};
use crate::model::{Caller, Page, PageRequest, Pagination, User, UserId, UserReview, UserRole};
use shelfmark_core::db::DbError;
use shelfmark_core::driver::{DriverError, DriverResult};
use shelfmark_core::model::{EmailAddress, Username};

/// Rejects callers that are neither the account `id` itself nor an administrator.
fn require_self_or_admin(caller: &Caller, id: UserId) -> DriverResult<()> {
    if caller.id() != id && !caller.is_admin() {
        return Err(DriverError::Forbidden(
            "Only the account owner or an administrator can access this account".to_owned(),
        ));
    }
    Ok(())
}

impl Driver {
    /// Fetches the account `id` on behalf of its owner or an administrator.
    pub(crate) async fn get_user(self, caller: Caller, id: UserId) -> DriverResult<User> {
        require_self_or_admin(&caller, id)?;

        let mut ex = self.db.ex().await?;
        get_existing_user(&mut ex, id).await
    }

    /// Lists all accounts on behalf of an administrator.
    pub(crate) async fn list_users(
        self,
        caller: Caller,
        page: PageRequest,
    ) -> DriverResult<Page<User>> {
        if !caller.is_admin() {
            return Err(DriverError::Forbidden(
                "Only administrators can list accounts".to_owned(),
            ));
        }

        let mut ex = self.db.ex().await?;
        let total = db::count_users(&mut ex).await?;
        let users = db::list_users(&mut ex, &page).await?;
        Ok(Page::new(users, Pagination::new(&page, total)))
    }

    /// Renames the account `id` or changes its email, preserving its role.
    pub(crate) async fn update_user(
        self,
        caller: Caller,
        id: UserId,
        username: Username,
        email: EmailAddress,
    ) -> DriverResult<User> {
        require_self_or_admin(&caller, id)?;

        let mut ex = self.db.ex().await?;

        get_existing_user(&mut ex, id).await?;

        match db::find_user_id_by_username(&mut ex, &username).await? {
            Some(other) if other != id => {
                return Err(DriverError::AlreadyExists(format!(
                    "Username {} is already taken",
                    username.as_str()
                )));
            }
            _ => (),
        }
        match db::find_user_id_by_email(&mut ex, &email).await? {
            Some(other) if other != id => {
                return Err(DriverError::AlreadyExists(format!(
                    "Email {} is already taken",
                    email.as_str()
                )));
            }
            _ => (),
        }

        let now = self.clock.now_utc();
        db::update_user(&mut ex, id, &username, &email, now).await?;
        Ok(db::get_user(&mut ex, id).await?)
    }

    /// Changes the role of the account `id` on behalf of an administrator.
    pub(crate) async fn set_user_role(
        self,
        caller: Caller,
        id: UserId,
        role: UserRole,
    ) -> DriverResult<User> {
        if !caller.is_admin() {
            return Err(DriverError::Forbidden(
                "Only administrators can change roles".to_owned(),
            ));
        }
        if caller.id() == id {
            return Err(DriverError::Forbidden(
                "Administrators cannot change their own role".to_owned(),
            ));
        }

        let mut ex = self.db.ex().await?;

        let now = self.clock.now_utc();
        match db::set_user_role(&mut ex, id, role, now).await {
            Ok(()) => (),
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound(format!("User {} not found", id)));
            }
            Err(e) => return Err(e.into()),
        }

        Ok(db::get_user(&mut ex, id).await?)
    }

    /// Deletes the account `id` and everything it wrote on behalf of an administrator.
    pub(crate) async fn delete_user(self, caller: Caller, id: UserId) -> DriverResult<()> {
        if !caller.is_admin() {
            return Err(DriverError::Forbidden(
                "Only administrators can delete accounts".to_owned(),
            ));
        }
        if caller.id() == id {
            return Err(DriverError::Forbidden(
                "Administrators cannot delete their own account".to_owned(),
            ));
        }

        let mut tx = self.db.begin().await?;

        db::delete_reviews_by_user(tx.ex(), id).await?;
        db::delete_wishlist_by_user(tx.ex(), id).await?;
        match db::delete_user(tx.ex(), id).await {
            Ok(()) => (),
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound(format!("User {} not found", id)));
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit().await?;
        Ok(())
    }

    /// Lists the reviews written by the account `id`, newest first.
    pub(crate) async fn list_user_reviews(
        self,
        caller: Caller,
        id: UserId,
        page: PageRequest,
    ) -> DriverResult<Page<UserReview>> {
        require_self_or_admin(&caller, id)?;

        let mut ex = self.db.ex().await?;

        get_existing_user(&mut ex, id).await?;

        let total = db::count_reviews_by_user(&mut ex, id).await?;
        let reviews = db::list_reviews_by_user(&mut ex, id, &page).await?;
        Ok(Page::new(reviews, Pagination::new(&page, total)))
    }
}
