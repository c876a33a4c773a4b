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

//! The `User` data type and its role.

use crate::model::UserId;
use derive_getters::Getters;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use shelfmark_core::model::{EmailAddress, ModelError, ModelResult, Username};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Access level of a user account.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum UserRole {
    /// Regular account with rights over its own reviews and wishlist only.
    User,

    /// Account that can manage the book catalog and other accounts.
    Admin,
}

impl UserRole {
    /// Returns the string representation of the role as persisted in the database.
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            _ => Err(ModelError(format!("Unknown role {}", s))),
        }
    }
}

/// Representation of a user account.
///
/// The hashed credentials live in the same database table but belong to the external
/// authentication service, so they are never loaded into this type.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
#[serde(rename_all = "camelCase")]
pub(crate) struct User {
    /// Identifier of the account.
    id: UserId,

    /// Name the account goes by.
    username: Username,

    /// Address used to contact the account owner.
    email: EmailAddress,

    /// Access level of the account.
    role: UserRole,

    /// Time at which the account was created.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,

    /// Time at which the account was last modified.
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}
