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

//! API to rename a user account or to change its email.

use crate::driver::Driver;
use crate::model::{Caller, User, UserId};
use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use shelfmark_core::model::{EmailAddress, Username};
use shelfmark_core::rest::RestError;

/// Message of a request to update an account.  The role is changed through a separate API.
#[derive(Deserialize, Serialize)]
pub(crate) struct UpdateUserRequest {
    /// New name for the account.
    pub(crate) username: Option<String>,

    /// New email address for the account.
    pub(crate) email: Option<String>,
}

/// Message of the response to account mutation requests.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize, PartialEq))]
pub(crate) struct UserResponse {
    /// Confirmation text for the operation.
    pub(crate) message: String,

    /// The account as stored.
    pub(crate) user: User,
}

/// PUT handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    caller: Caller,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, RestError> {
    let id = id.parse::<UserId>()?;
    let username = match request.username {
        Some(username) => Username::new(username)?,
        None => return Err(RestError::InvalidRequest("A username is required".to_owned())),
    };
    let email = match request.email {
        Some(email) => EmailAddress::new(email)?,
        None => return Err(RestError::InvalidRequest("An email is required".to_owned())),
    };

    let user = driver.update_user(caller, id, username, email).await?;
    Ok(Json(UserResponse { message: "User updated successfully".to_owned(), user }))
}
