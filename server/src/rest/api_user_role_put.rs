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

//! API to change the role of a user account.

use super::api_user_put::UserResponse;
use crate::driver::Driver;
use crate::model::{Caller, UserId, UserRole};
use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use shelfmark_core::rest::RestError;

/// Message of a request to change the role of an account.
#[derive(Deserialize, Serialize)]
pub(crate) struct SetRoleRequest {
    /// New role for the account, as one of the role names.
    pub(crate) role: Option<String>,
}

/// PUT handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    caller: Caller,
    Path(id): Path<String>,
    Json(request): Json<SetRoleRequest>,
) -> Result<Json<UserResponse>, RestError> {
    let id = id.parse::<UserId>()?;
    let role = match request.role {
        Some(role) => role.parse::<UserRole>()?,
        None => return Err(RestError::InvalidRequest("A role is required".to_owned())),
    };

    let user = driver.set_user_role(caller, id, role).await?;
    Ok(Json(UserResponse { message: "Role updated successfully".to_owned(), user }))
}
