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

//! API to delete a user account along with its reviews and wishlist.

use crate::driver::Driver;
use crate::model::{Caller, UserId};
use crate::rest::httputils::MessageResponse;
use axum::Json;
use axum::extract::{Path, State};
use shelfmark_core::rest::{EmptyBody, RestError};

/// DELETE handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    caller: Caller,
    Path(id): Path<String>,
    _: EmptyBody,
) -> Result<Json<MessageResponse>, RestError> {
    let id = id.parse::<UserId>()?;
    driver.delete_user(caller, id).await?;
    Ok(Json(MessageResponse { message: "User deleted successfully".to_owned() }))
}
