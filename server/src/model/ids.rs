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

//! Identifiers of the entities tracked by the service.

use serde::{Deserialize, Serialize};
use shelfmark_core::model::{ModelError, ModelResult};
use std::fmt;
use std::str::FromStr;

/// Identifier of a book.
///
/// Identifiers are assigned by the database and are always positive.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub(crate) struct BookId(i64);

impl BookId {
    /// Creates an id from a value previously persisted in the database.
    pub(crate) fn from_db(id: i64) -> ModelResult<Self> {
        if id < 1 {
            return Err(ModelError(format!("Book id {} must be positive", id)));
        }
        Ok(Self(id))
    }

    /// Returns the integer representation of the id for database queries.
    pub(crate) fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for BookId {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        match s.parse::<i64>() {
            Ok(id) if id >= 1 => Ok(Self(id)),
            _ => Err(ModelError(format!("Invalid book id {}", s))),
        }
    }
}

/// Identifier of a review.
///
/// Identifiers are assigned by the database and are always positive.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub(crate) struct ReviewId(i64);

impl ReviewId {
    /// Creates an id from a value previously persisted in the database.
    pub(crate) fn from_db(id: i64) -> ModelResult<Self> {
        if id < 1 {
            return Err(ModelError(format!("Review id {} must be positive", id)));
        }
        Ok(Self(id))
    }

    /// Returns the integer representation of the id for database queries.
    pub(crate) fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ReviewId {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        match s.parse::<i64>() {
            Ok(id) if id >= 1 => Ok(Self(id)),
            _ => Err(ModelError(format!("Invalid review id {}", s))),
        }
    }
}

/// Identifier of a user account.
///
/// Identifiers are assigned by the database and are always positive.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub(crate) struct UserId(i64);

impl UserId {
    /// Creates an id from a value previously persisted in the database.
    pub(crate) fn from_db(id: i64) -> ModelResult<Self> {
        if id < 1 {
            return Err(ModelError(format!("User id {} must be positive", id)));
        }
        Ok(Self(id))
    }

    /// Returns the integer representation of the id for database queries.
    pub(crate) fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        match s.parse::<i64>() {
            Ok(id) if id >= 1 => Ok(Self(id)),
            _ => Err(ModelError(format!("Invalid user id {}", s))),
        }
    }
}
