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

//! Database abstraction to manipulate books, reviews, users and wishlists.
//!
//! All queries are built twice, once per supported database system, because the two systems
//! differ in their placeholder syntax and in how they store timestamps.  The entity-specific
//! modules keep the pairs side by side so that they cannot drift apart unnoticed.

#[cfg(feature = "postgres")]
use shelfmark_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use shelfmark_core::db::sqlite;
use shelfmark_core::db::{DbResult, Executor};

mod books;
mod reviews;
mod stats;
#[cfg(test)]
mod tests;
mod users;
mod wishlist;

pub(crate) use books::*;
pub(crate) use reviews::*;
pub(crate) use stats::*;
pub(crate) use users::*;
pub(crate) use wishlist::*;

/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}
