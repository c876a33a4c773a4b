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

//! Entry point to the Shelfmark service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use shelfmark_core::db::Db;
use shelfmark_core::db::postgres::{PostgresDb, PostgresOptions};
use shelfmark_core::env::get_optional_var;
use shelfmark_server::db::init_schema;
use shelfmark_server::serve;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    env_logger::init();

    let port = get_optional_var::<u16>("SHELFMARK", "PORT").unwrap().unwrap_or(3000);
    let addr = (Ipv4Addr::LOCALHOST, port);

    let request_timeout = Duration::from_secs(
        get_optional_var::<u64>("SHELFMARK", "REQUEST_TIMEOUT").unwrap().unwrap_or(30),
    );

    let db_opts = PostgresOptions::from_env("PGSQL_PROD").unwrap();
    let db: Arc<dyn Db + Send + Sync> = Arc::from(PostgresDb::connect(db_opts).unwrap());
    init_schema(&mut db.ex().await.unwrap()).await.unwrap();

    serve(addr, db, request_timeout).await.unwrap()
}
