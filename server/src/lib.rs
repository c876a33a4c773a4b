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

//! REST service to track books, their reviews and per-user wishlists.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use axum::error_handling::HandleErrorLayer;
use shelfmark_core::clocks::SystemClock;
use shelfmark_core::db::Db;
use shelfmark_core::rest::RestError;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;

pub mod db;
mod driver;
use driver::Driver;
pub(crate) mod model;
mod rest;
use rest::app;

/// Converts errors raised by the middleware layers into REST errors.
async fn map_layer_error(e: tower::BoxError) -> RestError {
    if e.is::<tower::timeout::error::Elapsed>() {
        RestError::Unavailable("Request timed out".to_owned())
    } else {
        RestError::InternalError(format!("Unhandled middleware error: {}", e))
    }
}

/// Instantiates all resources to serve the application on `bind_addr`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db: Arc<dyn Db + Send + Sync>,
    request_timeout: Duration,
) -> Result<(), Box<dyn Error>> {
    let driver = Driver::new(db, Arc::from(SystemClock::default()));
    let app = app(driver).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(map_layer_error))
            .layer(TimeoutLayer::new(request_timeout)),
    );

    let bind_addr: SocketAddr = bind_addr.into();
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
