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

//! The `Caller` identity data type.

use crate::model::{UserId, UserRole};
use derive_more::Constructor;

/// Identity under which a request runs.
///
/// The identity is established by the authentication gateway in front of the service and
/// relayed via trusted headers, so holding a `Caller` does not imply that the corresponding
/// account still exists.
#[derive(Clone, Constructor, Copy)]
#[cfg_attr(test, derive(Debug, Eq, PartialEq))]
pub(crate) struct Caller {
    /// Account the request runs as.
    id: UserId,

    /// Access level granted to the request.
    role: UserRole,
}

impl Caller {
    pub(crate) fn id(&self) -> UserId {
        self.id
    }

    pub(crate) fn role(&self) -> UserRole {
        self.role
    }

    /// Checks whether the caller holds the admin role.
    pub(crate) fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_admin() {
        let id = UserId::from_db(1).unwrap();
        assert!(!Caller::new(id, UserRole::User).is_admin());
        assert!(Caller::new(id, UserRole::Admin).is_admin());
    }
}
