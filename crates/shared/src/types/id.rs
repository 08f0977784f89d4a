//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing an `ItemId` where a `VoucherId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for an acting user.");
typed_id!(VoucherId, "Unique identifier for a journal voucher.");
typed_id!(ItemId, "Unique identifier for an inventory item.");
typed_id!(MovementId, "Unique identifier for an inventory movement.");
typed_id!(WarehouseId, "Unique identifier for a warehouse.");
typed_id!(DocumentId, "Unique identifier for a source document.");
typed_id!(PartyId, "Unique identifier for a customer or supplier.");
typed_id!(AuditEventId, "Unique identifier for an audit event.");

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
