//! String identifiers for rooms, region groups and markers.
//!
//! Identifiers are opaque strings so documents written by older versions
//! (which used free-form ids) load unchanged. Newly minted ids follow the
//! `<prefix>_<n>` pattern; see [`MapDocument::generate_room_id`](crate::document::MapDocument::generate_room_id).

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer coordinate of a grid cell: `(x, y)`.
pub type Cell = (i32, i32);

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix used when minting new ids.
            pub const PREFIX: &'static str = $prefix;

            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Builds the `n`-th id in the `<prefix>_<n>` sequence.
            pub fn numbered(n: usize) -> Self {
                Self(format!("{}_{n}", Self::PREFIX))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a [`Room`](super::Room).
    RoomId,
    "room"
);
string_id!(
    /// Identifier of a [`RegionGroup`](super::RegionGroup).
    RegionGroupId,
    "region"
);
string_id!(
    /// Identifier of a [`Marker`](super::Marker).
    MarkerId,
    "marker"
);
