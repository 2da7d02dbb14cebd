//! Strongly typed identifiers.
//!
//! Two kinds of id live here:
//!
//! - **Dense slots** (`AreaId`, `EntranceId`, `ControlPointId`): `u32`
//!   indices into the flow-state `Vec`s.  Handed out by the topology registry
//!   and never reused, so `id.index()` is always a valid slot once issued.
//! - **External keys** (`EntityKey`): the stable identifier stored in the
//!   topology document.  Only seen at the boundary.

use std::fmt;

/// Generate a typed dense-slot wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid slot".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Dense slot of a venue area.
    pub struct AreaId(u32);
}

typed_id! {
    /// Dense slot of an entrance.
    pub struct EntranceId(u32);
}

typed_id! {
    /// Dense slot of a control point (security check, ticket scan, …).
    pub struct ControlPointId(u32);
}

/// Stable external identifier of a topology entity, as persisted in the
/// event document.  Unique within one entity kind.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntityKey(pub u64);

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for EntityKey {
    #[inline]
    fn from(raw: u64) -> Self {
        EntityKey(raw)
    }
}
