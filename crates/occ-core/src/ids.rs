//! Typed identifiers for agents and floor cells.
//!
//! Both are `Copy + Ord + Hash` newtypes over `u32`, so they key the visit
//! histogram and the escape-route table directly.  They print with a short
//! prefix (`A7`, `C42`) in the same style as [`Tick`](crate::Tick).

use std::fmt;

macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) = $prefix:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Position in a dense `Vec` keyed by this id.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;

            fn try_from(n: usize) -> Result<Self, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// A simulated agent.  Mixed into the run seed to give every agent its
    /// own random stream.
    pub struct AgentId(u32) = "A";
}

typed_id! {
    /// A floor cell, numbered row-major: `id = row * columns + column`.
    pub struct CellId(u32) = "C";
}
