//! Arena indices replacing the pointer web of the original implementation
//! (`Anchor*`, `Clique*`, `Run*`, ...). See `world::World`.

use std::fmt;

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(u32::try_from(index).expect("arena exceeded u32::MAX entries"))
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

arena_id!(GenomeId);
arena_id!(ChromId);
arena_id!(AnchorId);
arena_id!(EdgeId);
arena_id!(CliqueId);
arena_id!(RunId);
