use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! db_key {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub u64);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<u64> for $name {
                fn from(value: u64) -> Self {
                    Self(value)
                }
            }
        )*
    };
}

db_key! {
    /// Database key of a single chain (`chain_info.chain_id`).
    ChainDbId;
    /// Database key of an experimental sequence.
    ExpSeqId;
    /// Database key of a sequence alignment between two experimental sequences.
    CorrespondenceId;
}
