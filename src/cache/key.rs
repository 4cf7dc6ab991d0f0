//! Query identities.

use std::fmt;

/// Identity of a cached query. Each variant is a fixed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// All expenses plus the derived team members
    Expenses,
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Expenses => f.write_str("expenses"),
        }
    }
}
