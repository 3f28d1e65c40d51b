//! Offline place index: the read interface the resolvers depend on.
//!
//! The store behind it is a collaborator concern; this crate ships a sled
//! implementation and an in-memory one for tests. Both expose the same two
//! access patterns: point lookup by exact composite key, and a bounded,
//! ordered range scan under a composite key.

mod memory;
mod sled_store;

use thiserror::Error;

use crate::models::PlaceRecord;

pub use memory::MemoryIndex;
pub use sled_store::SledIndex;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index store error: {0}")]
    Store(#[from] sled::Error),

    #[error("index row decode error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Build the composite lookup key, e.g. `CH#8001` or `CH#zurich`.
pub fn composite_key(country: &str, part: &str) -> String {
    format!("{}#{}", country.trim().to_uppercase(), part)
}

/// Read interface over the offline place database.
///
/// Lookups are side-effect-free and safe for unbounded concurrent callers.
/// Ordering contracts: `cities_by_population` returns candidates sorted by
/// population descending; `postcodes_for_city` returns them in ascending
/// postcode order. The resolvers depend on both orderings.
pub trait PlaceIndex: Send + Sync {
    /// Point lookup of a postcode centroid row by `CC#POSTCODE`.
    fn postcode(&self, key: &str) -> Result<Option<PlaceRecord>, IndexError>;

    /// City rows under `CC#<name key>`, best-populated first.
    fn cities_by_population(&self, key: &str, limit: usize)
        -> Result<Vec<PlaceRecord>, IndexError>;

    /// Postcode rows under `CC#<name key>`, ascending postcode.
    fn postcodes_for_city(&self, key: &str, limit: usize)
        -> Result<Vec<PlaceRecord>, IndexError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_key_uppercases_country() {
        assert_eq!(composite_key("ch", "8001"), "CH#8001");
        assert_eq!(composite_key(" fr ", "lyon"), "FR#lyon");
    }
}
