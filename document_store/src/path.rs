use crate::error::StoreError;
use std::str::FromStr;

/// `database.collection` address of a document collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPath {
    pub database: String,
    pub collection: String,
}

impl FromStr for CollectionPath {
    type Err = StoreError;

    /// Splits on the first dot; the collection part may itself contain dots.
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        match path.split_once('.') {
            Some((database, collection)) if !database.is_empty() && !collection.is_empty() => {
                Ok(Self {
                    database: database.to_string(),
                    collection: collection.to_string(),
                })
            }
            _ => Err(StoreError::InvalidCollectionPath(path.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_dot() {
        let path: CollectionPath = "psrp.economy.history".parse().unwrap();
        assert_eq!(path.database, "psrp");
        assert_eq!(path.collection, "economy.history");
    }

    #[test]
    fn rejects_paths_without_both_parts() {
        for bad in ["", "psrp", ".economy", "psrp."] {
            assert!(
                matches!(
                    bad.parse::<CollectionPath>(),
                    Err(StoreError::InvalidCollectionPath(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }
}
