use serde::{Deserialize, Serialize};

use crate::{Address, Decimal, PublicKey};

/// A registered push key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PushKey {
    /// The key itself.
    pub pub_key: PublicKey,
    /// The account that registered the key and pays for its use.
    pub address: Address,
    /// Repositories or namespaces the key is restricted to; empty means unrestricted.
    pub scopes: Vec<String>,
    /// Maximum fee the key may spend per push; zero means no cap.
    pub fee_cap: Decimal,
}

impl PushKey {
    /// Returns an empty push key.
    pub fn bare() -> Self {
        PushKey::default()
    }

    /// Whether this is the value returned for an id that was never written.
    pub fn is_nil(&self) -> bool {
        *self == PushKey::bare()
    }

    /// Removes the scopes at `indices`, each index referring to the list as it was before the
    /// call. Duplicate and out-of-range indices are ignored.
    pub fn remove_scopes(&mut self, indices: &[u32]) {
        let mut indices: Vec<usize> = indices.iter().map(|index| *index as usize).collect();
        indices.sort_unstable();
        indices.dedup();
        // Highest first so earlier removals cannot shift the positions of later ones.
        for index in indices.into_iter().rev() {
            if index < self.scopes.len() {
                self.scopes.remove(index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_with_scopes(scopes: &[&str]) -> PushKey {
        PushKey {
            scopes: scopes.iter().map(|scope| scope.to_string()).collect(),
            ..PushKey::bare()
        }
    }

    #[test]
    fn should_remove_scopes_by_original_index() {
        let mut key = key_with_scopes(&["s1", "s2", "s3"]);
        key.remove_scopes(&[0, 2]);
        assert_eq!(key.scopes, vec!["s2"]);
    }

    #[test]
    fn removal_does_not_depend_on_index_order() {
        let scopes = ["a", "b", "c", "d", "e", "f", "g"];
        let mut first = key_with_scopes(&scopes);
        first.remove_scopes(&[0, 5, 2]);
        let mut second = key_with_scopes(&scopes);
        second.remove_scopes(&[0, 2, 5]);
        assert_eq!(first.scopes, vec!["b", "d", "e", "g"]);
        assert_eq!(first.scopes, second.scopes);
    }

    #[test]
    fn should_ignore_duplicate_and_out_of_range_indices() {
        let mut key = key_with_scopes(&["a", "b", "c"]);
        key.remove_scopes(&[1, 1, 9]);
        assert_eq!(key.scopes, vec!["a", "c"]);
    }

    #[test]
    fn bare_push_key_is_nil() {
        assert!(PushKey::bare().is_nil());
        assert!(!key_with_scopes(&["r/repo"]).is_nil());
    }
}
