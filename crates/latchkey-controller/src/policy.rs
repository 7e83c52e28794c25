//! Card access policy.

use latchkey_core::{CardId, Result};

/// Allow-list of card identifiers.
///
/// Membership checks go through [`CardId`]'s constant-time equality,
/// so a rejected probe card leaks nothing about the list contents
/// through timing.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    allowed: Vec<CardId>,
}

impl AccessPolicy {
    pub fn new(allowed: Vec<CardId>) -> Self {
        Self { allowed }
    }

    /// Build a policy from raw identifier strings, validating each one.
    pub fn from_ids<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = ids
            .into_iter()
            .map(|raw| CardId::new(raw.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { allowed })
    }

    /// Whether `id` is on the allow-list. An empty list rejects everything.
    pub fn is_allowed(&self, id: &CardId) -> bool {
        self.allowed.iter().any(|card| card == id)
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_listed_card() {
        let policy = AccessPolicy::from_ids(["04ab12cd34ef56", "0011223344556677"]).unwrap();
        let card = CardId::new("04AB12CD34EF56").unwrap();
        assert!(policy.is_allowed(&card));
    }

    #[test]
    fn rejects_unlisted_card() {
        let policy = AccessPolicy::from_ids(["04AB12CD34EF56"]).unwrap();
        let card = CardId::new("0011223344556677").unwrap();
        assert!(!policy.is_allowed(&card));
    }

    #[test]
    fn empty_policy_rejects_everything() {
        let policy = AccessPolicy::default();
        let card = CardId::new("04AB12CD34EF56").unwrap();
        assert!(policy.is_empty());
        assert!(!policy.is_allowed(&card));
    }

    #[test]
    fn invalid_id_in_list_is_an_error() {
        assert!(AccessPolicy::from_ids(["not-hex"]).is_err());
    }
}
