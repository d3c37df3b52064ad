//! Term Store
//!
//! Holds every term of one snapshot, keyed by primary identifier, plus the alias
//! map from retired (`alt_id`) identifiers to their canonical term. The store is
//! immutable once built.

use crate::error::{QueryError, QueryResult, ReferentialError};
use crate::models::{Namespace, Term};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Whether lookups may return obsolete terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lookup {
    /// Obsolete terms behave as if absent
    #[default]
    Active,
    IncludeObsolete,
}

impl Lookup {
    pub fn from_flag(include_obsolete: bool) -> Self {
        if include_obsolete {
            Lookup::IncludeObsolete
        } else {
            Lookup::Active
        }
    }

    fn admits(self, term: &Term) -> bool {
        self == Lookup::IncludeObsolete || !term.is_obsolete
    }
}

#[derive(Debug, Default)]
pub struct TermStore {
    /// Terms in source order
    terms: Vec<Term>,
    by_id: HashMap<String, usize>,
    aliases: HashMap<String, String>,
}

impl TermStore {
    /// Build a store, rejecting duplicate ids and colliding alt ids
    pub fn from_terms(terms: Vec<Term>) -> Result<Self, ReferentialError> {
        let mut by_id = HashMap::with_capacity(terms.len());
        for (idx, term) in terms.iter().enumerate() {
            if by_id.insert(term.id.clone(), idx).is_some() {
                return Err(ReferentialError::DuplicateId(term.id.clone()));
            }
        }

        let mut aliases: HashMap<String, String> = HashMap::new();
        for term in &terms {
            for alt_id in &term.alt_ids {
                if alt_id == &term.id {
                    debug!(term = %term.id, "Ignoring alt_id equal to its own primary id");
                    continue;
                }
                if by_id.contains_key(alt_id) {
                    return Err(ReferentialError::AltIdCollidesWithPrimary {
                        alt_id: alt_id.clone(),
                        term: term.id.clone(),
                    });
                }
                if let Some(first) = aliases.get(alt_id) {
                    if first != &term.id {
                        return Err(ReferentialError::AltIdClaimedTwice {
                            alt_id: alt_id.clone(),
                            first: first.clone(),
                            second: term.id.clone(),
                        });
                    }
                    continue;
                }
                aliases.insert(alt_id.clone(), term.id.clone());
            }
        }

        Ok(TermStore {
            terms,
            by_id,
            aliases,
        })
    }

    /// Look up a term by primary identifier
    pub fn get(&self, id: &str, lookup: Lookup) -> QueryResult<&Term> {
        self.by_id
            .get(id)
            .map(|&idx| &self.terms[idx])
            .filter(|term| lookup.admits(term))
            .ok_or_else(|| QueryError::TermNotFound(id.to_string()))
    }

    /// Look up a term by primary or alternate identifier
    pub fn resolve(&self, id: &str, lookup: Lookup) -> QueryResult<&Term> {
        let primary = self.canonical_id(id).unwrap_or(id);
        self.get(primary, lookup)
    }

    /// Whether `id` is the primary id of a non-obsolete term
    pub fn is_active(&self, id: &str) -> bool {
        self.get(id, Lookup::Active).is_ok()
    }

    /// Primary identifier for a primary or alternate id, if either is known
    pub fn canonical_id<'a>(&'a self, id: &'a str) -> Option<&'a str> {
        if let Some((key, _)) = self.by_id.get_key_value(id) {
            return Some(key.as_str());
        }
        self.aliases.get(id).map(String::as_str)
    }

    /// Non-obsolete terms in source order
    ///
    /// Every call starts a fresh pass, so the sequence can be walked repeatedly.
    pub fn all(&self) -> impl Iterator<Item = &Term> + '_ {
        self.terms.iter().filter(|t| !t.is_obsolete)
    }

    pub fn all_including_obsolete(&self) -> impl Iterator<Item = &Term> + '_ {
        self.terms.iter()
    }

    pub fn in_namespace(&self, namespace: Namespace) -> impl Iterator<Item = &Term> + '_ {
        self.all().filter(move |t| t.namespace == namespace)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Every term, obsolete ones included
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn active_len(&self) -> usize {
        self.all().count()
    }

    /// Alias map as (alt id, primary id) pairs
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn term(id: &str, name: &str) -> Term {
        Term::new(id, name, Namespace::MolecularFunction)
    }

    fn sample_store() -> TermStore {
        let mut mf = term("GO:0003674", "molecular_function");
        mf.alt_ids = vec!["GO:0005554".to_string()];
        let mut obsolete = term("GO:0000005", "obsolete ribosomal chaperone activity");
        obsolete.is_obsolete = true;
        TermStore::from_terms(vec![mf, term("GO:0005488", "binding"), obsolete]).unwrap()
    }

    #[test]
    fn test_get_returns_term_unchanged() {
        let store = sample_store();
        let binding = store.get("GO:0005488", Lookup::Active).unwrap();
        assert_eq!(binding, &term("GO:0005488", "binding"));
    }

    #[test]
    fn test_resolve_alt_id() {
        let store = sample_store();
        let resolved = store.resolve("GO:0005554", Lookup::Active).unwrap();
        assert_eq!(resolved.id, "GO:0003674");
        assert_eq!(store.canonical_id("GO:0005554"), Some("GO:0003674"));

        // get() never follows aliases
        assert!(store.get("GO:0005554", Lookup::Active).is_err());
    }

    #[test]
    fn test_obsolete_requires_explicit_lookup() {
        let store = sample_store();
        assert_eq!(
            store.get("GO:0000005", Lookup::Active),
            Err(QueryError::TermNotFound("GO:0000005".to_string()))
        );
        assert!(store.get("GO:0000005", Lookup::IncludeObsolete).is_ok());

        let active: Vec<_> = store.all().map(|t| t.id.as_str()).collect();
        assert_eq!(active, vec!["GO:0003674", "GO:0005488"]);
        assert_eq!(store.all_including_obsolete().count(), 3);
        assert_eq!(store.len(), 3);
        assert_eq!(store.active_len(), 2);
    }

    #[test]
    fn test_all_is_restartable() {
        let store = sample_store();
        let first: Vec<_> = store.all().map(|t| t.id.clone()).collect();
        let second: Vec<_> = store.all().map(|t| t.id.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = TermStore::from_terms(vec![term("GO:1", "a"), term("GO:1", "b")]).unwrap_err();
        assert_eq!(err, ReferentialError::DuplicateId("GO:1".to_string()));
    }

    #[test]
    fn test_alt_id_collisions_rejected() {
        let mut a = term("GO:1", "a");
        a.alt_ids = vec!["GO:2".to_string()];
        let err = TermStore::from_terms(vec![a, term("GO:2", "b")]).unwrap_err();
        assert!(matches!(err, ReferentialError::AltIdCollidesWithPrimary { .. }));

        let mut a = term("GO:1", "a");
        a.alt_ids = vec!["GO:9".to_string()];
        let mut b = term("GO:2", "b");
        b.alt_ids = vec!["GO:9".to_string()];
        let err = TermStore::from_terms(vec![a, b]).unwrap_err();
        assert!(matches!(err, ReferentialError::AltIdClaimedTwice { .. }));
    }
}
