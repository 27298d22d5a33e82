//! The per-statement parameter table.

use tracing::warn;

use super::{ParamKey, ParamSpec};

/// Two declarations of the same parameter with different types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamConflict {
    /// The parameter.
    pub key: ParamKey,
    /// Type kept from the first declaration.
    pub kept_type: Option<String>,
    /// Type of the later, ignored declaration.
    pub other_type: Option<String>,
}

/// Parameters discovered in one statement, unique by key, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    specs: Vec<ParamSpec>,
    conflicts: Vec<ParamConflict>,
}

impl ParamSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `spec`, or merges it into the existing spec with the same key.
    ///
    /// The first declaration keeps its type and description, nullability is
    /// OR-ed. A differing type is recorded and returned as a conflict.
    pub fn insert_or_merge(&mut self, spec: ParamSpec) -> Option<ParamConflict> {
        let Some(existing) = self.specs.iter_mut().find(|s| s.key == spec.key) else {
            self.specs.push(spec);
            return None;
        };
        existing.nullok |= spec.nullok;
        if existing.descr.is_none() {
            existing.descr = spec.descr;
        }
        if existing.type_name.is_none() {
            existing.type_name = spec.type_name;
            existing.value_type = spec.value_type;
            return None;
        }
        let differs = spec.type_name.as_ref().is_some_and(|other| {
            existing
                .type_name
                .as_ref()
                .is_some_and(|kept| !kept.eq_ignore_ascii_case(other))
        });
        if !differs {
            return None;
        }
        let conflict = ParamConflict {
            key: spec.key,
            kept_type: existing.type_name.clone(),
            other_type: spec.type_name,
        };
        warn!(
            param = %conflict.key,
            kept = ?conflict.kept_type,
            ignored = ?conflict.other_type,
            "parameter declared with conflicting types"
        );
        self.conflicts.push(conflict.clone());
        Some(conflict)
    }

    /// Returns the spec with `key`.
    #[must_use]
    pub fn get(&self, key: &ParamKey) -> Option<&ParamSpec> {
        self.specs.iter().find(|s| &s.key == key)
    }

    /// Returns the named spec `name`.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&ParamSpec> {
        self.specs
            .iter()
            .find(|s| matches!(&s.key, ParamKey::Named(n) if n == name))
    }

    /// Returns the number of distinct parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns true if the statement has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Iterates over the specs in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &ParamSpec> {
        self.specs.iter()
    }

    /// Returns the type conflicts met while building the set.
    #[must_use]
    pub fn conflicts(&self) -> &[ParamConflict] {
        &self.conflicts
    }

    /// Returns the display names of all parameters.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.specs.iter().map(|s| s.key.to_string()).collect()
    }
}

impl<'a> IntoIterator for &'a ParamSet {
    type Item = &'a ParamSpec;
    type IntoIter = std::slice::Iter<'a, ParamSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}
