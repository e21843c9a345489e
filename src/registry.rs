//! Static classification tables consulted while resolving declarations.
//!
//! A [`Registry`] describes names that are not (or not only) declared in the
//! DSL source: token leaves and polymorphic enums defined elsewhere, tags
//! whose name differs from the DSL type backed by them, and token leaves
//! whose cast also accepts the empty token.
//!
//! It is built once and never mutated, so that generation stays a pure
//! function of the source and the registry.

use hashbrown::{HashMap, HashSet};
use rustc_hash::FxBuildHasher;

#[derive(Debug, Default, Clone)]
pub struct Registry {
    token_leaves: HashSet<String, FxBuildHasher>,
    polymorphic: HashSet<String, FxBuildHasher>,
    aliases: HashMap<String, String, FxBuildHasher>,
    nullable: HashSet<String, FxBuildHasher>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryClass {
    TokenLeaf,
    Polymorphic,
}

impl RegistryClass {
    pub fn describe(self) -> &'static str {
        match self {
            RegistryClass::TokenLeaf => "a token leaf",
            RegistryClass::Polymorphic => "a polymorphic enum",
        }
    }
}

impl Registry {
    #[inline]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    #[inline]
    pub fn is_token_leaf(&self, name: &str) -> bool {
        self.token_leaves.contains(name)
    }

    #[inline]
    pub fn is_polymorphic(&self, name: &str) -> bool {
        self.polymorphic.contains(name)
    }

    #[inline]
    pub fn is_nullable(&self, name: &str) -> bool {
        self.nullable.contains(name)
    }

    /// Polymorphic wins if a name was registered as both.
    pub fn class_of(&self, name: &str) -> Option<RegistryClass> {
        if self.is_polymorphic(name) {
            Some(RegistryClass::Polymorphic)
        } else if self.is_token_leaf(name) {
            Some(RegistryClass::TokenLeaf)
        } else {
            None
        }
    }

    /// Tag backing the token type `name`.
    pub fn tag_for<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    inner: Registry,
}

impl RegistryBuilder {
    pub fn token_leaf(mut self, name: impl Into<String>) -> Self {
        self.inner.token_leaves.insert(name.into());
        self
    }

    pub fn polymorphic(mut self, name: impl Into<String>) -> Self {
        self.inner.polymorphic.insert(name.into());
        self
    }

    pub fn alias(mut self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.inner.aliases.insert(name.into(), tag.into());
        self
    }

    pub fn nullable(mut self, name: impl Into<String>) -> Self {
        self.inner.nullable.insert(name.into());
        self
    }

    pub fn build(self) -> Registry {
        self.inner
    }
}
