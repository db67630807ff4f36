//! Thread-safe registry keyed by piece name and alias.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::{RegistryError, RegistryResult};

/// Anything that can be stored in a [`Registry`].
pub trait Named {
    /// Primary lookup key.
    fn name(&self) -> &str;

    /// Additional lookup keys.
    fn aliases(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Internal state of the registry.
struct RegistryInner<T: ?Sized> {
    /// Pieces indexed by primary name.
    entries: HashMap<String, Arc<T>>,

    /// Alias to primary name.
    aliases: HashMap<String, String>,
}

impl<T: ?Sized> Default for RegistryInner<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            aliases: HashMap::new(),
        }
    }
}

/// Thread-safe registry of named pieces.
///
/// The registry is wrapped in `Arc<RwLock<...>>` internally; clones share the
/// same storage, so a registry handed to a dispatcher keeps seeing pieces
/// registered later through another clone.
pub struct Registry<T: ?Sized> {
    kind: &'static str,
    inner: Arc<RwLock<RegistryInner<T>>>,
}

impl<T: ?Sized> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ?Sized + Named> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kind", &self.kind)
            .field("names", &self.names())
            .finish()
    }
}

impl<T: ?Sized + Named> Registry<T> {
    /// Create a new empty registry. `kind` is used in error messages.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            inner: Arc::new(RwLock::new(RegistryInner::default())),
        }
    }

    /// The kind of piece stored here.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryInner<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryInner<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate a piece name.
    ///
    /// Names must be non-empty and must not contain whitespace, since command
    /// names are split off the raw message on whitespace.
    pub(crate) fn validate_name(&self, name: &str) -> RegistryResult<()> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidName {
                kind: self.kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Register a piece.
    ///
    /// Returns an error if the name or one of the aliases is already taken.
    pub fn register(&self, piece: Arc<T>) -> RegistryResult<()> {
        let name = piece.name().to_string();
        self.validate_name(&name)?;
        let aliases = piece.aliases();

        let mut inner = self.write();
        if inner.entries.contains_key(&name) || inner.aliases.contains_key(&name) {
            return Err(RegistryError::Conflict {
                kind: self.kind,
                name,
            });
        }

        for alias in &aliases {
            self.validate_name(alias)?;
            if let Some(owner) = inner.aliases.get(alias) {
                return Err(RegistryError::AliasConflict {
                    kind: self.kind,
                    alias: alias.clone(),
                    owner: owner.clone(),
                });
            }
            if inner.entries.contains_key(alias) {
                return Err(RegistryError::AliasConflict {
                    kind: self.kind,
                    alias: alias.clone(),
                    owner: alias.clone(),
                });
            }
        }

        for alias in aliases {
            if alias != name {
                inner.aliases.insert(alias, name.clone());
            }
        }
        debug!(kind = self.kind, name = %name, "registered piece");
        inner.entries.insert(name, piece);
        Ok(())
    }

    /// Register multiple pieces.
    ///
    /// Stops on first error and returns the count of successfully registered pieces.
    pub fn register_batch(&self, pieces: impl IntoIterator<Item = Arc<T>>) -> RegistryResult<usize> {
        let mut count = 0;
        for piece in pieces {
            self.register(piece)?;
            count += 1;
        }
        Ok(count)
    }

    /// Register a piece, replacing any existing one with the same name.
    ///
    /// Aliases of the replaced piece are dropped; aliases of the new piece
    /// take over any alias they collide with.
    pub fn register_or_replace(&self, piece: Arc<T>) -> Option<Arc<T>> {
        let name = piece.name().to_string();
        let mut inner = self.write();
        let previous = inner.entries.remove(&name);
        if previous.is_some() {
            inner.aliases.retain(|_, owner| owner != &name);
        }
        for alias in piece.aliases() {
            if alias != name {
                inner.aliases.insert(alias, name.clone());
            }
        }
        debug!(kind = self.kind, name = %name, replaced = previous.is_some(), "registered piece");
        inner.entries.insert(name, piece);
        previous
    }

    /// Find a piece by name or alias.
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        let inner = self.read();
        if let Some(piece) = inner.entries.get(name) {
            return Some(Arc::clone(piece));
        }
        inner
            .aliases
            .get(name)
            .and_then(|owner| inner.entries.get(owner))
            .map(Arc::clone)
    }

    /// Get a piece by name or alias, returning an error if not found.
    pub fn resolve(&self, name: &str) -> RegistryResult<Arc<T>> {
        self.get(name).ok_or_else(|| RegistryError::NotFound {
            kind: self.kind,
            name: name.to_string(),
        })
    }

    /// Check if a name or alias is registered.
    pub fn contains(&self, name: &str) -> bool {
        let inner = self.read();
        inner.entries.contains_key(name) || inner.aliases.contains_key(name)
    }

    /// Remove a piece by primary name together with its aliases.
    pub fn remove(&self, name: &str) -> RegistryResult<Arc<T>> {
        let mut inner = self.write();
        let piece = inner.entries.remove(name).ok_or_else(|| RegistryError::NotFound {
            kind: self.kind,
            name: name.to_string(),
        })?;
        inner.aliases.retain(|_, owner| owner != name);
        debug!(kind = self.kind, name, "removed piece");
        Ok(piece)
    }

    /// Get the number of registered pieces (aliases not counted).
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All primary names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// All pieces, sorted by name.
    pub fn values(&self) -> Vec<Arc<T>> {
        let inner = self.read();
        let mut entries: Vec<(&String, &Arc<T>)> = inner.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, piece)| Arc::clone(piece)).collect()
    }

    /// Clear all pieces from the registry.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.entries.clear();
        inner.aliases.clear();
    }
}
