use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::database::value::{HASH_SEED, KeyValue, fold};

/// Accumulates key components in order.
///
/// Each `update` folds the component into the running hash as
/// `hash * 37 + component_hash`, so the same components in a different order
/// produce a different key. A checksum (plain sum of component hashes) and the
/// update count are tracked alongside to make equality checks cheap to reject.
#[derive(Debug, Clone)]
pub struct CompositeKeyBuilder {
    hash: u64,
    checksum: u64,
    components: Vec<KeyValue>,
}

impl Default for CompositeKeyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeKeyBuilder {
    pub fn new() -> Self {
        CompositeKeyBuilder {
            hash: HASH_SEED,
            checksum: 0,
            components: Vec::new(),
        }
    }

    pub fn update(&mut self, value: impl Into<KeyValue>) -> &mut Self {
        let value = value.into();
        let component = value.component_hash();
        self.hash = fold(self.hash, component);
        self.checksum = self.checksum.wrapping_add(component);
        self.components.push(value);
        self
    }

    pub fn update_all<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<KeyValue>,
    {
        for value in values {
            self.update(value);
        }
        self
    }

    pub fn update_count(&self) -> usize {
        self.components.len()
    }

    pub fn build(self) -> CompositeKey {
        CompositeKey {
            hash: self.hash,
            checksum: self.checksum,
            components: self.components.into(),
        }
    }
}

/// Equal keys always hash equally. Two keys are equal only when hash,
/// checksum, update count and every component match.
#[derive(Debug, Clone)]
pub struct CompositeKey {
    hash: u64,
    checksum: u64,
    components: Arc<[KeyValue]>,
}

impl CompositeKey {
    pub fn hash_code(&self) -> u64 {
        self.hash
    }

    pub fn checksum(&self) -> u64 {
        self.checksum
    }

    pub fn update_count(&self) -> usize {
        self.components.len()
    }

    pub fn components(&self) -> &[KeyValue] {
        &self.components
    }
}

impl PartialEq for CompositeKey {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.components, &other.components) {
            return true;
        }
        self.hash == other.hash
            && self.checksum == other.checksum
            && self.components.len() == other.components.len()
            && self.components == other.components
    }
}

impl Eq for CompositeKey {}

impl Hash for CompositeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// `hash:checksum:component:component...`
impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hash, self.checksum)?;
        for component in self.components.iter() {
            write!(f, ":{component}")?;
        }
        Ok(())
    }
}
