use std::collections::HashMap;

#[derive(Debug)]
pub struct BuildCache<V> {
    entries: HashMap<String, V>,
}

impl<V> Default for BuildCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> BuildCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `key`, running `builder` only on the first request.
    pub fn get_or_build(&mut self, key: &str, builder: impl FnOnce() -> V) -> &V {
        if !self.entries.contains_key(key) {
            tracing::debug!(key, "building cache entry");
            let value = builder();
            self.entries.insert(key.to_owned(), value);
        }
        &self.entries[key]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_runs_once_per_key() {
        let mut cache = BuildCache::new();
        let mut calls = 0;

        let first = *cache.get_or_build("a.json", || {
            calls += 1;
            7
        });
        let second = *cache.get_or_build("a.json", || {
            calls += 1;
            99
        });

        assert_eq!((first, second), (7, 7));
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn keys_are_independent() {
        let mut cache = BuildCache::new();
        cache.get_or_build("a", || "alpha".to_owned());
        let beta = cache.get_or_build("b", || "beta".to_owned()).clone();

        assert_eq!(beta, "beta");
        assert_eq!(cache.len(), 2);
    }
}
