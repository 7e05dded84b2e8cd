use crate::ast::Expr;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Parsed expressions keyed by source text. Holds ASTs only, never evaluation state.
#[derive(Debug)]
pub(crate) struct ExprCache {
    capacity: usize,
    map: RwLock<HashMap<String, Arc<Expr>>>,
}

impl ExprCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, src: &str) -> Option<Arc<Expr>> {
        self.map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(src)
            .cloned()
    }

    /// Insert, dropping every entry first when the cache is full. Capacity 0 disables caching.
    pub fn insert(&self, src: &str, expr: Arc<Expr>) {
        if self.capacity == 0 {
            return;
        }
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        if map.len() >= self.capacity && !map.contains_key(src) {
            map.clear();
        }
        map.insert(src.to_string(), expr);
    }

    pub fn clear(&self) {
        self.map
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.map.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
