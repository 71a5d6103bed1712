use super::parser::Expr;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

/// LRU cache of parsed expressions keyed by their source text.
#[derive(Debug)]
pub(crate) struct ExpressionCache {
    inner: Mutex<ExpressionCacheInner>,
}

#[derive(Debug)]
struct ExpressionCacheInner {
    capacity: usize,
    map: HashMap<String, Arc<Expr>>,
    order: VecDeque<String>,
}

impl ExpressionCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(ExpressionCacheInner {
                capacity,
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .capacity
    }

    pub(crate) fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map
            .len()
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<Expr>> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let expr = inner.map.get(key).cloned()?;
        inner.touch(key);
        Some(expr)
    }

    /// Insert `expr` unless another thread already cached the same source.
    pub(crate) fn insert_if_absent(&self, key: &str, expr: Arc<Expr>) -> Arc<Expr> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.capacity == 0 {
            return expr;
        }

        if let Some(existing) = inner.map.get(key).cloned() {
            inner.touch(key);
            return existing;
        }

        inner.map.insert(key.to_string(), Arc::clone(&expr));
        inner.order.push_back(key.to_string());
        inner.evict_if_needed();
        expr
    }
}

impl ExpressionCacheInner {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k.as_str() == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn evict_if_needed(&mut self) {
        while self.map.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            let _ = self.map.remove(&oldest);
        }
    }
}
