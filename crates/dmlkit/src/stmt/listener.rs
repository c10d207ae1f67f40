//! Callbacks run on a statement right before it is turned into SQL.

use super::{Delete, Select};
use std::fmt;
use std::sync::Arc;

/// Callback receiving a mutable statement before SQL generation.
pub type Listener<T> = Arc<dyn Fn(&mut T) + Send + Sync>;

/// Ordered listeners for one statement kind.
pub struct ListenerBucket<T> {
    items: Vec<Listener<T>>,
}

impl<T> ListenerBucket<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, f: Listener<T>) {
        self.items.push(f);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append the listeners of `other` after the existing ones.
    pub fn merge(&mut self, other: &ListenerBucket<T>) {
        self.items.extend(other.items.iter().cloned());
    }

    pub(crate) fn dispatch(&self, target: &mut T) {
        for f in &self.items {
            f(target);
        }
    }
}

impl<T> Default for ListenerBucket<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ListenerBucket<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T> fmt::Debug for ListenerBucket<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerBucket({})", self.items.len())
    }
}

/// Per-statement-kind listeners, usually attached to a table.
#[derive(Debug, Clone, Default)]
pub struct Listeners {
    pub select: ListenerBucket<Select>,
    pub delete: ListenerBucket<Delete>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_select(mut self, f: impl Fn(&mut Select) + Send + Sync + 'static) -> Self {
        self.select.push(Arc::new(f));
        self
    }

    pub fn on_delete(mut self, f: impl Fn(&mut Delete) + Send + Sync + 'static) -> Self {
        self.delete.push(Arc::new(f));
        self
    }

    pub fn merge(&mut self, other: &Listeners) {
        self.select.merge(&other.select);
        self.delete.merge(&other.delete);
    }

    pub fn is_empty(&self) -> bool {
        self.select.is_empty() && self.delete.is_empty()
    }
}
