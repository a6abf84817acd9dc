//! Item emission
//!
//! The paginator hands items to an [`Emitter`] one at a time and asks it how
//! many more the caller wants after each one.

use crate::error::Result;
use crate::types::RowBudget;
use async_trait::async_trait;

/// Receives listed items in order
#[async_trait]
pub trait Emitter<T: Send>: Send {
    /// Accept one item; returns the budget left afterwards
    async fn emit(&mut self, item: T) -> Result<RowBudget>;

    /// Budget left right now
    fn remaining(&self) -> RowBudget;
}

/// Emitter that keeps everything in memory
#[derive(Debug)]
pub struct Collector<T> {
    items: Vec<T>,
    budget: RowBudget,
}

impl<T> Default for Collector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Collector<T> {
    /// Collect without a limit
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            budget: RowBudget::Unbounded,
        }
    }

    /// Collect at most `limit` items
    pub fn with_budget(limit: u64) -> Self {
        Self {
            items: Vec::new(),
            budget: RowBudget::Remaining(limit),
        }
    }

    /// Items collected so far
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Take the collected items
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

#[async_trait]
impl<T: Send> Emitter<T> for Collector<T> {
    async fn emit(&mut self, item: T) -> Result<RowBudget> {
        self.items.push(item);
        self.budget = self.budget.decrement();
        Ok(self.budget)
    }

    fn remaining(&self) -> RowBudget {
        self.budget
    }
}
