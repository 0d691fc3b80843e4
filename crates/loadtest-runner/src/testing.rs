//! In-memory [`WorkloadDatabase`] for tests and dry runs.
//!
//! Filters match on plain equality of top-level fields. Operator
//! expressions (`{"$gt": ..}`) match everything. Updates understand
//! `$set` and `$inc`.

use crate::database::{Namespace, Operation, OperationOutcome, TransactionSession, WorkloadDatabase};
use crate::error::DatabaseError;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use workload_core::{Document, OperationKind, Value};

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<Namespace, Vec<Document>>,
    executed: Vec<OperationKind>,
    committed_transactions: u64,
    aborted_transactions: u64,
}

/// Shared in-memory document store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
    failing: HashSet<OperationKind>,
    latency: Option<Duration>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every operation of `kind`, inside or outside transactions.
    pub fn failing_on(mut self, kind: OperationKind) -> Self {
        self.failing.insert(kind);
        self
    }

    /// Sleep this long in every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn documents(&self, namespace: &Namespace) -> Vec<Document> {
        self.lock()
            .collections
            .get(namespace)
            .cloned()
            .unwrap_or_default()
    }

    pub fn count(&self, namespace: &Namespace) -> usize {
        self.lock().collections.get(namespace).map_or(0, Vec::len)
    }

    /// Kinds of every successfully applied operation, in order.
    pub fn executed(&self) -> Vec<OperationKind> {
        self.lock().executed.clone()
    }

    pub fn committed_transactions(&self) -> u64 {
        self.lock().committed_transactions
    }

    pub fn aborted_transactions(&self) -> u64 {
        self.lock().aborted_transactions
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    async fn admit(&self, operation: &Operation) -> Result<(), DatabaseError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let kind = operation.kind();
        if self.failing.contains(&kind) {
            return Err(DatabaseError::Rejected(format!("injected failure for {kind}")));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl WorkloadDatabase for MemoryDatabase {
    async fn execute(&self, operation: &Operation) -> Result<OperationOutcome, DatabaseError> {
        self.admit(operation).await?;
        let mut state = self.lock();
        let outcome = apply(&mut state.collections, operation);
        state.executed.push(operation.kind());
        Ok(outcome)
    }

    async fn start_transaction(&self) -> Result<Box<dyn TransactionSession>, DatabaseError> {
        Ok(Box::new(MemoryTransaction {
            database: self.clone(),
            staged: Vec::new(),
        }))
    }
}

/// Transaction that stages operations and applies them on commit.
struct MemoryTransaction {
    database: MemoryDatabase,
    staged: Vec<Operation>,
}

#[async_trait::async_trait]
impl TransactionSession for MemoryTransaction {
    async fn execute(&mut self, operation: &Operation) -> Result<OperationOutcome, DatabaseError> {
        self.database.admit(operation).await?;
        self.staged.push(operation.clone());
        Ok(OperationOutcome::default())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let mut state = self.database.lock();
        for operation in &self.staged {
            apply(&mut state.collections, operation);
            state.executed.push(operation.kind());
        }
        state.committed_transactions += 1;
        Ok(())
    }

    async fn abort(self: Box<Self>) -> Result<(), DatabaseError> {
        self.database.lock().aborted_transactions += 1;
        Ok(())
    }
}

fn apply(collections: &mut HashMap<Namespace, Vec<Document>>, operation: &Operation) -> OperationOutcome {
    let docs = collections.entry(operation.namespace().clone()).or_default();

    let affected = match operation {
        Operation::Find {
            filter,
            limit,
            single,
            ..
        } => {
            let matched = docs.iter().filter(|d| matches(d, filter)).count() as u64;
            let cap = if *single { 1 } else { (*limit).max(0) as u64 };
            if cap == 0 {
                matched
            } else {
                matched.min(cap)
            }
        }
        Operation::InsertOne { document, .. } => {
            docs.push(document.clone());
            1
        }
        Operation::InsertMany { documents, .. } => {
            docs.extend(documents.iter().cloned());
            documents.len() as u64
        }
        Operation::UpdateOne {
            filter,
            update,
            upsert,
            ..
        } => update_matching(docs, filter, update, *upsert, Some(1)),
        Operation::UpdateMany {
            filter,
            update,
            upsert,
            ..
        } => update_matching(docs, filter, update, *upsert, None),
        Operation::DeleteOne { filter, .. } => match docs.iter().position(|d| matches(d, filter)) {
            Some(idx) => {
                docs.remove(idx);
                1
            }
            None => 0,
        },
        Operation::DeleteMany { filter, .. } => {
            let before = docs.len();
            docs.retain(|d| !matches(d, filter));
            (before - docs.len()) as u64
        }
        Operation::Aggregate { .. } => docs.len() as u64,
    };
    OperationOutcome::documents(affected)
}

fn is_operator_expression(value: &Value) -> bool {
    value
        .as_document()
        .and_then(Document::first_key)
        .is_some_and(|key| key.starts_with('$'))
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .filter(|(key, value)| !key.starts_with('$') && !is_operator_expression(value))
        .all(|(key, value)| doc.get(key) == Some(value))
}

fn update_matching(
    docs: &mut Vec<Document>,
    filter: &Document,
    update: &Document,
    upsert: bool,
    limit: Option<usize>,
) -> u64 {
    let mut modified = 0u64;
    for doc in docs.iter_mut().filter(|d| matches(d, filter)) {
        if limit.is_some_and(|l| modified as usize >= l) {
            break;
        }
        apply_update(doc, update);
        modified += 1;
    }

    if modified == 0 && upsert {
        let mut doc: Document = filter
            .iter()
            .filter(|(key, value)| !key.starts_with('$') && !is_operator_expression(value))
            .map(|(key, value)| (key, value.clone()))
            .collect();
        apply_update(&mut doc, update);
        docs.push(doc);
        modified = 1;
    }
    modified
}

fn apply_update(doc: &mut Document, update: &Document) {
    if let Some(Value::Document(set)) = update.get("$set") {
        for (key, value) in set.iter() {
            doc.insert(key, value.clone());
        }
    }
    if let Some(Value::Document(inc)) = update.get("$inc") {
        for (key, delta) in inc.iter() {
            let current = doc.get(key).and_then(Value::as_i64).unwrap_or(0);
            let delta = delta.as_i64().unwrap_or(0);
            doc.insert(key, Value::Int64(current + delta));
        }
    }
}
