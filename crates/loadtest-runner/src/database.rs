//! The database seam.
//!
//! The runner never talks to a driver directly. It materializes
//! [`Operation`]s and hands them to a [`WorkloadDatabase`], which may be a
//! real cluster or the in-memory [`MemoryDatabase`](crate::testing::MemoryDatabase).

use crate::error::DatabaseError;
use std::fmt;
use workload_core::{Document, OperationKind};

/// `database.collection` pair an operation targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// A fully materialized operation, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Find {
        namespace: Namespace,
        filter: Document,
        projection: Option<Document>,
        limit: i64,
        batch_size: u32,
        /// Ask for a single document instead of a cursor
        single: bool,
    },
    InsertOne {
        namespace: Namespace,
        document: Document,
    },
    InsertMany {
        namespace: Namespace,
        documents: Vec<Document>,
    },
    UpdateOne {
        namespace: Namespace,
        filter: Document,
        update: Document,
        upsert: bool,
    },
    UpdateMany {
        namespace: Namespace,
        filter: Document,
        update: Document,
        upsert: bool,
    },
    DeleteOne {
        namespace: Namespace,
        filter: Document,
    },
    DeleteMany {
        namespace: Namespace,
        filter: Document,
    },
    Aggregate {
        namespace: Namespace,
        pipeline: Vec<Document>,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Find { .. } => OperationKind::Find,
            Operation::InsertOne { .. } => OperationKind::InsertOne,
            Operation::InsertMany { .. } => OperationKind::InsertMany,
            Operation::UpdateOne { .. } => OperationKind::UpdateOne,
            Operation::UpdateMany { .. } => OperationKind::UpdateMany,
            Operation::DeleteOne { .. } => OperationKind::DeleteOne,
            Operation::DeleteMany { .. } => OperationKind::DeleteMany,
            Operation::Aggregate { .. } => OperationKind::Aggregate,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        match self {
            Operation::Find { namespace, .. }
            | Operation::InsertOne { namespace, .. }
            | Operation::InsertMany { namespace, .. }
            | Operation::UpdateOne { namespace, .. }
            | Operation::UpdateMany { namespace, .. }
            | Operation::DeleteOne { namespace, .. }
            | Operation::DeleteMany { namespace, .. }
            | Operation::Aggregate { namespace, .. } => namespace,
        }
    }
}

/// What an executed operation touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationOutcome {
    /// Documents returned, inserted, modified or deleted
    pub documents: u64,
}

impl OperationOutcome {
    pub fn documents(documents: u64) -> Self {
        Self { documents }
    }
}

/// Live handle to the target database.
#[async_trait::async_trait]
pub trait WorkloadDatabase: Send + Sync {
    /// Execute one operation outside any transaction.
    async fn execute(&self, operation: &Operation) -> Result<OperationOutcome, DatabaseError>;

    /// Start a session with an open multi-statement transaction.
    async fn start_transaction(&self) -> Result<Box<dyn TransactionSession>, DatabaseError>;
}

/// An open transaction. Operations run strictly in call order.
#[async_trait::async_trait]
pub trait TransactionSession: Send {
    async fn execute(&mut self, operation: &Operation) -> Result<OperationOutcome, DatabaseError>;

    /// Commit every operation executed in this session.
    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;

    /// Discard every operation executed in this session.
    async fn abort(self: Box<Self>) -> Result<(), DatabaseError>;
}
