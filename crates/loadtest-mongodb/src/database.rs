//! [`WorkloadDatabase`] backed by a MongoDB cluster.

use crate::error::MongoWorkloadError;
use crate::forward::to_bson_document;
use bson::{doc, Document as BsonDocument};
use futures::TryStreamExt;
use loadtest_runner::{
    DatabaseError, Namespace, Operation, OperationOutcome, TransactionSession, WorkloadDatabase,
};
use mongodb::{Client, ClientSession, Collection};
use std::time::Duration;
use tracing::{debug, info};

/// Default soft timeout for a single call.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_millis(500);
/// Default number of retries after a failed call.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 2;
/// Default fixed sleep between retries.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(5);

/// Timeout and retry behavior applied to every non-transactional call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    pub op_timeout: Duration,
    pub retry_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            op_timeout: DEFAULT_OP_TIMEOUT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

/// MongoDB handle used by the workload engine.
#[derive(Debug, Clone)]
pub struct MongoDatabase {
    client: Client,
    policy: CallPolicy,
}

impl MongoDatabase {
    /// Connect and verify the cluster answers a ping.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let db = MongoDatabase::connect("mongodb://localhost:27017", CallPolicy::default()).await?;
    /// ```
    pub async fn connect(uri: &str, policy: CallPolicy) -> Result<Self, MongoWorkloadError> {
        if uri.trim().is_empty() {
            return Err(MongoWorkloadError::Config(
                "connection URI is empty".to_string(),
            ));
        }
        let client = Client::with_uri_str(uri).await?;

        // Test connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        info!("Connected to MongoDB");

        Ok(Self::with_client(client, policy))
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client, policy: CallPolicy) -> Self {
        Self { client, policy }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn policy(&self) -> CallPolicy {
        self.policy
    }

    async fn execute_once(&self, operation: &Operation) -> Result<OperationOutcome, DatabaseError> {
        match tokio::time::timeout(self.policy.op_timeout, execute(&self.client, operation)).await {
            Ok(result) => result.map_err(DatabaseError::from),
            Err(_) => Err(DatabaseError::Timeout(self.policy.op_timeout)),
        }
    }
}

#[async_trait::async_trait]
impl WorkloadDatabase for MongoDatabase {
    async fn execute(&self, operation: &Operation) -> Result<OperationOutcome, DatabaseError> {
        let mut attempt = 0;
        loop {
            match self.execute_once(operation).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if attempt < self.policy.retry_attempts => {
                    attempt += 1;
                    debug!(
                        "{} on {} failed (attempt {attempt}): {e}",
                        operation.kind(),
                        operation.namespace()
                    );
                    tokio::time::sleep(self.policy.retry_backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn start_transaction(&self) -> Result<Box<dyn TransactionSession>, DatabaseError> {
        let mut session = self
            .client
            .start_session()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;
        session
            .start_transaction()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;
        Ok(Box::new(MongoTransaction {
            client: self.client.clone(),
            session,
        }))
    }
}

/// Open MongoDB transaction. Not retried and not timed out per call.
struct MongoTransaction {
    client: Client,
    session: ClientSession,
}

#[async_trait::async_trait]
impl TransactionSession for MongoTransaction {
    async fn execute(&mut self, operation: &Operation) -> Result<OperationOutcome, DatabaseError> {
        execute_in_session(&self.client, &mut self.session, operation)
            .await
            .map_err(DatabaseError::from)
    }

    async fn commit(mut self: Box<Self>) -> Result<(), DatabaseError> {
        self.session
            .commit_transaction()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))
    }

    async fn abort(mut self: Box<Self>) -> Result<(), DatabaseError> {
        self.session
            .abort_transaction()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))
    }
}

fn collection(client: &Client, namespace: &Namespace) -> Collection<BsonDocument> {
    client
        .database(&namespace.database)
        .collection(&namespace.collection)
}

fn to_bson_pipeline(pipeline: &[workload_core::Document]) -> Vec<BsonDocument> {
    pipeline.iter().map(to_bson_document).collect()
}

/// Execute one operation outside any session.
async fn execute(client: &Client, operation: &Operation) -> Result<OperationOutcome, MongoWorkloadError> {
    let coll = collection(client, operation.namespace());

    let documents = match operation {
        Operation::Find {
            filter,
            projection,
            limit,
            batch_size,
            single,
            ..
        } => {
            let filter = to_bson_document(filter);
            let projection = projection.as_ref().map(to_bson_document);
            if *single {
                let mut find_one = coll.find_one(filter);
                if let Some(projection) = projection {
                    find_one = find_one.projection(projection);
                }
                u64::from(find_one.await?.is_some())
            } else {
                let mut find = coll.find(filter).limit(*limit).batch_size(*batch_size);
                if let Some(projection) = projection {
                    find = find.projection(projection);
                }
                let mut cursor = find.await?;
                let mut returned = 0u64;
                while cursor.try_next().await?.is_some() {
                    returned += 1;
                }
                returned
            }
        }
        Operation::InsertOne { document, .. } => {
            coll.insert_one(to_bson_document(document)).await?;
            1
        }
        Operation::InsertMany { documents, .. } => {
            let result = coll
                .insert_many(documents.iter().map(to_bson_document))
                .await?;
            result.inserted_ids.len() as u64
        }
        Operation::UpdateOne {
            filter,
            update,
            upsert,
            ..
        } => {
            let result = coll
                .update_one(to_bson_document(filter), to_bson_document(update))
                .upsert(*upsert)
                .await?;
            result.modified_count + u64::from(result.upserted_id.is_some())
        }
        Operation::UpdateMany {
            filter,
            update,
            upsert,
            ..
        } => {
            let result = coll
                .update_many(to_bson_document(filter), to_bson_document(update))
                .upsert(*upsert)
                .await?;
            result.modified_count + u64::from(result.upserted_id.is_some())
        }
        Operation::DeleteOne { filter, .. } => {
            coll.delete_one(to_bson_document(filter)).await?.deleted_count
        }
        Operation::DeleteMany { filter, .. } => {
            coll.delete_many(to_bson_document(filter)).await?.deleted_count
        }
        Operation::Aggregate { pipeline, .. } => {
            let mut cursor = coll.aggregate(to_bson_pipeline(pipeline)).await?;
            let mut returned = 0u64;
            while cursor.try_next().await?.is_some() {
                returned += 1;
            }
            returned
        }
    };
    Ok(OperationOutcome::documents(documents))
}

/// Execute one operation inside an open transaction.
async fn execute_in_session(
    client: &Client,
    session: &mut ClientSession,
    operation: &Operation,
) -> Result<OperationOutcome, MongoWorkloadError> {
    let coll = collection(client, operation.namespace());

    let documents = match operation {
        Operation::Find {
            filter,
            projection,
            limit,
            batch_size,
            single,
            ..
        } => {
            let filter = to_bson_document(filter);
            let projection = projection.as_ref().map(to_bson_document);
            if *single {
                let mut find_one = coll.find_one(filter);
                if let Some(projection) = projection {
                    find_one = find_one.projection(projection);
                }
                let found = find_one.session(&mut *session).await?;
                u64::from(found.is_some())
            } else {
                let mut find = coll.find(filter).limit(*limit).batch_size(*batch_size);
                if let Some(projection) = projection {
                    find = find.projection(projection);
                }
                let mut cursor = find.session(&mut *session).await?;
                let mut returned = 0u64;
                while cursor.advance(session).await? {
                    returned += 1;
                }
                returned
            }
        }
        Operation::InsertOne { document, .. } => {
            coll.insert_one(to_bson_document(document))
                .session(&mut *session)
                .await?;
            1
        }
        Operation::InsertMany { documents, .. } => {
            let result = coll
                .insert_many(documents.iter().map(to_bson_document))
                .session(&mut *session)
                .await?;
            result.inserted_ids.len() as u64
        }
        Operation::UpdateOne {
            filter,
            update,
            upsert,
            ..
        } => {
            let result = coll
                .update_one(to_bson_document(filter), to_bson_document(update))
                .upsert(*upsert)
                .session(&mut *session)
                .await?;
            result.modified_count + u64::from(result.upserted_id.is_some())
        }
        Operation::UpdateMany {
            filter,
            update,
            upsert,
            ..
        } => {
            let result = coll
                .update_many(to_bson_document(filter), to_bson_document(update))
                .upsert(*upsert)
                .session(&mut *session)
                .await?;
            result.modified_count + u64::from(result.upserted_id.is_some())
        }
        Operation::DeleteOne { filter, .. } => {
            coll.delete_one(to_bson_document(filter))
                .session(&mut *session)
                .await?
                .deleted_count
        }
        Operation::DeleteMany { filter, .. } => {
            coll.delete_many(to_bson_document(filter))
                .session(&mut *session)
                .await?
                .deleted_count
        }
        Operation::Aggregate { pipeline, .. } => {
            let mut cursor = coll
                .aggregate(to_bson_pipeline(pipeline))
                .session(&mut *session)
                .await?;
            let mut returned = 0u64;
            while cursor.advance(session).await? {
                returned += 1;
            }
            returned
        }
    };
    Ok(OperationOutcome::documents(documents))
}
