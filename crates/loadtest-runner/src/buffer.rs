//! Pre-generated insert documents.
//!
//! One bounded channel per collection, filled by a background producer.
//! Workers take from it without waiting and generate on demand when it
//! is empty.

use crate::config::RunConfig;
use crate::workload::Workload;
use loadtest_generator::DocumentGenerator;
use rand::rngs::StdRng;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use workload_core::Document;

/// Producer RNG streams start here so they never overlap worker streams.
const PRODUCER_STREAM_OFFSET: u64 = 1_000_000;

struct BufferSlot {
    sender: mpsc::Sender<Document>,
    receiver: Mutex<mpsc::Receiver<Document>>,
}

impl BufferSlot {
    fn receiver(&self) -> MutexGuard<'_, mpsc::Receiver<Document>> {
        match self.receiver.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Per-collection bounded document queues, owned by one run.
pub struct DocumentBuffer {
    capacity: usize,
    slots: Vec<BufferSlot>,
}

impl DocumentBuffer {
    /// Create one queue of `capacity` documents per collection. A capacity
    /// of zero creates no queues.
    pub fn new(collections: usize, capacity: usize) -> Self {
        let slots = if capacity == 0 {
            Vec::new()
        } else {
            (0..collections)
                .map(|_| {
                    let (sender, receiver) = mpsc::channel(capacity);
                    BufferSlot {
                        sender,
                        receiver: Mutex::new(receiver),
                    }
                })
                .collect()
        };
        Self { capacity, slots }
    }

    pub fn is_enabled(&self) -> bool {
        !self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Take a buffered document for the collection without waiting.
    pub fn try_take(&self, target: usize) -> Option<Document> {
        self.slots.get(target)?.receiver().try_recv().ok()
    }

    /// Documents currently buffered for the collection.
    pub fn len(&self, target: usize) -> usize {
        self.slots
            .get(target)
            .map(|slot| self.capacity - slot.sender.capacity())
            .unwrap_or(0)
    }

    /// Start one producer per collection. Producers exit when `cancel`
    /// fires. Returns no handles when the buffer is disabled.
    pub fn spawn_producers(
        &self,
        workload: &Workload,
        config: &RunConfig,
        cancel: &CancellationToken,
    ) -> Vec<JoinHandle<()>> {
        self.slots
            .iter()
            .zip(workload.targets())
            .enumerate()
            .map(|(idx, (slot, target))| {
                let sender = slot.sender.clone();
                let generator = target.generator.clone();
                let cancel = cancel.clone();
                let rng = config.rng_for(PRODUCER_STREAM_OFFSET + idx as u64);
                tokio::spawn(produce(sender, generator, cancel, rng))
            })
            .collect()
    }
}

async fn produce(
    sender: mpsc::Sender<Document>,
    generator: DocumentGenerator,
    cancel: CancellationToken,
    mut rng: StdRng,
) {
    let namespace = generator.collection().namespace();
    let mut produced = 0u64;

    loop {
        let permit = tokio::select! {
            _ = cancel.cancelled() => break,
            permit = sender.reserve() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };
        permit.send(generator.generate(&mut rng));
        produced += 1;
    }

    debug!("Producer for {namespace} stopped after {produced} documents");
}
