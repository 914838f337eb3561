//! Bounded delivery queue in front of another sink
//!
//! Request handlers enqueue without waiting on the object store; a fixed
//! pool of workers drains the queue into the inner sink. When the queue is
//! full the record is dropped rather than blocking ingestion.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use super::{dead_letter, TxnSink};
use crate::stats::BridgeStats;
use crate::txn::FinancialTxn;

/// Sink that hands records to background workers through a bounded channel
pub struct QueuedSink {
    sender: Mutex<Option<mpsc::Sender<FinancialTxn>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    stats: Arc<BridgeStats>,
}

impl QueuedSink {
    /// Spawn `workers` delivery tasks feeding `inner`
    pub fn start(
        inner: Arc<dyn TxnSink>,
        capacity: usize,
        workers: usize,
        stats: Arc<BridgeStats>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        let handles = (0..workers.max(1))
            .map(|worker| {
                let rx = Arc::clone(&rx);
                let inner = Arc::clone(&inner);
                tokio::spawn(async move {
                    loop {
                        let next = rx.lock().await.recv().await;
                        match next {
                            Some(txn) => inner.save(txn).await,
                            None => break,
                        }
                    }
                    tracing::debug!(worker, "Sink worker stopped");
                })
            })
            .collect();

        tracing::info!(
            "Sink queue started with capacity {} and {} workers",
            capacity.max(1),
            workers.max(1)
        );

        Self {
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(handles),
            stats,
        }
    }

    /// Stop accepting records and wait until queued ones are delivered
    pub async fn close(&self) {
        self.sender.lock().take();
        let handles: Vec<_> = std::mem::take(&mut *self.workers.lock());

        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                tracing::error!("Sink worker failed: {}", e);
            }
        }
        tracing::info!("Sink queue drained");
    }

    fn drop_record(&self, txn: &FinancialTxn, reason: &str) {
        self.stats.record_dropped();
        dead_letter(txn, reason);
    }
}

#[async_trait]
impl TxnSink for QueuedSink {
    async fn save(&self, txn: FinancialTxn) {
        let sender = self.sender.lock().clone();
        let Some(sender) = sender else {
            self.drop_record(&txn, "queue closed");
            return;
        };

        match sender.try_send(txn) {
            Ok(()) => {}
            Err(TrySendError::Full(txn)) => {
                tracing::warn!("Sink queue full, dropping record");
                self.drop_record(&txn, "queue full");
            }
            Err(TrySendError::Closed(txn)) => self.drop_record(&txn, "queue closed"),
        }
    }
}
