//! Groups parsed documents into fixed-size batches and hands them to the
//! worker pool.

use std::sync::Arc;

use crate::app::ProgressCounters;
use crate::error_handling::PipelineError;
use crate::models::{Batch, Document};

/// Accumulates documents and sends full batches over the distribution channel.
///
/// Owned by the producer. With a rendezvous channel, [`Batcher::accept`]
/// suspends until a worker takes the batch; this is the only backpressure
/// point between reading and indexing.
pub struct Batcher {
    pending: Batch,
    batch_size: usize,
    tx: flume::Sender<Batch>,
    counters: Arc<ProgressCounters>,
}

impl Batcher {
    /// `batch_size` must be at least 1; [`crate::Config::validate`] enforces it.
    pub fn new(
        batch_size: usize,
        tx: flume::Sender<Batch>,
        counters: Arc<ProgressCounters>,
    ) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            pending: Vec::with_capacity(batch_size),
            batch_size,
            tx,
            counters,
        }
    }

    /// Number of documents waiting for the next batch.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Appends `document`, sending the batch once it reaches `batch_size`.
    ///
    /// # Errors
    ///
    /// `PipelineError::ChannelClosed` if every worker is gone.
    pub async fn accept(&mut self, document: Document) -> Result<(), PipelineError> {
        self.pending.push(document);
        if self.pending.len() >= self.batch_size {
            let batch = std::mem::replace(&mut self.pending, Vec::with_capacity(self.batch_size));
            self.send(batch).await?;
        }
        Ok(())
    }

    /// Sends the partially filled batch, if any. Calling it again is a no-op.
    pub async fn flush(&mut self) -> Result<(), PipelineError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.pending);
        self.send(batch).await
    }

    async fn send(&self, batch: Batch) -> Result<(), PipelineError> {
        let records = batch.len();
        self.tx
            .send_async(batch)
            .await
            .map_err(|flume::SendError(batch)| PipelineError::ChannelClosed(batch.len()))?;
        self.counters.record_dispatched();
        log::trace!("Dispatched batch of {} records", records);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metadata;

    fn doc(n: usize) -> Document {
        Document {
            id: format!("snomed-ct-description-{n}"),
            code: n.to_string(),
            display: format!("term {n}"),
            context: "snomed-ct".into(),
            metadata: Metadata::default(),
        }
    }

    fn drain(rx: &flume::Receiver<Batch>) -> Vec<Batch> {
        rx.drain().collect()
    }

    #[tokio::test]
    async fn test_full_batches_are_sent_on_accept() {
        let (tx, rx) = flume::unbounded();
        let counters = Arc::new(ProgressCounters::new());
        let mut batcher = Batcher::new(3, tx, Arc::clone(&counters));

        for n in 0..7 {
            batcher.accept(doc(n)).await.expect("accept");
        }
        assert_eq!(batcher.pending(), 1);
        let sent = drain(&rx);
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|b| b.len() == 3));
        assert_eq!(counters.snapshot().batches_dispatched, 2);
    }

    #[tokio::test]
    async fn test_flush_sends_remainder_once() {
        let (tx, rx) = flume::unbounded();
        let mut batcher = Batcher::new(3, tx, Arc::new(ProgressCounters::new()));

        for n in 0..4 {
            batcher.accept(doc(n)).await.expect("accept");
        }
        batcher.flush().await.expect("flush");
        batcher.flush().await.expect("second flush");

        let sent = drain(&rx);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].len(), 1);
        assert_eq!(sent[1][0].id, "snomed-ct-description-3");
    }

    #[tokio::test]
    async fn test_flush_empty_is_noop() {
        let (tx, rx) = flume::unbounded();
        let mut batcher = Batcher::new(3, tx, Arc::new(ProgressCounters::new()));
        batcher.flush().await.expect("flush");
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order() {
        let (tx, rx) = flume::unbounded();
        let mut batcher = Batcher::new(5, tx, Arc::new(ProgressCounters::new()));
        for n in 0..5 {
            batcher.accept(doc(n)).await.expect("accept");
        }
        let sent = drain(&rx);
        let codes: Vec<_> = sent[0].iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, ["0", "1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn test_closed_channel() {
        let (tx, rx) = flume::bounded(0);
        drop(rx);
        let mut batcher = Batcher::new(2, tx, Arc::new(ProgressCounters::new()));
        batcher.accept(doc(0)).await.expect("first accept only buffers");
        let err = batcher.accept(doc(1)).await.expect_err("channel is closed");
        assert!(matches!(err, PipelineError::ChannelClosed(2)));
    }

    #[tokio::test]
    async fn test_rendezvous_send_waits_for_receiver() {
        let (tx, rx) = flume::bounded(0);
        let mut batcher = Batcher::new(1, tx, Arc::new(ProgressCounters::new()));

        let consumer = tokio::spawn(async move {
            let mut received = Vec::new();
            while let Ok(batch) = rx.recv_async().await {
                received.push(batch);
            }
            received
        });

        for n in 0..4 {
            batcher.accept(doc(n)).await.expect("accept");
        }
        drop(batcher);

        let received = consumer.await.expect("consumer task");
        assert_eq!(received.len(), 4);
    }
}
