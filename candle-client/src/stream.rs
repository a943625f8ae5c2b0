//! Streaming candle loads.
//!
//! Listing concatenates fixed-size pages; this wrapper exposes the pages as
//! they arrive so the map can render progressively instead of waiting for the
//! full collection.

use futures::{Stream, StreamExt};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use crate::candle::Candle;

/// One page of candles from a paginated load.
#[derive(Debug, Clone)]
pub struct CandleBatch {
    /// Candles in this page
    pub candles: Vec<Candle>,
    /// Whether this is the last page
    pub is_final: bool,
}

impl CandleBatch {
    /// Create an intermediate batch.
    pub fn page(candles: Vec<Candle>) -> Self {
        Self {
            candles,
            is_final: false,
        }
    }

    /// Create the final batch.
    pub fn final_page(candles: Vec<Candle>) -> Self {
        Self {
            candles,
            is_final: true,
        }
    }
}

pin_project! {
    /// Stream of candle batches from a paginated load.
    pub struct CandleStream {
        #[pin]
        receiver: mpsc::Receiver<CandleBatch>,
        // Candles seen so far (for progress display)
        loaded: usize,
        // Whether the final batch has been observed
        complete: bool,
    }
}

impl CandleStream {
    /// Create a stream backed by a channel of batches.
    pub fn new(receiver: mpsc::Receiver<CandleBatch>) -> Self {
        Self {
            receiver,
            loaded: 0,
            complete: false,
        }
    }

    /// Create a stream from an already-complete collection (single batch).
    pub fn from_complete(candles: Vec<Candle>) -> Self {
        let (tx, rx) = mpsc::channel(1);

        tokio::spawn(async move {
            let _ = tx.send(CandleBatch::final_page(candles)).await;
        });

        Self::new(rx)
    }

    /// Number of candles observed so far.
    pub fn loaded(&self) -> usize {
        self.loaded
    }

    /// Whether the final batch has been observed.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Drain the stream into a single collection.
    pub async fn collect_all(mut self) -> Vec<Candle> {
        let mut out = Vec::new();
        while let Some(batch) = self.next().await {
            out.extend(batch.candles);
        }
        out
    }
}

impl Stream for CandleStream {
    type Item = CandleBatch;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        match this.receiver.get_mut().poll_recv(cx) {
            Poll::Ready(Some(batch)) => {
                *this.loaded += batch.candles.len();
                if batch.is_final {
                    *this.complete = true;
                }
                Poll::Ready(Some(batch))
            }
            Poll::Ready(None) => {
                *this.complete = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candle::Position;

    fn candle(id: &str) -> Candle {
        Candle {
            id: id.to_string(),
            position: Position::new(0.0, 0.0).unwrap(),
            emotion: Some("sorrow".to_string()),
            created_at: None,
            user_timestamp: None,
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_from_complete() {
        let stream = CandleStream::from_complete(vec![candle("a"), candle("b")]);
        let all = stream.collect_all().await;
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_batches_arrive_in_order() {
        let (tx, rx) = mpsc::channel(4);
        let mut stream = CandleStream::new(rx);

        tx.send(CandleBatch::page(vec![candle("a"), candle("b")]))
            .await
            .unwrap();
        tx.send(CandleBatch::final_page(vec![candle("c")]))
            .await
            .unwrap();
        drop(tx);

        let first = stream.next().await.unwrap();
        assert_eq!(first.candles.len(), 2);
        assert!(!first.is_final);
        assert_eq!(stream.loaded(), 2);

        let last = stream.next().await.unwrap();
        assert!(last.is_final);
        assert!(stream.is_complete());
        assert_eq!(stream.loaded(), 3);

        assert!(stream.next().await.is_none());
    }
}
