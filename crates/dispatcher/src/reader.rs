//! MergedReader - one read stream over many transport read halves

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

use contracts::BoxedReader;

/// Reads from several sources as one stream.
///
/// Sources are polled round-robin. A source reporting end-of-stream is
/// dropped and the merge continues; the merge itself ends only when every
/// source has. A source error is surfaced once and that source dropped,
/// after which reads continue with the rest.
pub struct MergedReader {
    sources: Vec<BoxedReader>,
    cursor: usize,
}

impl MergedReader {
    /// Merge the given read halves. An empty set is immediately at
    /// end-of-stream.
    pub fn new(sources: Vec<BoxedReader>) -> Self {
        Self { sources, cursor: 0 }
    }

    /// Number of sources still open.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl AsyncRead for MergedReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let me = self.get_mut();

        if buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        loop {
            if me.sources.is_empty() {
                return Poll::Ready(Ok(()));
            }

            let len = me.sources.len();
            let mut finished: Option<usize> = None;

            for offset in 0..len {
                let idx = (me.cursor + offset) % len;
                let before = buf.filled().len();
                match Pin::new(&mut me.sources[idx]).poll_read(cx, buf) {
                    Poll::Pending => {}
                    Poll::Ready(Ok(())) if buf.filled().len() > before => {
                        me.cursor = (idx + 1) % len;
                        return Poll::Ready(Ok(()));
                    }
                    Poll::Ready(Ok(())) => {
                        // This source is done; drop it and rescan.
                        finished = Some(idx);
                        break;
                    }
                    Poll::Ready(Err(e)) => {
                        me.sources.swap_remove(idx);
                        me.cursor = 0;
                        return Poll::Ready(Err(e));
                    }
                }
            }

            match finished {
                Some(idx) => {
                    me.sources.swap_remove(idx);
                    me.cursor = 0;
                }
                // Every source was polled and none was ready.
                None => return Poll::Pending,
            }
        }
    }
}
