//! Fixed-size pool of connection workers.
//!
//! Every job holds one slot for as long as it runs. Slots are the buffered
//! places of a bounded channel: taking one is a `send`, giving it back is a
//! `recv`. Once all slots are taken, [`WorkerPool::submit`] waits, which in
//! turn stalls the accept loop. New connections then queue in the kernel
//! backlog instead of piling up in memory.

use std::future::Future;

use async_std::channel::{self, Receiver, Sender};
use async_std::task;

pub struct WorkerPool {
    size: usize,
    take: Sender<()>,
    give_back: Receiver<()>,
}

/// Returns its slot when dropped, including when the job panics.
struct Slot(Receiver<()>);

impl Drop for Slot {
    fn drop(&mut self) {
        self.0.try_recv().ok();
    }
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (take, give_back) = channel::bounded(size);
        Self {
            size,
            take,
            give_back,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Jobs currently holding a slot.
    pub fn busy(&self) -> usize {
        self.take.len()
    }

    /// Runs `job` on its own task once a slot is free.
    pub async fn submit<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.take.send(()).await.is_err() {
            // both ends live in `self`, so this cannot happen while we exist
            tracing::error!("worker pool closed, dropping job");
            return;
        }

        let slot = Slot(self.give_back.clone());
        task::spawn(async move {
            let _slot = slot;
            job.await;
        });
    }

    /// Waits for every running job to finish. No new jobs can be submitted.
    pub async fn drain(self) {
        tracing::debug!(busy = self.busy(), "draining worker pool");
        for _ in 0..self.size {
            if self.take.send(()).await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_std::future::timeout;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[async_std::test]
    async fn submit_blocks_when_saturated() {
        let pool = WorkerPool::new(1);
        let (release, wait) = channel::bounded::<()>(1);

        pool.submit(async move {
            wait.recv().await.ok();
        })
        .await;
        assert_eq!(pool.busy(), 1);

        let blocked = timeout(Duration::from_millis(100), pool.submit(async {})).await;
        assert!(blocked.is_err(), "second job must wait for a free slot");

        release.send(()).await.unwrap();
        timeout(Duration::from_secs(5), pool.submit(async {}))
            .await
            .expect("slot freed once the first job finished");
    }

    #[async_std::test]
    async fn drain_waits_for_running_jobs() {
        let pool = WorkerPool::new(3);
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let done = Arc::clone(&done);
            pool.submit(async move {
                task::sleep(Duration::from_millis(50)).await;
                done.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        }

        pool.drain().await;
        assert_eq!(done.load(Ordering::SeqCst), 3);
    }

    #[async_std::test]
    async fn zero_size_is_clamped() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.size(), 1);
        pool.submit(async {}).await;
        pool.drain().await;
    }
}
