//! Background sampling with a synchronous fallback.
//!
//! Sampling is cheap for the built-in tours, but route previews evaluate a
//! tour many times and catalogs loaded from disk can be arbitrarily long. The
//! worker here runs on whatever executor the host provides and talks to the
//! render thread over bounded channels. The client never blocks: if a result
//! is not ready yet, callers compute it inline.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_channel::TrySendError;

use crate::pose::Pose;
use crate::sampler;
use crate::tour::Tour;

/// Work for the sampling worker.
#[derive(Debug, Clone)]
pub enum SampleRequest {
    /// A single pose at the given progress.
    Pose { tour: Arc<Tour>, progress: f32 },
    /// `count` evenly spaced poses along the whole tour.
    Path { tour: Arc<Tour>, count: usize },
}

/// Completed work from the sampling worker.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleResult {
    Pose {
        tour_id: String,
        progress: f32,
        pose: Option<Pose>,
    },
    Path {
        tour_id: String,
        count: usize,
        poses: Vec<Pose>,
    },
}

impl SampleRequest {
    fn evaluate(&self) -> SampleResult {
        match self {
            SampleRequest::Pose { tour, progress } => SampleResult::Pose {
                tour_id: tour.id.clone(),
                progress: *progress,
                pose: sampler::sample(tour, *progress),
            },
            SampleRequest::Path { tour, count } => SampleResult::Path {
                tour_id: tour.id.clone(),
                count: *count,
                poses: sampler::sample_path(tour, *count),
            },
        }
    }
}

/// Create a connected client/worker pair with room for `capacity` in-flight
/// requests and results.
#[must_use]
pub fn sampler_worker(capacity: usize) -> (SamplerClient, SamplerWorker) {
    let capacity = capacity.max(1);
    let (request_tx, request_rx) = async_channel::bounded(capacity);
    let (result_tx, result_rx) = async_channel::bounded(capacity);
    (
        SamplerClient {
            requests: request_tx,
            results: result_rx,
            paths: HashMap::new(),
            pending_paths: HashSet::new(),
            poses: Vec::new(),
        },
        SamplerWorker {
            requests: request_rx,
            results: result_tx,
        },
    )
}

/// The background half. Spawn [`run`](Self::run) on an executor.
pub struct SamplerWorker {
    requests: async_channel::Receiver<SampleRequest>,
    results: async_channel::Sender<SampleResult>,
}

impl SamplerWorker {
    /// Answer requests until the client shuts down or goes away.
    pub async fn run(self) {
        while let Ok(request) = self.requests.recv().await {
            if self.results.send(request.evaluate()).await.is_err() {
                break;
            }
        }
        tracing::debug!("Sampler worker stopped");
    }
}

/// The render-thread half. All methods are non-blocking.
pub struct SamplerClient {
    requests: async_channel::Sender<SampleRequest>,
    results: async_channel::Receiver<SampleResult>,
    paths: HashMap<(String, usize), Vec<Pose>>,
    pending_paths: HashSet<(String, usize)>,
    poses: Vec<(String, f32, Option<Pose>)>,
}

impl SamplerClient {
    /// Queue a path computation. Returns false if it could not be queued.
    ///
    /// Paths already computed or in flight are not requested again.
    pub fn request_path(&mut self, tour: &Arc<Tour>, count: usize) -> bool {
        let key = (tour.id.clone(), count);
        if self.paths.contains_key(&key) || self.pending_paths.contains(&key) {
            return true;
        }
        let request = SampleRequest::Path {
            tour: Arc::clone(tour),
            count,
        };
        if self.try_send(request) {
            self.pending_paths.insert(key);
            true
        } else {
            false
        }
    }

    /// Queue a single pose computation. Returns false if it could not be queued.
    pub fn request_pose(&mut self, tour: &Arc<Tour>, progress: f32) -> bool {
        self.try_send(SampleRequest::Pose {
            tour: Arc::clone(tour),
            progress,
        })
    }

    fn try_send(&self, request: SampleRequest) -> bool {
        match self.requests.try_send(request) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Closed(_)) => {
                tracing::trace!("Sampler worker unavailable; using inline sampling");
                false
            }
        }
    }

    /// Drain any results the worker has finished. Returns how many arrived.
    pub fn poll(&mut self) -> usize {
        let mut received = 0;
        while let Ok(result) = self.results.try_recv() {
            received += 1;
            match result {
                SampleResult::Path {
                    tour_id,
                    count,
                    poses,
                } => {
                    let key = (tour_id, count);
                    self.pending_paths.remove(&key);
                    self.paths.insert(key, poses);
                }
                SampleResult::Pose {
                    tour_id,
                    progress,
                    pose,
                } => self.poses.push((tour_id, progress, pose)),
            }
        }
        received
    }

    /// A path the worker has already computed.
    #[must_use]
    pub fn cached_path(&self, tour_id: &str, count: usize) -> Option<&[Pose]> {
        self.paths
            .get(&(tour_id.to_owned(), count))
            .map(Vec::as_slice)
    }

    /// Take single-pose results received so far, in arrival order.
    pub fn take_poses(&mut self) -> Vec<(String, f32, Option<Pose>)> {
        std::mem::take(&mut self.poses)
    }

    /// The worker's path if ready; otherwise queue it and sample inline.
    pub fn path_or_sample(&mut self, tour: &Arc<Tour>, count: usize) -> Vec<Pose> {
        self.poll();
        if let Some(path) = self.cached_path(&tour.id, count) {
            return path.to_vec();
        }
        self.request_path(tour, count);
        sampler::sample_path(tour, count)
    }

    /// Stop accepting requests. The worker finishes queued work, then exits.
    pub fn shutdown(&self) {
        self.requests.close();
    }

    /// Returns true while requests still have somewhere to go.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.requests.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;

    use glam::Vec3;

    use super::*;
    use crate::tour::tests::tour_with;

    fn block_on<F: Future>(f: F) -> F::Output {
        // Simple polling executor for tests.
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        #[allow(unsafe_code)]
        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {
                    // Requests are queued and closed before running, so the worker never waits.
                    panic!("Future unexpectedly pending");
                }
            }
        }
    }

    fn line_tour() -> Arc<Tour> {
        Arc::new(tour_with(
            &[(Vec3::ZERO, 1.0), (Vec3::new(10.0, 0.0, 0.0), 1.0)],
            20.0,
        ))
    }

    #[test]
    fn test_worker_answers_queued_requests() {
        let (mut client, worker) = sampler_worker(4);
        let tour = line_tour();

        assert!(client.request_path(&tour, 3));
        assert!(client.request_pose(&tour, 0.5));
        client.shutdown();
        block_on(worker.run());

        assert_eq!(client.poll(), 2);
        let path = client.cached_path("test", 3).unwrap();
        assert_eq!(
            path.iter().map(|p| p.position.x).collect::<Vec<_>>(),
            vec![0.0, 5.0, 10.0]
        );

        let poses = client.take_poses();
        assert_eq!(poses.len(), 1);
        assert_eq!(poses[0].2.unwrap().position, Vec3::new(5.0, 0.0, 0.0));
        assert!(client.take_poses().is_empty());
    }

    #[test]
    fn test_duplicate_path_requests_are_coalesced() {
        let (mut client, worker) = sampler_worker(1);
        let tour = line_tour();

        assert!(client.request_path(&tour, 8));
        // Same key is in flight; no second message is needed even though the queue is full.
        assert!(client.request_path(&tour, 8));
        // A different key does not fit.
        assert!(!client.request_path(&tour, 16));

        client.shutdown();
        block_on(worker.run());
        assert_eq!(client.poll(), 1);
    }

    #[test]
    fn test_fallback_without_worker() {
        let (mut client, worker) = sampler_worker(2);
        drop(worker);
        let tour = line_tour();

        assert!(!client.is_connected());
        let path = client.path_or_sample(&tour, 3);
        assert_eq!(path, sampler::sample_path(&tour, 3));
        assert!(client.cached_path("test", 3).is_none());
    }

    #[test]
    fn test_path_or_sample_prefers_worker_result() {
        let (mut client, worker) = sampler_worker(2);
        let tour = line_tour();

        // First call falls back inline and queues the work.
        let inline = client.path_or_sample(&tour, 5);
        client.shutdown();
        block_on(worker.run());

        let from_worker = client.path_or_sample(&tour, 5);
        assert_eq!(inline, from_worker);
        assert!(client.cached_path("test", 5).is_some());
    }
}
