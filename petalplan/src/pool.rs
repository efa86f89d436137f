//! Worker pool for parallel per-positioner planning.
//!
//! Planning is pure computation over a read-only collision snapshot, so
//! requests for different positioners run safely in parallel. Each request
//! carries its own positioner snapshot and an `Arc` to the shared snapshot;
//! superseding a pending plan is just submitting a new request for the same
//! positioner.

use crate::collision::CollisionGeometry;
use crate::config::PlannerConfig;
use crate::error::{Error, Result};
use crate::planner::{PlanOutcome, Planner};
use crossbeam_channel::{unbounded, Receiver, Sender};
use petalkin::{JointAngles, Positioner};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// One planning job.
pub struct PlanRequest {
    /// Snapshot of the positioner to plan for.
    pub positioner: Positioner,
    /// Joint-space target.
    pub target: JointAngles,
    /// Shared read-only collision snapshot for this cycle.
    pub geometry: Arc<dyn CollisionGeometry>,
}

/// Result of one planning job.
pub struct PlanResponse {
    /// Positioner the job belonged to.
    pub positioner_id: u32,
    /// Planning outcome or malformed-input error.
    pub outcome: Result<PlanOutcome>,
}

/// Fixed set of planner worker threads fed over channels.
pub struct PlannerPool {
    request_tx: Option<Sender<PlanRequest>>,
    response_rx: Receiver<PlanResponse>,
    workers: Vec<JoinHandle<()>>,
}

impl PlannerPool {
    /// Spawn `worker_count` planner threads sharing one configuration.
    pub fn new(config: PlannerConfig, worker_count: usize) -> Result<Self> {
        if worker_count == 0 {
            return Err(Error::InvalidParameter(
                "worker_count must be at least 1".into(),
            ));
        }
        let planner = Planner::new(config)?;
        let (request_tx, request_rx) = unbounded::<PlanRequest>();
        let (response_tx, response_rx) = unbounded::<PlanResponse>();

        let mut workers = Vec::with_capacity(worker_count);
        for n in 0..worker_count {
            let planner = planner.clone();
            let request_rx = request_rx.clone();
            let response_tx = response_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("planner-{n}"))
                .spawn(move || {
                    for request in request_rx.iter() {
                        let outcome = planner.plan_move(
                            &request.positioner,
                            request.target,
                            request.geometry.as_ref(),
                        );
                        let response = PlanResponse {
                            positioner_id: request.positioner.id(),
                            outcome,
                        };
                        if response_tx.send(response).is_err() {
                            break;
                        }
                    }
                })
                .map_err(Error::Io)?;
            workers.push(handle);
        }

        Ok(Self {
            request_tx: Some(request_tx),
            response_rx,
            workers,
        })
    }

    /// Queue one planning job.
    pub fn submit(&self, request: PlanRequest) -> Result<()> {
        match &self.request_tx {
            Some(tx) => tx.send(request).map_err(|_| Error::PoolDisconnected),
            None => Err(Error::PoolDisconnected),
        }
    }

    /// Receiver side for completed jobs, in completion order.
    pub fn responses(&self) -> &Receiver<PlanResponse> {
        &self.response_rx
    }

    /// Block for the next completed job.
    pub fn recv(&self) -> Result<PlanResponse> {
        self.response_rx.recv().map_err(|_| Error::PoolDisconnected)
    }

    /// Stop accepting jobs and wait for workers to drain.
    pub fn shutdown(&mut self) {
        self.request_tx = None;
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::warn!("planner worker panicked during shutdown");
            }
        }
    }
}

impl Drop for PlannerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::NeighborPointField;
    use petalkin::{CalibrationParams, FlatPoint};

    #[test]
    fn test_pool_plans_in_parallel() {
        let mut pool = PlannerPool::new(PlannerConfig::default(), 2).unwrap();
        let geometry: Arc<dyn CollisionGeometry> = Arc::new(
            NeighborPointField::empty(FlatPoint::ZERO, 3.0, 3.0, 0.5).unwrap(),
        );
        let calib = CalibrationParams {
            spinupdown_period: 0,
            ..Default::default()
        };
        for id in 0..4 {
            let positioner =
                Positioner::new(id, calib.clone(), JointAngles::new(0.0, 170.0)).unwrap();
            pool.submit(PlanRequest {
                positioner,
                target: JointAngles::new(20.0, 120.0),
                geometry: Arc::clone(&geometry),
            })
            .unwrap();
        }
        let mut seen = Vec::new();
        for _ in 0..4 {
            let response = pool.recv().unwrap();
            assert!(matches!(
                response.outcome,
                Ok(PlanOutcome::Table(_))
            ));
            seen.push(response.positioner_id);
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
        pool.shutdown();
        assert!(matches!(
            pool.recv(),
            Err(Error::PoolDisconnected)
        ));
    }
}
