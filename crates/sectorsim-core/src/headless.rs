//! Headless fast-forward.
//!
//! [`fast_forward`] is the pure form: it loads a snapshot and returns a lazy
//! iterator of progress checkpoints, one every `progress_cycle` ticks plus a
//! final one. The caller never sees entity state until
//! [`FastForward::into_snapshot`].
//!
//! [`Worker`] runs the same loop on its own thread and talks to the host
//! only through [`HostMessage`]/[`WorkerMessage`] values. Dropping the
//! worker abandons the run.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::sim::Sim;
use crate::snapshot::Snapshot;

/// Checkpoint reported while fast-forwarding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Simulated time reached
    pub time: f64,
    /// Ticks run so far
    pub ticks: u64,
    /// Whether the target time has been reached
    pub done: bool,
}

/// Finite, non-restartable sequence of progress checkpoints
pub struct FastForward {
    sim: Sim,
    target_time: f64,
    delta: f64,
    ticks: u64,
    finished: bool,
}

/// Load `snapshot` and prepare to advance it to `target_time` in steps of
/// `delta`. The last step may overshoot the target by less than `delta`.
pub fn fast_forward(
    snapshot: Snapshot,
    target_time: f64,
    delta: f64,
    config: Option<SimConfig>,
) -> Result<FastForward> {
    if !delta.is_finite() || delta <= 0.0 {
        return Err(SimError::Config(format!("fast-forward delta must be positive, got {delta}")));
    }
    if !target_time.is_finite() {
        return Err(SimError::Config(format!("invalid target time {target_time}")));
    }
    let sim = Sim::load(snapshot, config)?;
    log::info!(
        "fast-forwarding from t={} to t={target_time} (delta {delta})",
        sim.time()
    );
    Ok(FastForward {
        sim,
        target_time,
        delta,
        ticks: 0,
        finished: false,
    })
}

impl FastForward {
    pub fn sim(&self) -> &Sim {
        &self.sim
    }

    /// Run whatever is left and return the final snapshot
    pub fn into_snapshot(mut self) -> Result<Snapshot> {
        for progress in self.by_ref() {
            progress?;
        }
        log::info!("fast-forward finished at t={} after {} ticks", self.sim.time(), self.ticks);
        Ok(self.sim.serialize())
    }
}

impl Iterator for FastForward {
    type Item = Result<Progress>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        for _ in 0..self.sim.config().progress_cycle {
            if self.sim.time() >= self.target_time {
                break;
            }
            if let Err(err) = self.sim.next(self.delta) {
                self.finished = true;
                return Some(Err(err));
            }
            self.ticks += 1;
        }

        let done = self.sim.time() >= self.target_time;
        self.finished = done;
        Some(Ok(Progress {
            time: self.sim.time(),
            ticks: self.ticks,
            done,
        }))
    }
}

/// Host to worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    Init {
        sim: Snapshot,
        #[serde(rename = "targetTime")]
        target_time: f64,
        delta: f64,
    },
}

/// Worker to host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerMessage {
    Update { time: f64 },
    Completed { data: Snapshot },
    Failed { error: String },
}

/// Serve one init message: emit an update per checkpoint, then exactly one
/// `completed` or `failed`. `emit` returns false when the host is gone, which
/// abandons the run.
pub fn serve(message: HostMessage, mut emit: impl FnMut(WorkerMessage) -> bool) {
    let HostMessage::Init {
        sim,
        target_time,
        delta,
    } = message;

    let mut run = match fast_forward(sim, target_time, delta, None) {
        Ok(run) => run,
        Err(err) => {
            emit(WorkerMessage::Failed { error: err.to_string() });
            return;
        }
    };

    for progress in run.by_ref() {
        match progress {
            Ok(progress) => {
                if !emit(WorkerMessage::Update { time: progress.time }) {
                    log::debug!("host hung up at t={}", progress.time);
                    return;
                }
            }
            Err(err) => {
                emit(WorkerMessage::Failed { error: err.to_string() });
                return;
            }
        }
    }

    match run.into_snapshot() {
        Ok(data) => emit(WorkerMessage::Completed { data }),
        Err(err) => emit(WorkerMessage::Failed { error: err.to_string() }),
    };
}

/// Fast-forward running on a dedicated thread
pub struct Worker {
    sender: Sender<HostMessage>,
    receiver: Receiver<WorkerMessage>,
    _handle: JoinHandle<()>,
}

impl Worker {
    pub fn spawn() -> Self {
        let (host_tx, worker_rx) = unbounded::<HostMessage>();
        let (worker_tx, host_rx) = unbounded::<WorkerMessage>();

        let handle = thread::spawn(move || {
            for message in worker_rx.iter() {
                serve(message, |reply| worker_tx.send(reply).is_ok());
            }
        });

        Self {
            sender: host_tx,
            receiver: host_rx,
            _handle: handle,
        }
    }

    pub fn send(&self, message: HostMessage) -> Result<()> {
        self.sender.send(message).map_err(|_| SimError::Disconnected)
    }

    /// Block until the next message
    pub fn recv(&self) -> Result<WorkerMessage> {
        self.receiver.recv().map_err(|_| SimError::Disconnected)
    }

    pub fn try_recv(&self) -> Option<WorkerMessage> {
        self.receiver.try_recv().ok()
    }

    /// Block until the run ends, passing every update to `on_update`
    pub fn wait(&self, mut on_update: impl FnMut(f64)) -> Result<Snapshot> {
        loop {
            match self.recv()? {
                WorkerMessage::Update { time } => on_update(time),
                WorkerMessage::Completed { data } => return Ok(data),
                WorkerMessage::Failed { error } => return Err(SimError::RunFailed(error)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetypes::{self, ShipTemplate};
    use crate::components::*;

    fn snapshot(progress_cycle: u32) -> Snapshot {
        let mut sim = Sim::new(SimConfig {
            progress_cycle,
            ..SimConfig::default()
        });
        let faction = sim.spawn(archetypes::faction("Union", "UNI", Color::default(), 0, false));
        let ship = sim.spawn(archetypes::ship(
            &ShipTemplate::courier("Swift"),
            faction,
            Color::default(),
            Vec2::ZERO,
        ));
        sim.enqueue(ship, Order::Move { position: Vec2::new(30.0, 0.0) }).unwrap();
        sim.serialize()
    }

    #[test]
    fn test_progress_every_cycle_then_final() {
        let run = fast_forward(snapshot(4), 10.0, 1.0, None).unwrap();
        let checkpoints: Vec<Progress> = run.map(|p| p.unwrap()).collect();

        let times: Vec<f64> = checkpoints.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![4.0, 8.0, 10.0]);
        assert!(checkpoints.last().unwrap().done);
        assert_eq!(checkpoints.last().unwrap().ticks, 10);
    }

    #[test]
    fn test_into_snapshot_matches_direct_run() {
        let start = snapshot(3);
        let snapshot = fast_forward(start.clone(), 5.0, 1.0, None)
            .unwrap()
            .into_snapshot()
            .unwrap();

        let mut direct = Sim::load(start, None).unwrap();
        for _ in 0..5 {
            direct.next(1.0).unwrap();
        }
        assert_eq!(snapshot, direct.serialize());
    }

    #[test]
    fn test_rejects_non_positive_delta() {
        assert!(fast_forward(snapshot(1), 5.0, 0.0, None).is_err());
    }

    #[test]
    fn test_worker_protocol() {
        let worker = Worker::spawn();
        worker
            .send(HostMessage::Init {
                sim: snapshot(2),
                target_time: 6.0,
                delta: 1.0,
            })
            .unwrap();

        let mut updates = Vec::new();
        let data = worker.wait(|time| updates.push(time)).unwrap();

        assert_eq!(updates, vec![2.0, 4.0, 6.0]);
        assert_eq!(data.time, 6.0);
    }

    #[test]
    fn test_worker_reports_failure() {
        let mut bad = snapshot(2);
        bad.version = "9.0".into();
        let worker = Worker::spawn();
        worker
            .send(HostMessage::Init {
                sim: bad,
                target_time: 6.0,
                delta: 1.0,
            })
            .unwrap();

        assert!(matches!(worker.recv().unwrap(), WorkerMessage::Failed { .. }));
    }

    #[test]
    fn test_messages_are_tagged() {
        let json = serde_json::to_value(WorkerMessage::Update { time: 1.5 }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "update", "time": 1.5}));

        let init = serde_json::to_value(HostMessage::Init {
            sim: snapshot(1),
            target_time: 3.0,
            delta: 0.5,
        })
        .unwrap();
        assert_eq!(init["type"], "init");
        assert_eq!(init["targetTime"], 3.0);
    }
}
