use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, info};

use crate::distance::DistanceEstimate;
use crate::overlay::OverlaySet;
use crate::pipeline::FrameOutput;

// make SharedState an alias for a Mutex protected struct State
pub type SharedState = Arc<Mutex<State>>;

// what the presenting thread shows; written once per applied frame
pub struct State {
    pub fps: Option<f32>,
    pub fps_vec: Vec<f32>,
    pub last_frame_time: Option<Instant>,

    pub overlays: OverlaySet,
    pub last_distance: Option<DistanceEstimate>,
    pub distance_ts: TimeSeries,

    pub frames_presented: u64,
    pub frames_dropped: u64,
}

impl State {
    pub fn new(distance_history: usize) -> Self {
        Self {
            fps: None,
            fps_vec: Vec::new(),
            last_frame_time: None,
            overlays: OverlaySet::empty(0),
            last_distance: None,
            distance_ts: TimeSeries::new(distance_history),
            frames_presented: 0,
            frames_dropped: 0,
        }
    }

    /// Replaces the overlay set with the output's, unless a newer frame is already shown.
    ///
    /// Returns false when the output was stale and dropped.
    pub fn present(&mut self, output: FrameOutput) -> bool {
        if self.frames_presented > 0 && output.frame_id <= self.overlays.frame_id() {
            debug!(
                "dropping stale frame {} (showing {})",
                output.frame_id,
                self.overlays.frame_id()
            );
            self.frames_dropped += 1;
            return false;
        }

        let now = Instant::now();
        if let Some(last) = self.last_frame_time {
            let frame_delta = now.duration_since(last).as_secs_f32();
            if frame_delta > 0.0 {
                self.fps_vec.push(1.0 / frame_delta);
                if self.fps_vec.len() > 10 {
                    self.fps_vec.remove(0);
                }
                self.fps =
                    Some((self.fps_vec.iter().sum::<f32>() / self.fps_vec.len() as f32).round());
            }
        }
        self.last_frame_time = Some(now);

        for estimate in output.distances.iter() {
            info!(
                "distance to person {}: {:.2} meters",
                estimate.index, estimate.meters
            );
            self.distance_ts.push(estimate.meters, output.frame_id as u128);
            self.last_distance = Some(*estimate);
        }

        self.overlays = output.overlays;
        self.frames_presented += 1;
        true
    }
}

pub struct TimeSeries {
    data: VecDeque<f32>,
    timestamp: VecDeque<u128>,
    max_length: usize,
}

impl TimeSeries {
    pub fn new(max_length: usize) -> Self {
        Self {
            data: VecDeque::new(),
            timestamp: VecDeque::new(),
            max_length: max_length.max(1),
        }
    }

    pub fn push(&mut self, value: f32, timestamp: u128) {
        self.data.push_back(value);
        self.timestamp.push_back(timestamp);

        if self.data.len() > self.max_length {
            self.data.pop_front();
            self.timestamp.pop_front();
        }
    }

    /// Mean of the window, `None` while empty.
    pub fn get_mean(&self) -> Option<f32> {
        if self.data.is_empty() {
            return None;
        }
        Some(self.data.iter().sum::<f32>() / self.data.len() as f32)
    }

    pub fn latest_timestamp(&self) -> Option<u128> {
        self.timestamp.back().copied()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
