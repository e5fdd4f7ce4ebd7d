//! Recorded detector output, replayed in place of a live camera session.

use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::pipeline::{FrameInput, FrameOutput, FramePipeline};
use crate::utils::SharedState;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub frames: Vec<FrameInput>,
}

impl Recording {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading recording {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("parsing recording {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn frame(&self, index: usize) -> Result<&FrameInput> {
        self.frames
            .get(index)
            .ok_or_else(|| anyhow!("frame {} out of range ({} frames)", index, self.frames.len()))
    }
}

/// Processes every frame independently; outputs come back in frame order.
pub fn annotate_all(pipeline: &FramePipeline, recording: &Recording) -> Vec<FrameOutput> {
    recording
        .frames
        .par_iter()
        .enumerate()
        .map(|(i, frame)| pipeline.process(i as u64, frame))
        .collect()
}

/// Replays the recording the way a live session runs.
///
/// A worker thread processes frames at `frame_interval` and hands outputs to
/// the calling thread, which presents only the newest output it has received.
pub fn play(
    pipeline: Arc<FramePipeline>,
    recording: Recording,
    state: SharedState,
    frame_interval: Duration,
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<FrameOutput>();

    let worker = thread::spawn(move || {
        for (i, frame) in recording.frames.iter().enumerate() {
            let output = pipeline.process(i as u64, frame);
            if tx.send(output).is_err() {
                break;
            }
            thread::sleep(frame_interval);
        }
    });

    while let Ok(mut output) = rx.recv() {
        // skip straight to the newest frame if the worker got ahead
        while let Ok(newer) = rx.try_recv() {
            debug!("superseding frame {} with {}", output.frame_id, newer.frame_id);
            output = newer;
        }

        let mut guard = state
            .lock()
            .map_err(|_| anyhow!("presentation state poisoned"))?;
        let frame_id = output.frame_id;
        if guard.present(output) {
            info!(
                "frame {}: {} overlay shapes, fps {:?}",
                frame_id,
                guard.overlays.len(),
                guard.fps
            );
        }
    }

    worker
        .join()
        .map_err(|_| anyhow!("replay worker panicked"))?;
    Ok(())
}
