//! Positional capture: per-tick samples and the record they are uploaded in.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One animation tick worth of entity positions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub ball_position: Point,
    pub paddle_position: Point,
    pub timestamp_millis: f64,
}

/// Append-only, bounded log of samples for the active session.
#[derive(Debug)]
pub struct CaptureBuffer {
    samples: Vec<Sample>,
    capacity: usize,
    dropped: usize,
}

impl CaptureBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            // Reserve lazily; capacity can be large for long sessions.
            samples: Vec::with_capacity(capacity.min(4096)),
            capacity,
            dropped: 0,
        }
    }

    /// Returns false once the buffer is full; the sample is counted as dropped.
    pub fn append(&mut self, sample: Sample) -> bool {
        if self.samples.len() >= self.capacity {
            if self.dropped == 0 {
                log::warn!(
                    "capture buffer full at {} samples, dropping further samples",
                    self.capacity
                );
            }
            self.dropped += 1;
            return false;
        }
        self.samples.push(sample);
        true
    }

    /// Drains everything captured so far, oldest first.
    pub fn flush(&mut self) -> Vec<Sample> {
        self.dropped = 0;
        std::mem::take(&mut self.samples)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.dropped = 0;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

/// Data submitted to the persistence layer once per trial session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialRecord {
    pub video_id: String,
    pub video_list: Vec<String>,
    pub export_arr: Vec<Sample>,
}

impl TrialRecord {
    pub fn to_json(&self) -> Result<String, crate::error::FrameError> {
        Ok(serde_json::to_string(self)?)
    }
}
