// Bounded single-producer / single-consumer sample ring
//
// A mutex guards the indices and is only held to move pointers or copy a
// batch, never across long work; a condition variable lets a blocking
// consumer sleep while the ring is empty. The producer signals once per
// batch. Overflow overwrites the oldest samples (audio is soft-real-time);
// underflow hands out silence.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Ring capacity: a quarter second of audio
pub const RING_CAPACITY: usize = 44_100 / 4;

struct RingState {
    buffer: Box<[i16; RING_CAPACITY]>,
    /// Next slot the consumer reads
    read: usize,
    /// Next slot the producer writes
    write: usize,
    /// Occupied slots
    len: usize,
    /// Producer is gone; consumers should drain and stop waiting
    shutdown: bool,
}

/// Shared sample ring
pub struct SampleRing {
    state: Mutex<RingState>,
    available: Condvar,
}

impl SampleRing {
    pub fn new() -> Arc<Self> {
        Arc::new(SampleRing {
            state: Mutex::new(RingState {
                buffer: Box::new([0; RING_CAPACITY]),
                read: 0,
                write: 0,
                len: 0,
                shutdown: false,
            }),
            available: Condvar::new(),
        })
    }

    /// Producer: append a batch, overwriting the oldest samples when full,
    /// then signal the consumer once
    pub fn push(&self, samples: &[i16]) {
        let mut state = self.state.lock().unwrap();
        for &sample in samples {
            let slot = state.write;
            state.buffer[slot] = sample;
            state.write = (state.write + 1) % RING_CAPACITY;
            if state.len == RING_CAPACITY {
                // Overwrote the oldest unread sample
                state.read = (state.read + 1) % RING_CAPACITY;
            } else {
                state.len += 1;
            }
        }
        drop(state);
        self.available.notify_one();
    }

    /// Consumer: fill `dest`, zero-padding on underflow. Never blocks, so
    /// it is safe inside a host audio callback.
    pub fn pop(&self, dest: &mut [i16]) -> usize {
        let mut state = self.state.lock().unwrap();
        let available = state.len.min(dest.len());
        for slot in dest.iter_mut().take(available) {
            *slot = state.buffer[state.read];
            state.read = (state.read + 1) % RING_CAPACITY;
            state.len -= 1;
        }
        for slot in dest.iter_mut().skip(available) {
            *slot = 0;
        }
        available
    }

    /// Consumer: wait until samples arrive or the ring shuts down
    pub fn wait_for_samples(&self, timeout: Duration) -> bool {
        let state = self.state.lock().unwrap();
        if state.len > 0 || state.shutdown {
            return state.len > 0;
        }
        let (state, _timed_out) = self
            .available
            .wait_timeout_while(state, timeout, |s| s.len == 0 && !s.shutdown)
            .unwrap();
        state.len > 0
    }

    /// Samples currently buffered
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Producer shutdown: wake any waiting consumer so it can exit
    pub fn shutdown(&self) {
        self.state.lock().unwrap().shutdown = true;
        self.available.notify_one();
    }

    pub fn is_shut_down(&self) -> bool {
        self.state.lock().unwrap().shutdown
    }
}
