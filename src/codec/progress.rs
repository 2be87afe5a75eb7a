// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Per-run progress tracking.
//!
//! Each [`Pipeline`](crate::Pipeline) owns one [`Progress`] behind an `Arc`,
//! so another thread can poll it while the run executes. Atomics only; runs
//! on different pipelines never share a tracker.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::codec::error::Stage;

/// Observer invoked on every stage transition with `(stage, step, total)`.
pub type StageObserver = Box<dyn Fn(Stage, u32, u32) + Send + Sync>;

const NO_STAGE: u8 = u8::MAX;

const STAGES: [Stage; 8] = [
    Stage::Fitting,
    Stage::Cipher,
    Stage::Framing,
    Stage::ErasureCoding,
    Stage::HexPacking,
    Stage::RasterEncode,
    Stage::RasterDecode,
    Stage::RasterIo,
];

fn stage_code(stage: Stage) -> u8 {
    STAGES.iter().position(|&s| s == stage).map_or(NO_STAGE, |i| i as u8)
}

#[derive(Default)]
pub struct Progress {
    step: AtomicU32,
    total: AtomicU32,
    stage: AtomicU8,
    observer: Mutex<Option<StageObserver>>,
}

impl core::fmt::Debug for Progress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let (step, total) = self.get();
        f.debug_struct("Progress")
            .field("step", &step)
            .field("total", &total)
            .field("stage", &self.stage())
            .finish()
    }
}

impl Progress {
    pub fn new() -> Self {
        Self { stage: AtomicU8::new(NO_STAGE), ..Self::default() }
    }

    /// Install (or clear) the stage observer.
    pub fn set_observer(&self, observer: Option<StageObserver>) {
        *self.observer_slot() = observer;
    }

    /// Reset to step 0 of `total`.
    pub fn init(&self, total: u32) {
        self.step.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
        self.stage.store(NO_STAGE, Ordering::Relaxed);
    }

    /// Enter `stage`, advancing one step. Step is capped at total.
    pub fn enter(&self, stage: Stage) {
        self.stage.store(stage_code(stage), Ordering::Relaxed);
        let total = self.total.load(Ordering::Relaxed);
        let step = self.step.load(Ordering::Relaxed);
        if total == 0 || step < total {
            self.step.store(step + 1, Ordering::Relaxed);
        }
        let (step, total) = self.get();
        if let Some(observer) = self.observer_slot().as_ref() {
            observer(stage, step, total);
        }
    }

    /// A panicking observer does not disable the tracker.
    fn observer_slot(&self) -> MutexGuard<'_, Option<StageObserver>> {
        self.observer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current (step, total).
    pub fn get(&self) -> (u32, u32) {
        (self.step.load(Ordering::Relaxed), self.total.load(Ordering::Relaxed))
    }

    /// Stage most recently entered, if any.
    pub fn stage(&self) -> Option<Stage> {
        STAGES.get(self.stage.load(Ordering::Relaxed) as usize).copied()
    }

    /// Mark complete (step = total).
    pub fn finish(&self) {
        let t = self.total.load(Ordering::Relaxed);
        self.step.store(t, Ordering::Relaxed);
    }
}
