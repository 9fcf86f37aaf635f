//! Render note chain
//!
//! The ordered, mutable sequence of render stages executed each frame. The
//! chain is an arena of slots addressed by generational keys with explicit
//! prev/next links, so removal is neighbor re-linking plus slot
//! invalidation and `clear` is an arena reset — no recursive destructor
//! walks, no ownership cycles.
//!
//! Lookup misses (stale key, out-of-range index) are `None`, never panics:
//! "not found" is an expected outcome for callers that reorder stages at
//! runtime.

use crate::foundation::time::{MovingAverage, Stopwatch};
use crate::pipeline::note::{RenderContext, RenderNote};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable key of a render note within a chain
    pub struct NoteKey;
}

struct NoteSlot {
    note: Box<dyn RenderNote>,
    prev: Option<NoteKey>,
    next: Option<NoteKey>,
    timing: MovingAverage,
}

/// Ordered chain of render stages with per-stage timing
pub struct NoteChain {
    slots: SlotMap<NoteKey, NoteSlot>,
    head: Option<NoteKey>,
    tail: Option<NoteKey>,
    /// When set, a stage exceeding this many milliseconds logs a warning
    slow_stage_warn_ms: Option<f32>,
}

impl Default for NoteChain {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            head: None,
            tail: None,
            slow_stage_warn_ms: None,
        }
    }

    /// Enable or disable the slow-stage warning threshold
    pub fn set_slow_stage_warn_ms(&mut self, threshold: Option<f32>) {
        self.slow_stage_warn_ms = threshold;
    }

    /// Number of stages in the chain
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the chain has no stages
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Append a stage at the tail; returns its key
    pub fn append(&mut self, note: Box<dyn RenderNote>) -> NoteKey {
        let key = self.slots.insert(NoteSlot {
            note,
            prev: self.tail,
            next: None,
            timing: MovingAverage::new(),
        });

        match self.tail {
            Some(tail) => self.slots[tail].next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
        key
    }

    /// Splice a stage immediately after an existing one
    ///
    /// Returns `None` (and drops the note) when `after` no longer names a
    /// stage.
    pub fn insert_after(&mut self, note: Box<dyn RenderNote>, after: NoteKey) -> Option<NoteKey> {
        if !self.slots.contains_key(after) {
            return None;
        }

        let next = self.slots[after].next;
        let key = self.slots.insert(NoteSlot {
            note,
            prev: Some(after),
            next,
            timing: MovingAverage::new(),
        });

        self.slots[after].next = Some(key);
        match next {
            Some(n) => self.slots[n].prev = Some(key),
            None => self.tail = Some(key),
        }
        Some(key)
    }

    /// Splice a stage immediately after the one at `index` (0 = the head)
    ///
    /// Returns `None` when the chain has no stage at that position.
    pub fn insert_at(&mut self, note: Box<dyn RenderNote>, index: usize) -> Option<NoteKey> {
        let after = self.key_at(index)?;
        self.insert_after(note, after)
    }

    /// Remove a stage by key, bridging its neighbors
    pub fn remove(&mut self, key: NoteKey) -> Option<Box<dyn RenderNote>> {
        let slot = self.slots.remove(key)?;

        match slot.prev {
            Some(prev) => self.slots[prev].next = slot.next,
            None => self.head = slot.next,
        }
        match slot.next {
            Some(next) => self.slots[next].prev = slot.prev,
            None => self.tail = slot.prev,
        }
        Some(slot.note)
    }

    /// Remove the stage at `index` (0 = the head)
    pub fn remove_at(&mut self, index: usize) -> Option<Box<dyn RenderNote>> {
        let key = self.key_at(index)?;
        self.remove(key)
    }

    /// Remove the tail stage
    pub fn shorten(&mut self) -> Option<Box<dyn RenderNote>> {
        let tail = self.tail?;
        self.remove(tail)
    }

    /// Drop every stage
    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    /// Key of the stage at `index`, walking from the head
    pub fn key_at(&self, index: usize) -> Option<NoteKey> {
        let mut current = self.head;
        for _ in 0..index {
            current = self.slots.get(current?)?.next;
        }
        current
    }

    /// Keys in chain order
    pub fn keys(&self) -> Vec<NoteKey> {
        let mut keys = Vec::with_capacity(self.slots.len());
        let mut current = self.head;
        while let Some(key) = current {
            keys.push(key);
            current = self.slots[key].next;
        }
        keys
    }

    /// Rolling average execution time of a stage, in milliseconds
    pub fn average_time_ms(&self, key: NoteKey) -> Option<f32> {
        self.slots.get(key).map(|slot| slot.timing.mean())
    }

    /// Propagate a reinitialization down the whole chain
    ///
    /// Called after a render-target resize so every stage can reallocate
    /// its screen-space resources.
    pub fn reinit_all(&mut self, extent: (u32, u32)) {
        for key in self.keys() {
            self.slots[key].note.reinit(extent);
        }
    }

    /// Execute every stage in chain order, timing each one
    pub fn render(&mut self, ctx: &mut RenderContext<'_>) {
        for key in self.keys() {
            let Some(slot) = self.slots.get_mut(key) else {
                continue;
            };

            let watch = Stopwatch::start_new();
            slot.note.render(ctx);
            let elapsed_ms = watch.elapsed_millis();
            slot.timing.push(elapsed_ms);

            if let Some(threshold) = self.slow_stage_warn_ms {
                if elapsed_ms > threshold {
                    log::warn!(
                        "render stage '{}' took {:.2}ms (threshold {:.2}ms)",
                        slot.note.name(),
                        elapsed_ms,
                        threshold
                    );
                }
            }
        }
    }
}
