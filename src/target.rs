//! Live target capability
//!
//! A target exposes named integer slots in a running game. Each slot has a
//! current value and an original value captured when the target was attached.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Named slots the reconciliation pass writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    TimeTravelAnimationEnabled,
    Clock1BaseTime,
    Clock1Increment,
    Clock2BaseTime,
    Clock2Increment,
    Clock3BaseTime,
    Clock3Increment,
    PoolDividerLength,
}

impl Slot {
    pub const ALL: [Slot; 8] = [
        Slot::TimeTravelAnimationEnabled,
        Slot::Clock1BaseTime,
        Slot::Clock1Increment,
        Slot::Clock2BaseTime,
        Slot::Clock2Increment,
        Slot::Clock3BaseTime,
        Slot::Clock3Increment,
        Slot::PoolDividerLength,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Slot::TimeTravelAnimationEnabled => "TimeTravelAnimationEnabled",
            Slot::Clock1BaseTime => "Clock1BaseTime",
            Slot::Clock1Increment => "Clock1Increment",
            Slot::Clock2BaseTime => "Clock2BaseTime",
            Slot::Clock2Increment => "Clock2Increment",
            Slot::Clock3BaseTime => "Clock3BaseTime",
            Slot::Clock3Increment => "Clock3Increment",
            Slot::PoolDividerLength => "PoolDividerLength",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capability consumed by the reconciliation pass
///
/// How the target is located and how originals are captured is up to the
/// implementor.
pub trait Target {
    fn is_valid(&self) -> bool;

    /// Overwrite the slot's current value
    fn set_value(&mut self, slot: Slot, value: i32) -> Result<()>;

    /// Reset the slot's current value to the original captured at attach time
    fn restore_original(&mut self, slot: Slot) -> Result<()>;
}

/// A write performed on a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotWrite {
    Set(Slot, i32),
    Restore(Slot),
}

impl fmt::Display for SlotWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotWrite::Set(slot, value) => write!(f, "{slot} <- {value}"),
            SlotWrite::Restore(slot) => write!(f, "{slot} <- original"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RestorableValue {
    original: i32,
    current: i32,
}

/// Target backed by plain memory
///
/// Records every write so callers can inspect what a pass did.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTarget {
    valid: bool,
    slots: HashMap<Slot, RestorableValue>,
    writes: Vec<SlotWrite>,
}

impl InMemoryTarget {
    /// Attach with the given originals; slots not listed are unavailable
    pub fn attach(originals: impl IntoIterator<Item = (Slot, i32)>) -> Self {
        let slots = originals
            .into_iter()
            .map(|(slot, original)| {
                (
                    slot,
                    RestorableValue {
                        original,
                        current: original,
                    },
                )
            })
            .collect();
        Self {
            valid: true,
            slots,
            writes: Vec::new(),
        }
    }

    /// Every slot attached with an original of 0
    pub fn zeroed() -> Self {
        Self::attach(Slot::ALL.map(|slot| (slot, 0)))
    }

    #[cfg(test)]
    pub fn detach(&mut self) {
        self.valid = false;
    }

    pub fn current(&self, slot: Slot) -> Option<i32> {
        self.slots.get(&slot).map(|v| v.current)
    }

    #[cfg(test)]
    pub fn original(&self, slot: Slot) -> Option<i32> {
        self.slots.get(&slot).map(|v| v.original)
    }

    pub fn writes(&self) -> &[SlotWrite] {
        &self.writes
    }

    #[cfg(test)]
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    fn slot_mut(&mut self, slot: Slot) -> Result<&mut RestorableValue> {
        self.slots
            .get_mut(&slot)
            .with_context(|| format!("Slot {slot} is not attached"))
    }
}

impl Target for InMemoryTarget {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn set_value(&mut self, slot: Slot, value: i32) -> Result<()> {
        self.slot_mut(slot)?.current = value;
        self.writes.push(SlotWrite::Set(slot, value));
        debug!(slot = %slot, value = value, "Slot written");
        Ok(())
    }

    fn restore_original(&mut self, slot: Slot) -> Result<()> {
        let entry = self.slot_mut(slot)?;
        entry.current = entry.original;
        self.writes.push(SlotWrite::Restore(slot));
        debug!(slot = %slot, "Slot restored");
        Ok(())
    }
}
