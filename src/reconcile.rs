//! Reconciliation pass: push registry state onto a live target
//!
//! A pass is stateless. Present overrides are written, absent ones restore
//! the slot's original value. Each setting is reconciled on its own so a
//! failing slot does not stop the rest of the pass, and nothing already
//! written is rolled back.

use anyhow::Result;
use std::str::FromStr;
use tracing::{debug, error};

use crate::constants::{animation, messages};
use crate::settings::{SettingId, SettingsError, SettingsRegistry};
use crate::target::{Slot, Target};

/// Primitive settings and the slot each one drives
const PRIMITIVE_SLOTS: [(SettingId, Slot); 7] = [
    (SettingId::Clock1BaseTime, Slot::Clock1BaseTime),
    (SettingId::Clock1Increment, Slot::Clock1Increment),
    (SettingId::Clock2BaseTime, Slot::Clock2BaseTime),
    (SettingId::Clock2Increment, Slot::Clock2Increment),
    (SettingId::Clock3BaseTime, Slot::Clock3BaseTime),
    (SettingId::Clock3Increment, Slot::Clock3Increment),
    (SettingId::PoolDividerLength, Slot::PoolDividerLength),
];

/// Tri-state of the forced timetravel animation setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceAnimation {
    Ignore,
    AlwaysOn,
    AlwaysOff,
}

impl ForceAnimation {
    /// Value to write to the animation slot, `None` leaves it untouched
    pub fn slot_value(self) -> Option<i32> {
        match self {
            ForceAnimation::Ignore => None,
            ForceAnimation::AlwaysOn => Some(1),
            ForceAnimation::AlwaysOff => Some(0),
        }
    }
}

impl FromStr for ForceAnimation {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            animation::IGNORE => Ok(ForceAnimation::Ignore),
            animation::ALWAYS_ON => Ok(ForceAnimation::AlwaysOn),
            animation::ALWAYS_OFF => Ok(ForceAnimation::AlwaysOff),
            other => Err(SettingsError::invalid(
                SettingId::ForceTimetravelAnimationValue.as_str(),
                format!("\"{other}\""),
                "not a known animation mode",
            )),
        }
    }
}

/// A setting that could not be reconciled during a pass
#[derive(Debug)]
pub struct TickFailure {
    pub setting: SettingId,
    pub error: anyhow::Error,
}

/// Outcome of one reconciliation pass
#[derive(Debug, Default)]
pub struct TickReport {
    /// True when the target was absent or invalid and nothing was attempted
    pub skipped: bool,
    /// Number of slot writes (sets and restores) applied
    pub writes: usize,
    pub failures: Vec<TickFailure>,
}

impl TickReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, setting: SettingId, outcome: Result<bool>) {
        match outcome {
            Ok(wrote) => self.writes += usize::from(wrote),
            Err(error) => {
                error!(
                    setting = %setting,
                    "{}\n{}",
                    messages::TICK_FAILED,
                    sanitize_error(&error)
                );
                self.failures.push(TickFailure { setting, error });
            }
        }
    }
}

/// Run one reconciliation pass
///
/// An absent or invalid target makes the pass a no-op.
pub fn tick<T: Target + ?Sized>(
    registry: &SettingsRegistry,
    target: Option<&mut T>,
) -> TickReport {
    let Some(target) = target.filter(|t| t.is_valid()) else {
        debug!("Target not attached, skipping settings tick");
        return TickReport::skipped();
    };

    let mut report = TickReport::default();
    report.record(
        SettingId::ForceTimetravelAnimationValue,
        apply_animation(registry, &mut *target),
    );
    for (id, slot) in PRIMITIVE_SLOTS {
        report.record(id, apply_primitive(registry, &mut *target, id, slot));
    }
    report
}

fn apply_animation<T: Target + ?Sized>(
    registry: &SettingsRegistry,
    target: &mut T,
) -> Result<bool> {
    let mode: ForceAnimation = registry
        .whitelisted(SettingId::ForceTimetravelAnimationValue)?
        .value()
        .parse()?;

    match mode.slot_value() {
        Some(value) => {
            target.set_value(Slot::TimeTravelAnimationEnabled, value)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn apply_primitive<T: Target + ?Sized>(
    registry: &SettingsRegistry,
    target: &mut T,
    id: SettingId,
    slot: Slot,
) -> Result<bool> {
    match registry.primitive(id)?.value() {
        Some(value) => target.set_value(slot, value)?,
        None => target.restore_original(slot)?,
    }
    Ok(true)
}

/// Render an error chain as printable text
///
/// Control characters other than newline and tab are dropped.
pub fn sanitize_error(error: &anyhow::Error) -> String {
    format!("{error:#}")
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}
