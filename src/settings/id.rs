//! Closed set of catalog ids

use std::fmt;
use std::str::FromStr;

use super::error::SettingsError;

/// Identity of every setting in the catalog
///
/// The string form is the persistence key and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingId {
    ForceTimetravelAnimationValue,
    Clock1BaseTime,
    Clock1Increment,
    Clock2BaseTime,
    Clock2Increment,
    Clock3BaseTime,
    Clock3Increment,
    PoolDividerLength,
}

impl SettingId {
    /// Catalog order
    pub const ALL: [SettingId; 8] = [
        SettingId::ForceTimetravelAnimationValue,
        SettingId::Clock1BaseTime,
        SettingId::Clock1Increment,
        SettingId::Clock2BaseTime,
        SettingId::Clock2Increment,
        SettingId::Clock3BaseTime,
        SettingId::Clock3Increment,
        SettingId::PoolDividerLength,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingId::ForceTimetravelAnimationValue => "ForceTimetravelAnimationValue",
            SettingId::Clock1BaseTime => "Clock1BaseTime",
            SettingId::Clock1Increment => "Clock1Increment",
            SettingId::Clock2BaseTime => "Clock2BaseTime",
            SettingId::Clock2Increment => "Clock2Increment",
            SettingId::Clock3BaseTime => "Clock3BaseTime",
            SettingId::Clock3Increment => "Clock3Increment",
            SettingId::PoolDividerLength => "PoolDividerLength",
        }
    }
}

impl fmt::Display for SettingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingId {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownKey { id: s.to_string() })
    }
}
