//! Settings registry: the fixed catalog, JSON overlay and persistence

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::error::SettingsError;
use super::id::SettingId;
use super::value::{PrimitiveValue, Setting, SettingValue, WhitelistedValue};
use crate::constants::{animation, messages};

/// What to do with a persisted key that is not in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeyPolicy {
    /// Fail the whole load with `UnknownKey`
    #[default]
    Reject,
    /// Log a warning and ignore the key
    Skip,
}

/// Owns every catalog setting, in catalog order
///
/// The set of ids is fixed at construction; `settings[id as usize]` always
/// holds the setting for `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsRegistry {
    settings: Vec<Setting>,
}

impl SettingsRegistry {
    /// Build the catalog with default values
    pub fn build_default() -> Self {
        let force_animation = WhitelistedValue::new(
            SettingId::ForceTimetravelAnimationValue,
            &animation::ALLOWED,
            animation::IGNORE,
        );

        let clock = |id: SettingId, name: &'static str, description: &'static str| {
            Setting::new(id, name, description, SettingValue::Primitive(PrimitiveValue::new(None)))
        };

        let settings = vec![
            Setting::new(
                SettingId::ForceTimetravelAnimationValue,
                "Force timetravel animation value",
                "Whether or not to force the timetravel button to a certain state",
                SettingValue::Whitelisted(force_animation),
            ),
            clock(
                SettingId::Clock1BaseTime,
                "Short Timer Base Time",
                "The base time of the first clock in total seconds",
            ),
            clock(
                SettingId::Clock1Increment,
                "Short Timer Increment",
                "The increment of the first clock in seconds",
            ),
            clock(
                SettingId::Clock2BaseTime,
                "Medium Timer Base Time",
                "The base time of the second clock in total seconds",
            ),
            clock(
                SettingId::Clock2Increment,
                "Medium Timer Increment",
                "The increment of the second clock in seconds",
            ),
            clock(
                SettingId::Clock3BaseTime,
                "Long Timer Base Time",
                "The base time of the third clock in total seconds",
            ),
            clock(
                SettingId::Clock3Increment,
                "Long Timer Increment",
                "The increment of the third clock in seconds",
            ),
            clock(
                SettingId::PoolDividerLength,
                "Pool Divider Length",
                "The length of the pool divider in meters",
            ),
        ];

        debug_assert!(settings.iter().zip(SettingId::ALL).all(|(s, id)| s.id() == id));

        Self { settings }
    }

    /// Build defaults, then overlay the file at `path` if it exists
    pub fn load_or_create(path: &Path, policy: UnknownKeyPolicy) -> Result<Self, SettingsError> {
        let mut registry = Self::build_default();

        if !path.exists() {
            debug!(path = %path.display(), "No settings file found, using defaults");
            return Ok(registry);
        }

        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Map<String, Value> =
            serde_json::from_str(&contents).map_err(|source| SettingsError::MalformedDocument {
                path: path.to_path_buf(),
                source,
            })?;

        registry.apply_overlay(&document, policy)?;
        info!(path = %path.display(), "{}", messages::LOADED);
        Ok(registry)
    }

    /// Apply persisted values on top of the current ones
    pub fn apply_overlay(
        &mut self,
        document: &Map<String, Value>,
        policy: UnknownKeyPolicy,
    ) -> Result<(), SettingsError> {
        for (key, token) in document {
            let setting = match self.get_mut(key) {
                Ok(setting) => setting,
                Err(SettingsError::UnknownKey { .. }) if policy == UnknownKeyPolicy::Skip => {
                    warn!(key = %key, "Ignoring unknown key in settings file");
                    continue;
                }
                Err(e) => return Err(e),
            };
            setting.set_from_external(token)?;
        }
        Ok(())
    }

    /// Overwrite `path` with the full catalog as indented JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source: std::io::Error| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| io_err(e.into()))?;
        fs::write(path, json).map_err(io_err)?;

        info!(path = %path.display(), "{}", messages::SAVED);
        Ok(())
    }

    /// Every setting, in catalog order
    pub fn get_all(&self) -> &[Setting] {
        &self.settings
    }

    /// Look up a setting by its persistence key
    pub fn get(&self, id: &str) -> Result<&Setting, SettingsError> {
        let id: SettingId = id.parse()?;
        Ok(self.setting(id))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Setting, SettingsError> {
        let id: SettingId = id.parse()?;
        Ok(&mut self.settings[id as usize])
    }

    pub fn setting(&self, id: SettingId) -> &Setting {
        &self.settings[id as usize]
    }

    pub fn whitelisted(&self, id: SettingId) -> Result<&WhitelistedValue, SettingsError> {
        match self.setting(id).value() {
            SettingValue::Whitelisted(w) => Ok(w),
            _ => Err(SettingsError::KindMismatch {
                id: id.to_string(),
                expected: "whitelisted",
            }),
        }
    }

    pub fn primitive(&self, id: SettingId) -> Result<&PrimitiveValue, SettingsError> {
        match self.setting(id).value() {
            SettingValue::Primitive(p) => Ok(p),
            _ => Err(SettingsError::KindMismatch {
                id: id.to_string(),
                expected: "primitive",
            }),
        }
    }

    /// Editing action: set a setting from user-typed text
    pub fn set_from_input(&mut self, id: &str, input: &str) -> Result<(), SettingsError> {
        let setting = self.get_mut(id)?;
        setting.set_from_input(input)?;
        info!(setting = %setting.id(), value = %setting.value(), "Setting updated");
        Ok(())
    }

    pub fn reset(&mut self, id: &str) -> Result<(), SettingsError> {
        self.get_mut(id)?.reset();
        Ok(())
    }

    pub fn reset_all(&mut self) {
        self.settings.iter_mut().for_each(Setting::reset);
    }
}

/// Serializes as `{ id: value, .. }` in catalog order
impl Serialize for SettingsRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.settings.len()))?;
        for setting in &self.settings {
            map.serialize_entry(setting.id().as_str(), &setting.get_serializable())?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::test_log::capture;
    use tempfile::TempDir;

    fn write_settings(dir: &TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("settings.json");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_build_default_catalog() {
        let registry = SettingsRegistry::build_default();
        let ids: Vec<_> = registry.get_all().iter().map(|s| s.id()).collect();
        assert_eq!(ids, SettingId::ALL.to_vec());

        assert_eq!(
            registry
                .whitelisted(SettingId::ForceTimetravelAnimationValue)
                .unwrap()
                .value(),
            "ignore"
        );
        for id in &SettingId::ALL[1..] {
            assert_eq!(registry.primitive(*id).unwrap().value(), None, "{id}");
        }
    }

    #[test]
    fn test_setting_index_matches_id() {
        let registry = SettingsRegistry::build_default();
        for id in SettingId::ALL {
            assert_eq!(registry.setting(id).id(), id);
        }
    }

    #[test]
    fn test_get_unknown_id() {
        let registry = SettingsRegistry::build_default();
        assert!(matches!(
            registry.get("Unknown"),
            Err(SettingsError::UnknownKey { ref id }) if id == "Unknown"
        ));
        assert!(registry.get("Clock2Increment").is_ok());
    }

    #[test]
    fn test_kind_mismatch() {
        let registry = SettingsRegistry::build_default();
        assert!(matches!(
            registry.primitive(SettingId::ForceTimetravelAnimationValue),
            Err(SettingsError::KindMismatch { expected: "primitive", .. })
        ));
        assert!(matches!(
            registry.whitelisted(SettingId::PoolDividerLength),
            Err(SettingsError::KindMismatch { expected: "whitelisted", .. })
        ));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let registry = SettingsRegistry::load_or_create(&path, UnknownKeyPolicy::Reject).unwrap();
        assert_eq!(registry, SettingsRegistry::build_default());
        assert!(!path.exists());
    }

    #[test]
    fn test_save_writes_null_for_unset_and_load_keeps_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        SettingsRegistry::build_default().save(&path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"Clock1BaseTime\": null"), "{contents}");

        let loaded = SettingsRegistry::load_or_create(&path, UnknownKeyPolicy::Reject).unwrap();
        assert_eq!(loaded.primitive(SettingId::Clock1BaseTime).unwrap().value(), None);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let mut registry = SettingsRegistry::build_default();
        registry
            .set_from_input("ForceTimetravelAnimationValue", "always_off")
            .unwrap();
        registry.set_from_input("Clock1BaseTime", "600").unwrap();
        registry.set_from_input("Clock3Increment", "-5").unwrap();
        registry.set_from_input("PoolDividerLength", "0").unwrap();
        registry.save(&path).unwrap();

        let loaded = SettingsRegistry::load_or_create(&path, UnknownKeyPolicy::Reject).unwrap();
        for (saved, read) in registry.get_all().iter().zip(loaded.get_all()) {
            assert_eq!(saved.get_serializable(), read.get_serializable(), "{}", saved.id());
        }
    }

    #[test]
    fn test_save_is_indented_in_catalog_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        SettingsRegistry::build_default().save(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("{\n  \"ForceTimetravelAnimationValue\": \"ignore\""));

        let positions: Vec<_> = SettingId::ALL
            .iter()
            .map(|id| contents.find(id.as_str()).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, "{\"Clock1BaseTime\": 1, \"stale\": true}");

        SettingsRegistry::build_default().save(&path).unwrap();
        let document: Map<String, Value> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(document.len(), SettingId::ALL.len());
        assert_eq!(document["Clock1BaseTime"], Value::Null);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        SettingsRegistry::build_default().save(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_overlay_single_key_leaves_others_default() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, r#"{"ForceTimetravelAnimationValue": "always_on"}"#);

        let registry = SettingsRegistry::load_or_create(&path, UnknownKeyPolicy::Reject).unwrap();
        assert_eq!(
            registry.get("ForceTimetravelAnimationValue").unwrap().get_serializable(),
            json!("always_on")
        );

        let defaults = SettingsRegistry::build_default();
        for setting in &registry.get_all()[1..] {
            assert_eq!(
                setting.get_serializable(),
                defaults.setting(setting.id()).get_serializable()
            );
        }
    }

    #[test]
    fn test_overlay_unknown_key_is_fatal_by_default() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, r#"{"Clock1BaseTime": 5, "Unknown": 1}"#);

        let err = SettingsRegistry::load_or_create(&path, UnknownKeyPolicy::Reject).unwrap_err();
        assert!(matches!(err, SettingsError::UnknownKey { ref id } if id == "Unknown"));
    }

    #[test]
    fn test_overlay_unknown_key_skipped_when_tolerant() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, r#"{"Unknown": 1, "Clock2BaseTime": 180}"#);

        let registry = SettingsRegistry::load_or_create(&path, UnknownKeyPolicy::Skip).unwrap();
        assert_eq!(registry.primitive(SettingId::Clock2BaseTime).unwrap().value(), Some(180));
    }

    #[test]
    fn test_overlay_invalid_whitelisted_value() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, r#"{"ForceTimetravelAnimationValue": "sometimes"}"#);

        let err = SettingsRegistry::load_or_create(&path, UnknownKeyPolicy::Skip).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
    }

    #[test]
    fn test_malformed_document() {
        let dir = TempDir::new().unwrap();
        for contents in ["{not json", "[1, 2]", "\"text\""] {
            let path = write_settings(&dir, contents);
            let err =
                SettingsRegistry::load_or_create(&path, UnknownKeyPolicy::Reject).unwrap_err();
            assert!(matches!(err, SettingsError::MalformedDocument { .. }), "{contents}");
        }
    }

    #[test]
    fn test_reset_and_reset_all() {
        let mut registry = SettingsRegistry::build_default();
        registry.set_from_input("Clock1BaseTime", "10").unwrap();
        registry.set_from_input("Clock2BaseTime", "20").unwrap();

        registry.reset("Clock1BaseTime").unwrap();
        assert_eq!(registry.primitive(SettingId::Clock1BaseTime).unwrap().value(), None);
        assert_eq!(registry.primitive(SettingId::Clock2BaseTime).unwrap().value(), Some(20));

        registry.reset_all();
        assert_eq!(registry, SettingsRegistry::build_default());
        assert!(registry.reset("Nope").is_err());
    }

    #[test]
    fn test_load_and_save_log_their_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let (saved, output) = capture(|| SettingsRegistry::build_default().save(&path));
        saved.unwrap();
        assert!(output.contains("Settings saved."), "{output}");

        let (loaded, output) =
            capture(|| SettingsRegistry::load_or_create(&path, UnknownKeyPolicy::Reject));
        loaded.unwrap();
        assert!(output.contains("Settings loaded."), "{output}");
    }

    #[test]
    fn test_load_without_file_does_not_log_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let (loaded, output) =
            capture(|| SettingsRegistry::load_or_create(&path, UnknownKeyPolicy::Reject));
        loaded.unwrap();
        assert!(!output.contains("Settings loaded."), "{output}");
    }
}
