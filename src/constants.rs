//! Application-wide constants
//!
//! String literals shared by the settings catalog, the persisted file and
//! the reconciliation pass.

/// Settings file constants
pub mod settings {
    /// Default settings file, relative to the working directory
    pub const FILENAME: &str = "settings.json";

    /// Environment variable overriding the settings file path
    pub const PATH_ENV: &str = "FIVED_SETTINGS";
}

/// Allowed values of the forced timetravel animation setting
pub mod animation {
    /// Leave the game's own toggle alone
    pub const IGNORE: &str = "ignore";

    /// Force the animation on (slot value 1)
    pub const ALWAYS_ON: &str = "always_on";

    /// Force the animation off (slot value 0)
    pub const ALWAYS_OFF: &str = "always_off";

    pub const ALLOWED: [&str; 3] = [IGNORE, ALWAYS_ON, ALWAYS_OFF];
}

/// Tokens accepted by the editing action to clear a primitive override
pub const UNSET_TOKENS: [&str; 4] = ["", "null", "unset", "none"];

/// Observable log messages
pub mod messages {
    pub const LOADED: &str = "Settings loaded.";
    pub const SAVED: &str = "Settings saved.";
    pub const TICK_FAILED: &str = "Error while ticking settings handler:";
}
