// Configuration types for bpnative, deserialized from bpnative.config.toml.

use serde::Deserialize;

/// Top-level config file.
#[derive(Deserialize)]
pub struct BpnativeConfig {
    pub nativize: NativizeConfig,
}

#[derive(Deserialize)]
pub struct NativizeConfig {
    pub paths: NativizePaths,
    #[serde(default)]
    pub options: NativizeOptions,
    #[serde(default)]
    pub blocklist: Blocklist,
}

/// All paths are resolved relative to the config file directory.
#[derive(Deserialize)]
pub struct NativizePaths {
    /// Directory holding classes.json / structs.json / enums.json / objects.json.
    pub model_input: String,
    /// Directory receiving generated .h/.cpp files.
    pub cpp_out: String,
}

#[derive(Deserialize)]
pub struct NativizeOptions {
    /// Cook-target platform filter applied to dependency records.
    #[serde(default)]
    pub platform: PlatformFilter,
    /// Allow a class whose full dependency closure is already enumerated by
    /// another converted class to delegate to that class's generated
    /// function instead of re-listing everything.
    #[serde(default = "default_true")]
    pub event_driven_loader: bool,
}

impl Default for NativizeOptions {
    fn default() -> Self {
        NativizeOptions {
            platform: PlatformFilter::None,
            event_driven_loader: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Default, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum PlatformFilter {
    #[default]
    None,
    ClientOnly,
    ServerOnly,
}

#[derive(Deserialize, Default)]
pub struct Blocklist {
    /// Class paths excluded from conversion even when marked converted in
    /// the dump.
    #[serde(default)]
    pub classes: Vec<String>,
}
