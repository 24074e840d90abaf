//! Built-in and External Module Definitions
//!
//! This module loads pin-role tables from:
//! 1. Embedded JSON files compiled into the binary (the standard kinds)
//! 2. External JSON files in a user directory (optional, user-editable)
//!
//! Users can add or replace component definitions by pointing the embedding
//! application at a directory of JSON files without recompiling.

use std::path::Path;

use super::ModuleDefinition;

// Embed the default JSON files into the binary.
const EMBEDDED_BATTERY: &str = include_str!("../../modules/battery.json");
const EMBEDDED_POWER_SUPPLY: &str = include_str!("../../modules/power_supply.json");
const EMBEDDED_RESISTOR: &str = include_str!("../../modules/resistor.json");
const EMBEDDED_LED: &str = include_str!("../../modules/led.json");
const EMBEDDED_MOTOR: &str = include_str!("../../modules/motor.json");
const EMBEDDED_MICROCONTROLLER: &str = include_str!("../../modules/microcontroller.json");

/// Get all module definitions from the embedded JSON files.
pub fn builtin_modules() -> Vec<ModuleDefinition> {
    let embedded_jsons = [
        EMBEDDED_BATTERY,
        EMBEDDED_POWER_SUPPLY,
        EMBEDDED_RESISTOR,
        EMBEDDED_LED,
        EMBEDDED_MOTOR,
        EMBEDDED_MICROCONTROLLER,
    ];

    let mut definitions = Vec::new();

    for json_str in embedded_jsons {
        match serde_json::from_str::<ModuleDefinition>(json_str) {
            Ok(def) => definitions.push(def),
            Err(e) => {
                tracing::warn!("Failed to parse embedded module definition: {}", e);
            }
        }
    }

    definitions
}

/// Load module definitions from a directory of JSON files.
/// Returns both successfully loaded definitions and any errors encountered.
pub fn load_modules_from_directory(dir: &Path) -> (Vec<ModuleDefinition>, Vec<String>) {
    let mut definitions = Vec::new();
    let mut errors = Vec::new();

    if !dir.exists() || !dir.is_dir() {
        return (definitions, errors);
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            errors.push(format!("Failed to read directory {:?}: {}", dir, e));
            return (definitions, errors);
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();

        // Skip non-JSON files and README
        if path.extension().map(|e| e != "json").unwrap_or(true) {
            continue;
        }

        match load_module_from_file(&path) {
            Ok(def) => {
                tracing::info!("Loaded module definition {} from {:?}", def.name, path.file_name());
                definitions.push(def);
            }
            Err(e) => {
                let error_msg = format!("Failed to load {:?}: {}", path.file_name(), e);
                tracing::warn!("{}", error_msg);
                errors.push(error_msg);
            }
        }
    }

    (definitions, errors)
}

/// Load a single module definition from a JSON file.
pub fn load_module_from_file(path: &Path) -> Result<ModuleDefinition, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse JSON: {}", e))
}
