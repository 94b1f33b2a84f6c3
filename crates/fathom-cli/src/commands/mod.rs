pub mod essence;
pub mod init_level;
pub mod pool;
pub mod run;

use std::fs;
use std::path::Path;

use fathom_core::LevelConfig;

/// Read and validate a level file, or fall back to the built-in level.
fn load_level(path: Option<&Path>) -> Result<LevelConfig, String> {
    let Some(path) = path else {
        return Ok(LevelConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    LevelConfig::from_json(&text).map_err(|e| format!("invalid level {}: {e}", path.display()))
}
