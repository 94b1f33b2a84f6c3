use std::fs;
use std::path::Path;

use fathom_core::LevelConfig;

pub fn run(path: &Path, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "'{}' already exists (use --force to overwrite)",
            path.display()
        ));
    }

    let level = LevelConfig::default();
    let json = level
        .to_json_pretty()
        .map_err(|e| format!("cannot serialize level: {e}"))?;
    fs::write(path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))?;

    println!("Wrote level '{}' to {}", level.name, path.display());
    println!("  {} species, {:.0}s, target size {}", level.pool.len(), level.duration_ms / 1000.0, level.target_size);
    println!();
    println!("Try it:");
    println!("  fathom run --level {}", path.display());
    Ok(())
}
