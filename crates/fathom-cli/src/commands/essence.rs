use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use fathom_simulation::RunStore;

use crate::store::JsonFileStore;

pub fn run(path: &Path) -> Result<(), String> {
    let mut store = JsonFileStore::new(path);
    let record = store
        .load()
        .map_err(|e| format!("cannot read run record: {e}"))?;

    println!("  {} {}", "Run record".bold(), store.path().display().to_string().dimmed());
    if let Ok(Some(at)) = store.saved_at() {
        println!("  Last saved {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(size) = record.size {
        println!("  Last finish at size {size:.1}");
    }
    println!();

    if record.essence.is_empty() {
        println!("  {}", "(no essence collected yet)".dimmed());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Essence", "Amount"]);
    for (kind, amount) in &record.essence {
        table.add_row(vec![kind.clone(), amount.to_string()]);
    }
    table.add_row(vec!["total".bold().to_string(), record.total_essence().to_string()]);
    println!("{table}");
    Ok(())
}
