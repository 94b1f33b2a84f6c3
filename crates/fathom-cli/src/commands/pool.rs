use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use fathom_core::CreatureClass;

pub fn run(level: Option<&Path>) -> Result<(), String> {
    let level = super::load_level(level)?;
    let policy = &level.spawn;

    println!(
        "  {} '{}' {}",
        "Level".bold(),
        level.name,
        format!(
            "({:.0}x{:.0}, up to {} fish)",
            level.bounds.width(),
            level.bounds.height(),
            policy.hard_cap()
        )
        .dimmed()
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Species", "Class", "Size", "Speed", "Health", "Damage", "Depth", "Essence", "Weight",
    ]);

    for t in &level.pool {
        let essence = t
            .essence
            .as_ref()
            .map(|e| format!("{} {} ({} chunks)", e.amount, e.essence_type, e.chunks))
            .unwrap_or_else(|| "--".to_string());
        table.add_row(vec![
            t.species.clone(),
            class_label(t.class),
            format!("{:.0}", t.size),
            format!("{:.0}", t.speed),
            format!("{:.0}", t.health),
            format!("{:.0}", t.damage),
            format!("{:.0}%-{:.0}%", t.depth.min * 100.0, t.depth.max * 100.0),
            essence,
            policy.weight_for(t.class).to_string(),
        ]);
    }

    println!("{table}");
    Ok(())
}

fn class_label(class: CreatureClass) -> String {
    let label = match class {
        CreatureClass::SmallPrey => "small prey".green(),
        CreatureClass::Prey => "prey".cyan(),
        CreatureClass::Predator => "predator".yellow(),
        CreatureClass::Apex => "apex".red().bold(),
    };
    label.to_string()
}
