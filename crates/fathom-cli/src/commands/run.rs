use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use fathom_simulation::{
    Combatant, MemoryStore, RunCallbacks, RunStats, RunStore, SimConfig, SimEventKind, Simulation,
};

use crate::autopilot::Autopilot;
use crate::store::JsonFileStore;

pub struct RunOptions {
    pub ticks: u64,
    pub seed: u64,
    pub fps: f64,
    pub level: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub verbose: bool,
}

/// How the run finished, as reported through the callbacks.
#[derive(Default)]
struct Outcome {
    completed: Option<u64>,
    game_over: bool,
    updates: u64,
}

impl RunCallbacks for Outcome {
    fn on_level_complete(&mut self, score: u64, _stats: &RunStats) {
        self.completed = Some(score);
    }

    fn on_game_over(&mut self, _stats: &RunStats) {
        self.game_over = true;
    }

    fn on_stats_update(&mut self, _stats: &RunStats) {
        self.updates += 1;
    }
}

pub fn run(opts: &RunOptions) -> Result<(), String> {
    if !opts.fps.is_finite() || opts.fps <= 0.0 {
        return Err(format!("fps must be positive, got {}", opts.fps));
    }
    let level = super::load_level(opts.level.as_deref())?;
    let store: Box<dyn RunStore> = match &opts.store {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };
    let config = SimConfig::default().with_seed(opts.seed).with_max_events(5_000);

    let mut sim = Simulation::new(level, config, store).map_err(|e| format!("cannot start run: {e}"))?;
    let pilot = Autopilot::new();
    let mut outcome = Outcome::default();
    let frame_ms = 1000.0 / opts.fps;

    let mut frames = 0;
    while frames < opts.ticks {
        frames += 1;
        let input = pilot.steer(sim.state());
        let running = sim
            .tick(&input, frames as f64 * frame_ms, &mut outcome)
            .map_err(|e| format!("simulation error: {e}"))?;
        if !running {
            break;
        }
    }

    let stats = sim.stats();
    println!(
        "  {} '{}' {}",
        "Run".bold(),
        sim.level().name,
        format!("({frames} frames, seed={}, fps={})", opts.seed, opts.fps).dimmed()
    );
    println!(
        "  {:.1}s survived, {} events logged, {} stat updates",
        stats.elapsed_ms / 1000.0,
        sim.events().len(),
        outcome.updates
    );
    match (outcome.completed, outcome.game_over) {
        (Some(score), _) => println!("  {} score {score}", "LEVEL COMPLETE".green().bold()),
        (None, true) => println!("  {}", "GAME OVER".red().bold()),
        (None, false) => println!("  {}", "still swimming".dimmed()),
    }
    println!();

    if opts.verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in sim.events().events() {
            let frame_label = format!("[frame {:>5}]", event.frame).dimmed();
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {frame_label} {desc}");
        }
        if sim.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    } else {
        let notable: Vec<_> = sim
            .events()
            .events()
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    SimEventKind::FishDied {
                        killer: Combatant::Player,
                        ..
                    } | SimEventKind::PersistenceFailed { .. }
                        | SimEventKind::GameOver { .. }
                        | SimEventKind::LevelComplete { .. }
                )
            })
            .collect();
        if !notable.is_empty() {
            println!("  {}", "Notable Events".bold().underline());
            for event in notable {
                let tag = match event.kind {
                    SimEventKind::FishDied { .. } => "KILL".green().bold(),
                    SimEventKind::PersistenceFailed { .. } => "WARN".yellow().bold(),
                    _ => " END".bold(),
                };
                println!("  {tag}  {}", event.description);
            }
            println!();
        }
    }

    println!("  {}", "Player".bold().underline());
    println!();
    println!("{}", stats_table(&stats));
    Ok(())
}

fn stats_table(stats: &RunStats) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Size", "Health", "Hunger", "Stamina", "Kills", "Meat", "Essence", "Fish", "Score"]);
    table.add_row(vec![
        format!("{:.1}", stats.size),
        format!("{:.0}/{:.0}", stats.health, stats.max_health),
        format_bar(stats.hunger / 100.0),
        format!("{:.0}/{:.0}", stats.stamina, stats.stamina_ceiling),
        stats.kills.to_string(),
        stats.meat_collected.to_string(),
        stats.essence_collected.to_string(),
        stats.fish_alive.to_string(),
        stats.score().to_string(),
    ]);
    table
}

fn format_bar(fraction: f32) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * 10.0).round() as usize;
    let bar = format!("{}{}", "#".repeat(filled), ".".repeat(10 - filled));
    if fraction < 0.25 {
        bar.red().to_string()
    } else if fraction < 0.5 {
        bar.yellow().to_string()
    } else {
        bar.green().to_string()
    }
}

fn colorize_event(kind: &SimEventKind, desc: &str) -> String {
    match kind {
        SimEventKind::FishDied { .. } | SimEventKind::GameOver { .. } => desc.red().to_string(),
        SimEventKind::DamageDealt { .. } | SimEventKind::BloodBurst { .. } => desc.yellow().to_string(),
        SimEventKind::ChunksCollected { .. } | SimEventKind::LevelComplete { .. } => {
            desc.green().to_string()
        }
        SimEventKind::PersistenceFailed { .. } => desc.yellow().bold().to_string(),
        SimEventKind::FishSpawned { .. } | SimEventKind::FishDespawned { .. } => desc.dimmed().to_string(),
        _ => desc.to_string(),
    }
}
