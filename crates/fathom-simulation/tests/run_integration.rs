use std::cell::RefCell;
use std::rc::Rc;

use fathom_core::{Actor, LevelConfig, Vec2};
use fathom_mechanics::resource::stamina_ceiling;
use fathom_simulation::{
    InputFrame, MemoryStore, NoCallbacks, RunCallbacks, RunEnd, RunRecord, RunStats, RunStore, SimConfig,
    SimEventKind, Simulation, StoreError,
};

const FRAME_MS: f64 = 1000.0 / 60.0;

/// Store handle the test keeps a second reference to.
#[derive(Debug, Clone, Default)]
struct SharedStore(Rc<RefCell<MemoryStore>>);

impl RunStore for SharedStore {
    fn load(&mut self) -> Result<RunRecord, StoreError> {
        self.0.borrow_mut().load()
    }

    fn save(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        self.0.borrow_mut().save(key, value)
    }
}

#[derive(Default)]
struct Milestones {
    completed: Vec<(u64, RunStats)>,
    game_overs: usize,
}

impl RunCallbacks for Milestones {
    fn on_level_complete(&mut self, score: u64, stats: &RunStats) {
        self.completed.push((score, *stats));
    }

    fn on_game_over(&mut self, _stats: &RunStats) {
        self.game_overs += 1;
    }
}

/// Swim in a slow figure eight, dashing now and then.
fn wandering_input(frame: u64) -> InputFrame {
    let t = frame as f32 / 90.0;
    InputFrame::steering(Vec2::new(t.cos(), (2.0 * t).sin() * 0.5), frame % 240 < 40)
}

#[test]
fn population_stays_under_the_hard_cap() {
    let level = LevelConfig::default();
    let cap = level.spawn.hard_cap();
    let mut sim = Simulation::new(level, SimConfig::default().with_seed(7), Box::new(MemoryStore::new())).unwrap();

    for frame in 1..=3_000u64 {
        let running = sim
            .tick(&wandering_input(frame), frame as f64 * FRAME_MS, &mut NoCallbacks)
            .unwrap();
        assert!(sim.state().live_count() <= cap, "frame {frame}");
        if !running {
            sim.reset_run();
        }
    }
}

#[test]
fn stamina_never_leaves_its_band() {
    let mut sim = Simulation::new(
        LevelConfig::default(),
        SimConfig::default().with_seed(11),
        Box::new(MemoryStore::new()),
    )
    .unwrap();

    for frame in 1..=1_200u64 {
        let running = sim
            .tick(&wandering_input(frame), frame as f64 * FRAME_MS, &mut NoCallbacks)
            .unwrap();
        let ocean = sim.state();
        let player = &ocean.player;
        assert!(player.vitals.stamina >= 0.0);
        assert!(player.vitals.stamina <= stamina_ceiling(player) + 1e-3);
        for fish in ocean.fish.iter().filter(|f| f.has_vitals()) {
            let vitals = fish.vitals();
            assert!(vitals.stamina >= 0.0);
            assert!(vitals.stamina <= stamina_ceiling(fish) + 1e-3);
            assert!(fish.size() >= 0.0);
        }
        if !running {
            break;
        }
    }
}

#[test]
fn level_timer_completes_the_run_and_saves_size() {
    let mut level = LevelConfig {
        duration_ms: 2_000.0,
        ..LevelConfig::default()
    };
    level.pool.retain(|t| t.class.is_prey());
    let store = SharedStore::default();
    let mut sim = Simulation::new(level, SimConfig::default(), Box::new(store.clone())).unwrap();
    let mut milestones = Milestones::default();

    let idle = InputFrame::idle();
    let mut frames = 0u64;
    loop {
        frames += 1;
        if !sim.tick(&idle, frames as f64 * FRAME_MS, &mut milestones).unwrap() {
            break;
        }
        assert!(frames < 1_000, "run never ended");
    }

    assert_eq!(sim.ended(), Some(RunEnd::LevelComplete));
    assert!(sim.clock().now_ms() >= 2_000.0);
    assert_eq!(milestones.completed.len(), 1);
    assert_eq!(milestones.game_overs, 0);
    let (score, stats) = milestones.completed[0];
    assert_eq!(score, stats.score());

    let saved = store.0.borrow().record().size;
    assert_eq!(saved, Some(stats.size));
    assert_eq!(
        sim.events().count(|k| matches!(k, SimEventKind::LevelComplete { .. })),
        1
    );
    assert!(sim.tick(&idle, (frames + 1) as f64 * FRAME_MS, &mut milestones).is_err());
}

#[test]
fn long_pause_is_clamped_to_one_step() {
    let mut sim = Simulation::new(LevelConfig::default(), SimConfig::default(), Box::new(MemoryStore::new())).unwrap();
    let idle = InputFrame::idle();
    sim.tick(&idle, 0.0, &mut NoCallbacks).unwrap();
    let before = sim.clock().now_ms();
    sim.tick(&idle, 60_000.0, &mut NoCallbacks).unwrap();
    let step = sim.clock().now_ms() - before;
    assert!((step - sim.config().max_delta_ms).abs() < 1e-9);
}

#[test]
fn essence_from_a_previous_run_is_loaded() {
    let mut record = RunRecord::default();
    record.essence.insert("abyssal".into(), 12);
    let store = MemoryStore::with_record(record);
    let sim = Simulation::new(LevelConfig::default(), SimConfig::default(), Box::new(store)).unwrap();
    assert_eq!(sim.state().total_essence(), 12);
}
