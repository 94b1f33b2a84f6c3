//! Read-only level configuration: world bounds, the creature pool, and the
//! spawn policy. Levels are plain JSON so they can be authored outside the
//! engine.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::geometry::Bounds;

/// Behavioral class of a creature template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatureClass {
    /// Tiny schooling fish.
    SmallPrey,
    /// Ordinary prey.
    Prey,
    /// Hunts smaller fish and the player.
    Predator,
    /// Top of the food chain.
    Apex,
}

impl CreatureClass {
    /// Predator-class creatures chase; everything else flees.
    pub fn is_predator(self) -> bool {
        matches!(self, Self::Predator | Self::Apex)
    }

    /// Prey-class creatures flee from larger threats.
    pub fn is_prey(self) -> bool {
        !self.is_predator()
    }
}

impl std::fmt::Display for CreatureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SmallPrey => write!(f, "small prey"),
            Self::Prey => write!(f, "prey"),
            Self::Predator => write!(f, "predator"),
            Self::Apex => write!(f, "apex"),
        }
    }
}

/// Essence a species drops when killed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssenceYield {
    /// Currency type, e.g. `"shallow"` or `"abyssal"`.
    pub essence_type: String,
    /// Total essence across all dropped essence chunks.
    pub amount: u32,
    /// Number of essence chunks to scatter.
    pub chunks: u32,
}

/// Vertical band of the world a species lives in, as fractions of the height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthBand {
    /// Shallowest fraction (0 = surface).
    pub min: f32,
    /// Deepest fraction (1 = floor).
    pub max: f32,
}

impl DepthBand {
    /// The full water column.
    pub const FULL: Self = Self { min: 0.0, max: 1.0 };

    /// Whether a depth fraction falls in this band.
    pub fn contains(&self, fraction: f32) -> bool {
        fraction >= self.min && fraction <= self.max
    }
}

impl Default for DepthBand {
    fn default() -> Self {
        Self::FULL
    }
}

/// A species definition in the spawn pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureTemplate {
    /// Species name, also used for sprite lookup by the renderer.
    pub species: String,
    /// Behavioral class.
    pub class: CreatureClass,
    /// Body length at spawn.
    pub size: f32,
    /// Cruise speed in units per second.
    pub speed: f32,
    /// Maximum health.
    pub health: f32,
    /// Base damage per bite.
    pub damage: f32,
    /// Hunger drained per second at movement factor 1.
    #[serde(default = "default_hunger_drain")]
    pub hunger_drain_rate: f32,
    /// Stamina ceiling at full hunger.
    #[serde(default = "default_base_stamina")]
    pub base_stamina: f32,
    /// Essence dropped on death.
    #[serde(default)]
    pub essence: Option<EssenceYield>,
    /// Where this species spawns.
    #[serde(default)]
    pub depth: DepthBand,
    /// How long a fish may live before despawning, as `[min, max]` ms.
    #[serde(default)]
    pub lifespan_ms: Option<[f64; 2]>,
}

fn default_hunger_drain() -> f32 {
    0.8
}

fn default_base_stamina() -> f32 {
    100.0
}

impl CreatureTemplate {
    /// Minimal template with default resources and no essence.
    pub fn new(species: impl Into<String>, class: CreatureClass, size: f32, speed: f32) -> Self {
        Self {
            species: species.into(),
            class,
            size,
            speed,
            health: (size * 1.5).max(1.0),
            damage: 8.0,
            hunger_drain_rate: default_hunger_drain(),
            base_stamina: default_base_stamina(),
            essence: None,
            depth: DepthBand::FULL,
            lifespan_ms: None,
        }
    }

    /// Set health.
    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health;
        self
    }

    /// Set bite damage.
    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    /// Set the essence drop.
    pub fn with_essence(mut self, essence_type: impl Into<String>, amount: u32, chunks: u32) -> Self {
        self.essence = Some(EssenceYield {
            essence_type: essence_type.into(),
            amount,
            chunks,
        });
        self
    }

    /// Set the depth band.
    pub fn with_depth(mut self, min: f32, max: f32) -> Self {
        self.depth = DepthBand { min, max };
        self
    }

    /// Set the lifespan window.
    pub fn with_lifespan(mut self, min_ms: f64, max_ms: f64) -> Self {
        self.lifespan_ms = Some([min_ms, max_ms]);
        self
    }
}

/// Population and respawn policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnPolicy {
    /// Population ceiling for all creatures.
    pub base_max: usize,
    /// Extra allowance usable only by small prey.
    pub small_prey_extra: usize,
    /// Minimum time between respawn attempts.
    pub respawn_interval_ms: f64,
    /// Smallest school of small prey.
    pub school_min: usize,
    /// Largest school of small prey.
    pub school_max: usize,
    /// Radius around the school anchor.
    pub school_spread: f32,
    /// No fish spawns closer than this to the player.
    pub min_player_distance: f32,
    /// Fade-in duration of a new fish.
    pub fade_in_ms: f64,
    /// Fade-out duration of a despawning fish.
    pub fade_out_ms: f64,
    /// Delay between successive members of a batch.
    pub stagger_ms: f64,
    /// Pool weight of small prey.
    pub small_prey_weight: u32,
    /// Pool weight of prey.
    pub prey_weight: u32,
    /// Pool weight of everything else.
    pub other_weight: u32,
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self {
            base_max: 14,
            small_prey_extra: 8,
            respawn_interval_ms: 1500.0,
            school_min: 2,
            school_max: 5,
            school_spread: 45.0,
            min_player_distance: 260.0,
            fade_in_ms: 800.0,
            fade_out_ms: 600.0,
            stagger_ms: 120.0,
            small_prey_weight: 4,
            prey_weight: 2,
            other_weight: 1,
        }
    }
}

impl SpawnPolicy {
    /// Absolute population ceiling.
    pub fn hard_cap(&self) -> usize {
        self.base_max + self.small_prey_extra
    }

    /// Ceiling that applies to a given class.
    pub fn cap_for(&self, class: CreatureClass) -> usize {
        match class {
            CreatureClass::SmallPrey => self.hard_cap(),
            _ => self.base_max,
        }
    }

    /// Spawn pool weight of a class.
    pub fn weight_for(&self, class: CreatureClass) -> u32 {
        match class {
            CreatureClass::SmallPrey => self.small_prey_weight,
            CreatureClass::Prey => self.prey_weight,
            CreatureClass::Predator | CreatureClass::Apex => self.other_weight,
        }
    }
}

/// Everything the simulation needs to know about a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Display name.
    pub name: String,
    /// World rectangle.
    pub bounds: Bounds,
    /// Creatures that may spawn.
    pub pool: Vec<CreatureTemplate>,
    /// Population policy.
    #[serde(default)]
    pub spawn: SpawnPolicy,
    /// Surviving this long completes the level.
    pub duration_ms: f64,
    /// Reaching this size completes the level early.
    pub target_size: f32,
    /// Player size at the start of a run.
    pub player_start_size: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            name: "Kelp Shallows".to_string(),
            bounds: Bounds::default(),
            pool: vec![
                CreatureTemplate::new("sardine", CreatureClass::SmallPrey, 12.0, 95.0)
                    .with_health(6.0)
                    .with_damage(2.0)
                    .with_depth(0.0, 0.5),
                CreatureTemplate::new("anchovy", CreatureClass::SmallPrey, 10.0, 105.0)
                    .with_health(5.0)
                    .with_damage(2.0)
                    .with_depth(0.1, 0.6),
                CreatureTemplate::new("wrasse", CreatureClass::Prey, 26.0, 80.0)
                    .with_health(30.0)
                    .with_damage(5.0)
                    .with_essence("shallow", 3, 1)
                    .with_depth(0.2, 0.8),
                CreatureTemplate::new("grouper", CreatureClass::Prey, 48.0, 60.0)
                    .with_health(70.0)
                    .with_damage(8.0)
                    .with_essence("shallow", 6, 2)
                    .with_depth(0.4, 1.0)
                    .with_lifespan(60_000.0, 120_000.0),
                CreatureTemplate::new("barracuda", CreatureClass::Predator, 55.0, 120.0)
                    .with_health(80.0)
                    .with_damage(12.0)
                    .with_essence("reef", 8, 2)
                    .with_depth(0.1, 0.7)
                    .with_lifespan(45_000.0, 90_000.0),
                CreatureTemplate::new("reef shark", CreatureClass::Apex, 120.0, 110.0)
                    .with_health(220.0)
                    .with_damage(20.0)
                    .with_essence("abyssal", 15, 3)
                    .with_depth(0.5, 1.0)
                    .with_lifespan(40_000.0, 70_000.0),
            ],
            spawn: SpawnPolicy::default(),
            duration_ms: 180_000.0,
            target_size: 150.0,
            player_start_size: 20.0,
        }
    }
}

impl LevelConfig {
    /// Parse a level from JSON and validate it.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configurations the simulation cannot run.
    pub fn validate(&self) -> CoreResult<()> {
        if self.bounds.width() <= 0.0 || self.bounds.height() <= 0.0 {
            return Err(CoreError::InvalidLevel(
                "world bounds must have positive width and height".into(),
            ));
        }
        if self.pool.is_empty() {
            return Err(CoreError::InvalidLevel("spawn pool is empty".into()));
        }
        if self.pool.iter().all(|t| self.spawn.weight_for(t.class) == 0) {
            return Err(CoreError::InvalidLevel(
                "every template in the spawn pool has weight 0".into(),
            ));
        }
        for t in &self.pool {
            if t.size <= 0.0 || t.speed < 0.0 || t.health <= 0.0 {
                return Err(CoreError::InvalidLevel(format!(
                    "template '{}' needs positive size and health",
                    t.species
                )));
            }
            if t.depth.min > t.depth.max {
                return Err(CoreError::InvalidLevel(format!(
                    "template '{}' has an inverted depth band",
                    t.species
                )));
            }
        }
        if self.spawn.school_min == 0 || self.spawn.school_min > self.spawn.school_max {
            return Err(CoreError::InvalidLevel(
                "school size range must satisfy 1 <= min <= max".into(),
            ));
        }
        if self.duration_ms <= 0.0 {
            return Err(CoreError::InvalidLevel("duration must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_is_valid() {
        LevelConfig::default().validate().unwrap();
    }

    #[test]
    fn json_roundtrip_preserves_pool() {
        let level = LevelConfig::default();
        let json = level.to_json_pretty().unwrap();
        let back = LevelConfig::from_json(&json).unwrap();
        assert_eq!(back, level);
    }

    #[test]
    fn minimal_json_uses_defaults() {
        let json = r#"{
            "name": "Tiny",
            "bounds": { "min_x": 0, "min_y": 0, "max_x": 500, "max_y": 400 },
            "pool": [
                { "species": "guppy", "class": "small_prey", "size": 8, "speed": 90,
                  "health": 4, "damage": 1 }
            ],
            "duration_ms": 60000,
            "target_size": 60,
            "player_start_size": 18
        }"#;
        let level = LevelConfig::from_json(json).unwrap();
        assert_eq!(level.spawn, SpawnPolicy::default());
        assert_eq!(level.pool[0].depth, DepthBand::FULL);
        assert!(level.pool[0].essence.is_none());
        assert!((level.pool[0].base_stamina - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_pool_rejected() {
        let level = LevelConfig {
            pool: Vec::new(),
            ..LevelConfig::default()
        };
        assert!(matches!(level.validate(), Err(CoreError::InvalidLevel(_))));
    }

    #[test]
    fn inverted_school_range_rejected() {
        let mut level = LevelConfig::default();
        level.spawn.school_min = 6;
        level.spawn.school_max = 2;
        assert!(level.validate().is_err());
    }

    #[test]
    fn caps_and_weights_per_class() {
        let policy = SpawnPolicy::default();
        assert_eq!(policy.cap_for(CreatureClass::SmallPrey), 22);
        assert_eq!(policy.cap_for(CreatureClass::Apex), 14);
        assert!(
            policy.weight_for(CreatureClass::SmallPrey) > policy.weight_for(CreatureClass::Prey)
        );
        assert_eq!(policy.weight_for(CreatureClass::Predator), 1);
    }

    #[test]
    fn class_predicates() {
        assert!(CreatureClass::Apex.is_predator());
        assert!(CreatureClass::SmallPrey.is_prey());
        assert!(!CreatureClass::Predator.is_prey());
    }
}
