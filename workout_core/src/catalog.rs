//! Built-in workout plans and plan file loading.
//!
//! Plans are either picked from the default catalog by name or read from a
//! TOML file:
//!
//! ```toml
//! name = "upper a"
//!
//! [[exercises]]
//! name = "Bench Press"
//! target_sets = 3
//! target_reps = 5
//! rest_seconds = 120
//! ```

use crate::session::validate_plan;
use crate::{Error, PlannedExercise, Result, WorkoutPlan};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::path::Path;

/// A named collection of workout plans
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub plans: BTreeMap<String, WorkoutPlan>,
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with the built-in plans
pub fn build_default_catalog() -> Catalog {
    let mut catalog = Catalog::default();

    catalog.insert(WorkoutPlan {
        name: "push".into(),
        exercises: vec![
            PlannedExercise::new("Bench Press", 3, 5, 150),
            PlannedExercise::new("Overhead Press", 3, 8, 120),
            PlannedExercise::new("Incline Dumbbell Press", 3, 10, 90),
            PlannedExercise::new("Triceps Pushdown", 3, 12, 60),
        ],
    });

    catalog.insert(WorkoutPlan {
        name: "pull".into(),
        exercises: vec![
            PlannedExercise::new("Deadlift", 3, 5, 180),
            PlannedExercise::new("Pull-up", 3, 8, 120),
            PlannedExercise::new("Barbell Row", 3, 8, 90),
            PlannedExercise::new("Biceps Curl", 3, 12, 60),
        ],
    });

    catalog.insert(WorkoutPlan {
        name: "legs".into(),
        exercises: vec![
            PlannedExercise::new("Back Squat", 4, 5, 180),
            PlannedExercise::new("Romanian Deadlift", 3, 8, 120),
            PlannedExercise::new("Walking Lunge", 3, 12, 90),
            PlannedExercise::new("Calf Raise", 3, 15, 45),
        ],
    });

    catalog.insert(WorkoutPlan {
        name: "conditioning".into(),
        exercises: vec![
            PlannedExercise::new("Kettlebell Swing", 5, 15, 30),
            PlannedExercise::new("Burpee", 3, 10, 0),
            PlannedExercise::new("Plank", 1, 1, 0),
        ],
    });

    catalog
}

impl Catalog {
    pub fn insert(&mut self, plan: WorkoutPlan) {
        self.plans.insert(plan.name.to_lowercase(), plan);
    }

    /// Look up a plan by name, ignoring case
    pub fn get(&self, name: &str) -> Option<&WorkoutPlan> {
        self.plans.get(&name.trim().to_lowercase())
    }

    /// Look up a plan or report the known names
    pub fn require(&self, name: &str) -> Result<&WorkoutPlan> {
        self.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.plans.keys().map(String::as_str).collect();
            Error::Catalog(format!(
                "Unknown plan '{}'. Available: {}",
                name,
                known.join(", ")
            ))
        })
    }

    /// Validate every plan, returning one message per problem
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.plans.is_empty() {
            errors.push("Catalog has no plans".to_string());
        }

        for (key, plan) in &self.plans {
            if let Err(e) = validate_plan(plan) {
                errors.push(format!("Plan '{}': {}", key, e));
            }
        }

        errors
    }
}

/// Load a plan from a TOML file and validate it
pub fn load_plan(path: &Path) -> Result<WorkoutPlan> {
    let contents = std::fs::read_to_string(path)?;
    let plan: WorkoutPlan = toml::from_str(&contents)?;
    validate_plan(&plan)?;
    tracing::info!("Loaded plan '{}' from {:?}", plan.name, path);
    Ok(plan)
}
