//! Default catalog of exercises and Elite skill roadmaps.
//!
//! The catalog is compiled in, built once, and never mutated. Order is
//! significant: it defines display order, and the zero-based position of
//! an exercise within its category is the rank number shown in listings.

use crate::types::*;
use once_cell::sync::Lazy;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog of exercises
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns
/// a cached reference. This function is retained for testing and custom
/// catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

/// The complete ordered catalog of exercises
#[derive(Clone, Debug)]
pub struct Catalog {
    pub exercises: Vec<Exercise>,
}

impl Catalog {
    /// Look up an exercise by id
    pub fn find(&self, exercise_id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == exercise_id)
    }

    /// All exercises in a category, preserving catalog order
    pub fn by_category(&self, category: Category) -> Vec<&Exercise> {
        self.exercises
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen_ids = std::collections::HashSet::new();

        for exercise in &self.exercises {
            if exercise.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if exercise.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", exercise.id));
            }
            if !seen_ids.insert(exercise.id.as_str()) {
                errors.push(format!("Duplicate exercise ID '{}'", exercise.id));
            }

            match (&exercise.category, &exercise.roadmap) {
                (Category::Elite, None) => {
                    errors.push(format!("Elite exercise '{}' has no roadmap", exercise.id));
                }
                (Category::Elite, Some(roadmap)) => {
                    if roadmap.is_empty() {
                        errors.push(format!("Elite exercise '{}' has empty roadmap", exercise.id));
                    }
                    // Levels must run 1..N, strictly increasing, no gaps
                    for (i, step) in roadmap.iter().enumerate() {
                        let expected = (i + 1) as u32;
                        if step.level != expected {
                            errors.push(format!(
                                "Exercise '{}': roadmap level {} found where {} expected",
                                exercise.id, step.level, expected
                            ));
                        }
                        if step.name.is_empty() {
                            errors.push(format!(
                                "Exercise '{}': roadmap level {} has empty name",
                                exercise.id, step.level
                            ));
                        }
                    }
                }
                (_, Some(_)) => {
                    errors.push(format!(
                        "Non-Elite exercise '{}' carries a roadmap",
                        exercise.id
                    ));
                }
                (_, None) => {}
            }
        }

        // Every category must be represented
        for category in [Category::Push, Category::Pull, Category::Elite] {
            if !self.exercises.iter().any(|e| e.category == category) {
                errors.push(format!("Catalog has no {} exercises", category.label()));
            }
        }

        errors
    }
}

fn exercise(id: &str, name: &str, category: Category) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        category,
        roadmap: None,
    }
}

fn step(level: u32, name: &str, goal: &str) -> SkillLevel {
    SkillLevel {
        level,
        name: name.into(),
        goal: goal.into(),
    }
}

fn elite(id: &str, name: &str, roadmap: Vec<SkillLevel>) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        category: Category::Elite,
        roadmap: Some(roadmap),
    }
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    let exercises = vec![
        // ====================================================================
        // Push
        // ====================================================================
        exercise("push-1", "Pushups", Category::Push),
        exercise("push-2", "Diamond Pushups", Category::Push),
        exercise("push-3", "Decline Pushups", Category::Push),
        exercise("push-4", "Explosive Pushups", Category::Push),
        exercise("push-5", "Dips", Category::Push),
        exercise("push-6", "Pike Pushups", Category::Push),
        exercise("push-7", "Handstand Hold (Wall)", Category::Push),
        exercise("push-8", "Pseudo Planche Pushups", Category::Push),
        exercise("push-9", "Scapula Shrugs", Category::Push),
        exercise("push-10", "Dynamic Planche Lean", Category::Push),
        // ====================================================================
        // Pull
        // ====================================================================
        exercise("pull-1", "Australian Face Pull", Category::Pull),
        exercise("pull-2", "Supermans", Category::Pull),
        exercise("pull-3", "Chin ups", Category::Pull),
        exercise("pull-4", "Pull ups", Category::Pull),
        exercise("pull-5", "Wide Pull ups", Category::Pull),
        // ====================================================================
        // Elite Skills
        // ====================================================================
        elite(
            "elite-1",
            "Handstand",
            vec![
                step(1, "Wall Hold", "Hold 30s"),
                step(2, "Kick up to Wall", "5 reps"),
                step(3, "Freestanding Tuck Hold", "Hold 5s"),
                step(4, "Handstand", "Mastery"),
            ],
        ),
        elite(
            "elite-2",
            "Front Lever",
            vec![
                step(1, "Tuck Front Lever", "Hold 10s"),
                step(2, "Adv. Tuck Front Lever", "Hold 10s"),
                step(3, "Straddle Front Lever", "Hold 5s"),
                step(4, "Front Lever", "Mastery"),
            ],
        ),
        elite(
            "elite-3",
            "Muscle Up",
            vec![
                step(1, "High Pull-ups", "5 reps"),
                step(2, "Jumping Muscle Up", "5 reps"),
                step(3, "Negative Muscle Up", "5 reps"),
                step(4, "Muscle Up", "Mastery"),
            ],
        ),
        elite(
            "elite-4",
            "Full Planche",
            vec![
                step(1, "Tuck Planche", "Hold 10s"),
                step(2, "Adv. Tuck Planche", "Hold 10s"),
                step(3, "Straddle Planche", "Hold 5s"),
                step(4, "Full Planche", "Mastery"),
            ],
        ),
        elite(
            "elite-5",
            "Human Flag",
            vec![
                step(1, "Vertical Flag", "Hold 10s"),
                step(2, "Tucked Human Flag", "Hold 5s"),
                step(3, "Straddle Human Flag", "Hold 5s"),
                step(4, "Human Flag", "Mastery"),
            ],
        ),
    ];

    Catalog { exercises }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.exercises.len(), 20);
        assert_eq!(catalog.by_category(Category::Push).len(), 10);
        assert_eq!(catalog.by_category(Category::Pull).len(), 5);
        assert_eq!(catalog.by_category(Category::Elite).len(), 5);
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_find_by_id() {
        let catalog = build_default_catalog();
        let handstand = catalog.find("elite-1").expect("elite-1 should exist");
        assert_eq!(handstand.name, "Handstand");
        assert_eq!(handstand.roadmap_len(), 4);

        assert!(catalog.find("no-such-id").is_none());
    }

    #[test]
    fn test_category_order_preserved() {
        let catalog = build_default_catalog();
        let push = catalog.by_category(Category::Push);
        assert_eq!(push[0].id, "push-1");
        assert_eq!(push[9].id, "push-10");
    }

    #[test]
    fn test_all_elite_roadmaps_contiguous() {
        let catalog = build_default_catalog();
        for exercise in catalog.by_category(Category::Elite) {
            let roadmap = exercise.roadmap.as_ref().unwrap();
            for (i, step) in roadmap.iter().enumerate() {
                assert_eq!(step.level, (i + 1) as u32, "{}", exercise.id);
            }
        }
    }

    #[test]
    fn test_roadmap_step_lookup() {
        let catalog = build_default_catalog();
        let handstand = catalog.find("elite-1").unwrap();

        let wall_hold = handstand.roadmap_step(1).unwrap();
        assert_eq!(wall_hold.name, "Wall Hold");
        assert_eq!(wall_hold.goal, "Hold 30s");

        assert!(handstand.roadmap_step(5).is_none());
    }

    #[test]
    fn test_validate_rejects_level_gap() {
        let mut catalog = build_default_catalog();
        catalog.exercises.push(elite(
            "elite-bad",
            "Bad Skill",
            vec![step(1, "Step One", "5 reps"), step(3, "Step Three", "5 reps")],
        ));

        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("elite-bad")));
    }

    #[test]
    fn test_validate_rejects_duplicate_id() {
        let mut catalog = build_default_catalog();
        catalog
            .exercises
            .push(exercise("push-1", "Copycat Pushups", Category::Push));

        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("Duplicate")));
    }
}
