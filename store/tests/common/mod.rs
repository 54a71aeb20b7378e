//! Common test utilities for store tests

#![allow(dead_code)]

use shared::{HazardId, JhaId, NewHazard, NewJha, NewStep, StepId};
use store::{SqliteStore, StoreConfig};
use std::path::Path;
use std::time::Duration;

/// Standard test data
pub struct TestFixtures;

impl TestFixtures {
    pub fn new_jha(title: &str) -> NewJha {
        NewJha {
            title: title.to_string(),
            author: "J. Alvarez".to_string(),
            job_description: "Replace the rooftop HVAC unit".to_string(),
            job_location: "Warehouse 4".to_string(),
        }
    }

    pub fn new_step(description: &str) -> NewStep {
        NewStep { step_description: description.to_string() }
    }

    pub fn new_hazard(description: &str, controls: &str) -> NewHazard {
        NewHazard {
            description: description.to_string(),
            controls: controls.to_string(),
        }
    }
}

/// Store helpers to cut down test boilerplate
pub struct TestHelpers;

impl TestHelpers {
    pub fn memory_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    pub fn file_store(path: &Path) -> SqliteStore {
        let config = StoreConfig::file(path)
            .with_busy_timeout(Duration::from_secs(10))
            .with_max_retries(5);
        SqliteStore::open(config).unwrap()
    }

    /// A JHA with `count` steps numbered 1..=count
    pub fn jha_with_steps(store: &mut SqliteStore, count: usize) -> (JhaId, Vec<StepId>) {
        let jha = store.create_jha(&TestFixtures::new_jha("Rooftop HVAC swap")).unwrap();
        let steps = (1..=count)
            .map(|i| {
                store
                    .append_step(jha.id, &TestFixtures::new_step(&format!("Step {i}")))
                    .unwrap()
                    .id
            })
            .collect();
        (jha.id, steps)
    }

    pub fn add_hazards(store: &mut SqliteStore, step_id: StepId, count: usize) -> Vec<HazardId> {
        (0..count)
            .map(|i| {
                store
                    .create_hazard(
                        step_id,
                        &TestFixtures::new_hazard(&format!("Hazard {i}"), "PPE"),
                    )
                    .unwrap()
                    .id
            })
            .collect()
    }

    /// Step numbers of a JHA in display order
    pub fn numbers(store: &mut SqliteStore, jha_id: JhaId) -> Vec<u32> {
        store
            .get_jha(jha_id)
            .unwrap()
            .steps
            .iter()
            .map(|detail| detail.step.step_number)
            .collect()
    }

    pub fn number_of(store: &mut SqliteStore, step_id: StepId) -> u32 {
        store.get_step(step_id).unwrap().step.step_number
    }

    pub fn assert_unique(numbers: &[u32]) {
        let mut sorted = numbers.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), numbers.len(), "duplicate step numbers in {numbers:?}");
    }
}
