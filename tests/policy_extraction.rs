//! Integration tests for greedy policy extraction

mod common;

use std::collections::BTreeSet;

use common::{CountingEnv, two_by_two};
use gridq::{
    Error, QTable,
    adapters::{GridWorld, GridWorldConfig},
    ports::Environment,
    q_learning::{ExtractionMode, PolicyEntry, extract, extract_with_mode, train_with_config},
    pipeline::TrainingConfig,
    types::State,
};

fn trained_grid(width: usize, height: usize, seed: u64) -> (GridWorld, QTable) {
    let mut world = GridWorld::new(GridWorldConfig::new(width, height)).unwrap();
    let config = TrainingConfig::default().with_episodes(40).with_seed(seed);
    let table = train_with_config(&mut world, &config).unwrap();
    (world, table)
}

#[test]
fn test_key_set_is_full_cartesian_product() {
    let (mut world, table) = trained_grid(4, 3, 17);
    let policy = extract(&mut world, &table).unwrap();

    let keys: BTreeSet<State> = policy.states().collect();
    let expected: BTreeSet<State> = (0..4)
        .flat_map(|x| (0..3).map(move |y| State::new(x, y)))
        .collect();
    assert_eq!(keys, expected);
    assert_eq!(policy.len(), 12);
    assert!(policy.iter().all(|(_, action)| action < 4));
}

#[test]
fn test_unreachable_states_are_included() {
    let config = GridWorldConfig::new(3, 3).with_walls(vec![State::new(1, 1)]);
    let mut world = GridWorld::new(config).unwrap();
    let table = QTable::for_environment(&world, 0.5, 0.4).unwrap();
    let policy = extract(&mut world, &table).unwrap();

    assert_eq!(policy.len(), 9);
    assert_eq!(policy.action(State::new(1, 1)), Some(0));
}

#[test]
fn test_extraction_is_idempotent() {
    let (mut world, table) = trained_grid(5, 5, 23);

    world.reset().unwrap();
    let first = extract(&mut world, &table).unwrap();
    world.reset().unwrap();
    let second = extract(&mut world, &table).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_ties_resolve_to_lowest_index() {
    let mut world = two_by_two();
    let mut table = QTable::for_environment(&world, 0.5, 0.4).unwrap();
    table.set(State::new(0, 1), 0, 0.3).unwrap();
    table.set(State::new(0, 1), 1, 0.3).unwrap();
    table.set(State::new(1, 0), 1, 0.1).unwrap();

    for _ in 0..3 {
        world.reset().unwrap();
        let policy = extract(&mut world, &table).unwrap();
        assert_eq!(policy.action(State::new(0, 0)), Some(0));
        assert_eq!(policy.action(State::new(0, 1)), Some(0));
        assert_eq!(policy.action(State::new(1, 0)), Some(1));
        assert_eq!(policy.action(State::new(1, 1)), Some(0));
    }
}

#[test]
fn test_replay_steps_once_per_state() {
    let mut world = CountingEnv::new(GridWorld::new(GridWorldConfig::new(3, 4)).unwrap());
    let table = QTable::for_environment(&world, 0.5, 0.4).unwrap();

    extract(&mut world, &table).unwrap();
    assert_eq!(world.steps, 12);
    assert_eq!(world.resets, 0);
}

#[test]
fn test_table_only_never_steps() {
    let mut world = CountingEnv::new(GridWorld::new(GridWorldConfig::new(3, 4)).unwrap());
    let table = QTable::for_environment(&world, 0.5, 0.4).unwrap();

    let replayed = {
        let mut other = GridWorld::new(GridWorldConfig::new(3, 4)).unwrap();
        extract(&mut other, &table).unwrap()
    };
    let table_only = extract_with_mode(&mut world, &table, ExtractionMode::TableOnly).unwrap();

    assert_eq!(world.steps, 0);
    assert_eq!(table_only, replayed);
}

#[test]
fn test_table_for_other_environment_is_rejected() {
    let (_, table) = trained_grid(3, 3, 2);
    let mut other = GridWorld::new(GridWorldConfig::new(3, 4)).unwrap();
    assert!(matches!(
        extract(&mut other, &table),
        Err(Error::ShapeMismatch { .. })
    ));
}

#[test]
fn test_policy_export_writes_entries() {
    let (mut world, table) = trained_grid(2, 3, 4);
    let policy = extract(&mut world, &table).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("policy.json");
    policy.save(&path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let entries: Vec<PolicyEntry> = serde_json::from_str(&contents).unwrap();
    assert_eq!(entries, policy.to_entries());
    assert_eq!(entries.len(), 6);
    assert_eq!((entries[0].x, entries[0].y), (0, 0));
    assert_eq!((entries[1].x, entries[1].y), (0, 1));
}
