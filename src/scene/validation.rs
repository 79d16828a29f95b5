//! Setup checks for state machines.
//!
//! Checks use Stillwater's `Validation` so that every problem with a
//! machine's setup is reported in one pass instead of one at a time.
//! Issues are advisory: a machine with issues still runs, it just refuses
//! the transitions its setup cannot satisfy.

use crate::core::Hierarchy;
use crate::machine::{label, StateMachine};
use std::collections::{BTreeSet, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A problem with how a machine and its states are arranged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SetupIssue {
    #[error("State machine \"{machine}\" has no child states to control")]
    NoStates { machine: String },

    #[error("State machine \"{machine}\" has more than one state named \"{name}\"; only the first is reachable by name")]
    DuplicateStateName { machine: String, name: String },

    #[error("Default state {target} of state machine \"{machine}\" is not one of its states")]
    UnknownDefaultState { machine: String, target: String },
}

/// Check one machine, accumulating every issue.
pub fn validate_machine<H: Hierarchy>(
    graph: &H,
    machine: &StateMachine,
) -> Validation<(), NonEmptyVec<SetupIssue>> {
    let name = label(graph, machine.container());
    let states = machine.states(graph);
    let mut checks: Vec<Validation<(), NonEmptyVec<SetupIssue>>> = Vec::new();

    checks.push(if states.is_empty() {
        Validation::fail(SetupIssue::NoStates {
            machine: name.clone(),
        })
    } else {
        Validation::success(())
    });

    let mut seen = HashSet::new();
    let duplicates: BTreeSet<&str> = states
        .iter()
        .map(|state| state.name.as_str())
        .filter(|state| !seen.insert(*state))
        .collect();
    for duplicate in duplicates {
        checks.push(Validation::fail(SetupIssue::DuplicateStateName {
            machine: name.clone(),
            name: duplicate.to_string(),
        }));
    }

    if let Some(default) = &machine.config().default_state {
        let owned = machine
            .resolve(graph, default)
            .is_ok_and(|node| graph.parent(node) == Some(machine.container()));
        checks.push(if owned {
            Validation::success(())
        } else {
            Validation::fail(SetupIssue::UnknownDefaultState {
                machine: name.clone(),
                target: default.to_string(),
            })
        });
    }

    Validation::all_vec(checks).map(|_| ())
}

/// Check several machines, accumulating the issues of all of them.
pub fn validate_all<'a, H, I>(graph: &H, machines: I) -> Validation<(), NonEmptyVec<SetupIssue>>
where
    H: Hierarchy,
    I: IntoIterator<Item = &'a StateMachine>,
{
    let checks: Vec<Validation<(), NonEmptyVec<SetupIssue>>> = machines
        .into_iter()
        .map(|machine| validate_machine(graph, machine))
        .collect();
    Validation::all_vec(checks).map(|_| ())
}

/// Flatten a validation result into a list of issues.
pub fn issues(result: Validation<(), NonEmptyVec<SetupIssue>>) -> Vec<SetupIssue> {
    match result {
        Validation::Success(_) => Vec::new(),
        Validation::Failure(errors) => errors.iter().cloned().collect(),
    }
}
