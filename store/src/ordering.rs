//! Step numbering policy
//!
//! Everything here is a pure function over the current steps of one JHA.
//! The store reads the rows, asks for a plan, and applies it inside a single
//! write transaction. Nothing is cached between calls.

use shared::{MAX_STEP_NUMBER, StepId};

/// Number a step is parked on while a swap is in flight. Real numbers start at 1.
pub const PARKED_STEP_NUMBER: u32 = 0;

/// A step of the JHA being renumbered, as seen by the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sibling {
    pub id: StepId,
    pub step_number: u32,
}

/// What a renumber request turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenumberPlan {
    /// No number was requested, or it is the step's current number
    Unchanged,
    /// Nobody holds the requested number
    Move { step_id: StepId, from: u32, to: u32 },
    /// `displaced` held `to` and takes over `from`
    Swap {
        step_id: StepId,
        from: u32,
        to: u32,
        displaced: StepId,
    },
}

impl RenumberPlan {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, RenumberPlan::Unchanged)
    }
}

/// Number for a step appended to a JHA whose steps carry `existing`, or
/// `None` once the highest step already sits at [`MAX_STEP_NUMBER`].
pub fn next_step_number(existing: &[u32]) -> Option<u32> {
    existing
        .iter()
        .copied()
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .filter(|number| *number <= MAX_STEP_NUMBER)
}

/// The number a renumber request actually moves to, if it moves at all.
///
/// Returning `None` lets the caller skip the collision lookup entirely.
pub fn requested_move(current: u32, requested: Option<u32>) -> Option<u32> {
    requested.filter(|number| *number != current)
}

/// Plan moving `step` to `to` given the JHA's current steps.
///
/// `siblings` may include `step` itself; it is never treated as a holder.
pub fn plan_renumber(step: Sibling, to: u32, siblings: &[Sibling]) -> RenumberPlan {
    if step.step_number == to {
        return RenumberPlan::Unchanged;
    }

    let holder = siblings
        .iter()
        .find(|sibling| sibling.id != step.id && sibling.step_number == to);

    match holder {
        Some(holder) => RenumberPlan::Swap {
            step_id: step.id,
            from: step.step_number,
            to,
            displaced: holder.id,
        },
        None => RenumberPlan::Move {
            step_id: step.id,
            from: step.step_number,
            to,
        },
    }
}
