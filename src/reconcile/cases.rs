//! Best, average and worst case estimates.

use crate::complexity::CodeShape;
use crate::core::{CaseSplit, GrowthClass};
use crate::patterns::{case_split_for, RecursionKind};

/// Case split for the final class. A recognised algorithm uses its fixed
/// table; recursive code keeps one class for every case except linear
/// recursion that can stop early; anything else moves one lattice step
/// for early exits (best) and unbounded loops (worst).
pub fn case_split(time: GrowthClass, pattern: Option<&str>, shape: &CodeShape) -> CaseSplit {
    if let Some(split) = pattern.and_then(case_split_for) {
        return split;
    }

    match shape.recursion {
        Some(RecursionKind::Linear) if shape.branching => {
            CaseSplit::new(GrowthClass::Const, time, time)
        }
        Some(RecursionKind::DivideAndConquer | RecursionKind::BinaryTree | RecursionKind::Linear) => {
            CaseSplit::uniform(time)
        }
        _ => {
            let best = if shape.early_exit { time.simplify() } else { time };
            let worst = if shape.unbounded_loop { time.complicate() } else { time };
            CaseSplit::new(best, time, worst)
        }
    }
}
