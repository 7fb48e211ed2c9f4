//! Growth-class lattice.
//!
//! A fixed, totally ordered set of asymptotic classes with table-driven
//! combination. Every combination of canonical classes lands back in the
//! canonical set; products beyond cubic saturate at `Cubic` until the
//! exponential tier takes over.
//!
//! `Unknown` sits outside the order. It is the identity for both `max`
//! and `multiply`, so a missing signal never changes a known result.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Asymptotic growth class.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum GrowthClass {
    Const,
    Log,
    Sqrt,
    Linear,
    Linearithmic,
    Quadratic,
    Cubic,
    Exponential,
    Factorial,
    #[default]
    Unknown,
}

/// The canonical classes in ascending order.
pub const CANONICAL: [GrowthClass; 9] = [
    GrowthClass::Const,
    GrowthClass::Log,
    GrowthClass::Sqrt,
    GrowthClass::Linear,
    GrowthClass::Linearithmic,
    GrowthClass::Quadratic,
    GrowthClass::Cubic,
    GrowthClass::Exponential,
    GrowthClass::Factorial,
];

/// Inputs above this are evaluated at the cap for exponential growth.
pub const EXPONENTIAL_CAP: f64 = 25.0;

/// Inputs above this are evaluated at the cap for factorial growth.
pub const FACTORIAL_CAP: f64 = 12.0;

use GrowthClass::{
    Const as C, Cubic as Cu, Exponential as E, Factorial as F, Linear as N, Linearithmic as NL,
    Log as L, Quadratic as Q, Sqrt as S,
};

/// Product table indexed by canonical position. Symmetric and monotone
/// along every row.
const MULTIPLY: [[GrowthClass; 9]; 9] = [
    //  C   L   S   N   NL  Q   Cu  E  F
    [C, L, S, N, NL, Q, Cu, E, F],          // C
    [L, S, N, NL, NL, Q, Cu, E, F],         // L
    [S, N, N, Q, Q, Cu, Cu, E, F],          // S
    [N, NL, Q, Q, Q, Cu, Cu, E, F],         // N
    [NL, NL, Q, Q, Q, Cu, Cu, E, F],        // NL
    [Q, Q, Cu, Cu, Cu, Cu, Cu, E, F],       // Q
    [Cu, Cu, Cu, Cu, Cu, Cu, Cu, E, F],     // Cu
    [E, E, E, E, E, E, E, E, F],            // E
    [F, F, F, F, F, F, F, F, F],            // F
];

/// One step toward the simpler neighbour, used for best-case estimates.
const SIMPLIFY: [GrowthClass; 9] = [C, C, L, L, N, N, Q, Cu, E];

/// One step toward the harder neighbour, used for worst-case estimates.
const COMPLICATE: [GrowthClass; 9] = [L, N, N, NL, Q, Cu, E, F, F];

impl GrowthClass {
    /// Position in the canonical order, `None` for `Unknown`.
    pub fn position(self) -> Option<usize> {
        CANONICAL.iter().position(|c| *c == self)
    }

    pub fn is_known(self) -> bool {
        self != GrowthClass::Unknown
    }

    /// Class at a canonical position, saturating at `Factorial`.
    pub fn from_position(index: usize) -> Self {
        CANONICAL[index.min(CANONICAL.len() - 1)]
    }

    /// Larger of two classes; `Unknown` is ignored.
    pub fn max(self, other: Self) -> Self {
        match (self, other) {
            (GrowthClass::Unknown, o) => o,
            (s, GrowthClass::Unknown) => s,
            (s, o) => std::cmp::max(s, o),
        }
    }

    /// Smaller of two classes; `Unknown` is ignored.
    pub fn min(self, other: Self) -> Self {
        match (self, other) {
            (GrowthClass::Unknown, o) => o,
            (s, GrowthClass::Unknown) => s,
            (s, o) => std::cmp::min(s, o),
        }
    }

    /// Cost of running `other` once per unit of `self`.
    pub fn multiply(self, other: Self) -> Self {
        match (self.position(), other.position()) {
            (Some(a), Some(b)) => MULTIPLY[a][b],
            (None, _) => other,
            (_, None) => self,
        }
    }

    pub fn simplify(self) -> Self {
        self.position().map_or(self, |p| SIMPLIFY[p])
    }

    pub fn complicate(self) -> Self {
        self.position().map_or(self, |p| COMPLICATE[p])
    }

    /// Lattice distance between two known classes.
    pub fn steps_between(self, other: Self) -> Option<usize> {
        Some(self.position()?.abs_diff(other.position()?))
    }

    /// Fold of `max` over an iterator, `Const` when empty.
    pub fn max_of(classes: impl IntoIterator<Item = GrowthClass>) -> Self {
        classes
            .into_iter()
            .fold(GrowthClass::Unknown, GrowthClass::max)
            .or_const()
    }

    fn or_const(self) -> Self {
        if self.is_known() {
            self
        } else {
            GrowthClass::Const
        }
    }

    /// Polynomial tier: quadratic and cubic.
    pub fn is_polynomial(self) -> bool {
        matches!(self, GrowthClass::Quadratic | GrowthClass::Cubic)
    }

    /// Exponential tier: exponential and factorial.
    pub fn is_exponential(self) -> bool {
        matches!(self, GrowthClass::Exponential | GrowthClass::Factorial)
    }

    /// Canonical growth function. Exponential and factorial growth are
    /// evaluated at a capped input so results stay finite.
    pub fn evaluate(self, n: f64) -> f64 {
        let n = n.max(1.0);
        match self {
            GrowthClass::Const => 1.0,
            GrowthClass::Log => n.log2(),
            GrowthClass::Sqrt => n.sqrt(),
            GrowthClass::Linear => n,
            GrowthClass::Linearithmic => n * n.log2(),
            GrowthClass::Quadratic => n * n,
            GrowthClass::Cubic => n * n * n,
            GrowthClass::Exponential => 2f64.powf(n.min(EXPONENTIAL_CAP)),
            GrowthClass::Factorial => factorial(n.min(FACTORIAL_CAP)),
            GrowthClass::Unknown => f64::NAN,
        }
    }

    /// Big-O notation label.
    pub fn notation(self) -> &'static str {
        match self {
            GrowthClass::Const => "O(1)",
            GrowthClass::Log => "O(log n)",
            GrowthClass::Sqrt => "O(sqrt n)",
            GrowthClass::Linear => "O(n)",
            GrowthClass::Linearithmic => "O(n log n)",
            GrowthClass::Quadratic => "O(n^2)",
            GrowthClass::Cubic => "O(n^3)",
            GrowthClass::Exponential => "O(2^n)",
            GrowthClass::Factorial => "O(n!)",
            GrowthClass::Unknown => "unknown",
        }
    }
}

fn factorial(n: f64) -> f64 {
    (2..=n.floor() as u64).map(|k| k as f64).product()
}

impl fmt::Display for GrowthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.notation())
    }
}

impl FromStr for GrowthClass {
    type Err = String;

    /// Normalizes free-form labels such as `O(n^2)`, `n log n` or
    /// `quadratic` into a class.
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let mut key: String = label
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '*' && *c != '·')
            .collect();
        if let Some(inner) = key
            .strip_prefix("o(")
            .or_else(|| key.strip_prefix("θ("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            key = inner.to_string();
        }

        let class = match key.as_str() {
            "1" | "c" | "const" | "constant" => GrowthClass::Const,
            "logn" | "log(n)" | "log" | "logarithmic" => GrowthClass::Log,
            "sqrtn" | "sqrt(n)" | "√n" | "n^0.5" | "sqrt" => GrowthClass::Sqrt,
            "n" | "linear" => GrowthClass::Linear,
            "nlogn" | "nlog(n)" | "linearithmic" => GrowthClass::Linearithmic,
            "n^2" | "n²" | "n2" | "quadratic" => GrowthClass::Quadratic,
            "n^3" | "n³" | "n3" | "cubic" => GrowthClass::Cubic,
            "2^n" | "exponential" | "exp" => GrowthClass::Exponential,
            "n!" | "factorial" => GrowthClass::Factorial,
            "unknown" | "?" => GrowthClass::Unknown,
            _ => return Err(format!("unrecognized growth label: {label}")),
        };
        Ok(class)
    }
}
