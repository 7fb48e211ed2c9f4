//! Recommendations and warnings attached to the final verdict.

use super::agreement::AgreementLevel;
use super::VerdictClass;
use crate::core::GrowthClass;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Advisories {
    pub recommendations: Vec<String>,
    pub warnings: Vec<String>,
}

impl Advisories {
    pub fn recommend(&mut self, message: impl Into<String>) {
        push_unique(&mut self.recommendations, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        push_unique(&mut self.warnings, message.into());
    }

    pub fn extend_warnings<I, S>(&mut self, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for message in messages {
            self.warn(message);
        }
    }
}

pub(crate) fn push_unique(list: &mut Vec<String>, message: String) {
    if !list.contains(&message) {
        list.push(message);
    }
}

/// Advisories that only make sense once every stage has been combined.
pub fn merger_advisories(verdict: &VerdictClass, agreement: AgreementLevel, out: &mut Advisories) {
    match agreement {
        AgreementLevel::Conflict => {
            out.warn(format!(
                "Structural and measured estimates conflict: {}",
                verdict.label()
            ));
            out.recommend("Review the loop bounds and recursion by hand before relying on this estimate");
        }
        AgreementLevel::Low => {
            out.warn("Low agreement between structural, pattern and measured estimates");
            out.recommend("Provide a larger or more representative snippet to sharpen the estimate");
        }
        AgreementLevel::High | AgreementLevel::Medium => {}
    }

    let upper = verdict.upper();
    if upper.is_polynomial() {
        out.recommend(format!(
            "{} growth: look for a hash-based lookup or a sort-then-scan approach",
            upper.notation()
        ));
    }
    if upper.is_exponential() {
        out.warn(format!(
            "{} growth becomes impractical beyond small inputs",
            upper.notation()
        ));
        if upper == GrowthClass::Exponential {
            out.recommend("Memoize overlapping subproblems or switch to dynamic programming");
        } else {
            out.recommend("Prune the search space or bound the input size");
        }
    }
}
