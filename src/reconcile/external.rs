//! Slot for an opinion obtained outside the pipeline.
//!
//! The pipeline never produces or waits for one; a caller that has an
//! independent estimate can fold it into a finished verdict here.

use super::{FinalVerdict, VerdictClass};
use crate::core::GrowthClass;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalOpinion {
    /// Who produced the opinion
    pub source: String,
    pub time_class: GrowthClass,
    pub confidence: f64,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalMergePolicy {
    /// Record the opinion, change nothing else
    KeepCore,
    /// Adopt the external class when its confidence reaches the threshold
    /// and beats the core confidence
    PreferExternalWhenConfident(f64),
    /// Average the confidences; the more confident class wins
    Average,
}

impl FinalVerdict {
    pub fn merge_external(mut self, opinion: ExternalOpinion, policy: ExternalMergePolicy) -> Self {
        let agrees = self.time.contains(opinion.time_class);
        let confidence = opinion.confidence.clamp(0.0, 1.0);

        match policy {
            ExternalMergePolicy::KeepCore => {}
            ExternalMergePolicy::PreferExternalWhenConfident(threshold) => {
                if confidence >= threshold && confidence > self.confidence {
                    self.adopt(&opinion, confidence);
                }
            }
            ExternalMergePolicy::Average => {
                let averaged = (self.confidence + confidence) / 2.0;
                if confidence > self.confidence && opinion.time_class.is_known() {
                    self.adopt(&opinion, averaged);
                } else {
                    self.confidence = averaged;
                    self.stages.combined = averaged;
                }
            }
        }

        if !agrees {
            self.warn(format!(
                "External opinion from {} suggests {}",
                opinion.source,
                opinion.time_class.notation()
            ));
        }
        self.external = Some(opinion);
        self
    }

    fn adopt(&mut self, opinion: &ExternalOpinion, confidence: f64) {
        self.time = VerdictClass::Exact(opinion.time_class);
        self.lower_bound = opinion.time_class;
        self.upper_bound = opinion.time_class;
        self.range_label = None;
        self.confidence = confidence;
        self.stages.combined = confidence;
        self.recommend(format!("Adopted the time class suggested by {}", opinion.source));
    }
}
