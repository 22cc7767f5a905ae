use std::collections::BTreeMap;
use std::fmt::Display;
use serde::{Serialize, Deserialize};
use crate::inspection::inference_manager::InferenceError;
use crate::inspection::utils::analysis_report::AnalysisReport;
use crate::inspection::utils::bounding_box::BoundingBox;
use crate::inspection::utils::contamination::{estimate_contamination, CfuFormula};
use crate::inspection::utils::count_map::CountMap;
use crate::inspection::utils::detection_class;
use crate::inspection::utils::verdict::{classify_contamination, classify_surface, ContaminationVerdict, SurfaceThresholds};

///Display-only per-ml scaling applied to residue counts in dual-capture
///reports; unrelated to the CFU formulas.
pub const RESIDUE_LEVEL_SCALE: u64 = 1000;

///Deployment selector read from the configuration file.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    Single,
    Dual,
}

///One deployment's complete decision parameters. Each variant carries its own
///thresholds and CFU formula; adding a deployment means adding a variant and
///a constructor, not editing the classifiers.
#[derive(Debug, Clone, PartialEq)]
pub enum InspectionProfile {
    SingleCapture {
        thresholds: SurfaceThresholds,
        formula: CfuFormula,
    },
    DualCapture {
        formula: CfuFormula,
    },
}

#[derive(Debug)]
pub enum AnalysisError {
    ImageCountMismatch { required: usize, supplied: usize },
    Inference(InferenceError),
    Annotation(String),
}

impl Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::ImageCountMismatch { required, supplied: 0 } => {
                let noun = if *required == 1 { "image" } else { "images" };
                write!(f, "Please capture {required} {noun} to run the inspection.")
            },
            AnalysisError::ImageCountMismatch { required, supplied } => {
                let noun = if *required == 1 { "image is" } else { "images are" };
                write!(f, "Exactly {required} {noun} required, {supplied} were supplied.")
            },
            AnalysisError::Inference(err) => write!(f, "Detection failed. {err}"),
            AnalysisError::Annotation(err) => write!(f, "{err}"),
        }
    }
}

impl From<InferenceError> for AnalysisError {
    fn from(err: InferenceError) -> Self {
        AnalysisError::Inference(err)
    }
}

impl InspectionProfile {
    pub fn single_capture() -> Self {
        Self::SingleCapture {
            thresholds: SurfaceThresholds::default_table(),
            formula: CfuFormula::ThirdOfOrganisms,
        }
    }

    pub fn dual_capture() -> Self {
        Self::DualCapture {
            formula: CfuFormula::FractionOfOrganisms(0.09),
        }
    }

    pub fn from_capture_mode(mode: CaptureMode) -> Self {
        match mode {
            CaptureMode::Single => Self::single_capture(),
            CaptureMode::Dual => Self::dual_capture(),
        }
    }

    pub fn required_images(&self) -> usize {
        match self {
            InspectionProfile::SingleCapture { .. } => 1,
            InspectionProfile::DualCapture { .. } => 2,
        }
    }

    ///Cardinality is checked before anything else; a wrong image count never
    ///produces a verdict.
    pub fn analyze(&self, detections_per_image: &[Vec<BoundingBox>]) -> Result<AnalysisReport, AnalysisError> {
        let required = self.required_images();
        let supplied = detections_per_image.len();
        if supplied != required {
            return Err(AnalysisError::ImageCountMismatch { required, supplied });
        }
        let counts = CountMap::from_detections(detections_per_image);
        let report = match self {
            InspectionProfile::SingleCapture { thresholds, formula } => {
                let estimate = estimate_contamination(counts.count(detection_class::BACTERIA), formula);
                let verdict = classify_surface(&counts, thresholds);
                AnalysisReport::Surface { counts, estimate, verdict }
            },
            InspectionProfile::DualCapture { formula } => {
                let estimate = estimate_contamination(counts.count(detection_class::BACTERIA), formula);
                let verdict = classify_contamination(&counts);
                let residue_levels = match verdict {
                    ContaminationVerdict::ResidueDetected => Self::residue_levels(&counts),
                    _ => BTreeMap::new(),
                };
                AnalysisReport::Contamination { counts, estimate, residue_levels, verdict }
            },
        };
        Ok(report)
    }

    fn residue_levels(counts: &CountMap) -> BTreeMap<String, u64> {
        let mut levels = BTreeMap::new();
        for label in [detection_class::MILK_RESIDUES, detection_class::DEBRIS] {
            let count = counts.count(label);
            if count > 0 {
                levels.insert(label.to_string(), count as u64 * RESIDUE_LEVEL_SCALE);
            }
        }
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::utils::contamination::CfuValue;
    use crate::inspection::utils::verdict::SurfaceVerdict;

    fn detections(labels: &[&str]) -> Vec<BoundingBox> {
        labels
            .iter()
            .map(|label| BoundingBox {
                xmin: 0,
                xmax: 10,
                ymin: 0,
                ymax: 10,
                name: label.to_string(),
                confidence: 0.8,
            })
            .collect()
    }

    #[test]
    fn single_capture_requires_exactly_one_image() {
        let profile = InspectionProfile::single_capture();
        let result = profile.analyze(&[]);
        assert!(matches!(result, Err(AnalysisError::ImageCountMismatch { required: 1, supplied: 0 })));
        let result = profile.analyze(&[detections(&[]), detections(&[])]);
        assert!(matches!(result, Err(AnalysisError::ImageCountMismatch { required: 1, supplied: 2 })));
    }

    #[test]
    fn dual_capture_cardinality_guard() {
        let profile = InspectionProfile::dual_capture();
        for supplied in [0_usize, 1, 3] {
            let images = vec![detections(&["bacteria"]); supplied];
            let result = profile.analyze(&images);
            assert!(
                matches!(result, Err(AnalysisError::ImageCountMismatch { required: 2, supplied: count }) if count == supplied),
                "{supplied} images must not classify"
            );
        }
    }

    #[test]
    fn single_capture_reports_estimate_and_verdict() {
        let profile = InspectionProfile::single_capture();
        let report = profile.analyze(&[detections(&["bacteria", "bacteria", "bacteria"])]).unwrap();
        match report {
            AnalysisReport::Surface { counts, estimate, verdict } => {
                assert_eq!(counts.count(detection_class::BACTERIA), 3);
                let estimate = estimate.unwrap();
                assert_eq!(estimate.organisms_per_ml, 3000);
                assert_eq!(estimate.colony_forming_units_per_ml, CfuValue::Count(1000));
                assert_eq!(verdict, SurfaceVerdict::Clean);
            },
            AnalysisReport::Contamination { .. } => panic!("single capture must produce a surface report"),
        }
    }

    #[test]
    fn dual_capture_clean_when_both_images_are_empty() {
        let profile = InspectionProfile::dual_capture();
        let report = profile.analyze(&[detections(&[]), detections(&[])]).unwrap();
        match report {
            AnalysisReport::Contamination { estimate, residue_levels, verdict, .. } => {
                assert_eq!(verdict, ContaminationVerdict::Clean);
                assert!(estimate.is_none());
                assert!(residue_levels.is_empty());
            },
            AnalysisReport::Surface { .. } => panic!("dual capture must produce a contamination report"),
        }
    }

    #[test]
    fn dual_capture_bacteria_outweigh_residues() {
        let profile = InspectionProfile::dual_capture();
        let report = profile
            .analyze(&[detections(&["bacteria", "milk_residues", "milk_residues"]), detections(&["bacteria", "milk_residues", "milk_residues", "milk_residues"])])
            .unwrap();
        match report {
            AnalysisReport::Contamination { counts, estimate, verdict, .. } => {
                assert_eq!(counts.count(detection_class::BACTERIA), 2);
                assert_eq!(counts.count(detection_class::MILK_RESIDUES), 5);
                assert_eq!(verdict, ContaminationVerdict::BacterialContamination);
                let estimate = estimate.unwrap();
                assert_eq!(estimate.organisms_per_ml, 2000);
                match estimate.colony_forming_units_per_ml {
                    CfuValue::Level(level) => assert!((level - 180.0).abs() < 1e-9),
                    CfuValue::Count(_) => panic!("dual-capture CFU must stay a real level"),
                }
            },
            AnalysisReport::Surface { .. } => panic!("dual capture must produce a contamination report"),
        }
    }

    #[test]
    fn dual_capture_residue_only_reports_scaled_levels() {
        let profile = InspectionProfile::dual_capture();
        let report = profile
            .analyze(&[detections(&["milk_residues", "milk_residues"]), detections(&["milk_residues"])])
            .unwrap();
        match report {
            AnalysisReport::Contamination { estimate, residue_levels, verdict, .. } => {
                assert_eq!(verdict, ContaminationVerdict::ResidueDetected);
                assert!(estimate.is_none(), "no bacteria metric may be shown");
                assert_eq!(residue_levels.get(detection_class::MILK_RESIDUES), Some(&3000));
                assert_eq!(residue_levels.get(detection_class::DEBRIS), None);
            },
            AnalysisReport::Surface { .. } => panic!("dual capture must produce a contamination report"),
        }
    }

    #[test]
    fn counts_sum_across_both_images() {
        let profile = InspectionProfile::dual_capture();
        let report = profile
            .analyze(&[detections(&["debries"]), detections(&["debries", "debries"])])
            .unwrap();
        assert_eq!(report.counts().count(detection_class::DEBRIS), 3);
    }
}
