use serde::{Serialize, Deserialize};
use crate::inspection::utils::count_map::CountMap;
use crate::inspection::utils::detection_class;

///Single-capture verdict vocabulary.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SurfaceVerdict {
    Clean,
    Caution,
    NotClean,
}

///Dual-capture verdict vocabulary.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContaminationVerdict {
    Clean,
    ResidueDetected,
    BacterialContamination,
}

///Inclusive range of counts classified as Caution.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct CountRange {
    pub lower: u32,
    pub upper: u32,
}

impl CountRange {
    pub const fn new(lower: u32, upper: u32) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, count: u32) -> bool {
        self.lower <= count && count <= self.upper
    }
}

///Single-capture threshold table. Fail bounds are strict (count must exceed
///them); caution ranges are inclusive and share their upper bound with the
///fail bound, so a count sitting exactly on the bound is Caution, not
///NotClean.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct SurfaceThresholds {
    pub bacteria_fail: u32,
    pub milk_fail: u32,
    pub debris_fail: u32,
    pub bacteria_caution: CountRange,
    pub milk_caution: CountRange,
    pub debris_caution: CountRange,
}

impl SurfaceThresholds {
    pub const fn default_table() -> Self {
        Self {
            bacteria_fail: 15,
            milk_fail: 10,
            debris_fail: 10,
            bacteria_caution: CountRange::new(5, 15),
            milk_caution: CountRange::new(5, 10),
            debris_caution: CountRange::new(5, 10),
        }
    }
}

///The fail rule is evaluated first and short-circuits the caution rule.
pub fn classify_surface(counts: &CountMap, thresholds: &SurfaceThresholds) -> SurfaceVerdict {
    let bacteria = counts.count(detection_class::BACTERIA);
    let milk = counts.count(detection_class::MILK_RESIDUES);
    let debris = counts.count(detection_class::DEBRIS);
    if bacteria > thresholds.bacteria_fail || milk > thresholds.milk_fail || debris > thresholds.debris_fail {
        SurfaceVerdict::NotClean
    } else if thresholds.bacteria_caution.contains(bacteria)
        || thresholds.milk_caution.contains(milk)
        || thresholds.debris_caution.contains(debris)
    {
        SurfaceVerdict::Caution
    } else {
        SurfaceVerdict::Clean
    }
}

///Any bacteria at all outweighs every other residue, regardless of magnitude.
pub fn classify_contamination(counts: &CountMap) -> ContaminationVerdict {
    if counts.total() == 0 {
        ContaminationVerdict::Clean
    } else if counts.count(detection_class::BACTERIA) > 0 {
        ContaminationVerdict::BacterialContamination
    } else {
        ContaminationVerdict::ResidueDetected
    }
}
