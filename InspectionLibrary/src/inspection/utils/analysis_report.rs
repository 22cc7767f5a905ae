use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use crate::inspection::utils::contamination::ContaminationEstimate;
use crate::inspection::utils::count_map::CountMap;
use crate::inspection::utils::verdict::{ContaminationVerdict, SurfaceVerdict};

///Presentation payload of one analysis session. The estimate is omitted from
///the serialized form whenever no bacteria were detected.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "mode")]
pub enum AnalysisReport {
    #[serde(rename = "surface")]
    Surface {
        counts: CountMap,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        estimate: Option<ContaminationEstimate>,
        verdict: SurfaceVerdict,
    },
    #[serde(rename = "contamination")]
    Contamination {
        counts: CountMap,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        estimate: Option<ContaminationEstimate>,
        ///Nonzero residue classes scaled to a per-ml display level; populated
        ///only for a ResidueDetected verdict.
        residue_levels: BTreeMap<String, u64>,
        verdict: ContaminationVerdict,
    },
}

impl AnalysisReport {
    pub fn counts(&self) -> &CountMap {
        match self {
            AnalysisReport::Surface { counts, .. } => counts,
            AnalysisReport::Contamination { counts, .. } => counts,
        }
    }

    pub fn estimate(&self) -> Option<&ContaminationEstimate> {
        match self {
            AnalysisReport::Surface { estimate, .. } => estimate.as_ref(),
            AnalysisReport::Contamination { estimate, .. } => estimate.as_ref(),
        }
    }
}
