use serde::{Serialize, Deserialize};

///One detected colony stands for this many organisms per milliliter.
pub const ORGANISMS_PER_DETECTION: u64 = 1000;

///CFU derivation strategy; each deployment profile carries its own variant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum CfuFormula {
    ///CFU/ml = round(organisms/ml ÷ 3), kept as an integer count.
    ThirdOfOrganisms,
    ///CFU/ml = organisms/ml × fraction, kept as a real level shown to two decimals.
    FractionOfOrganisms(f64),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum CfuValue {
    Count(u64),
    Level(f64),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContaminationEstimate {
    pub organisms_per_ml: u64,
    pub colony_forming_units_per_ml: CfuValue,
}

///No estimate is derived for a bacteria-free surface.
pub fn estimate_contamination(bacteria_count: u32, formula: &CfuFormula) -> Option<ContaminationEstimate> {
    if bacteria_count == 0 {
        return None;
    }
    let organisms_per_ml = bacteria_count as u64 * ORGANISMS_PER_DETECTION;
    let colony_forming_units_per_ml = match formula {
        CfuFormula::ThirdOfOrganisms => CfuValue::Count((organisms_per_ml as f64 / 3.0).round() as u64),
        CfuFormula::FractionOfOrganisms(fraction) => CfuValue::Level(organisms_per_ml as f64 * fraction),
    };
    Some(ContaminationEstimate {
        organisms_per_ml,
        colony_forming_units_per_ml,
    })
}
