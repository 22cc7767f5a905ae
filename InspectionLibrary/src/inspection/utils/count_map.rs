use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use crate::inspection::utils::bounding_box::BoundingBox;

///Per-class detection counts for one analysis session. Labels are normalized
///before counting so adapter formatting cannot create spurious classes.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CountMap(BTreeMap<String, u32>);

impl CountMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn from_detections<'a, I, J>(detections_per_image: I) -> Self
    where
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = &'a BoundingBox>,
    {
        let mut counts = Self::new();
        for detections in detections_per_image {
            for detection in detections {
                counts.record(&detection.name);
            }
        }
        counts
    }

    pub fn record(&mut self, label: &str) {
        *self.0.entry(normalize_label(label)).or_insert(0) += 1;
    }

    pub fn merge(&mut self, other: &CountMap) {
        for (label, count) in &other.0 {
            *self.0.entry(label.clone()).or_insert(0) += count;
        }
    }

    ///Count for a normalized label, 0 when the class was never detected.
    pub fn count(&self, label: &str) -> u32 {
        self.0.get(label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }
}

pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::utils::detection_class;

    fn detection(name: &str) -> BoundingBox {
        BoundingBox {
            xmin: 0,
            xmax: 10,
            ymin: 0,
            ymax: 10,
            name: name.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn empty_input_yields_all_zero_counts() {
        let counts = CountMap::from_detections(Vec::<Vec<BoundingBox>>::new().iter());
        assert_eq!(counts.total(), 0);
        assert_eq!(counts.count(detection_class::BACTERIA), 0);
    }

    #[test]
    fn label_normalization_merges_formatting_variants() {
        let detections = vec![vec![detection("Bacteria "), detection("bacteria"), detection("BACTERIA")]];
        let counts = CountMap::from_detections(&detections);
        assert_eq!(counts.count(detection_class::BACTERIA), 3);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn aggregation_is_commutative() {
        let first = vec![detection("bacteria"), detection("milk_residues")];
        let second = vec![detection("bacteria"), detection("debries")];
        let forward = CountMap::from_detections(vec![&first, &second]);
        let backward = CountMap::from_detections(vec![&second, &first]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn aggregation_is_additive_under_merge() {
        let first = vec![detection("bacteria"), detection("milk_residues")];
        let second = vec![detection("bacteria"), detection("debries")];
        let combined = CountMap::from_detections(vec![&first, &second]);
        let mut merged = CountMap::from_detections(vec![&first]);
        merged.merge(&CountMap::from_detections(vec![&second]));
        assert_eq!(combined, merged);
    }

    #[test]
    fn total_equals_sum_of_all_detections() {
        let detections = vec![
            vec![detection("bacteria"), detection("milk_residues")],
            vec![detection("debries")],
        ];
        let counts = CountMap::from_detections(&detections);
        assert_eq!(counts.total(), 3);
    }
}
