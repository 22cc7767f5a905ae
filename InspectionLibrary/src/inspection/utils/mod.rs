pub mod analysis_report;
pub mod contamination;
pub mod count_map;
pub mod profile;
pub mod verdict;

pub use Common::inspection::utils::bounding_box;
pub use Common::inspection::utils::detection_class;
