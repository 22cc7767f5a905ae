pub const BACTERIA: &str = "bacteria";
pub const MILK_RESIDUES: &str = "milk_residues";
//The training dataset labels debris as "debries"; the model emits that spelling.
pub const DEBRIS: &str = "debries";

pub fn display_color(label: &str) -> Option<[u8; 3]> {
    match label {
        BACTERIA => Some([255, 0, 0]),
        MILK_RESIDUES => Some([0, 255, 0]),
        DEBRIS => Some([0, 0, 255]),
        _ => None,
    }
}
