//! Human-readable zone labels
//!
//! Zone 1 is always the weakest vegetation, zone K the strongest.

/// Descriptive label for a zone id within a zoning of `num_zones` zones.
///
/// Fixed wording exists for 3-, 4- and 5-zone layouts; any other layout
/// (or an id outside 1..=num_zones) falls back to a generic "Zone N".
pub fn zone_label(zone_id: usize, num_zones: usize) -> String {
    let fixed = match (num_zones, zone_id) {
        (3, 1) => Some("weak"),
        (3, 2) => Some("medium"),
        (3, 3) => Some("strong"),

        (4, 1) => Some("very weak"),
        (4, 2) => Some("weak"),
        (4, 3) => Some("medium"),
        (4, 4) => Some("strong"),

        (5, 1) => Some("very weak"),
        (5, 2) => Some("weak"),
        (5, 3) => Some("medium"),
        (5, 4) => Some("strong"),
        (5, 5) => Some("very strong"),

        _ => None,
    };

    match fixed {
        Some(label) => label.to_string(),
        None => format!("Zone {}", zone_id),
    }
}
