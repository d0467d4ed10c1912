use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub facility_name: String,
    pub facility_description: String,
    /// Tasks due within this many days of the reference date count as
    /// "due soon" in refresh summaries.
    pub due_soon_window_days: i64,
}

impl Default for PlanMetadata {
    fn default() -> Self {
        Self {
            facility_name: "New Facility".to_string(),
            facility_description: "No description".to_string(),
            due_soon_window_days: 14,
        }
    }
}
