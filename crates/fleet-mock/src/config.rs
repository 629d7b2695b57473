use serde::Deserialize;
use warren_fleet::FleetMember;

/// Fleet file
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub initial_node: Option<String>,
    pub members: Vec<FleetMember>,
}
