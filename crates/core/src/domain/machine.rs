// Machine Domain Model (owned by the machine directory, read-only here)

use serde::{Deserialize, Serialize};

/// Machine identifier
pub type MachineId = String;

/// Machine as seen by the scheduler: identity and display data only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    pub name: String,
    #[serde(rename = "type", default = "default_machine_type")]
    pub machine_type: String,
}

fn default_machine_type() -> String {
    "Machining Center".to_string()
}

impl Machine {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            machine_type: default_machine_type(),
        }
    }
}
