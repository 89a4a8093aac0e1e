// JSON Machine Directory & Tool Inventory
//
// Reads machine_database.json (machine id -> record) maintained by the
// machine/tool management side. Tool numbers may be stored as strings or
// integers; both are compared as strings.

use crate::files::read_json_map;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use shopfloor_core::domain::{Machine, MachineId};
use shopfloor_core::error::{AppError, Result};
use shopfloor_core::port::{MachineDirectory, ToolCompatibility};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

pub const MACHINE_DATABASE_FILE: &str = "machine_database.json";

#[derive(Debug, Deserialize)]
struct MachineRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    machine_type: Option<String>,
    #[serde(default, deserialize_with = "tool_numbers")]
    physical_tools: HashSet<String>,
    #[serde(default, deserialize_with = "tool_numbers")]
    locked_tools: HashSet<String>,
}

fn tool_numbers<'de, D>(deserializer: D) -> std::result::Result<HashSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect())
}

struct MachineEntry {
    machine: Machine,
    physical_tools: HashSet<String>,
    locked_tools: HashSet<String>,
}

impl MachineEntry {
    fn has_tool(&self, tool: &str) -> bool {
        self.physical_tools.contains(tool) && !self.locked_tools.contains(tool)
    }
}

/// Machine directory loaded once from `machine_database.json`
pub struct JsonMachineDirectory {
    machines: BTreeMap<MachineId, MachineEntry>,
}

impl JsonMachineDirectory {
    /// Load the machine database. A missing file yields an empty directory.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let Some(records) = read_json_map::<MachineRecord>(path).await? else {
            warn!(path = %path.display(), "Machine database not found, no machines available");
            return Ok(Self {
                machines: BTreeMap::new(),
            });
        };

        let machines: BTreeMap<MachineId, MachineEntry> = records
            .into_iter()
            .map(|(key, record)| {
                let id = record.id.unwrap_or(key);
                let name = record.name.unwrap_or_else(|| id.clone());
                let mut machine = Machine::new(id.clone(), name);
                if let Some(machine_type) = record.machine_type {
                    machine.machine_type = machine_type;
                }
                let entry = MachineEntry {
                    machine,
                    physical_tools: record.physical_tools,
                    locked_tools: record.locked_tools,
                };
                (id, entry)
            })
            .collect();

        info!(path = %path.display(), machines = machines.len(), "Loaded machine directory");
        Ok(Self { machines })
    }
}

#[async_trait]
impl MachineDirectory for JsonMachineDirectory {
    async fn list_machines(&self) -> Result<Vec<Machine>> {
        Ok(self.machines.values().map(|e| e.machine.clone()).collect())
    }
}

#[async_trait]
impl ToolCompatibility for JsonMachineDirectory {
    async fn has_required_tools(
        &self,
        machine_id: &str,
        required_tools: &[String],
    ) -> Result<bool> {
        let entry = self
            .machines
            .get(machine_id)
            .ok_or_else(|| AppError::Collaborator(format!("Unknown machine: {}", machine_id)))?;
        Ok(required_tools.iter().all(|tool| entry.has_tool(tool)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_test::assert_err;

    const DATABASE: &str = r#"{
        "M1": {
            "id": "M1",
            "name": "DMG Mori 1",
            "type": "5-Axis",
            "location": "Hall A",
            "physical_tools": [1, 2, "T7"],
            "locked_tools": [2]
        },
        "M2": {
            "name": "Haas VF-2"
        }
    }"#;

    async fn directory() -> (TempDir, JsonMachineDirectory) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MACHINE_DATABASE_FILE);
        std::fs::write(&path, DATABASE).unwrap();
        let directory = JsonMachineDirectory::open(&path).await.unwrap();
        (dir, directory)
    }

    fn tools(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_lists_machines_in_id_order() {
        let (_dir, directory) = directory().await;
        let machines = directory.list_machines().await.unwrap();

        assert_eq!(machines.len(), 2);
        assert_eq!(machines[0].id, "M1");
        assert_eq!(machines[0].machine_type, "5-Axis");
        assert_eq!(machines[1].id, "M2");
        assert_eq!(machines[1].name, "Haas VF-2");
        assert_eq!(machines[1].machine_type, "Machining Center");
    }

    #[tokio::test]
    async fn test_locked_tools_do_not_count() {
        let (_dir, directory) = directory().await;

        assert!(directory.has_required_tools("M1", &tools(&["1", "T7"])).await.unwrap());
        assert!(!directory.has_required_tools("M1", &tools(&["2"])).await.unwrap());
        assert!(!directory.has_required_tools("M2", &tools(&["1"])).await.unwrap());
        assert!(directory.has_required_tools("M2", &[]).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_machine_is_an_error() {
        let (_dir, directory) = directory().await;
        assert_err!(directory.has_required_tools("M9", &tools(&["1"])).await);
    }

    #[tokio::test]
    async fn test_missing_database_is_empty() {
        let dir = TempDir::new().unwrap();
        let directory = JsonMachineDirectory::open(dir.path().join(MACHINE_DATABASE_FILE))
            .await
            .unwrap();
        assert!(directory.list_machines().await.unwrap().is_empty());
    }
}
