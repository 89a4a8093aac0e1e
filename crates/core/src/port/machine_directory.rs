// Machine Directory & Tool Compatibility Ports
// Machines and their tooling are owned outside the scheduling engine.

use crate::domain::Machine;
use crate::error::Result;
use async_trait::async_trait;

/// Read-only access to the machine directory (id -> name/type)
#[async_trait]
pub trait MachineDirectory: Send + Sync {
    /// All known machines, in any order
    async fn list_machines(&self) -> Result<Vec<Machine>>;
}

/// Tool compatibility verdicts computed by the tool-analysis collaborator
#[async_trait]
pub trait ToolCompatibility: Send + Sync {
    /// Whether `machine_id` has every tool in `required_tools` available
    ///
    /// # Errors
    /// Lookup failures are returned as errors; callers must treat an error
    /// as "not compatible".
    async fn has_required_tools(&self, machine_id: &str, required_tools: &[String]) -> Result<bool>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::{HashMap, HashSet};

    /// Fixed machine list
    pub struct StaticMachineDirectory {
        machines: Vec<Machine>,
    }

    impl StaticMachineDirectory {
        pub fn new(ids: &[&str]) -> Self {
            Self {
                machines: ids.iter().map(|id| Machine::new(*id, *id)).collect(),
            }
        }
    }

    #[async_trait]
    impl MachineDirectory for StaticMachineDirectory {
        async fn list_machines(&self) -> Result<Vec<Machine>> {
            Ok(self.machines.clone())
        }
    }

    /// Per-machine tool sets; machines listed in `failing` return errors
    #[derive(Default)]
    pub struct MockToolCompatibility {
        tools: HashMap<String, HashSet<String>>,
        failing: HashSet<String>,
    }

    impl MockToolCompatibility {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_tools(mut self, machine_id: &str, tools: &[&str]) -> Self {
            self.tools.insert(
                machine_id.to_string(),
                tools.iter().map(|t| t.to_string()).collect(),
            );
            self
        }

        pub fn failing_for(mut self, machine_id: &str) -> Self {
            self.failing.insert(machine_id.to_string());
            self
        }
    }

    #[async_trait]
    impl ToolCompatibility for MockToolCompatibility {
        async fn has_required_tools(
            &self,
            machine_id: &str,
            required_tools: &[String],
        ) -> Result<bool> {
            if self.failing.contains(machine_id) {
                return Err(AppError::Collaborator(format!(
                    "tool lookup failed for {}",
                    machine_id
                )));
            }
            let available = self.tools.get(machine_id);
            Ok(required_tools
                .iter()
                .all(|t| available.map(|set| set.contains(t)).unwrap_or(false)))
        }
    }
}
