//! Scenario file handling for the lsr binary.
//!
//! A scenario describes the routers, the links present at time zero and a
//! list of timed events. It is read from YAML and can be adjusted through
//! environment variables.

use anyhow::{bail, Context, Result};
use lsr_node::DEFAULT_HEARTBEAT_INTERVAL_MS;
use lsr_wire::{Address, Cost};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

const DEFAULT_TICK_MS: u64 = 100;
const DEFAULT_END_MS: u64 = 5000;

fn default_heartbeat_ms() -> u64 {
    DEFAULT_HEARTBEAT_INTERVAL_MS
}

fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}

fn default_end_ms() -> u64 {
    DEFAULT_END_MS
}

fn default_cost() -> Cost {
    1
}

/// Link present when the scenario starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub a: Address,
    pub b: Address,
    #[serde(default = "default_cost")]
    pub cost: Cost,
}

/// Something that happens at a given time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioEvent {
    /// Bring a link up
    Add {
        at_ms: u64,
        a: Address,
        b: Address,
        #[serde(default = "default_cost")]
        cost: Cost,
    },
    /// Take a link down
    Remove { at_ms: u64, a: Address, b: Address },
    /// Record the path data would take
    Trace {
        at_ms: u64,
        from: Address,
        to: Address,
    },
    /// Originate a data packet
    Send {
        at_ms: u64,
        from: Address,
        to: Address,
        #[serde(default)]
        payload: String,
    },
}

impl ScenarioEvent {
    pub fn at_ms(&self) -> u64 {
        match self {
            ScenarioEvent::Add { at_ms, .. }
            | ScenarioEvent::Remove { at_ms, .. }
            | ScenarioEvent::Trace { at_ms, .. }
            | ScenarioEvent::Send { at_ms, .. } => *at_ms,
        }
    }
}

/// Scenario configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Heartbeat interval given to every router
    #[serde(default = "default_heartbeat_ms")]
    pub heartbeat_ms: u64,
    /// Simulated time between clock ticks
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Simulated time at which the run stops
    #[serde(default = "default_end_ms")]
    pub end_ms: u64,
    /// Router addresses
    pub nodes: Vec<Address>,
    /// Links up at time zero
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    /// Timed events
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

impl Scenario {
    /// Load a scenario from file and apply environment overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file {:?}", path))?;

        let mut scenario: Scenario = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse scenario file {:?}", path))?;
        info!("Loaded scenario from {:?}", path);

        scenario.apply_environment_overrides();
        scenario.validate()?;

        info!(
            "Scenario: {} nodes, {} links, {} events, heartbeat={}ms, tick={}ms, end={}ms",
            scenario.nodes.len(),
            scenario.links.len(),
            scenario.events.len(),
            scenario.heartbeat_ms,
            scenario.tick_ms,
            scenario.end_ms
        );

        Ok(scenario)
    }

    /// Check values the simulation loop depends on
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            bail!("tick_ms must be greater than zero");
        }
        if self.nodes.is_empty() {
            bail!("scenario has no nodes");
        }
        Ok(())
    }

    /// Events ordered by time, keeping file order for equal times
    pub fn timeline(&self) -> Vec<ScenarioEvent> {
        let mut events = self.events.clone();
        events.sort_by_key(ScenarioEvent::at_ms);
        events
    }

    fn apply_environment_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("LSR_HEARTBEAT_MS").and_then(|v| v.parse::<u64>().ok()) {
            self.heartbeat_ms = value;
            info!("Heartbeat interval overridden by environment: {}ms", value);
        }

        if let Some(value) = lookup("LSR_TICK_MS").and_then(|v| v.parse::<u64>().ok()) {
            self.tick_ms = value;
            info!("Tick interval overridden by environment: {}ms", value);
        }

        if let Some(value) = lookup("LSR_END_MS").and_then(|v| v.parse::<u64>().ok()) {
            self.end_ms = value;
            info!("End time overridden by environment: {}ms", value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SCENARIO: &str = r#"
heartbeat_ms: 500
end_ms: 2000
nodes: [A, B, C]
links:
  - { a: A, b: B, cost: 2 }
  - { a: B, b: C }
events:
  - { action: trace, at_ms: 1500, from: A, to: C }
  - { action: remove, at_ms: 1000, a: B, b: C }
  - { action: add, at_ms: 1200, a: A, b: C, cost: 7 }
  - { action: send, at_ms: 1600, from: C, to: A, payload: hi }
"#;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_from_file() {
        let file = write_temp(SCENARIO);
        let scenario = Scenario::load_from_file(file.path()).unwrap();

        assert_eq!(scenario.nodes.len(), 3);
        assert_eq!(scenario.tick_ms, DEFAULT_TICK_MS);
        assert_eq!(scenario.links[0].cost, 2);
        assert_eq!(scenario.links[1].cost, 1);
        assert_eq!(
            scenario.events[2],
            ScenarioEvent::Add {
                at_ms: 1200,
                a: Address::from("A"),
                b: Address::from("C"),
                cost: 7
            }
        );
    }

    #[test]
    fn test_timeline_is_sorted() {
        let file = write_temp(SCENARIO);
        let scenario = Scenario::load_from_file(file.path()).unwrap();

        let times: Vec<u64> = scenario.timeline().iter().map(ScenarioEvent::at_ms).collect();
        assert_eq!(times, vec![1000, 1200, 1500, 1600]);
    }

    #[test]
    fn test_overrides() {
        let mut scenario: Scenario = serde_yaml::from_str(SCENARIO).unwrap();
        scenario.apply_overrides(|key| match key {
            "LSR_HEARTBEAT_MS" => Some("250".to_string()),
            "LSR_TICK_MS" => Some("not a number".to_string()),
            "LSR_END_MS" => Some("9000".to_string()),
            _ => None,
        });

        assert_eq!(scenario.heartbeat_ms, 250);
        assert_eq!(scenario.tick_ms, DEFAULT_TICK_MS);
        assert_eq!(scenario.end_ms, 9000);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = Scenario::load_from_file("/nonexistent/scenario.yaml").unwrap_err();
        assert!(err.to_string().contains("failed to read scenario file"));
    }

    #[test]
    fn test_invalid_scenarios() {
        let file = write_temp("nodes: [A\n");
        assert!(Scenario::load_from_file(file.path()).is_err());

        let file = write_temp("nodes: []\n");
        assert!(Scenario::load_from_file(file.path()).is_err());

        let mut scenario: Scenario = serde_yaml::from_str("nodes: [A]\n").unwrap();
        scenario.tick_ms = 0;
        assert!(scenario.validate().is_err());
    }
}
