//! End-of-run summary.

use serde::Serialize;
use shared_types::{NodeId, SimTime};
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct RadioReport {
    pub node_id: NodeId,
    pub device_index: u32,
    pub technology: String,
    pub receptions: u64,
    pub mean_rx_power_dbm: Option<f64>,
    pub strongest_rx_power_dbm: Option<f64>,
    /// Links from radios of other technologies that landed in this radio's
    /// channel above the coexistence sensitivity.
    pub interference_events: u64,
    pub mean_interference_dbm: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub scenario: String,
    pub final_time: SimTime,
    pub events_executed: u64,
    pub transmissions: usize,
    pub deliveries_scheduled: usize,
    pub dropped_out_of_range: usize,
    pub orthogonal_groups_skipped: usize,
    pub self_or_same_node_skipped: usize,
    pub converters: usize,
    pub radios: Vec<RadioReport>,
}

impl SimulationReport {
    pub fn total_receptions(&self) -> u64 {
        self.radios.iter().map(|r| r.receptions).sum()
    }
}

fn dbm(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario '{}' finished at {}", self.scenario, self.final_time)?;
        writeln!(f, "  events executed       {}", self.events_executed)?;
        writeln!(f, "  transmissions         {}", self.transmissions)?;
        writeln!(f, "  deliveries scheduled  {}", self.deliveries_scheduled)?;
        writeln!(f, "  dropped (range)       {}", self.dropped_out_of_range)?;
        writeln!(f, "  orthogonal skips      {}", self.orthogonal_groups_skipped)?;
        writeln!(f, "  self/same-node skips  {}", self.self_or_same_node_skipped)?;
        writeln!(f, "  converters            {}", self.converters)?;
        writeln!(f)?;
        writeln!(
            f,
            "  {:<10} {:<4} {:<10} {:>10} {:>12} {:>12} {:>8} {:>12}",
            "node", "dev", "tech", "rx", "mean dBm", "max dBm", "intf", "intf dBm"
        )?;
        for r in &self.radios {
            writeln!(
                f,
                "  {:<10} {:<4} {:<10} {:>10} {:>12} {:>12} {:>8} {:>12}",
                r.node_id.to_string(),
                r.device_index,
                r.technology,
                r.receptions,
                dbm(r.mean_rx_power_dbm),
                dbm(r.strongest_rx_power_dbm),
                r.interference_events,
                dbm(r.mean_interference_dbm)
            )?;
        }
        Ok(())
    }
}
