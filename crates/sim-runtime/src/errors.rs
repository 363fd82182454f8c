//! Scenario errors.

use shared_types::NodeId;
use std::path::PathBuf;
use thiserror::Error;
use vs_01_event_scheduler::SchedulerError;
use vs_02_spectrum_channel::ChannelError;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scenario JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Radio {device} on {node} uses unknown technology '{technology}'")]
    UnknownTechnology {
        node: NodeId,
        device: usize,
        technology: String,
    },

    #[error("{0} is declared by more than one vehicle")]
    DuplicateNode(NodeId),

    #[error("Invalid scenario: {0}")]
    Invalid(String),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}
