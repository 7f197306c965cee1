//! External control commands
//!
//! Commands arrive on the orchestrator control channel. DLQ clears are
//! forwarded over the DLQ control channels rather than invoked
//! directly, so the two managers stay decoupled across processes.

use super::runner::Orchestrator;
use crate::core::types::{ControlCommand, DlqControl, channels};
use crate::utils::error::Result;
use tracing::{info, warn};

impl Orchestrator {
    /// Decode and apply one control payload. Malformed or failing
    /// commands are logged, never fatal.
    pub(super) async fn handle_command(&self, payload: &str) {
        let command: ControlCommand = match serde_json::from_str(payload) {
            Ok(command) => command,
            Err(err) => {
                warn!("Ignoring malformed control command: {}", err);
                return;
            }
        };

        info!("Control command: {:?}", command);
        let result = self.apply_command(command).await;
        if let Err(err) = result {
            warn!("Control command failed: {}", err);
        }
    }

    async fn apply_command(&self, command: ControlCommand) -> Result<()> {
        match command {
            ControlCommand::Pause => self.dispatcher.pause().await,
            ControlCommand::Resume => self.dispatcher.resume().await,
            ControlCommand::Rebalance { model } => {
                let moved = self.rebalance(model).await?;
                info!("Rebalance moved {} tasks", moved);
                Ok(())
            }
            ControlCommand::HealthCheck => {
                let health = self.health_sweep().await?;
                info!(
                    "Health report: score {:.2}, {} agents, {} queues",
                    health.score, health.agents.total, health.queues.len()
                );
                Ok(())
            }
            ControlCommand::ClearDlq { model } => {
                let targets = match model {
                    Some(model) => vec![model],
                    None => self.config.models.active.clone(),
                };
                for model in targets {
                    let request = DlqControl {
                        model,
                        task_id: None,
                    };
                    self.redis
                        .publish(channels::DLQ_CLEAR, &serde_json::to_string(&request)?)
                        .await?;
                }
                Ok(())
            }
        }
    }
}
