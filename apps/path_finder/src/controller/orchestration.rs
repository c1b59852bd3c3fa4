//! Command orchestration helpers from reducer effects to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{ControllerEvent, UiError, UiErrorContext},
    reducer::Effect,
};

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure); restart the app"
                    .to_string();
            false
        }
    }
}

/// Queues the backend work for an effect. When the queue refuses it, the
/// failure comes back as a controller event so the request is not left
/// pending forever.
pub fn dispatch_effect(
    cmd_tx: &Sender<BackendCommand>,
    effect: Effect,
    status: &mut String,
) -> Option<ControllerEvent> {
    match effect {
        Effect::FetchPaths {
            request_id,
            request,
        } => {
            let queued = dispatch_backend_command(
                cmd_tx,
                BackendCommand::FindPaths {
                    request_id,
                    request,
                },
                status,
            );
            if queued {
                *status = format!("Finding paths ({request_id})...");
                None
            } else {
                Some(ControllerEvent::PathsFailed {
                    request_id,
                    error: UiError::from_message(UiErrorContext::FindPaths, status.clone()),
                })
            }
        }
    }
}
