//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread, time::Duration};

use client_core::{HttpRoutingClient, RoutingClient};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use shared::{domain::RequestId, protocol::PathsRequest};

use crate::backend_bridge::commands::BackendCommand;
use crate::config::Settings;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub routing_url: String,
    pub request_timeout: Option<Duration>,
}

impl From<&Settings> for BackendSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            routing_url: settings.routing_url.clone(),
            request_timeout: settings.request_timeout(),
        }
    }
}

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: BackendSettings) {
    thread::spawn(move || run_backend(cmd_rx, ui_tx, settings));
}

fn run_backend(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: BackendSettings) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!("failed to build backend runtime: {err}");
            let _ = ui_tx.send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: failed to build runtime: {err}"),
            )));
            return;
        }
    };

    runtime.block_on(async move {
        deliver(&ui_tx, UiEvent::Info("Backend worker starting...".to_string())).await;
        let routing: Arc<dyn RoutingClient> =
            match HttpRoutingClient::new(&settings.routing_url, settings.request_timeout) {
                Ok(client) => Arc::new(client),
                Err(err) => {
                    tracing::error!(routing_url = %settings.routing_url, "failed to build routing client: {err}");
                    deliver(
                        &ui_tx,
                        UiEvent::Error(UiError::from_client_error(
                            UiErrorContext::BackendStartup,
                            &err,
                        )),
                    )
                    .await;
                    return;
                }
            };

        tracing::info!(
            routing_url = %settings.routing_url,
            timeout = ?settings.request_timeout,
            "backend worker ready"
        );
        deliver(
            &ui_tx,
            UiEvent::Info("Click the map to place the origin, then the destination".to_string()),
        )
        .await;

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                BackendCommand::FindPaths {
                    request_id,
                    request,
                } => {
                    let routing = Arc::clone(&routing);
                    let ui_tx = ui_tx.clone();
                    tokio::spawn(async move {
                        let event = find_paths(routing.as_ref(), request_id, &request).await;
                        deliver(&ui_tx, event).await;
                    });
                }
            }
        }

        tracing::debug!("ui command queue closed; backend worker stopping");
    });
}

/// Hands an event to the UI. A full queue is waited out on the blocking pool;
/// only a closed queue drops the event.
pub(crate) async fn deliver(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    let event = match ui_tx.try_send(event) {
        Ok(()) => return,
        Err(TrySendError::Disconnected(_)) => {
            tracing::debug!("ui event queue closed; dropping backend event");
            return;
        }
        Err(TrySendError::Full(event)) => event,
    };

    tracing::warn!(queued = ui_tx.len(), "ui event queue is full; waiting for the ui to catch up");
    let ui_tx = ui_tx.clone();
    match tokio::task::spawn_blocking(move || ui_tx.send(event)).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => tracing::debug!("ui event queue closed while waiting; dropping backend event"),
        Err(err) => tracing::warn!("ui event delivery task failed: {err}"),
    }
}

pub(crate) async fn find_paths(
    client: &dyn RoutingClient,
    request_id: RequestId,
    request: &PathsRequest,
) -> UiEvent {
    match client.find_paths(request).await {
        Ok(routes) => {
            tracing::info!(%request_id, paths = routes.len(), "paths loaded");
            UiEvent::PathsLoaded { request_id, routes }
        }
        Err(err) => {
            tracing::warn!(%request_id, timeout = err.is_timeout(), "path query failed: {err}");
            UiEvent::PathsFailed {
                request_id,
                error: UiError::from_client_error(UiErrorContext::FindPaths, &err),
            }
        }
    }
}
