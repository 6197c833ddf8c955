//! Bots Long Poll event loop.

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::bot::{BotContext, Dispatcher};
use crate::errors::BotError;

use super::client::VkClient;
use super::types::{LongPollResponse, LongPollServer, Update};

/// What to do after a long poll response
#[derive(Debug, Clone, PartialEq)]
pub enum PollAction {
    /// Dispatch the updates and continue from the new `ts`
    Deliver(Vec<Update>),
    /// History partially lost; continue from the new `ts`
    ResetTs(String),
    /// Key expired; fetch a new key but keep the current `ts`
    RefreshKey,
    /// Key and history lost; fetch a new key and `ts`
    Reconnect,
}

/// Interpret a long poll response, advancing `server.ts` when a new one is supplied
pub fn interpret_response(
    server: &mut LongPollServer,
    response: LongPollResponse,
) -> Result<PollAction, BotError> {
    match response.failed {
        None => {
            if let Some(ts) = response.ts {
                server.ts = ts;
            }
            Ok(PollAction::Deliver(response.updates))
        }
        Some(1) => {
            let ts = response
                .ts
                .ok_or_else(|| BotError::LongPoll("failed=1 without ts".to_string()))?;
            server.ts = ts.clone();
            Ok(PollAction::ResetTs(ts))
        }
        Some(2) => Ok(PollAction::RefreshKey),
        Some(3) => Ok(PollAction::Reconnect),
        Some(code) => Err(BotError::LongPoll(format!("unknown failure code {code}"))),
    }
}

/// Receive events until the process is stopped or the transport fails
pub async fn run(
    client: Arc<VkClient>,
    dispatcher: Arc<Dispatcher>,
    ctx: BotContext,
    wait_secs: u64,
) -> Result<()> {
    let group_id = client.group_id().await?;
    let mut server = client.long_poll_server(group_id).await?;
    info!(group_id, "Long poll connected");

    loop {
        let response = match client.poll(&server, wait_secs).await {
            Ok(response) => response,
            Err(e) => {
                error!(group_id, error = %e, "Long poll request failed, stopping");
                return Err(e);
            }
        };

        match interpret_response(&mut server, response)? {
            PollAction::Deliver(updates) => {
                for update in updates {
                    handle_update(&dispatcher, &ctx, update);
                }
            }
            PollAction::ResetTs(ts) => {
                warn!(ts = %ts, "Long poll history lost, continuing from new ts");
            }
            PollAction::RefreshKey => {
                debug!("Long poll key expired, requesting a new one");
                let fresh = client.long_poll_server(group_id).await?;
                server.key = fresh.key;
                server.server = fresh.server;
            }
            PollAction::Reconnect => {
                warn!("Long poll session lost, reconnecting");
                server = client.long_poll_server(group_id).await?;
            }
        }
    }
}

/// Spawn a handler task for a single update
fn handle_update(dispatcher: &Arc<Dispatcher>, ctx: &BotContext, update: Update) {
    let kind = update.kind.clone();
    let message = match update.into_message() {
        Ok(Some(message)) => message,
        Ok(None) => {
            debug!(update_type = %kind, "Skipping update");
            return;
        }
        Err(e) => {
            warn!(update_type = %kind, error = %e, "Failed to decode update");
            return;
        }
    };

    let dispatcher = Arc::clone(dispatcher);
    let ctx = ctx.clone();
    tokio::spawn(async move {
        let peer_id = message.peer_id;
        match dispatcher.dispatch(&ctx, &message).await {
            Ok(Some(route)) => debug!(peer_id, route = ?route, "Message handled"),
            Ok(None) => debug!(peer_id, "No handler matched"),
            Err(e) => error!(peer_id, error = %e, "Handler failed"),
        }
    });
}
