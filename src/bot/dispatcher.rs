//! Routing of inbound messages to handlers
//!
//! Routes are tried in precedence order and the first match handles the
//! message:
//!
//! 1. exact payload match
//! 2. exact command text (`/time`, `!time`)
//! 3. free-form predicate over the message
//! 4. stored conversation state
//!
//! Within one tier, routes keep their registration order.

use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use crate::dialogue::{ConversationState, StateKind};
use crate::vk::Message;

use super::dialogue_manager::process_images;
use super::message_handler::{
    handle_avatar_request, handle_greeting, handle_monochrome, handle_time_request, is_greeting,
    redirect_to_images_keyboard, redirect_to_main_keyboard,
};
use super::ui_builder::{
    command_payload, keyboard_payload, IMAGES_KEYBOARD_NAME, MAIN_KEYBOARD_NAME,
};
use super::BotContext;

/// Prefixes accepted in front of a command name
pub const COMMAND_PREFIXES: [&str; 2] = ["!", "/"];

/// Condition selecting a route
#[derive(Debug, Clone)]
pub enum Rule {
    /// Message payload equals this JSON value
    Payload(Value),
    /// Message text is a prefixed command with this name and no arguments
    Command(&'static str),
    /// Arbitrary check on the message
    Predicate(fn(&Message) -> bool),
    /// Conversation is currently in this state
    State(StateKind),
}

impl Rule {
    fn precedence(&self) -> u8 {
        match self {
            Rule::Payload(_) => 0,
            Rule::Command(_) => 1,
            Rule::Predicate(_) => 2,
            Rule::State(_) => 3,
        }
    }
}

/// Handler invoked by a matching rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    MainKeyboard,
    ImagesKeyboard,
    Greeting,
    Time,
    Avatar,
    Monochrome,
    ContinueProcessing,
}

impl Route {
    pub async fn run(self, ctx: &BotContext, msg: &Message) -> Result<()> {
        match self {
            Route::MainKeyboard => redirect_to_main_keyboard(ctx, msg).await,
            Route::ImagesKeyboard => redirect_to_images_keyboard(ctx, msg).await,
            Route::Greeting => handle_greeting(ctx, msg).await,
            Route::Time => handle_time_request(ctx, msg).await,
            Route::Avatar => handle_avatar_request(ctx, msg).await,
            Route::Monochrome => handle_monochrome(ctx, msg).await,
            Route::ContinueProcessing => process_images(ctx, msg, None).await,
        }
    }
}

/// Whether `text` is `command` behind one of the command prefixes
pub fn matches_command(text: &str, command: &str) -> bool {
    COMMAND_PREFIXES
        .iter()
        .any(|prefix| text.strip_prefix(prefix) == Some(command))
}

/// Ordered rule table
#[derive(Debug, Clone)]
pub struct Dispatcher {
    routes: Vec<(Rule, Route)>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(vec![
            (Rule::Payload(keyboard_payload(MAIN_KEYBOARD_NAME)), Route::MainKeyboard),
            (Rule::Payload(keyboard_payload(IMAGES_KEYBOARD_NAME)), Route::ImagesKeyboard),
            (Rule::Predicate(is_greeting), Route::Greeting),
            (Rule::Command("time"), Route::Time),
            (Rule::Payload(command_payload("time")), Route::Time),
            (Rule::Command("avatar"), Route::Avatar),
            (Rule::Payload(command_payload("avatar")), Route::Avatar),
            (Rule::State(StateKind::Processing), Route::ContinueProcessing),
            (Rule::Command("monochrome"), Route::Monochrome),
            (Rule::Payload(command_payload("monochrome")), Route::Monochrome),
        ])
    }
}

impl Dispatcher {
    /// Build a dispatcher, ordering `routes` by rule precedence
    pub fn new(mut routes: Vec<(Rule, Route)>) -> Self {
        routes.sort_by_key(|(rule, _)| rule.precedence());
        Self { routes }
    }

    pub fn routes(&self) -> &[(Rule, Route)] {
        &self.routes
    }

    /// First route matching `msg`, if any
    pub async fn route(&self, ctx: &BotContext, msg: &Message) -> Result<Option<Route>> {
        let payload = msg.payload();
        // Loaded on first state rule only
        let mut state: Option<Option<ConversationState>> = None;

        for (rule, route) in &self.routes {
            let matched = match rule {
                Rule::Payload(expected) => payload.as_ref() == Some(expected),
                Rule::Command(command) => matches_command(&msg.text, command),
                Rule::Predicate(predicate) => predicate(msg),
                Rule::State(kind) => {
                    if state.is_none() {
                        state = Some(ctx.states.get(msg.peer_id).await?);
                    }
                    state
                        .as_ref()
                        .and_then(|s| s.as_ref())
                        .is_some_and(|s| s.kind() == *kind)
                }
            };

            if matched {
                return Ok(Some(*route));
            }
        }

        Ok(None)
    }

    /// Route `msg` and run the matching handler
    pub async fn dispatch(&self, ctx: &BotContext, msg: &Message) -> Result<Option<Route>> {
        let Some(route) = self.route(ctx, msg).await? else {
            return Ok(None);
        };
        debug!(peer_id = msg.peer_id, route = ?route, "Dispatching message");
        route.run(ctx, msg).await?;
        Ok(Some(route))
    }
}
