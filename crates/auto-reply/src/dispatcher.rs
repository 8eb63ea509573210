//! Per-event orchestration: decide, generate, deliver, commit.
//!
//! Each event runs `Idle → Deciding → (NoOp | Generating → Delivered |
//! Generating → Failed)`. Completion failures never escape this module; they
//! become a channel notice and leave the history untouched.

use std::{sync::Arc, time::Duration};

use {
    dashmap::DashMap,
    tokio::sync::{Mutex, oneshot},
    tracing::{debug, info, warn},
};

use {
    chatrelay_channels::{ChannelOutbound, InboundMessage},
    chatrelay_common::Turn,
    chatrelay_config::RelayConfig,
    chatrelay_providers::{CompletionProvider, CompletionResponse, Error as ServiceError},
};

use crate::{
    history::HistoryStore,
    modes::ChannelModeRegistry,
    policy::{ControlCommand, Decision, IgnoreReason, decide},
};

/// Discord's typing indicator lasts about ten seconds.
const TYPING_REFRESH: Duration = Duration::from_secs(8);

const AUTO_REPLY_ON: &str = "このチャンネルの自動返信を ON にしたよ。メンションなしでも全部拾うから覚悟しな。";
const AUTO_REPLY_OFF: &str = "このチャンネルの自動返信を OFF にしたよ。用があるならメンションしてね。";
const HISTORY_CLEARED: &str = "このチャンネルの会話履歴を忘れたよ。";

/// Fixed wording and limits for generated replies.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub system_prompt: String,
    pub error_prefix: String,
    pub empty_reply_placeholder: String,
    pub timeout: Duration,
}

impl RelaySettings {
    #[must_use]
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            system_prompt: config.chat.system_prompt.clone(),
            error_prefix: config.chat.error_prefix.clone(),
            empty_reply_placeholder: config.chat.empty_reply_placeholder.clone(),
            timeout: config.completion.timeout(),
        }
    }
}

/// Process-lifetime conversation state.
#[derive(Debug)]
pub struct RelayState {
    pub history: HistoryStore,
    pub modes: ChannelModeRegistry,
}

impl RelayState {
    #[must_use]
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            history: HistoryStore::new(max_exchanges),
            modes: ChannelModeRegistry::new(),
        }
    }
}

/// Terminal state of one handled event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored(IgnoreReason),
    /// A control command ran; `confirmed` is false when the confirmation
    /// could not be sent.
    Command {
        command: ControlCommand,
        confirmed: bool,
    },
    /// Reply sent and exchange committed.
    Delivered,
    /// Completion succeeded but the platform refused the reply; nothing committed.
    Undelivered,
    /// Completion failed or timed out; nothing committed.
    Failed,
}

pub struct RelayDispatcher {
    settings: RelaySettings,
    state: RelayState,
    provider: Arc<dyn CompletionProvider>,
    outbound: Arc<dyn ChannelOutbound>,
    /// One lock per channel, held from snapshot through commit.
    channel_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RelayDispatcher {
    pub fn new(
        settings: RelaySettings,
        state: RelayState,
        provider: Arc<dyn CompletionProvider>,
        outbound: Arc<dyn ChannelOutbound>,
    ) -> Self {
        Self {
            settings,
            state,
            provider,
            outbound,
            channel_locks: DashMap::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &RelayState {
        &self.state
    }

    /// Handle one inbound message to completion.
    pub async fn handle(&self, message: InboundMessage) -> Outcome {
        let channel_id = message.channel_id.as_str();
        match decide(&message, &self.state.modes) {
            Decision::Ignore(reason) => {
                debug!(channel_id, ?reason, "message ignored");
                Outcome::Ignored(reason)
            },
            Decision::Command(command) => self.run_command(channel_id, command).await,
            Decision::Respond { user_input } => {
                let lock = self.channel_lock(channel_id);
                let _guard = lock.lock().await;
                self.generate(channel_id, user_input).await
            },
        }
    }

    fn channel_lock(&self, channel_id: &str) -> Arc<Mutex<()>> {
        self.channel_locks
            .entry(channel_id.to_string())
            .or_default()
            .clone()
    }

    async fn run_command(&self, channel_id: &str, command: ControlCommand) -> Outcome {
        let reply = match command {
            ControlCommand::ToggleChannel => {
                let active = self.state.modes.toggle(channel_id);
                info!(channel_id, active, "auto-reply toggled");
                if active {
                    AUTO_REPLY_ON
                } else {
                    AUTO_REPLY_OFF
                }
            },
            ControlCommand::ClearHistory => {
                // Wait for any in-flight exchange so it cannot land after the clear.
                let lock = self.channel_lock(channel_id);
                let _guard = lock.lock().await;
                let dropped = self.state.history.clear(channel_id);
                info!(channel_id, dropped, "history cleared");
                HISTORY_CLEARED
            },
        };

        let confirmed = self.send(channel_id, reply).await;
        Outcome::Command { command, confirmed }
    }

    /// Caller holds the channel lock.
    async fn generate(&self, channel_id: &str, user_input: String) -> Outcome {
        let history = self.state.history.snapshot(channel_id);
        let user_turn = Turn::user(user_input);

        let mut payload = Vec::with_capacity(history.len() + 2);
        payload.push(Turn::system(self.settings.system_prompt.as_str()));
        payload.extend(history);
        payload.push(user_turn.clone());

        debug!(
            channel_id,
            provider = self.provider.name(),
            model = self.provider.id(),
            turns = payload.len(),
            "requesting completion"
        );

        match self.complete_with_typing(channel_id, &payload).await {
            Ok(response) => {
                let text = self.reply_text(response);
                if let Err(error) = self.outbound.send_text(channel_id, &text).await {
                    warn!(channel_id, %error, "failed to deliver reply");
                    let notice = format!("{}{error}", self.settings.error_prefix);
                    self.send(channel_id, &notice).await;
                    return Outcome::Undelivered;
                }
                self.state
                    .history
                    .commit_exchange(channel_id, user_turn, Turn::assistant(text));
                Outcome::Delivered
            },
            Err(error) => {
                warn!(channel_id, %error, "completion failed");
                let notice = format!("{}{error}", self.settings.error_prefix);
                self.send(channel_id, &notice).await;
                Outcome::Failed
            },
        }
    }

    /// Run the bounded completion call while a separate task keeps the typing
    /// indicator alive. A stalled typing request never delays the completion.
    async fn complete_with_typing(
        &self,
        channel_id: &str,
        payload: &[Turn],
    ) -> Result<CompletionResponse, ServiceError> {
        let (done_tx, mut done_rx) = oneshot::channel::<()>();
        let outbound = Arc::clone(&self.outbound);
        let typing_channel = channel_id.to_string();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    res = outbound.send_typing(&typing_channel) => {
                        if let Err(error) = res {
                            debug!(channel_id = %typing_channel, %error, "typing indicator failed");
                        }
                    },
                    _ = &mut done_rx => break,
                }
                tokio::select! {
                    _ = tokio::time::sleep(TYPING_REFRESH) => {},
                    _ = &mut done_rx => break,
                }
            }
        });

        let timeout = self.settings.timeout;
        let result = tokio::time::timeout(timeout, self.provider.complete(payload))
            .await
            .unwrap_or(Err(ServiceError::Timeout { after: timeout }));
        let _ = done_tx.send(());
        result
    }

    fn reply_text(&self, response: CompletionResponse) -> String {
        match response.text {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                debug!("empty completion, using placeholder");
                self.settings.empty_reply_placeholder.clone()
            },
        }
    }

    async fn send(&self, channel_id: &str, text: &str) -> bool {
        match self.outbound.send_text(channel_id, text).await {
            Ok(()) => true,
            Err(error) => {
                warn!(channel_id, %error, "failed to send message");
                false
            },
        }
    }
}
