//! Per-message response decision.
//!
//! Order matters: loop guards first, then commands, then the addressing
//! check, and finally the empty-input veto, which runs after mention
//! stripping and can override an affirmative addressing decision.

use chatrelay_channels::{InboundMessage, strip_mentions};

use crate::modes::ChannelModeRegistry;

/// Control commands understood by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Flip auto-reply mode for the invoking channel.
    ToggleChannel,
    /// Forget the invoking channel's conversation window.
    ClearHistory,
}

impl ControlCommand {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "channel" => Some(Self::ToggleChannel),
            "clear" => Some(Self::ClearHistory),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ToggleChannel => "channel",
            Self::ClearHistory => "clear",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    OwnMessage,
    OtherBot,
    /// Not mentioned and the channel is not in auto-reply mode.
    NotAddressed,
    /// Nothing left after removing mentions and whitespace.
    EmptyInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Ignore(IgnoreReason),
    Command(ControlCommand),
    Respond { user_input: String },
}

/// Decide what to do with `message`.
///
/// A recognized command never also triggers generation. Unrecognized
/// prefix words are treated as ordinary content.
#[must_use]
pub fn decide(message: &InboundMessage, modes: &ChannelModeRegistry) -> Decision {
    if message.author_is_self {
        return Decision::Ignore(IgnoreReason::OwnMessage);
    }
    if message.author_is_other_bot() {
        return Decision::Ignore(IgnoreReason::OtherBot);
    }

    if let Some(command) = message
        .command
        .as_ref()
        .and_then(|c| ControlCommand::from_name(&c.name))
    {
        return Decision::Command(command);
    }

    if !(message.mentions_self || modes.is_active(&message.channel_id)) {
        return Decision::Ignore(IgnoreReason::NotAddressed);
    }

    let user_input = strip_mentions(&message.content, &message.self_mention_tokens);
    if user_input.is_empty() {
        return Decision::Ignore(IgnoreReason::EmptyInput);
    }

    Decision::Respond { user_input }
}

#[cfg(test)]
mod tests {
    use {super::*, chatrelay_channels::parse_command, rstest::rstest};

    const BOT: &str = "<@42>";

    fn message(content: &str) -> InboundMessage {
        InboundMessage {
            channel_id: "C".into(),
            author_id: "7".into(),
            content: content.into(),
            mentions_self: content.contains(BOT) || content.contains("<@!42>"),
            self_mention_tokens: vec![BOT.into(), "<@!42>".into()],
            command: parse_command("!", content),
            ..Default::default()
        }
    }

    fn respond(input: &str) -> Decision {
        Decision::Respond {
            user_input: input.into(),
        }
    }

    #[rstest]
    #[case("<@42> hi", false)]
    #[case("<@42>", false)]
    #[case("!channel", false)]
    #[case("anything", true)]
    fn own_messages_are_always_ignored(#[case] content: &str, #[case] auto_reply: bool) {
        let modes = ChannelModeRegistry::new();
        if auto_reply {
            modes.toggle("C");
        }
        let mut msg = message(content);
        msg.author_is_self = true;
        msg.author_is_bot = true;
        assert_eq!(decide(&msg, &modes), Decision::Ignore(IgnoreReason::OwnMessage));
    }

    #[test]
    fn other_bots_are_ignored_even_when_mentioning() {
        let modes = ChannelModeRegistry::new();
        let mut msg = message("<@42> ping");
        msg.author_is_bot = true;
        assert_eq!(decide(&msg, &modes), Decision::Ignore(IgnoreReason::OtherBot));
    }

    #[test]
    fn mention_triggers_response_with_stripped_input() {
        let modes = ChannelModeRegistry::new();
        assert_eq!(decide(&message("<@42>  what's up "), &modes), respond("what's up"));
        assert_eq!(decide(&message("hey <@!42> you"), &modes), respond("hey  you"));
    }

    #[test]
    fn unaddressed_message_is_ignored_in_normal_mode() {
        let modes = ChannelModeRegistry::new();
        assert_eq!(
            decide(&message("nice weather"), &modes),
            Decision::Ignore(IgnoreReason::NotAddressed)
        );
    }

    #[test]
    fn auto_reply_answers_without_mention() {
        let modes = ChannelModeRegistry::new();
        modes.toggle("C");
        assert_eq!(decide(&message("nice weather"), &modes), respond("nice weather"));
    }

    #[rstest]
    #[case("<@42>", false)]
    #[case("  <@42>  <@!42> ", false)]
    #[case("<@42>", true)]
    #[case("   ", true)]
    fn empty_after_strip_is_vetoed(#[case] content: &str, #[case] auto_reply: bool) {
        let modes = ChannelModeRegistry::new();
        if auto_reply {
            modes.toggle("C");
        }
        assert_eq!(
            decide(&message(content), &modes),
            Decision::Ignore(IgnoreReason::EmptyInput)
        );
    }

    #[rstest]
    #[case("!channel", ControlCommand::ToggleChannel)]
    #[case("!clear", ControlCommand::ClearHistory)]
    fn commands_win_over_generation(#[case] content: &str, #[case] expected: ControlCommand) {
        let modes = ChannelModeRegistry::new();
        modes.toggle("C");
        assert_eq!(decide(&message(content), &modes), Decision::Command(expected));
    }

    #[test]
    fn unknown_prefix_word_is_plain_content() {
        let modes = ChannelModeRegistry::new();
        modes.toggle("C");
        assert_eq!(decide(&message("!dance"), &modes), respond("!dance"));
    }

    #[test]
    fn command_names_round_trip() {
        for command in [ControlCommand::ToggleChannel, ControlCommand::ClearHistory] {
            assert_eq!(ControlCommand::from_name(command.name()), Some(command));
        }
        assert_eq!(ControlCommand::from_name("Channel"), None);
    }
}
