use std::{collections::HashSet, sync::RwLock};

/// Channels in auto-reply mode, where every qualifying message gets an
/// answer instead of only mentions.
///
/// Independent of the history store: switching a channel off keeps its window.
#[derive(Debug, Default)]
pub struct ChannelModeRegistry {
    active: RwLock<HashSet<String>>,
}

impl ChannelModeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the channel's mode and return the new state (`true` = auto-reply on).
    pub fn toggle(&self, channel_id: &str) -> bool {
        let mut active = self.active.write().unwrap_or_else(|e| e.into_inner());
        if active.remove(channel_id) {
            false
        } else {
            active.insert(channel_id.to_string());
            true
        }
    }

    #[must_use]
    pub fn is_active(&self, channel_id: &str) -> bool {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(channel_id)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_reports_new_state() {
        let modes = ChannelModeRegistry::new();
        assert!(!modes.is_active("d"));
        assert!(modes.toggle("d"));
        assert!(modes.is_active("d"));
        assert!(!modes.toggle("d"));
        assert!(!modes.is_active("d"));
    }

    #[test]
    fn double_toggle_restores_original_state() {
        let modes = ChannelModeRegistry::new();
        modes.toggle("on");
        for channel in ["on", "off"] {
            let before = modes.is_active(channel);
            modes.toggle(channel);
            modes.toggle(channel);
            assert_eq!(modes.is_active(channel), before);
        }
    }

    #[test]
    fn channels_toggle_independently() {
        let modes = ChannelModeRegistry::new();
        modes.toggle("a");
        assert!(modes.is_active("a"));
        assert!(!modes.is_active("b"));
        assert_eq!(modes.active_count(), 1);
    }
}
