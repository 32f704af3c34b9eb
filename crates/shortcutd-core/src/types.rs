//! Domain types: shortcut descriptors and request batches

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Placeholder token in a batch name template, replaced with the
/// descriptor's display name when building the pinned label.
pub const NAME_TEMPLATE_TOKEN: &str = "$sh$";

/// One shortcut's name/icon/action triple. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutDescriptor {
    /// Human-readable name, also used to derive the platform shortcut id
    pub display_name: String,
    /// Opaque reference to the icon resource (path or handle)
    pub icon_ref: String,
    /// URI invoked when the pinned shortcut is launched
    pub action_link: String,
}

/// One user-approved set of shortcuts submitted together.
///
/// The descriptor list is consumed front-to-back as the job progresses;
/// everything else is fixed context for the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutBatch {
    /// Identifies the requesting device/session, prefixed onto shortcut ids
    pub device_label: String,
    /// Label template carrying [`NAME_TEMPLATE_TOKEN`]
    pub name_template: String,
    pub shortcuts: VecDeque<ShortcutDescriptor>,
}

impl ShortcutBatch {
    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty()
    }

    /// Take the next descriptor to attempt, in supplied order.
    pub fn pop_next(&mut self) -> Option<ShortcutDescriptor> {
        self.shortcuts.pop_front()
    }

    /// Render the pinned label for a descriptor by substituting the
    /// template token with its display name.
    pub fn render_label(&self, descriptor: &ShortcutDescriptor) -> String {
        self.name_template
            .replace(NAME_TEMPLATE_TOKEN, &descriptor.display_name)
    }

    /// Platform shortcut id: device label concatenated with the display
    /// name, so the same action pinned for two devices stays distinct.
    pub fn shortcut_id(&self, descriptor: &ShortcutDescriptor) -> String {
        format!("{}{}", self.device_label, descriptor.display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str) -> ShortcutDescriptor {
        ShortcutDescriptor {
            display_name: name.to_string(),
            icon_ref: format!("/icons/{name}.png"),
            action_link: format!("udp://10.0.0.2:8721/{name}"),
        }
    }

    fn batch(names: &[&str]) -> ShortcutBatch {
        ShortcutBatch {
            device_label: "Lounge - ".to_string(),
            name_template: "Lounge $sh$".to_string(),
            shortcuts: names.iter().map(|n| descriptor(n)).collect(),
        }
    }

    #[test]
    fn test_pop_next_is_fifo() {
        let mut b = batch(&["Power", "Mute"]);
        assert_eq!(b.pop_next().unwrap().display_name, "Power");
        assert_eq!(b.pop_next().unwrap().display_name, "Mute");
        assert!(b.pop_next().is_none());
        assert!(b.is_empty());
    }

    #[test]
    fn test_render_label_substitutes_token() {
        let b = batch(&["Power"]);
        let d = descriptor("Power");
        assert_eq!(b.render_label(&d), "Lounge Power");
    }

    #[test]
    fn test_render_label_without_token_is_verbatim() {
        let mut b = batch(&["Power"]);
        b.name_template = "Fixed name".to_string();
        let d = descriptor("Power");
        assert_eq!(b.render_label(&d), "Fixed name");
    }

    #[test]
    fn test_shortcut_id_concatenates_device_and_name() {
        let b = batch(&["Power"]);
        let d = descriptor("Power");
        assert_eq!(b.shortcut_id(&d), "Lounge - Power");
    }

    #[test]
    fn test_batch_wire_format_is_camel_case() {
        let json = r#"{
            "deviceLabel": "Lounge - ",
            "nameTemplate": "Lounge $sh$",
            "shortcuts": [
                {"displayName": "Power", "iconRef": "/i/p.png", "actionLink": "udp://h:1/p"}
            ]
        }"#;
        let b: ShortcutBatch = serde_json::from_str(json).unwrap();
        assert_eq!(b.device_label, "Lounge - ");
        assert_eq!(b.shortcuts.len(), 1);
        assert_eq!(b.shortcuts[0].display_name, "Power");

        let out = serde_json::to_string(&b.shortcuts[0]).unwrap();
        assert!(out.contains("\"displayName\""));
        assert!(out.contains("\"actionLink\""));
    }
}
