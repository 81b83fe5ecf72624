use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A short camera-technique descriptor the user can toggle in and out of
/// the composed prompt. The description backs the help popover.
#[derive(Debug, Clone, Copy)]
pub struct Modifier {
    pub name: &'static str,
    pub description: &'static str,
}

/// Fixed modifier catalog. Names double as the literal prompt tokens, so
/// they must stay stable.
pub const MODIFIERS: &[Modifier] = &[
    Modifier {
        name: "Drone shot",
        description: "Moving aerial view looking down at the subject, good for scale.",
    },
    Modifier {
        name: "Timelapse",
        description: "Frames captured far apart and played at normal speed, compressing time.",
    },
    Modifier {
        name: "Hyperlapse",
        description: "Timelapse where the camera also travels a long distance.",
    },
    Modifier {
        name: "Slow motion",
        description: "Subject motion slower than real time, emphasizing detail.",
    },
    Modifier {
        name: "Cinematic",
        description: "Professional film techniques: shallow depth of field, dramatic lighting, graded color.",
    },
    Modifier {
        name: "Black and white",
        description: "Removes all color, focusing on form and texture.",
    },
    Modifier {
        name: "First-person view",
        description: "Seen through the eyes of the main character.",
    },
    Modifier {
        name: "Dolly zoom",
        description: "Camera moves toward or away from the subject while the lens zooms the opposite way.",
    },
];

/// Looks up a catalog entry by its exact name.
pub fn modifier(name: &str) -> Option<&'static Modifier> {
    MODIFIERS.iter().find(|m| m.name == name)
}

/// The composed prompt. `text` is always the base text followed by the
/// active modifier tokens, comma-joined; toggling a modifier flips
/// membership and recomputes `text` in one step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptState {
    text: String,
    active_modifiers: BTreeSet<String>,
}

impl PromptState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn active_modifiers(&self) -> &BTreeSet<String> {
        &self.active_modifiers
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active_modifiers.contains(name)
    }

    /// Replaces the text wholesale (user edit or enhance overwrite) and
    /// re-derives the active set from the catalog tokens present in it.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.active_modifiers = self
            .text
            .split(',')
            .map(str::trim)
            .filter(|s| modifier(s).is_some())
            .map(str::to_string)
            .collect();
    }

    /// Flips membership of a catalog modifier and recomposes the text.
    /// Unknown names are ignored. Returns whether the modifier is active
    /// after the call.
    pub fn toggle_modifier(&mut self, name: &str) -> bool {
        if modifier(name).is_none() {
            return false;
        }
        let now_active = if self.active_modifiers.remove(name) {
            false
        } else {
            self.active_modifiers.insert(name.to_string());
            true
        };
        self.recompose();
        now_active
    }

    /// Text with all known modifier tokens stripped.
    pub fn base_text(&self) -> String {
        self.text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && modifier(s).is_none())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn recompose(&mut self) {
        let mut parts = vec![self.base_text()];
        parts.extend(self.active_modifiers.iter().cloned());
        self.text = parts
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_appends_token() {
        let mut prompt = PromptState::new();
        prompt.set_text("a cat on a skateboard");
        assert!(prompt.toggle_modifier("Cinematic"));
        assert_eq!(prompt.text(), "a cat on a skateboard, Cinematic");
        assert!(prompt.is_active("Cinematic"));
    }

    #[test]
    fn test_toggle_on_then_off_restores_text() {
        let mut prompt = PromptState::new();
        prompt.set_text("a quiet harbor at dawn");
        let before = prompt.text().to_string();
        prompt.toggle_modifier("Drone shot");
        prompt.toggle_modifier("Drone shot");
        assert_eq!(prompt.text(), before);
        assert!(prompt.active_modifiers().is_empty());
    }

    #[test]
    fn test_unknown_modifier_is_ignored() {
        let mut prompt = PromptState::new();
        prompt.set_text("a cat");
        assert!(!prompt.toggle_modifier("Vertigo effect"));
        assert_eq!(prompt.text(), "a cat");
    }

    #[test]
    fn test_set_text_rederives_active_set() {
        let mut prompt = PromptState::new();
        prompt.set_text("a cat, Timelapse, Slow motion");
        assert!(prompt.is_active("Timelapse"));
        assert!(prompt.is_active("Slow motion"));
        assert_eq!(prompt.base_text(), "a cat");

        prompt.set_text("a dog");
        assert!(prompt.active_modifiers().is_empty());
    }

    #[test]
    fn test_toggle_with_empty_base() {
        let mut prompt = PromptState::new();
        prompt.toggle_modifier("Cinematic");
        assert_eq!(prompt.text(), "Cinematic");
        prompt.toggle_modifier("Cinematic");
        assert_eq!(prompt.text(), "");
    }
}
