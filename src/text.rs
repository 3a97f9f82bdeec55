//! Message-key resolution. The core passes opaque keys around; this turns
//! them into display strings at the presentation edge, with English built-ins
//! and per-key overrides for localization.

use std::collections::HashMap;

use crate::validate::MessageKey;

fn builtin(key: &str) -> Option<&'static str> {
    Some(match key {
        "EmptyBranchName" => "Branch name is required",
        "BadBranchName" => "Branch name contains invalid characters",
        "DuplicatedBranchName" => "A branch with the same name already exists",
        "EmptyTagName" => "Tag name is required",
        "BadTagName" => "Tag name contains invalid characters",
        "DuplicatedTagName" => "A tag with the same name already exists",
        "EmptyRemoteName" => "Remote name is required",
        "BadRemoteName" => "Remote name contains invalid characters",
        "DuplicatedRemoteName" => "A remote with the same name already exists",
        "EmptyCommitMessage" => "Commit message is required",
        "BadPatchFile" => "Patch file does not exist",
        "BadCloneFolder" => "Clone folder does not exist",
        "BadSubmodulePath" => "Invalid submodule path",
        "BadRemoteUri" => "Invalid remote URL",
        "GitFlow.StartFeatureTitle" => "Start Feature Branch",
        "GitFlow.StartReleaseTitle" => "Start Release Branch",
        "GitFlow.StartHotfixTitle" => "Start Hotfix Branch",
        "CreateBranchTitle" => "Create Branch",
        "CreateTagTitle" => "Create Tag",
        "AddRemoteTitle" => "Add Remote",
        "RenameRemoteTitle" => "Rename Remote",
        _ => return None,
    })
}

/// Resolves message/title keys to display strings.
#[derive(Default)]
pub struct TextResolver {
    overrides: HashMap<String, String>,
}

impl TextResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the translation for one key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.overrides.insert(key.into(), value.into());
    }

    /// Resolve a key: override, then built-in, then the key itself so a
    /// missing translation is visible rather than blank.
    pub fn text(&self, key: &str) -> String {
        if let Some(value) = self.overrides.get(key) {
            return value.clone();
        }
        builtin(key)
            .map(|s| s.to_string())
            .unwrap_or_else(|| key.to_string())
    }

    pub fn message(&self, key: MessageKey) -> String {
        self.text(key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_and_override() {
        let mut resolver = TextResolver::new();
        assert_eq!(resolver.text("EmptyBranchName"), "Branch name is required");

        resolver.set("EmptyBranchName", "Le nom de branche est requis");
        assert_eq!(resolver.text("EmptyBranchName"), "Le nom de branche est requis");
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        let resolver = TextResolver::new();
        assert_eq!(resolver.text("No.Such.Key"), "No.Such.Key");
    }

    #[test]
    fn test_message_key_resolution() {
        let resolver = TextResolver::new();
        assert_eq!(
            resolver.message(MessageKey::DuplicatedTagName),
            "A tag with the same name already exists"
        );
    }
}
