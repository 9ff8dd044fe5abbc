use serde::{Deserialize, Serialize};

/// Raw addressing fields as entered by the user. Empty means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchTarget {
    pub user: String,
    pub group: String,
    pub broadcast: String,
}

impl DispatchTarget {
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            user: name.into(),
            ..Self::default()
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self {
            group: name.into(),
            ..Self::default()
        }
    }

    pub fn broadcast() -> Self {
        Self {
            broadcast: "all".to_owned(),
            ..Self::default()
        }
    }

    /// Number of fields that carry a non-blank value.
    pub fn provided(&self) -> usize {
        [&self.user, &self.group, &self.broadcast]
            .into_iter()
            .filter(|field| !field.trim().is_empty())
            .count()
    }

    pub fn addressing_mode(&self, policy: TargetPolicy) -> Result<AddressingMode, TargetError> {
        let provided = self.provided();
        if provided == 0 || (provided > 1 && policy == TargetPolicy::Strict) {
            return Err(TargetError::Ambiguous { provided });
        }

        let user = self.user.trim();
        let group = self.group.trim();

        if !user.is_empty() {
            Ok(AddressingMode::User(user.to_owned()))
        } else if !group.is_empty() {
            Ok(AddressingMode::Group(group.to_owned()))
        } else {
            Ok(AddressingMode::Broadcast)
        }
    }
}

/// Resolved addressing mode of a single outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressingMode {
    User(String),
    Group(String),
    Broadcast,
}

impl AddressingMode {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Group(_) => "group",
            Self::Broadcast => "broadcast",
        }
    }
}

/// How simultaneous target fields are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPolicy {
    /// Exactly one field must be set.
    #[default]
    Strict,
    /// First non-empty field wins, in user > group > broadcast order.
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetError {
    Ambiguous { provided: usize },
}
