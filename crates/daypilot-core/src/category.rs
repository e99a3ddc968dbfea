use serde::{Deserialize, Serialize};

/// Life-domain label attached to every task.
///
/// The bot only ever writes the four fixed labels; anything else found in
/// storage is carried through as-is so hand-edited rows still render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Recovery,
    Core,
    Dynamic,
    Denial,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Recovery => "Recovery",
            Self::Core => "Core",
            Self::Dynamic => "Dynamic",
            Self::Denial => "Denial",
            Self::Other(label) => label,
        }
    }

    /// Position in the fixed display order. Unknown labels sort after the
    /// four known ones, keeping their encounter order.
    pub fn display_rank(&self) -> usize {
        match self {
            Self::Recovery => 0,
            Self::Core => 1,
            Self::Dynamic => 2,
            Self::Denial => 3,
            Self::Other(_) => 4,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        match label {
            "Recovery" => Self::Recovery,
            "Core" => Self::Core,
            "Dynamic" => Self::Dynamic,
            "Denial" => Self::Denial,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Recovery" => Self::Recovery,
            "Core" => Self::Core,
            "Dynamic" => Self::Dynamic,
            "Denial" => Self::Denial,
            _ => Self::Other(label),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}
