use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one uploaded document: 128 random bits rendered as 32
/// lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub const LENGTH: usize = 32;

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        if value.len() != Self::LENGTH {
            return Err(format!(
                "Document id must be {} characters long",
                Self::LENGTH
            ));
        }

        if !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("Document id must contain only hexadecimal characters".to_string());
        }

        Uuid::try_parse(value)
            .map(Self)
            .map_err(|e| format!("Invalid document id: {}", e))
    }

    pub fn as_string(&self) -> String {
        self.0.simple().to_string()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl std::str::FromStr for DocumentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.as_string()
    }
}
