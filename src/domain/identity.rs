/// Canonical record for a user or group as reported by the directory service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub id: i64,
    pub display_name: String,
}

impl Identity {
    pub fn new(id: i64, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}
