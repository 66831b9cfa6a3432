use super::value::ConvarType;

/// Errors from text-driven convar updates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvarError {
    #[error("unknown convar `{0}`")]
    UnknownKey(String),

    #[error("malformed override `{0}`, expected name=value")]
    MalformedOverride(String),

    #[error("convar `{name}` expects {expected}, got `{value}`")]
    InvalidValue {
        name: String,
        expected: ConvarType,
        value: String,
    },
}
