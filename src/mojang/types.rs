use serde::Deserialize;

/// Response of the Mojang username lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct MojangProfile {
    pub id: String,
    pub name: String,
}
