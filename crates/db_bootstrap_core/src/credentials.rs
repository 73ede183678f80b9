use serde::{Deserialize, Deserializer};

use crate::error::BootstrapError;

/// Connection parameters read from an RDS-managed secret.
///
/// Unknown keys in the secret (`engine`, `dbClusterIdentifier`, ...) are ignored.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialBundle {
    pub host: String,
    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    #[serde(rename = "dbname")]
    pub database: String,
}

impl CredentialBundle {
    pub fn from_secret_string(secret: &str) -> Result<Self, BootstrapError> {
        serde_json::from_str(secret).map_err(BootstrapError::MalformedCredentials)
    }
}

impl std::fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

// The secret rotation template stores the port as a number, hand-made secrets
// often hold it as a string.
fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortValue {
        Number(u16),
        Text(String),
    }

    match PortValue::deserialize(deserializer)? {
        PortValue::Number(port) => Ok(port),
        PortValue::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port '{text}'"))),
    }
}
