use serde::{Deserialize, Serialize};

use crate::error::BootstrapError;

pub const SUCCESS_STATUS_CODE: u16 = 200;

/// One call to the data API: which secret to authenticate with, which cluster
/// to run against, and the literal SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRequest {
    pub secret_arn: String,
    pub resource_arn: String,
    pub sql: String,
    pub database: String,
}

/// Data API result of a single statement, serialized with the API's own
/// field names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatementOutput {
    pub number_of_records_updated: i64,
    #[serde(default)]
    pub generated_fields: Vec<FieldValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<Vec<FieldValue>>,
    #[serde(
        rename = "ResponseMetadata",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseMetadata {
    #[serde(rename = "RequestId")]
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    IsNull(bool),
    BooleanValue(bool),
    LongValue(i64),
    DoubleValue(f64),
    StringValue(String),
    BlobValue(#[serde(with = "base64_blob")] Vec<u8>),
    ArrayValue(ArrayValue),
}

/// Array elements may be SQL NULL, rendered as JSON `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ArrayValue {
    BooleanValues(Vec<Option<bool>>),
    LongValues(Vec<Option<i64>>),
    DoubleValues(Vec<Option<f64>>),
    StringValues(Vec<Option<String>>),
    ArrayValues(Vec<Option<ArrayValue>>),
}

/// Lambda proxy-integration response returned by the data API function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl ProxyResponse {
    pub fn success(output: &StatementOutput) -> Result<Self, BootstrapError> {
        Ok(Self {
            status_code: SUCCESS_STATUS_CODE,
            body: serde_json::to_string(output).map_err(BootstrapError::Serialization)?,
        })
    }
}

mod base64_blob {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: impl AsRef<[u8]>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}
