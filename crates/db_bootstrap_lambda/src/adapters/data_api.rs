use async_trait::async_trait;
use aws_sdk_rdsdata::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_rdsdata::operation::execute_statement::{
    ExecuteStatementError, ExecuteStatementOutput,
};
use aws_sdk_rdsdata::operation::RequestId;
use aws_sdk_rdsdata::types::{ArrayValue as SdkArrayValue, Field};
use db_bootstrap_core::contract::{
    ArrayValue, FieldValue, ResponseMetadata, StatementOutput, StatementRequest,
};
use db_bootstrap_core::error::BootstrapError;

/// Stateless statement execution: every call stands alone, no session is held.
#[async_trait]
pub trait StatementApi: Send + Sync {
    async fn execute_statement(
        &self,
        request: &StatementRequest,
    ) -> Result<StatementOutput, BootstrapError>;
}

pub struct AwsDataApi {
    client: aws_sdk_rdsdata::Client,
}

impl AwsDataApi {
    pub fn new(client: aws_sdk_rdsdata::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatementApi for AwsDataApi {
    async fn execute_statement(
        &self,
        request: &StatementRequest,
    ) -> Result<StatementOutput, BootstrapError> {
        let output = self
            .client
            .execute_statement()
            .secret_arn(&request.secret_arn)
            .resource_arn(&request.resource_arn)
            .sql(&request.sql)
            .database(&request.database)
            .send()
            .await
            .map_err(|error| classify_error(error.into_service_error()))?;

        convert_output(&output)
    }
}

fn convert_output(output: &ExecuteStatementOutput) -> Result<StatementOutput, BootstrapError> {
    Ok(StatementOutput {
        number_of_records_updated: output.number_of_records_updated(),
        generated_fields: output
            .generated_fields()
            .iter()
            .map(convert_field)
            .collect::<Result<Vec<_>, _>>()?,
        records: output
            .records()
            .iter()
            .map(|row| row.iter().map(convert_field).collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()?,
        response_metadata: response_metadata(output.request_id()),
    })
}

fn response_metadata(request_id: Option<&str>) -> Option<ResponseMetadata> {
    request_id.map(|request_id| ResponseMetadata {
        request_id: request_id.to_string(),
    })
}

fn convert_field(field: &Field) -> Result<FieldValue, BootstrapError> {
    Ok(match field {
        Field::IsNull(value) => FieldValue::IsNull(*value),
        Field::BooleanValue(value) => FieldValue::BooleanValue(*value),
        Field::LongValue(value) => FieldValue::LongValue(*value),
        Field::DoubleValue(value) => FieldValue::DoubleValue(*value),
        Field::StringValue(value) => FieldValue::StringValue(value.clone()),
        Field::BlobValue(blob) => FieldValue::BlobValue(blob.as_ref().to_vec()),
        Field::ArrayValue(array) => FieldValue::ArrayValue(convert_array(array)?),
        other => return Err(unsupported_shape(other)),
    })
}

fn convert_array(array: &SdkArrayValue) -> Result<ArrayValue, BootstrapError> {
    Ok(match array {
        SdkArrayValue::BooleanValues(values) => ArrayValue::BooleanValues(values.clone()),
        SdkArrayValue::LongValues(values) => ArrayValue::LongValues(values.clone()),
        SdkArrayValue::DoubleValues(values) => ArrayValue::DoubleValues(values.clone()),
        SdkArrayValue::StringValues(values) => ArrayValue::StringValues(values.clone()),
        SdkArrayValue::ArrayValues(values) => ArrayValue::ArrayValues(
            values
                .iter()
                .map(|value| value.as_ref().map(convert_array).transpose())
                .collect::<Result<Vec<_>, _>>()?,
        ),
        other => return Err(unsupported_shape(other)),
    })
}

fn unsupported_shape(shape: &impl std::fmt::Debug) -> BootstrapError {
    BootstrapError::DataApi {
        code: "UnsupportedFieldType".to_string(),
        message: format!("data api returned a value this client cannot represent: {shape:?}"),
    }
}

fn classify_error(error: ExecuteStatementError) -> BootstrapError {
    BootstrapError::DataApi {
        code: error.code().unwrap_or("Unhandled").to_string(),
        message: DisplayErrorContext(&error).to_string(),
    }
}
