use super::contact::ContactData;

#[derive(thiserror::Error, Debug)]
#[error("contact payload codec error: {0}")]
pub struct CodecError(#[from] pub serde_json::Error);

/// Turns contact data into the opaque payload sent to the remote and back.
pub trait PayloadCodec: Send + Sync {
	fn encode(&self, data: &ContactData) -> Result<String, CodecError>;

	fn decode(&self, payload: &str) -> Result<ContactData, CodecError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl PayloadCodec for JsonCodec {
	fn encode(&self, data: &ContactData) -> Result<String, CodecError> {
		serde_json::to_string(data).map_err(Into::into)
	}

	fn decode(&self, payload: &str) -> Result<ContactData, CodecError> {
		serde_json::from_str(payload).map_err(Into::into)
	}
}
