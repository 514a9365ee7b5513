//! Multicast message payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;

/// Maximum number of registration tokens the service accepts in a single
/// multicast request.
pub const MAX_REGISTRATION_IDS: usize = 1000;

/// A data message addressed to one or more registration tokens.
///
/// Serializes to the legacy HTTP send format:
///
/// ```json
/// {
///   "data": { "myKey1": "myValue1", "myKey2": "myValue2" },
///   "registration_ids": ["token1", "token2"]
/// }
/// ```
///
/// Both keys are always present, even when empty. Data keys keep the order
/// in which they were first inserted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MulticastMessage {
    #[serde(default)]
    data: Map<String, Value>,
    #[serde(rename = "registration_ids", default)]
    tokens: Vec<String>,
}

impl MulticastMessage {
    /// Create an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a value into the data payload, replacing any previous value
    /// for the key.
    pub fn put_data(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Put a string value into the data payload.
    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.put_data(key, Value::String(value.into()))
    }

    /// Put a boolean value into the data payload.
    pub fn put_bool(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.put_data(key, Value::Bool(value))
    }

    /// Serialize `value` and put it into the data payload.
    pub fn put_serialized<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<&mut Self> {
        let value = serde_json::to_value(value)?;
        Ok(self.put_data(key, value))
    }

    /// Get a data value.
    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// The data payload.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Append a registration token. Duplicates are kept.
    pub fn add_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.tokens.push(token.into());
        self
    }

    /// Remove the first occurrence of `token`. Does nothing if absent.
    pub fn remove_token(&mut self, token: &str) -> &mut Self {
        if let Some(index) = self.tokens.iter().position(|t| t == token) {
            self.tokens.remove(index);
        }
        self
    }

    /// Replace all registration tokens.
    pub fn set_tokens<I, S>(&mut self, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.clear();
        self.tokens.extend(tokens.into_iter().map(Into::into));
        self
    }

    /// Remove all registration tokens.
    pub fn clear_tokens(&mut self) -> &mut Self {
        self.tokens.clear();
        self
    }

    /// Registration tokens in send order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether the token count exceeds [`MAX_REGISTRATION_IDS`].
    pub fn exceeds_recipient_limit(&self) -> bool {
        self.tokens.len() > MAX_REGISTRATION_IDS
    }

    /// Build the JSON request document.
    pub fn to_value(&self) -> Value {
        let mut json = Map::with_capacity(2);
        json.insert("data".to_string(), Value::Object(self.data.clone()));
        json.insert(
            "registration_ids".to_string(),
            Value::Array(self.tokens.iter().cloned().map(Value::String).collect()),
        );
        Value::Object(json)
    }

    /// Build the JSON request text.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
