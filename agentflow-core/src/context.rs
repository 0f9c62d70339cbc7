//! Shared context carried between flow nodes.

use std::collections::HashMap;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    error::{FlowError, Result},
    message::{Conversation, Message},
};

/// Context passed from node to node while a flow runs.
///
/// Holds the conversation being built up with the model, a JSON blackboard
/// for intermediate results, and free-form metadata.
#[derive(Clone, Debug, Default)]
pub struct Context {
    conversation: Conversation,
    json_data: HashMap<String, Value>,
    metadata: HashMap<String, Value>,
}

impl Context {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context seeded with a conversation.
    pub fn with_conversation(conversation: Conversation) -> Self {
        Self {
            conversation,
            ..Default::default()
        }
    }

    /// The conversation so far.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Append a message to the conversation.
    pub fn push_message(&mut self, message: Message) {
        self.conversation.push(message);
    }

    /// Take the conversation out, leaving an empty one behind.
    pub fn take_conversation(&mut self) -> Conversation {
        std::mem::take(&mut self.conversation)
    }

    /// Set JSON data by key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
        let json_value = serde_json::to_value(value)?;
        self.json_data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get JSON data by key and deserialize it.
    pub fn get_json<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.json_data
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(FlowError::from)
    }

    /// Get JSON data by key, failing when it is absent.
    pub fn require<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.get_json(key)?
            .ok_or_else(|| FlowError::context(format!("missing key: {key}")))
    }

    /// Get raw JSON value by key.
    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.json_data.get(key)
    }

    /// Remove JSON data by key.
    pub fn remove_json(&mut self, key: &str) -> Option<Value> {
        self.json_data.remove(key)
    }

    /// Check if JSON data exists by key.
    pub fn contains_json(&self, key: &str) -> bool {
        self.json_data.contains_key(key)
    }

    /// Set metadata.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
        let json_value = serde_json::to_value(value)?;
        self.metadata.insert(key.into(), json_value);
        Ok(())
    }

    /// Get metadata.
    pub fn get_metadata<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.metadata
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(FlowError::from)
    }

    /// Convert the JSON blackboard to a single JSON object.
    pub fn to_json(&self) -> Result<Value> {
        serde_json::to_value(&self.json_data).map_err(FlowError::from)
    }
}

/// Builder for creating contexts with initial data.
#[derive(Default)]
pub struct ContextBuilder {
    context: Context,
}

impl ContextBuilder {
    /// Create a new context builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the initial conversation.
    pub fn message(mut self, message: Message) -> Self {
        self.context.push_message(message);
        self
    }

    /// Set JSON data.
    pub fn with_json(mut self, key: impl Into<String>, value: impl Serialize) -> Result<Self> {
        self.context.set(key, value)?;
        Ok(self)
    }

    /// Set metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Result<Self> {
        self.context.set_metadata(key, value)?;
        Ok(self)
    }

    /// Build the context.
    pub fn build(self) -> Context {
        self.context
    }
}
