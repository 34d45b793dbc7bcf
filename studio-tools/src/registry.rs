//! Ordered registry of tool descriptors and their implementations.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::call::CallContext;
use crate::error::{ToolError, ToolResult};
use crate::schema::ArgumentSchema;

const MAX_NAME_LEN: usize = 64;

/// Public description of a tool: name, summary and argument schema.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    schema: ArgumentSchema,
}

impl ToolDescriptor {
    /// Creates a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidDescriptor`] if the name is empty, longer
    /// than 64 characters or contains anything other than lowercase ASCII
    /// letters, digits and underscores, or if the description is blank.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ArgumentSchema,
    ) -> ToolResult<Self> {
        let name = name.into();
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(ToolError::InvalidDescriptor {
                reason: format!("tool name must be 1-{MAX_NAME_LEN} characters"),
            });
        }
        if !name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
        {
            return Err(ToolError::InvalidDescriptor {
                reason: format!("tool name `{name}` must be snake_case ASCII"),
            });
        }

        let description = description.into();
        if description.trim().is_empty() {
            return Err(ToolError::InvalidDescriptor {
                reason: format!("tool `{name}` needs a description"),
            });
        }

        Ok(Self {
            name,
            description,
            schema,
        })
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the argument schema.
    #[must_use]
    pub fn schema(&self) -> &ArgumentSchema {
        &self.schema
    }

    /// Wire form returned by discovery: `{name, description, inputSchema}`.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.schema.to_json_schema(),
        })
    }
}

/// Trait implemented by tool executors.
///
/// `args` has already been validated and normalised against the descriptor's
/// schema when `invoke` runs.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Invokes the tool, returning its JSON result.
    async fn invoke(&self, ctx: CallContext, args: Value) -> ToolResult<Value>;
}

#[async_trait]
impl<F, Fut> Tool for F
where
    F: Send + Sync + Fn(CallContext, Value) -> Fut + 'static,
    Fut: Future<Output = ToolResult<Value>> + Send + 'static,
{
    async fn invoke(&self, ctx: CallContext, args: Value) -> ToolResult<Value> {
        (self)(ctx, args).await
    }
}

/// Handle returned by the registry for direct invocation.
#[derive(Clone)]
pub struct ToolHandle {
    descriptor: ToolDescriptor,
    executor: Arc<dyn Tool>,
}

impl fmt::Debug for ToolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolHandle")
            .field("name", &self.descriptor.name)
            .finish_non_exhaustive()
    }
}

impl ToolHandle {
    /// Returns the associated descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    /// Executes the underlying tool implementation.
    ///
    /// # Errors
    ///
    /// Propagates whatever the implementation returns.
    pub async fn invoke(&self, ctx: CallContext, args: Value) -> ToolResult<Value> {
        self.executor.invoke(ctx, args).await
    }
}

/// Registry that stores tool implementations in registration order.
///
/// Built once at start-up and shared read-only afterwards.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<ToolHandle>,
    index: HashMap<String, usize>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.entries.iter().map(|h| h.descriptor.name()).collect();
        f.debug_struct("ToolRegistry")
            .field("registered", &names)
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool implementation.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateTool`] if the name is already present.
    pub fn register_tool<T>(&mut self, descriptor: ToolDescriptor, tool: T) -> ToolResult<()>
    where
        T: Tool + 'static,
    {
        self.register_arc(descriptor, Arc::new(tool))
    }

    /// Registers a shared tool implementation.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateTool`] if the name is already present.
    pub fn register_arc(
        &mut self,
        descriptor: ToolDescriptor,
        tool: Arc<dyn Tool>,
    ) -> ToolResult<()> {
        let name = descriptor.name().to_owned();
        if self.index.contains_key(&name) {
            return Err(ToolError::DuplicateTool { name });
        }

        self.index.insert(name, self.entries.len());
        self.entries.push(ToolHandle {
            descriptor,
            executor: tool,
        });
        Ok(())
    }

    /// Returns a handle to the tool matching the supplied name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolHandle> {
        self.index.get(name).map(|idx| &self.entries[*idx])
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.entries.iter().map(ToolHandle::descriptor)
    }

    /// Wire-form descriptors in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<Value> {
        self.descriptors().map(ToolDescriptor::to_wire).collect()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
