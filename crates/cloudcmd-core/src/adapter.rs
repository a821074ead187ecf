//! The generic command invocation pipeline.
//!
//! One adapter per operation: bind named arguments (resolving aliases) into
//! an immutable context, run the pre/post-bind hooks, validate required
//! parameters, gate destructive operations, construct the request, issue
//! exactly one service call, and select the output. The adapter holds no
//! state across invocations; the client handle is supplied by the caller on
//! every invocation.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::confirm::{ConfirmGate, ConfirmImpact};
use crate::context::{BoundContext, ContextBuilder};
use crate::descriptor::OperationDescriptor;
use crate::error::{InvokeError, InvokeResult};
use crate::select::OutputSelector;

/// One remote operation: how to build its request and issue its call.
#[async_trait]
pub trait ServiceOperation: Send + Sync {
    type Client: Send + Sync;
    type Request: Send;
    type Response: Serialize + Send;

    fn descriptor(&self) -> &'static OperationDescriptor;

    /// Copy bound values into the request, applying the group-presence
    /// rule: a nested sub-object is included only when at least one of its
    /// members was supplied.
    fn build_request(&self, ctx: &BoundContext) -> InvokeResult<Self::Request>;

    /// Issue the single remote call. Invoked exactly once per invocation;
    /// retries, signing and transport live behind the client handle.
    async fn call(
        &self,
        client: &Self::Client,
        request: Self::Request,
    ) -> InvokeResult<Self::Response>;
}

/// Named arguments supplied by the shell surface for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    entries: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: Value) -> Self {
        self.entries.push((name.into(), value));
        self
    }

    /// Bind only when a value was actually given.
    pub fn set_opt(self, name: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.set(name, value.into()),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.entries.iter()
    }
}

/// Hook allowed to adjust the context builder around binding.
pub type ContextHook = Box<dyn Fn(&mut ContextBuilder) + Send + Sync>;

/// Generic invocation adapter for one [`ServiceOperation`].
pub struct CommandAdapter<O: ServiceOperation> {
    operation: O,
    selector: OutputSelector<O::Response>,
    pre_bind: Option<ContextHook>,
    post_bind: Option<ContextHook>,
}

impl<O: ServiceOperation> CommandAdapter<O> {
    /// Adapter with the operation's documented default selection.
    pub fn new(operation: O) -> Self {
        let selector = OutputSelector::default_for(operation.descriptor());
        Self {
            operation,
            selector,
            pre_bind: None,
            post_bind: None,
        }
    }

    pub fn with_selector(mut self, selector: OutputSelector<O::Response>) -> Self {
        self.selector = selector;
        self
    }

    /// Override selection from a shell expression; invalid expressions fail
    /// here, before anything is bound or sent.
    pub fn with_select_expression(self, expression: &str) -> InvokeResult<Self> {
        let selector = OutputSelector::parse(self.operation.descriptor(), expression)?;
        Ok(self.with_selector(selector))
    }

    /// Hook run on the empty builder before arguments are bound.
    pub fn with_pre_bind(mut self, hook: ContextHook) -> Self {
        self.pre_bind = Some(hook);
        self
    }

    /// Hook run after binding, before the context freezes.
    pub fn with_post_bind(mut self, hook: ContextHook) -> Self {
        self.post_bind = Some(hook);
        self
    }

    pub fn descriptor(&self) -> &'static OperationDescriptor {
        self.operation.descriptor()
    }

    /// Run one invocation end to end. Returns `Ok(None)` when the
    /// confirmation gate declines; the service is not called in that case.
    pub async fn invoke(
        &self,
        client: &O::Client,
        arguments: Arguments,
        gate: &dyn ConfirmGate,
    ) -> InvokeResult<Option<Value>> {
        let descriptor = self.operation.descriptor();

        let mut builder = ContextBuilder::new();
        if let Some(hook) = &self.pre_bind {
            hook(&mut builder);
        }

        for (name, value) in arguments.iter() {
            let spec = descriptor.resolve(name).ok_or_else(|| {
                InvokeError::UnknownParameter {
                    name: name.clone(),
                    operation: descriptor.operation.to_string(),
                }
            })?;
            if !spec.kind.accepts(value) {
                return Err(InvokeError::InvalidParameter {
                    name: spec.name.to_string(),
                    expected: spec.kind.expected(),
                });
            }
            builder.bind(spec.name, value.clone());
        }

        if let Some(hook) = &self.post_bind {
            hook(&mut builder);
        }
        let ctx = builder.freeze();

        descriptor.validate_required(&ctx)?;

        if descriptor.confirm_impact >= ConfirmImpact::Medium {
            let target = confirmation_target(descriptor, &ctx);
            if !gate.should_proceed(descriptor.confirm_impact, descriptor.operation, &target) {
                log::debug!(
                    "{} not confirmed for '{}', skipping call",
                    descriptor.operation,
                    target
                );
                return Ok(None);
            }
        }

        let request = self.operation.build_request(&ctx)?;
        let response = self.operation.call(client, request).await?;
        let selected = self.selector.apply(&response, &ctx)?;
        Ok(Some(selected))
    }
}

/// Short resource description shown in confirmation prompts: the value
/// bound at shell position 0 when there is one.
fn confirmation_target(descriptor: &OperationDescriptor, ctx: &BoundContext) -> String {
    descriptor
        .positional()
        .and_then(|spec| ctx.value(spec.name))
        .and_then(|value| value.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| descriptor.operation.to_string())
}
