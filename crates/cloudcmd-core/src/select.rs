//! Output selection.
//!
//! A selector is a typed function from the response (and the bound input)
//! to the value a command emits. The shell surface exposes three forms:
//! `*` for the whole response, a field name for one top-level response
//! field, and `^Param` to echo a bound input value back. Field and
//! parameter names are validated against the operation descriptor when the
//! selector is constructed, before anything is bound or sent.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::context::BoundContext;
use crate::descriptor::OperationDescriptor;
use crate::error::{InvokeError, InvokeResult};

type SelectFn<R> = dyn Fn(&R, &BoundContext) -> InvokeResult<Value> + Send + Sync;

/// Chooses what part of a response becomes the command output.
pub struct OutputSelector<R> {
    expression: String,
    select: Arc<SelectFn<R>>,
}

impl<R> Clone for OutputSelector<R> {
    fn clone(&self) -> Self {
        Self {
            expression: self.expression.clone(),
            select: Arc::clone(&self.select),
        }
    }
}

impl<R> fmt::Debug for OutputSelector<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSelector")
            .field("expression", &self.expression)
            .finish()
    }
}

impl<R: Serialize> OutputSelector<R> {
    /// The unmodified response, serialized.
    pub fn whole_response() -> Self {
        Self {
            expression: "*".to_string(),
            select: Arc::new(|response, _| Ok(serde_json::to_value(response)?)),
        }
    }

    /// One top-level response field, validated against the descriptor.
    pub fn field(descriptor: &OperationDescriptor, name: &str) -> InvokeResult<Self> {
        if !descriptor.has_response_field(name) {
            return Err(InvokeError::InvalidSelect {
                expression: name.to_string(),
                reason: format!(
                    "the {} response has no field by that name",
                    descriptor.operation
                ),
            });
        }
        Ok(Self::field_unchecked(name))
    }

    /// Echo of one bound input value (the pass-through form), validated
    /// against the declared parameter set.
    pub fn input_parameter(descriptor: &OperationDescriptor, name: &str) -> InvokeResult<Self> {
        let canonical = descriptor
            .resolve(name)
            .map(|spec| spec.name.to_string())
            .ok_or_else(|| InvokeError::InvalidSelect {
                expression: format!("^{name}"),
                reason: format!("{} declares no such parameter", descriptor.operation),
            })?;
        Ok(Self {
            expression: format!("^{name}"),
            select: Arc::new(move |_, ctx| {
                Ok(ctx.value(&canonical).cloned().unwrap_or(Value::Null))
            }),
        })
    }

    /// Caller-supplied typed selection function.
    pub fn custom(
        expression: impl Into<String>,
        select: impl Fn(&R, &BoundContext) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            expression: expression.into(),
            select: Arc::new(move |response, ctx| Ok(select(response, ctx))),
        }
    }

    /// Parse a shell select expression against a descriptor.
    pub fn parse(descriptor: &OperationDescriptor, expression: &str) -> InvokeResult<Self> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(InvokeError::InvalidSelect {
                expression: expression.to_string(),
                reason: "expression is empty".to_string(),
            });
        }
        if trimmed == "*" {
            return Ok(Self::whole_response());
        }
        if let Some(param) = trimmed.strip_prefix('^') {
            return Self::input_parameter(descriptor, param);
        }
        Self::field(descriptor, trimmed)
    }

    /// The descriptor's documented default: the designated field if one is
    /// named, otherwise the whole response.
    pub fn default_for(descriptor: &OperationDescriptor) -> Self {
        match descriptor.default_select {
            Some(name) => Self::field_unchecked(name),
            None => Self::whole_response(),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn apply(&self, response: &R, ctx: &BoundContext) -> InvokeResult<Value> {
        (self.select)(response, ctx)
    }

    // Descriptor defaults are authored alongside their response field list,
    // so the default path skips re-validation.
    fn field_unchecked(name: &str) -> Self {
        let field = name.to_string();
        Self {
            expression: name.to_string(),
            select: Arc::new(move |response, _| {
                let serialized = serde_json::to_value(response)?;
                Ok(serialized.get(&field).cloned().unwrap_or(Value::Null))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::ConfirmImpact;
    use crate::context::ContextBuilder;
    use crate::descriptor::{ParamKind, ParamSpec};
    use serde_json::json;

    #[derive(Serialize)]
    struct Response {
        #[serde(rename = "Fleet")]
        fleet: Value,
        #[serde(rename = "Arn")]
        arn: String,
    }

    static DESCRIPTOR: OperationDescriptor = OperationDescriptor {
        service: "test",
        operation: "CreateFleet",
        parameters: &[ParamSpec::new("Name", ParamKind::String).required()],
        response_fields: &["Fleet", "Arn"],
        default_select: Some("Fleet"),
        confirm_impact: ConfirmImpact::None,
    };

    fn response() -> Response {
        Response {
            fleet: json!({"Id": "f-1"}),
            arn: "arn:aws:test:::fleet/f-1".to_string(),
        }
    }

    fn ctx() -> BoundContext {
        let mut builder = ContextBuilder::new();
        builder.bind("Name", json!("Fleet-A"));
        builder.freeze()
    }

    #[test]
    fn whole_response_is_unmodified() {
        let selector = OutputSelector::<Response>::parse(&DESCRIPTOR, "*").unwrap();
        let out = selector.apply(&response(), &ctx()).unwrap();
        assert_eq!(
            out,
            json!({"Fleet": {"Id": "f-1"}, "Arn": "arn:aws:test:::fleet/f-1"})
        );
    }

    #[test]
    fn default_selects_documented_field() {
        let selector = OutputSelector::<Response>::default_for(&DESCRIPTOR);
        let out = selector.apply(&response(), &ctx()).unwrap();
        assert_eq!(out, json!({"Id": "f-1"}));
    }

    #[test]
    fn named_field_and_input_echo() {
        let selector = OutputSelector::<Response>::parse(&DESCRIPTOR, "Arn").unwrap();
        let out = selector.apply(&response(), &ctx()).unwrap();
        assert_eq!(out, json!("arn:aws:test:::fleet/f-1"));

        let echo = OutputSelector::<Response>::parse(&DESCRIPTOR, "^Name").unwrap();
        let out = echo.apply(&response(), &ctx()).unwrap();
        assert_eq!(out, json!("Fleet-A"));
    }

    #[test]
    fn invalid_expressions_fail_at_construction() {
        let err = OutputSelector::<Response>::parse(&DESCRIPTOR, "Nope").unwrap_err();
        assert!(err.is_configuration());
        let err = OutputSelector::<Response>::parse(&DESCRIPTOR, "^Nope").unwrap_err();
        assert!(err.is_configuration());
        let err = OutputSelector::<Response>::parse(&DESCRIPTOR, "  ").unwrap_err();
        assert!(err.is_configuration());
    }
}
