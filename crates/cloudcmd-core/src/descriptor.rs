//! Static operation metadata.
//!
//! One descriptor per remote operation: the declared parameter set with
//! aliases, kinds and required rules, the top-level response fields a select
//! expression may name, the documented default selection, and the
//! confirmation impact of running the operation. Descriptors are authored as
//! `static` values next to the operation they describe.

use serde_json::Value;

use crate::confirm::ConfirmImpact;
use crate::context::BoundContext;
use crate::error::{InvokeError, InvokeResult};

/// Value kind a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Long,
    Boolean,
    Double,
    StringList,
    DoubleList,
    StringMap,
}

impl ParamKind {
    /// Human-readable kind name used in configuration errors.
    pub fn expected(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "32-bit integer",
            Self::Long => "64-bit integer",
            Self::Boolean => "boolean",
            Self::Double => "floating-point",
            Self::StringList => "list of strings",
            Self::DoubleList => "list of numbers",
            Self::StringMap => "map of string to string",
        }
    }

    /// Whether a bound JSON value matches this kind. Null always matches;
    /// required-null is rejected later by [`OperationDescriptor::validate_required`].
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match self {
            Self::String => value.is_string(),
            Self::Integer | Self::Long => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Double => value.is_number(),
            Self::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            Self::DoubleList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_number)),
            Self::StringMap => value
                .as_object()
                .is_some_and(|entries| entries.values().all(Value::is_string)),
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: ParamKind,
    pub required: bool,
    /// Positional binding index on the shell surface, if any.
    pub position: Option<usize>,
    /// Dotted path of the nested request group this parameter populates.
    pub group: Option<&'static str>,
}

impl ParamSpec {
    pub const fn new(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            aliases: &[],
            kind,
            required: false,
            position: None,
            group: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn positional(mut self, index: usize) -> Self {
        self.position = Some(index);
        self
    }

    pub const fn aliased(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    pub const fn grouped(mut self, path: &'static str) -> Self {
        self.group = Some(path);
        self
    }

    fn matches(&self, supplied: &str) -> bool {
        self.name == supplied || self.aliases.contains(&supplied)
    }
}

/// Static description of one remote operation.
#[derive(Debug)]
pub struct OperationDescriptor {
    /// Signing name of the owning service (e.g. "osis").
    pub service: &'static str,
    /// Remote operation name (e.g. "CreatePipeline").
    pub operation: &'static str,
    pub parameters: &'static [ParamSpec],
    /// Top-level fields of the serialized response, for select validation.
    pub response_fields: &'static [&'static str],
    /// Documented default selection; `None` selects the whole response.
    pub default_select: Option<&'static str>,
    pub confirm_impact: ConfirmImpact,
}

impl OperationDescriptor {
    /// Look up a parameter by canonical name.
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.parameters.iter().find(|spec| spec.name == name)
    }

    /// Resolve a supplied name or alias to its declared parameter.
    pub fn resolve(&self, supplied: &str) -> Option<&ParamSpec> {
        self.parameters.iter().find(|spec| spec.matches(supplied))
    }

    pub fn has_response_field(&self, name: &str) -> bool {
        self.response_fields.contains(&name)
    }

    /// The parameter bound at shell position 0, used as the confirmation
    /// target description.
    pub fn positional(&self) -> Option<&ParamSpec> {
        self.parameters.iter().find(|spec| spec.position == Some(0))
    }

    /// Every required parameter must be bound to a non-null value. Reported
    /// before any request is constructed.
    pub fn validate_required(&self, ctx: &BoundContext) -> InvokeResult<()> {
        for spec in self.parameters.iter().filter(|spec| spec.required) {
            match ctx.value(spec.name) {
                Some(value) if !value.is_null() => {}
                _ => {
                    return Err(InvokeError::MissingParameter {
                        name: spec.name.to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextBuilder;
    use serde_json::json;

    static FLEET: OperationDescriptor = OperationDescriptor {
        service: "test",
        operation: "CreateFleet",
        parameters: &[
            ParamSpec::new("Name", ParamKind::String).required().positional(0),
            ParamSpec::new("Site", ParamKind::String).required(),
            ParamSpec::new("MaxUnit", ParamKind::Integer).aliased(&["MaxUnits"]),
        ],
        response_fields: &["Fleet"],
        default_select: Some("Fleet"),
        confirm_impact: ConfirmImpact::Medium,
    };

    #[test]
    fn alias_resolves_to_canonical_name() {
        assert_eq!(FLEET.resolve("MaxUnits").map(|s| s.name), Some("MaxUnit"));
        assert_eq!(FLEET.resolve("MaxUnit").map(|s| s.name), Some("MaxUnit"));
        assert!(FLEET.resolve("Units").is_none());
    }

    #[test]
    fn required_validation_names_first_missing() {
        let mut builder = ContextBuilder::new();
        builder.bind("Name", json!("Fleet-A"));
        let ctx = builder.freeze();
        let err = FLEET.validate_required(&ctx).unwrap_err();
        assert_eq!(err.to_string(), "required parameter 'Site' was not supplied");
    }

    #[test]
    fn null_bound_required_is_missing() {
        let mut builder = ContextBuilder::new();
        builder.bind("Name", json!("Fleet-A"));
        builder.bind("Site", serde_json::Value::Null);
        let ctx = builder.freeze();
        assert!(FLEET.validate_required(&ctx).is_err());
    }

    #[test]
    fn kind_acceptance() {
        assert!(ParamKind::String.accepts(&json!("x")));
        assert!(!ParamKind::String.accepts(&json!(3)));
        assert!(ParamKind::Integer.accepts(&json!(3)));
        assert!(!ParamKind::Integer.accepts(&json!(3.5)));
        assert!(ParamKind::Double.accepts(&json!(3.5)));
        assert!(ParamKind::DoubleList.accepts(&json!([1.0, 2])));
        assert!(!ParamKind::StringList.accepts(&json!(["a", 1])));
        assert!(ParamKind::StringMap.accepts(&json!({"k": "v"})));
        assert!(!ParamKind::StringMap.accepts(&json!({"k": 1})));
        assert!(ParamKind::Boolean.accepts(&serde_json::Value::Null));
    }
}
