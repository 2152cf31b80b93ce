//! Function schemas: validated arguments and return values.

use crate::context::{Outcome, ParseContext};
use crate::error::{Issue, IssueKind, ValidationError};
use crate::schema::primitive::unknown;
use crate::schema::tuple::tuple;
use crate::schema::{Base, SafeParseResult, Schema, ZodType};
use crate::value::{Function, ParsedType, Value};

#[derive(Debug, Clone)]
pub(crate) struct FunctionDef {
    /// Tuple schema for the argument list.
    pub(crate) args: Schema,
    pub(crate) returns: Schema,
}

/// Builder for function schemas.
#[derive(Debug, Clone)]
pub struct FunctionSchema {
    pub(crate) def: FunctionDef,
    pub(crate) base: Base,
}

typed_schema!(FunctionSchema, Function);

/// Function taking any arguments and returning anything.
pub fn function() -> FunctionSchema {
    FunctionSchema {
        def: FunctionDef {
            args: tuple(Vec::new()).rest(unknown()).into(),
            returns: unknown(),
        },
        base: Base::default(),
    }
}

impl FunctionSchema {
    /// Validate the leading arguments with `args`; extra arguments pass.
    pub fn args(mut self, args: Vec<Schema>) -> Self {
        self.def.args = tuple(args).rest(unknown()).into();
        self
    }

    pub fn returns(mut self, returns: impl Into<Schema>) -> Self {
        self.def.returns = returns.into();
        self
    }

    pub fn parameters(&self) -> &Schema {
        &self.def.args
    }

    pub fn return_type(&self) -> &Schema {
        &self.def.returns
    }

    /// Wrap `f` so that every call validates its arguments and return value.
    pub fn implement<F>(&self, f: F) -> Function
    where
        F: Fn(Vec<Value>) -> Result<Value, ValidationError> + Send + Sync + 'static,
    {
        guarded(self.def.clone(), f)
    }
}

fn call_error(kind: IssueKind) -> ValidationError {
    ValidationError::new(vec![Issue::new(kind, Vec::new())])
}

/// Argument and return validation run synchronously on each call.
fn guarded<F>(def: FunctionDef, f: F) -> Function
where
    F: Fn(Vec<Value>) -> Result<Value, ValidationError> + Send + Sync + 'static,
{
    Function::new(move |args| {
        let args = match def.args.safe_parse(Value::Array(args)) {
            SafeParseResult::Success(Value::Array(args)) => args,
            SafeParseResult::Success(other) => vec![other],
            SafeParseResult::Failure(error) => {
                return Err(call_error(IssueKind::InvalidArguments {
                    argument_errors: error.into_issues(),
                }));
            }
        };
        let output = f(args)?;
        def.returns.parse(output).map_err(|error| {
            call_error(IssueKind::InvalidReturnType {
                return_type_errors: error.into_issues(),
            })
        })
    })
}

pub(crate) fn parse(def: &FunctionDef, ctx: ParseContext) -> Outcome {
    match &ctx.data {
        Value::Function(inner) => {
            let inner = inner.clone();
            Outcome::Valid(Value::Function(guarded(def.clone(), move |args| {
                inner.call(args)
            })))
        }
        _ => ctx.invalid_type(ParsedType::Function),
    }
}
