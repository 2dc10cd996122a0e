//! Reads an operation document into the one root field the dispatcher needs.
//!
//! Parsing is done by `async-graphql-parser`; this module narrows its AST to
//! the subset the gateway serves: one operation, one root field, no fragments
//! and no directives at the root. Nested selection sets are parsed and then
//! ignored, since resolvers always return their whole envelope.

use std::collections::HashMap;
use std::convert::Infallible;
use std::iter::Peekable;
use std::str::Chars;

use async_graphql_parser::types::{DocumentOperations, OperationDefinition, OperationType, Selection};
use async_graphql_parser::{Positioned, parse_query};
use async_graphql_value::{ConstValue, Name, Value as GqlValue};
use serde_json::{Map, Value};
use thiserror::Error;

/// Deepest bracket nesting (`{`, `[`, `(`) accepted in a document.
pub const MAX_DEPTH: usize = 64;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Document nesting exceeds {limit} levels")]
    TooDeep { limit: usize },

    #[error("Document contains no operation")]
    Empty,

    #[error("Fragments are not supported")]
    Fragments,

    #[error("Directives are not supported")]
    Directives,

    #[error("Documents with multiple operations are not supported")]
    MultipleOperations,

    #[error("Operations with multiple root fields are not supported")]
    MultipleRootFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    /// Only `mutation` selects a mutation. Shorthand documents and
    /// `subscription` operations both land on `Query`.
    pub fn from_operation_type(ty: OperationType) -> Self {
        match ty {
            OperationType::Mutation => OperationKind::Mutation,
            OperationType::Query | OperationType::Subscription => OperationKind::Query,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub alias: Option<String>,
    pub name: String,
    arguments: Vec<(String, GqlValue)>,
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OperationKind,
    /// Written as `subscription`; executed as a query.
    pub subscription: bool,
    pub name: Option<String>,
    variable_defaults: HashMap<String, ConstValue>,
    pub field: Field,
}

impl Operation {
    /// Value of the root field's argument `name`.
    ///
    /// Clients that put arguments in the variables map without declaring
    /// them in the document still work: when the field has no such argument,
    /// the top-level variable of the same name is used.
    pub fn argument(&self, name: &str, variables: &Value) -> Option<Value> {
        let vars = variables.as_object();
        match self.field.arguments.iter().find(|(arg, _)| arg == name) {
            Some((_, value)) => Some(self.bind(value.clone(), vars)),
            None => vars.and_then(|vars| vars.get(name)).cloned(),
        }
    }

    /// Substitute variables; unbound ones fall back to their declared default,
    /// then to `null`.
    fn bind(&self, value: GqlValue, vars: Option<&Map<String, Value>>) -> Value {
        value
            .into_const_with(|var: Name| {
                let supplied = vars
                    .and_then(|vars| vars.get(var.as_str()))
                    .and_then(|v| ConstValue::from_json(v.clone()).ok());
                Ok::<_, Infallible>(
                    supplied
                        .or_else(|| self.variable_defaults.get(var.as_str()).cloned())
                        .unwrap_or(ConstValue::Null),
                )
            })
            .unwrap_or_else(|never| match never {})
            .into_json()
            .unwrap_or(Value::Null)
    }
}

pub fn parse(source: &str) -> Result<Operation, DocumentError> {
    if !check_nesting(source)? {
        return Err(DocumentError::Empty);
    }

    let document = parse_query(source).map_err(|e| DocumentError::Syntax(e.to_string()))?;
    if !document.fragments.is_empty() {
        return Err(DocumentError::Fragments);
    }

    let (name, definition) = match document.operations {
        DocumentOperations::Single(op) => (None, op.node),
        DocumentOperations::Multiple(ops) => {
            if ops.len() > 1 {
                return Err(DocumentError::MultipleOperations);
            }
            match ops.into_iter().next() {
                Some((name, op)) => (Some(name.to_string()), op.node),
                None => return Err(DocumentError::Empty),
            }
        }
    };

    operation(name, definition)
}

fn operation(name: Option<String>, def: OperationDefinition) -> Result<Operation, DocumentError> {
    if !def.directives.is_empty() {
        return Err(DocumentError::Directives);
    }

    let mut items = def.selection_set.node.items;
    if items.len() > 1 {
        return Err(DocumentError::MultipleRootFields);
    }
    let field = match items.pop().map(|item| item.node) {
        Some(Selection::Field(Positioned { node: field, .. })) => field,
        Some(Selection::FragmentSpread(_)) | Some(Selection::InlineFragment(_)) => {
            return Err(DocumentError::Fragments);
        }
        None => return Err(DocumentError::Empty),
    };
    if !field.directives.is_empty() {
        return Err(DocumentError::Directives);
    }

    let subscription = matches!(def.ty, OperationType::Subscription);
    let kind = OperationKind::from_operation_type(def.ty);
    let variable_defaults = def
        .variable_definitions
        .into_iter()
        .filter_map(|var| {
            let var = var.node;
            var.default_value
                .map(|default| (var.name.node.to_string(), default.node))
        })
        .collect();

    Ok(Operation {
        kind,
        subscription,
        name,
        variable_defaults,
        field: Field {
            alias: field.alias.map(|alias| alias.node.to_string()),
            name: field.name.node.to_string(),
            arguments: field
                .arguments
                .into_iter()
                .map(|(arg, value)| (arg.node.to_string(), value.node))
                .collect(),
        },
    })
}

/// Rejects documents nested deeper than [`MAX_DEPTH`] before they reach the
/// recursive parser. Returns whether the document holds anything besides
/// whitespace, commas and comments.
fn check_nesting(source: &str) -> Result<bool, DocumentError> {
    let mut depth = 0usize;
    let mut content = false;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '#' => {
                while chars.next_if(|c| *c != '\n' && *c != '\r').is_some() {}
            }
            '"' => {
                content = true;
                skip_string(&mut chars);
            }
            '{' | '[' | '(' => {
                content = true;
                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(DocumentError::TooDeep { limit: MAX_DEPTH });
                }
            }
            '}' | ']' | ')' => {
                content = true;
                depth = depth.saturating_sub(1);
            }
            ',' | '\u{feff}' => {}
            c if c.is_whitespace() => {}
            _ => content = true,
        }
    }
    Ok(content)
}

// Called after the opening quote.
fn skip_string(chars: &mut Peekable<Chars<'_>>) {
    if chars.next_if_eq(&'"').is_some() {
        if chars.next_if_eq(&'"').is_none() {
            return; // ""
        }
        let mut quotes = 0;
        while let Some(c) = chars.next() {
            match c {
                '"' => {
                    quotes += 1;
                    if quotes == 3 {
                        return;
                    }
                }
                '\\' => {
                    quotes = 0;
                    chars.next();
                }
                _ => quotes = 0,
            }
        }
        return;
    }

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '"' | '\n' | '\r' => return,
            _ => {}
        }
    }
}
