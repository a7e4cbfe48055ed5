//! Operation descriptors and argument binding.

use quire_turn::ToolSchema;
use quire_types::OperationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

/// Which kind of file an operation is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// `.xlsx` workbooks.
    Spreadsheet,
    /// `.docx` documents.
    Document,
}

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// A string. Numbers and booleans are accepted and stringified.
    String,
    /// An integer, or a string holding one.
    Integer,
    /// A boolean, or the strings `"true"` / `"false"`.
    Boolean,
    /// An array; items are stringified.
    StringList,
    /// A column letter (`"B"`) or a 1-based column index (`2`).
    ColumnRef,
}

impl ParamKind {
    fn json_schema(self) -> Value {
        match self {
            ParamKind::String => json!({"type": "string"}),
            ParamKind::Integer => json!({"type": "integer"}),
            ParamKind::Boolean => json!({"type": "boolean"}),
            ParamKind::StringList => json!({"type": "array", "items": {"type": "string"}}),
            ParamKind::ColumnRef => json!({"type": ["string", "integer"]}),
        }
    }

    /// Coerce a non-null value into this kind, or `None` if it cannot be.
    fn coerce(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (ParamKind::String, Value::String(_)) => Some(value.clone()),
            (ParamKind::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (ParamKind::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (ParamKind::Integer, Value::Number(n)) => integral(n).map(Value::from),
            (ParamKind::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            (ParamKind::Boolean, Value::Bool(_)) => Some(value.clone()),
            (ParamKind::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            (ParamKind::StringList, Value::Array(items)) => Some(Value::Array(
                items
                    .iter()
                    .map(|item| Value::String(stringify(item)))
                    .collect(),
            )),
            (ParamKind::ColumnRef, Value::String(s)) if !s.trim().is_empty() => {
                Some(Value::String(s.trim().to_string()))
            }
            (ParamKind::ColumnRef, Value::Number(n)) => {
                integral(n).map(|i| Value::String(i.to_string()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamKind::String => "a string",
            ParamKind::Integer => "an integer",
            ParamKind::Boolean => "a boolean",
            ParamKind::StringList => "a list of values",
            ParamKind::ColumnRef => "a column letter or 1-based index",
        };
        f.write_str(s)
    }
}

fn integral(n: &serde_json::Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// One declared parameter of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Argument name.
    pub name: String,
    /// Declared type.
    pub kind: ParamKind,
    /// Whether the engine must supply it.
    pub required: bool,
    /// Value used when an optional argument is absent.
    pub default: Option<Value>,
    /// Shown to the engine.
    pub description: String,
}

impl ParamSpec {
    /// A required parameter.
    pub fn required(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
            description: description.into(),
        }
    }

    /// An optional parameter with no default.
    pub fn optional(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            description: description.into(),
        }
    }
}

/// Name, description, and parameter schema of one operation.
///
/// The target file path is not a parameter: the agent loop always supplies
/// it from session context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Unique operation name.
    pub name: String,
    /// Tells the engine when the operation applies.
    pub description: String,
    /// File kind the operation is written for.
    pub target: TargetKind,
    /// Declared parameters, in presentation order.
    pub params: Vec<ParamSpec>,
}

impl OperationDescriptor {
    /// JSON Schema of the arguments object.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.params {
            let mut schema = param.kind.json_schema();
            schema["description"] = Value::String(param.description.clone());
            if let Some(default) = &param.default {
                schema["default"] = default.clone();
            }
            properties.insert(param.name.clone(), schema);
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// The schema handed to the reasoning engine.
    pub fn tool_schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema(),
        }
    }

    /// Validate raw engine arguments against the declared parameters.
    ///
    /// Required arguments must be present and non-null; present arguments
    /// are coerced to their declared kind; absent optional arguments take
    /// their default. Undeclared keys (a stray `file_path` included) are
    /// dropped.
    pub fn bind(&self, raw: &Value) -> Result<Arguments, OperationError> {
        let empty = Map::new();
        let given = match raw {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(OperationError::validation(format!(
                    "arguments for {} must be an object, got {other}",
                    self.name
                )));
            }
        };

        let mut values = Map::new();
        for param in &self.params {
            match given.get(&param.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    let coerced = param.kind.coerce(value).ok_or_else(|| {
                        OperationError::validation(format!(
                            "argument '{}' of {} must be {}, got {value}",
                            param.name, self.name, param.kind
                        ))
                    })?;
                    values.insert(param.name.clone(), coerced);
                }
                None if param.required => {
                    return Err(OperationError::validation(format!(
                        "missing required argument '{}' for {}",
                        param.name, self.name
                    )));
                }
                None => {
                    if let Some(default) = &param.default {
                        values.insert(param.name.clone(), default.clone());
                    }
                }
            }
        }
        Ok(Arguments { values })
    }
}

/// Arguments that passed [`OperationDescriptor::bind`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Map<String, Value>,
}

impl Arguments {
    /// Raw access to a bound value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// A required string argument.
    pub fn str(&self, name: &str) -> Result<&str, OperationError> {
        self.opt_str(name)
            .ok_or_else(|| OperationError::validation(format!("missing argument '{name}'")))
    }

    /// An optional string argument.
    pub fn opt_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    /// A required integer argument.
    pub fn int(&self, name: &str) -> Result<i64, OperationError> {
        self.values
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| OperationError::validation(format!("missing argument '{name}'")))
    }

    /// An optional boolean argument.
    pub fn opt_bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    /// A required column reference: letters (`"B"`) or a decimal index (`"2"`).
    pub fn column(&self, name: &str) -> Result<&str, OperationError> {
        self.str(name)
    }

    /// A required list argument, items as strings.
    pub fn string_list(&self, name: &str) -> Result<Vec<String>, OperationError> {
        match self.values.get(name) {
            Some(Value::Array(items)) => Ok(items.iter().map(stringify).collect()),
            _ => Err(OperationError::validation(format!(
                "missing argument '{name}'"
            ))),
        }
    }
}
