//! Conversion of provider-neutral declarations into each provider's tool schema.

use serde_json::{json, Map, Value};

use super::ProviderKind;
use crate::tools::{ParamType, Parameter, ToolDeclaration};

/// Gemini spells OpenAPI types in upper case.
fn gemini_type(ty: ParamType) -> &'static str {
    match ty {
        ParamType::String => "STRING",
        ParamType::Number => "NUMBER",
    }
}

fn json_schema_type(ty: ParamType) -> &'static str {
    match ty {
        ParamType::String => "string",
        ParamType::Number => "number",
    }
}

fn properties(parameters: &[Parameter], type_name: fn(ParamType) -> &'static str) -> Value {
    let mut props = Map::new();
    for param in parameters {
        let mut prop = json!({
            "type": type_name(param.ty),
            "description": param.description,
        });
        if let Some(values) = param.enum_values {
            prop["enum"] = json!(values);
        }
        props.insert(param.name.to_string(), prop);
    }
    Value::Object(props)
}

/// `[{"functionDeclarations": [...]}]`
pub fn gemini_tools(declarations: &[ToolDeclaration]) -> Value {
    let functions: Vec<Value> = declarations
        .iter()
        .map(|decl| {
            json!({
                "name": decl.name,
                "description": decl.description,
                "parameters": {
                    "type": "OBJECT",
                    "properties": properties(&decl.parameters, gemini_type),
                    "required": decl.required,
                },
            })
        })
        .collect();
    json!([{ "functionDeclarations": functions }])
}

/// `[{"type": "function", "function": {...}}]`
pub fn chat_tools(declarations: &[ToolDeclaration]) -> Value {
    let tools: Vec<Value> = declarations
        .iter()
        .map(|decl| {
            json!({
                "type": "function",
                "function": {
                    "name": decl.name,
                    "description": decl.description,
                    "parameters": {
                        "type": "object",
                        "properties": properties(&decl.parameters, json_schema_type),
                        "required": decl.required,
                    },
                },
            })
        })
        .collect();
    Value::Array(tools)
}

/// Tool schema in the wire format of `kind`.
pub fn tools_for(kind: ProviderKind, declarations: &[ToolDeclaration]) -> Value {
    match kind {
        ProviderKind::NativeFunctionCalling => gemini_tools(declarations),
        ProviderKind::ChatCompletions => chat_tools(declarations),
    }
}
