//! Synthesis of a stack into a Terraform JSON document
//!
//! The output is the only artifact handed to the provisioning engine.
//! Keys are emitted in sorted order so identical stacks synthesize to
//! identical bytes.

use crate::resource::Declaration;
use crate::stack::Stack;
use crate::types::Kind;
use serde_json::{Map, Value, json};

/// Version stamped into the document metadata
const GENERATOR: &str = concat!("declarative/", env!("CARGO_PKG_VERSION"));

/// Build the Terraform JSON document for a stack
pub fn synthesize(stack: &Stack) -> Value {
    let mut root = Map::new();

    let mut metadata = Map::new();
    metadata.insert("stackName".into(), json!(stack.name()));
    metadata.insert("version".into(), json!(GENERATOR));
    if stack.backend().is_some() {
        metadata.insert("backend".into(), json!("remote"));
    }
    root.insert("//".into(), json!({ "metadata": metadata }));

    let terraform = terraform_block(stack);
    if !terraform.is_empty() {
        root.insert("terraform".into(), Value::Object(terraform));
    }

    for kind in [Kind::Provider, Kind::Data, Kind::Resource, Kind::Module] {
        let block = kind_block(stack, kind);
        if !block.is_empty() {
            root.insert(kind.block().into(), Value::Object(block));
        }
    }

    let mut outputs = Map::new();
    for (name, output) in stack.outputs() {
        let mut body = Map::new();
        body.insert("value".into(), output.value.to_json());
        if output.sensitive {
            body.insert("sensitive".into(), Value::Bool(true));
        }
        if let Some(description) = &output.description {
            body.insert("description".into(), json!(description));
        }
        outputs.insert(name.to_string(), Value::Object(body));
    }
    if !outputs.is_empty() {
        root.insert("output".into(), Value::Object(outputs));
    }

    Value::Object(root)
}

/// Synthesize and pretty-print
pub fn to_string_pretty(stack: &Stack) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&synthesize(stack))
}

fn terraform_block(stack: &Stack) -> Map<String, Value> {
    let mut terraform = Map::new();

    let requirements = stack.requirements();
    if !requirements.is_empty() {
        let mut providers = Map::new();
        for (name, requirement) in requirements {
            providers.insert(
                name,
                json!({ "source": requirement.source, "version": requirement.version }),
            );
        }
        terraform.insert("required_providers".into(), Value::Object(providers));
    }

    if let Some(backend) = stack.backend() {
        terraform.insert(
            "backend".into(),
            json!({
                "remote": {
                    "hostname": backend.hostname,
                    "organization": backend.organization,
                    "workspaces": { "name": backend.workspace },
                }
            }),
        );
    }

    terraform
}

fn kind_block(stack: &Stack, kind: Kind) -> Map<String, Value> {
    let mut block = Map::new();
    for declaration in stack.declarations().iter().filter(|d| d.kind == kind) {
        let body = Value::Object(attributes_json(declaration));
        match kind {
            // Providers may be configured more than once, hence the list
            Kind::Provider => {
                let entry = block
                    .entry(declaration.type_name.clone())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(configs) = entry {
                    configs.push(body);
                }
            }
            Kind::Module => {
                block.insert(declaration.name.clone(), body);
            }
            Kind::Data | Kind::Resource => {
                let entry = block
                    .entry(declaration.type_name.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(by_name) = entry {
                    by_name.insert(declaration.name.clone(), body);
                }
            }
        }
    }
    block
}

fn attributes_json(declaration: &Declaration) -> Map<String, Value> {
    let mut body: Map<String, Value> = declaration
        .attributes
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect();
    if declaration.kind == Kind::Module {
        body.insert("source".into(), json!(declaration.type_name));
    }
    body
}
