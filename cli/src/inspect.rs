#![deny(missing_docs)]

//! # Inspect Command
//!
//! Resolves a document and writes a manifest of everything a client
//! emitter needs: models and enums in emission order, the discriminator
//! base classes, and each operation with its projected type expressions.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clientgen_core::oas::naming::class_name;
use clientgen_core::oas::{OperationNode, ParameterLocation, SchemaNode};
use clientgen_core::{parse_openapi_document, DocumentModel, TypeProjector};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::CliResult;

/// Arguments for the inspect command.
#[derive(clap::Args, Debug, Clone)]
pub struct InspectArgs {
    /// Path to the OpenAPI document (YAML or JSON).
    #[clap(long, short, env = "CLIENTGEN_INPUT")]
    pub input: PathBuf,

    /// Output path for the manifest. Written to stdout when absent.
    #[clap(long, short, env = "CLIENTGEN_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Manifest encoding.
    #[clap(long, value_enum, env = "CLIENTGEN_FORMAT", default_value_t = ManifestFormat::Json)]
    pub format: ManifestFormat,
}

/// Encoding of the written manifest.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

/// Resolved view of a document.
#[derive(Serialize, Debug)]
pub struct Manifest {
    info: InfoEntry,
    enums: Vec<EnumEntry>,
    models: Vec<ModelEntry>,
    discriminator_base_classes: Vec<BaseClassEntry>,
    operations: Vec<OperationEntry>,
}

#[derive(Serialize, Debug)]
struct InfoEntry {
    title: String,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Serialize, Debug)]
struct EnumEntry {
    name: String,
    values: Vec<Value>,
}

#[derive(Serialize, Debug)]
struct ModelEntry {
    name: String,
    bases: Vec<String>,
    fields: Vec<FieldEntry>,
}

#[derive(Serialize, Debug)]
struct FieldEntry {
    original_key: String,
    resolved_key: String,
    type_expr: String,
    required: bool,
}

#[derive(Serialize, Debug)]
struct BaseClassEntry {
    name: String,
    attr: String,
}

#[derive(Serialize, Debug)]
struct OperationEntry {
    path: String,
    method: String,
    fn_name: String,
    parameters: IndexMap<&'static str, Vec<FieldEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_body: Option<BodyEntry>,
    response_type: String,
    responses: IndexMap<String, String>,
}

#[derive(Serialize, Debug)]
struct BodyEntry {
    media_type: String,
    type_expr: String,
    required: bool,
    form_encoded: bool,
    multipart: bool,
    file_properties: Vec<String>,
    files_required: bool,
}

impl Manifest {
    /// Projects a resolved document through `projector`.
    pub fn build(model: &DocumentModel, projector: &impl TypeProjector) -> CliResult<Self> {
        let enums = model
            .sorted_enums()
            .iter()
            .map(|node| EnumEntry {
                name: class_name(&node.id),
                values: node.enum_values.clone().unwrap_or_default(),
            })
            .collect();

        let models = model
            .sorted_schemas()
            .iter()
            .map(|node| model_entry(node, projector))
            .collect();

        let discriminator_base_classes = model
            .discriminator_base_classes
            .iter()
            .map(|base| BaseClassEntry {
                name: base.name.clone(),
                attr: base.attr.clone(),
            })
            .collect();

        let operations = model
            .operations()
            .map(|(path, _, op)| operation_entry(path, op, projector))
            .collect::<CliResult<Vec<_>>>()?;

        Ok(Self {
            info: InfoEntry {
                title: model.info.title.clone(),
                version: model.info.version.clone(),
                description: model.info.description.clone(),
            },
            enums,
            models,
            discriminator_base_classes,
            operations,
        })
    }

    /// Encodes the manifest.
    pub fn render(&self, format: ManifestFormat) -> CliResult<String> {
        Ok(match format {
            ManifestFormat::Json => {
                let mut text = serde_json::to_string_pretty(self)?;
                text.push('\n');
                text
            }
            ManifestFormat::Yaml => serde_yaml::to_string(self)?,
        })
    }
}

fn model_entry(node: &SchemaNode, projector: &impl TypeProjector) -> ModelEntry {
    ModelEntry {
        name: class_name(&node.id),
        bases: node
            .named_all_of()
            .iter()
            .map(|parent| class_name(&parent.id))
            .collect(),
        fields: node
            .properties
            .iter()
            .map(|prop| FieldEntry {
                original_key: prop.original_key.clone(),
                resolved_key: prop.resolved_key.clone(),
                type_expr: projector.property_type_expr(node, prop),
                required: node.is_required(&prop.original_key),
            })
            .collect(),
    }
}

fn operation_entry(
    path: &str,
    op: &OperationNode,
    projector: &impl TypeProjector,
) -> CliResult<OperationEntry> {
    let mut parameters = IndexMap::new();
    for location in [
        ParameterLocation::Path,
        ParameterLocation::Query,
        ParameterLocation::Header,
        ParameterLocation::Cookie,
    ] {
        let params = op.params_in(location);
        if params.is_empty() {
            continue;
        }
        let entries = params
            .into_iter()
            .map(|param| FieldEntry {
                original_key: param.original_key.clone(),
                resolved_key: param.resolved_key.clone(),
                type_expr: projector.type_expr(&param.schema),
                required: param.required,
            })
            .collect();
        parameters.insert(location.as_str(), entries);
    }

    let request_body = op.request_body.as_ref().map(|body| BodyEntry {
        media_type: body.media_type.clone(),
        type_expr: projector.type_expr(&body.schema),
        required: body.required,
        form_encoded: body.is_form_encoded,
        multipart: body.is_multipart,
        file_properties: body.file_properties.clone(),
        files_required: body.files_required,
    });

    let responses = projector
        .response_deserialize_expr(&op.responses)?
        .into_iter()
        .collect();

    Ok(OperationEntry {
        path: path.to_string(),
        method: op.method.as_str().to_string(),
        fn_name: op.fn_name.clone(),
        parameters,
        request_body,
        response_type: projector.response_type_expr(&op.responses),
        responses,
    })
}

/// Executes the inspect command.
///
/// The manifest is fully rendered before anything is written, so a failing
/// document never leaves a partial output file behind.
pub fn execute(args: &InspectArgs, projector: &impl TypeProjector) -> CliResult<()> {
    let text = fs::read_to_string(&args.input)?;
    let model = parse_openapi_document(&text)?;
    let rendered = Manifest::build(&model, projector)?.render(args.format)?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, rendered)?;
            info!(output = %path.display(), "Wrote manifest");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
