//! Bulk export of existing platform objects as Terraform state
//!
//! Each exportable resource lists its ids, then every id is read through the
//! resource's own read path. The list call fills the proxy cache, so those
//! reads rarely reach the API. Attributes named in `ref_attrs` are recorded
//! as references to other exported resources.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tfcore::resource::ReadResourceRequest;
use tfcore::{Diagnostics, Dynamic, DynamicValue, Resource, ResourceData};

/// Reads in flight at once per resource type
pub const EXPORT_CONCURRENCY: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceMeta {
    /// Label for the exported block, sanitized before use
    pub name: String,
}

impl ResourceMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Id to meta; ordered so exports are stable
pub type ResourceIdMetaMap = BTreeMap<String, ResourceMeta>;

/// Attribute that holds the id of another exported resource
#[derive(Debug, Clone, PartialEq)]
pub struct RefAttrSettings {
    pub ref_type: String,
    /// Values that are not ids and stay as they are
    pub alt_values: Vec<String>,
}

impl RefAttrSettings {
    pub fn new(ref_type: &str) -> Self {
        Self {
            ref_type: ref_type.to_string(),
            alt_values: Vec::new(),
        }
    }
}

#[async_trait]
pub trait ResourceExporter: Resource {
    /// Every exportable id with a name for it; names need not be unique
    async fn get_resources(&self) -> Result<ResourceIdMetaMap, Diagnostics>;

    /// Attribute path (dot separated for nested blocks) to referenced type
    fn ref_attrs(&self) -> HashMap<String, RefAttrSettings> {
        HashMap::new()
    }
}

/// Id of another resource found in an exported state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedReference {
    pub attribute: String,
    #[serde(rename = "type")]
    pub ref_type: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportedResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    pub id: String,
    pub state: Dynamic,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<ExportedReference>,
}

// Nested blocks are lists of objects; every element is searched
fn values_at<'a>(value: &'a Dynamic, path: &[&str], out: &mut Vec<&'a str>) {
    match (value, path.split_first()) {
        (Dynamic::String(s), None) => out.push(s),
        (Dynamic::List(items), _) => {
            for item in items {
                values_at(item, path, out);
            }
        }
        (Dynamic::Map(fields), Some((head, rest))) => {
            if let Some(field) = fields.get(*head) {
                values_at(field, rest, out);
            }
        }
        _ => {}
    }
}

/// References held by one exported state, in `ref_attrs` key order
pub fn collect_references(
    state: &Dynamic,
    ref_attrs: &HashMap<String, RefAttrSettings>,
) -> Vec<ExportedReference> {
    let mut attributes: Vec<_> = ref_attrs.iter().collect();
    attributes.sort_by(|a, b| a.0.cmp(b.0));

    let mut references = Vec::new();
    for (attribute, settings) in attributes {
        let path: Vec<&str> = attribute.split('.').collect();
        let mut values = Vec::new();
        values_at(state, &path, &mut values);
        references.extend(
            values
                .into_iter()
                .filter(|v| !v.is_empty() && !settings.alt_values.iter().any(|alt| alt == v))
                .map(|id| ExportedReference {
                    attribute: attribute.clone(),
                    ref_type: settings.ref_type.clone(),
                    id: id.to_string(),
                }),
        );
    }
    references
}

// Terraform identifiers: letters, digits, underscores and dashes
fn is_safe_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

// 32-bit FNV-1, matching labels exported by earlier provider versions
fn fnv1_32(bytes: &[u8]) -> u32 {
    const OFFSET_BASIS: u32 = 2_166_136_261;
    const PRIME: u32 = 16_777_619;
    bytes.iter().fold(OFFSET_BASIS, |hash, byte| {
        hash.wrapping_mul(PRIME) ^ u32::from(*byte)
    })
}

/// Turns a display name into a valid Terraform block label
///
/// Unsafe characters become `_` and a hash of the original name is appended
/// so that distinct names stay distinct. Labels cannot start with a digit.
pub fn sanitize_resource_name(input: &str) -> String {
    let mut name: String = input
        .chars()
        .map(|c| if is_safe_name_char(c) { c } else { '_' })
        .collect();
    if name != input {
        name = format!("{}_{}", name, fnv1_32(input.as_bytes()));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Lists and reads every instance of one resource type
pub async fn export_resources(
    exporter: &dyn ResourceExporter,
) -> Result<Vec<ExportedResource>, Diagnostics> {
    let resource_type = exporter.type_name().to_string();
    let resources = exporter.get_resources().await?;
    tracing::info!("Exporting {} {} resources", resources.len(), resource_type);

    let reads = stream::iter(resources)
        .map(|(id, meta)| {
            let resource_type = resource_type.clone();
            async move {
                let mut data = ResourceData::new(DynamicValue::object());
                data.set_id(id.clone());
                let response = exporter
                    .read(ReadResourceRequest {
                        type_name: resource_type.clone(),
                        current_state: data.state().clone(),
                    })
                    .await;
                (id, meta, response)
            }
        })
        .buffer_unordered(EXPORT_CONCURRENCY)
        .collect::<Vec<_>>()
        .await;

    let ref_attrs = exporter.ref_attrs();
    let mut diagnostics = Diagnostics::new();
    let mut exported = Vec::with_capacity(reads.len());
    for (id, meta, response) in reads {
        diagnostics.extend(response.diagnostics);
        match response.new_state {
            Some(state) => exported.push(ExportedResource {
                resource_type: resource_type.clone(),
                name: sanitize_resource_name(&meta.name),
                id,
                references: collect_references(&state.value, &ref_attrs),
                state: state.value,
            }),
            None => tracing::warn!("{} {} disappeared during export", resource_type, id),
        }
    }

    if diagnostics.has_errors() {
        return Err(diagnostics);
    }
    exported.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    Ok(exported)
}
