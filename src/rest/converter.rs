//! Body converters and their registry.
//!
//! Marshaling for XML and Atom is supplied by the deployment; the default
//! registry only knows JSON and reports the other formats as unavailable.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::rest::descriptor::RequestDescriptor;
use crate::rest::negotiation::Format;

/// Query parameter listing the fields a client wants rendered.
pub const FIELDS_PARAM: &str = "fields";

#[derive(Debug, Error)]
pub enum ConverterError {
    #[error("no {direction} converter available for {format}")]
    Unavailable {
        format: Format,
        direction: &'static str,
    },

    #[error("malformed {format} body: {message}")]
    Malformed { format: Format, message: String },

    #[error("failed to encode {format} response: {message}")]
    Encode { format: Format, message: String },
}

/// Parses request bodies of one format.
pub trait InputConverter: Send + Sync + fmt::Debug {
    fn format(&self) -> Format;

    fn parse(&self, body: &[u8]) -> Result<Value, ConverterError>;
}

/// Renders success payloads in one format.
pub trait OutputConverter: Send + Sync + fmt::Debug {
    fn format(&self) -> Format;

    fn content_type(&self) -> &'static str {
        self.format().mime_type()
    }

    /// The descriptor gives access to request context such as requested fields.
    fn render(&self, payload: &Value, request: &RequestDescriptor) -> Result<Vec<u8>, ConverterError>;
}

/// JSON in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter;

impl InputConverter for JsonConverter {
    fn format(&self) -> Format {
        Format::Json
    }

    fn parse(&self, body: &[u8]) -> Result<Value, ConverterError> {
        serde_json::from_slice(body).map_err(|e| ConverterError::Malformed {
            format: Format::Json,
            message: e.to_string(),
        })
    }
}

impl OutputConverter for JsonConverter {
    fn format(&self) -> Format {
        Format::Json
    }

    fn render(&self, payload: &Value, request: &RequestDescriptor) -> Result<Vec<u8>, ConverterError> {
        let entry = match request.query_param(FIELDS_PARAM) {
            Some(fields) => select_fields(payload, fields),
            None => payload.clone(),
        };

        let mut document = Map::new();
        document.insert("entry".to_string(), entry);

        serde_json::to_vec(&Value::Object(document)).map_err(|e| ConverterError::Encode {
            format: Format::Json,
            message: e.to_string(),
        })
    }
}

/// Keep only the comma-separated `fields` (plus `id`) of object payloads.
fn select_fields(payload: &Value, fields: &str) -> Value {
    let wanted: HashSet<&str> = fields
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .chain(std::iter::once("id"))
        .collect();

    match payload {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| wanted.contains(k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| select_fields(item, fields)).collect())
        }
        other => other.clone(),
    }
}

/// Placeholder for a format whose marshaler has not been installed.
#[derive(Debug, Clone, Copy)]
pub struct UnavailableConverter(pub Format);

impl InputConverter for UnavailableConverter {
    fn format(&self) -> Format {
        self.0
    }

    fn parse(&self, _body: &[u8]) -> Result<Value, ConverterError> {
        Err(ConverterError::Unavailable {
            format: self.0,
            direction: "input",
        })
    }
}

impl OutputConverter for UnavailableConverter {
    fn format(&self) -> Format {
        self.0
    }

    fn render(&self, _payload: &Value, _request: &RequestDescriptor) -> Result<Vec<u8>, ConverterError> {
        Err(ConverterError::Unavailable {
            format: self.0,
            direction: "output",
        })
    }
}

#[derive(Debug, Clone)]
struct PerFormat<T> {
    json: T,
    xml: T,
    atom: T,
}

impl<T> PerFormat<T> {
    fn get(&self, format: Format) -> &T {
        match format {
            Format::Json => &self.json,
            Format::Xml => &self.xml,
            Format::Atom => &self.atom,
        }
    }

    fn set(&mut self, format: Format, value: T) {
        match format {
            Format::Json => self.json = value,
            Format::Xml => self.xml = value,
            Format::Atom => self.atom = value,
        }
    }
}

/// Lookup of converters by negotiated format.
#[derive(Debug, Clone)]
pub struct ConverterRegistry {
    inputs: PerFormat<Arc<dyn InputConverter>>,
    outputs: PerFormat<Arc<dyn OutputConverter>>,
}

impl ConverterRegistry {
    /// Install an input converter for the format it reports.
    pub fn with_input(mut self, converter: Arc<dyn InputConverter>) -> Self {
        self.inputs.set(converter.format(), converter);
        self
    }

    /// Install an output converter for the format it reports.
    pub fn with_output(mut self, converter: Arc<dyn OutputConverter>) -> Self {
        self.outputs.set(converter.format(), converter);
        self
    }

    pub fn input(&self, format: Format) -> Arc<dyn InputConverter> {
        Arc::clone(self.inputs.get(format))
    }

    pub fn output(&self, format: Format) -> Arc<dyn OutputConverter> {
        Arc::clone(self.outputs.get(format))
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self {
            inputs: PerFormat {
                json: Arc::new(JsonConverter),
                xml: Arc::new(UnavailableConverter(Format::Xml)),
                atom: Arc::new(UnavailableConverter(Format::Atom)),
            },
            outputs: PerFormat {
                json: Arc::new(JsonConverter),
                xml: Arc::new(UnavailableConverter(Format::Xml)),
                atom: Arc::new(UnavailableConverter(Format::Atom)),
            },
        }
    }
}
