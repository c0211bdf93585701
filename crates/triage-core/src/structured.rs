//! Structured-output binding: derive a JSON Schema for a response type, hand it
//! to the provider, and validate whatever comes back before deserializing.

use crate::errors::{TriageError, TriageResult};
use crate::providers::llm::LlmClient;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

const MAX_REPORTED_ERRORS: usize = 10;

/// A typed record a model can be asked to produce.
pub trait StructuredOutput: DeserializeOwned + JsonSchema {
    /// Schema name sent to providers with native structured output.
    const NAME: &'static str;
}

#[derive(Clone)]
pub struct OutputSchema {
    name: &'static str,
    schema: Value,
    validator: Arc<jsonschema::Validator>,
}

impl std::fmt::Debug for OutputSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSchema")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish()
    }
}

impl OutputSchema {
    pub fn of<T: StructuredOutput>() -> TriageResult<Self> {
        let raw = serde_json::to_value(schemars::schema_for!(T)).map_err(|e| {
            TriageError::Config(format!("schema for '{}' is not JSON: {}", T::NAME, e))
        })?;
        let schema = wire_schema(raw);
        let validator = jsonschema::validator_for(&schema).map_err(|e| {
            TriageError::Config(format!("schema for '{}' does not compile: {}", T::NAME, e))
        })?;
        Ok(Self {
            name: T::NAME,
            schema,
            validator: Arc::new(validator),
        })
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn validate(&self, instance: &Value) -> anyhow::Result<()> {
        if self.validator.is_valid(instance) {
            return Ok(());
        }
        let lines: Vec<String> = self
            .validator
            .iter_errors(instance)
            .take(MAX_REPORTED_ERRORS)
            .enumerate()
            .map(|(i, e)| format!("{:02}: {}", i + 1, e))
            .collect();
        anyhow::bail!(
            "output does not match schema '{}':\n{}",
            self.name,
            lines.join("\n")
        )
    }

    /// Pulls the first JSON value out of `text`, validates it, then deserializes.
    pub fn parse<T: StructuredOutput>(&self, text: &str) -> anyhow::Result<T> {
        let mut value = extract_json(text)?;
        self.validate(&value)?;
        integral_floats(&mut value);
        serde_json::from_value(value)
            .map_err(|e| anyhow::anyhow!("output for '{}' failed to decode: {}", self.name, e))
    }

    /// Instruction appended to the prompt for providers without native support.
    pub fn instruction(&self) -> String {
        format!(
            "Respond ONLY with a JSON object that conforms to this JSON Schema (no prose, no code fences):\n{}",
            self.schema
        )
    }
}

pub fn extract_json(text: &str) -> anyhow::Result<Value> {
    let text = text.trim();
    let start = text
        .find('{')
        .or_else(|| text.find('['))
        .ok_or_else(|| anyhow::anyhow!("No JSON start ({{ or [) found in model output"))?;

    serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| anyhow::anyhow!("No JSON object found in extracted text"))?
        .map_err(|e| anyhow::anyhow!("Invalid JSON: {}", e))
}

/// Rewrites whole-valued floats (`85.0`) as integers; the validator already counts them
/// as `integer`, serde's integer fields do not.
fn integral_floats(node: &mut Value) {
    let whole = match node {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64),
        Value::Array(items) => {
            items.iter_mut().for_each(integral_floats);
            None
        }
        Value::Object(map) => {
            map.values_mut().for_each(integral_floats);
            None
        }
        _ => None,
    };
    if let Some(f) = whole {
        *node = Value::from(f as i64);
    }
}

/// Sends `prompt` with `T`'s schema bound and returns the validated record.
pub async fn invoke_structured<T: StructuredOutput>(
    client: &dyn LlmClient,
    prompt: &str,
    system: Option<&[String]>,
) -> TriageResult<T> {
    let schema = OutputSchema::of::<T>()?;
    let provider = client.provider_name();

    let resp = client
        .complete_structured(prompt, system, &schema)
        .await
        .map_err(|e| TriageError::from_provider(provider, e))?;

    tracing::debug!(schema = schema.name(), model = %resp.model, "structured output received");

    schema
        .parse::<T>(&resp.text)
        .map_err(|e| TriageError::from_provider(provider, e))
}

/// Strips generator metadata and closes every object, which strict providers require.
fn wire_schema(mut schema: Value) -> Value {
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
    }
    close_objects(&mut schema);
    schema
}

fn close_objects(node: &mut Value) {
    match node {
        Value::Object(map) => {
            map.remove("title");
            map.remove("format");
            if map.contains_key("properties") && !map.contains_key("additionalProperties") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }
            for (key, child) in map.iter_mut() {
                match key.as_str() {
                    // keyed by field / definition name, not schemas themselves
                    "properties" | "$defs" | "definitions" => {
                        if let Some(named) = child.as_object_mut() {
                            named.values_mut().for_each(close_objects);
                        }
                    }
                    "enum" | "const" | "examples" | "default" => {}
                    _ => close_objects(child),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(close_objects),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Rating {
        /// Rating from 1 to 5.
        #[schemars(range(min = 1, max = 5))]
        stars: u8,
        label: Category,
    }

    impl StructuredOutput for Rating {
        const NAME: &'static str = "rating";
    }

    #[test]
    fn schema_is_closed_and_bounded() {
        let schema = OutputSchema::of::<Rating>().unwrap();
        let v = schema.schema();
        assert!(v.get("$schema").is_none());
        assert_eq!(v["additionalProperties"], json!(false));
        assert_eq!(v["properties"]["stars"]["minimum"], json!(1));
        assert_eq!(v["properties"]["stars"]["maximum"], json!(5));
    }

    #[test]
    fn parse_accepts_json_wrapped_in_prose() {
        let schema = OutputSchema::of::<Rating>().unwrap();
        let r: Rating = schema
            .parse("Sure! Here you go: {\"stars\": 4, \"label\": \"spam\"} hope it helps")
            .unwrap();
        assert_eq!(r.stars, 4);
        assert_eq!(r.label, Category::Spam);
    }

    #[test]
    fn parse_rejects_out_of_range_and_unknown_fields() {
        let schema = OutputSchema::of::<Rating>().unwrap();

        let err = schema
            .parse::<Rating>(r#"{"stars": 9, "label": "spam"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("does not match schema 'rating'"));

        assert!(schema
            .parse::<Rating>(r#"{"stars": 2, "label": "spam", "extra": true}"#)
            .is_err());
        assert!(schema
            .parse::<Rating>(r#"{"stars": 2, "label": "marketing"}"#)
            .is_err());
    }

    #[test]
    fn whole_valued_floats_decode_as_integers() {
        let schema = OutputSchema::of::<Rating>().unwrap();
        let r: Rating = schema
            .parse(r#"{"stars": 3.0, "label": "normal"}"#)
            .unwrap();
        assert_eq!(r.stars, 3);

        let err = schema
            .parse::<Rating>(r#"{"stars": 3.5, "label": "normal"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("does not match schema"));
    }

    #[test]
    fn extract_json_requires_a_json_start() {
        let err = extract_json("no json here").unwrap_err();
        assert!(err.to_string().contains("No JSON start"));
    }
}
