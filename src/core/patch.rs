//! Config-document image patching.
//!
//! A config document is an untyped tree of unknown origin format. Parsing
//! tries JSON first and falls back to YAML; the document re-serializes
//! through whichever format family parsed it. Patching rewrites every
//! string-valued `image` key that references the target repository, leaving
//! everything else untouched.

use anyhow::{Result, bail};

use crate::core::image::ImageRule;

/// A parsed config document, tagged with the format family that parsed it.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigDocument {
    Json(serde_json::Value),
    Yaml(serde_yaml::Value),
}

impl ConfigDocument {
    /// Parse `text` as JSON, falling back to YAML.
    ///
    /// If both parsers reject the input, the error reports both underlying
    /// failures. A document whose root is not a mapping (a scalar or a
    /// sequence) is rejected after parsing.
    pub fn parse(text: &str) -> Result<Self> {
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(root) => {
                if !root.is_object() {
                    bail!("root of the document must be a mapping");
                }
                Ok(Self::Json(root))
            }
            Err(json_err) => match serde_yaml::from_str::<serde_yaml::Value>(text) {
                Ok(root) => {
                    if !root.is_mapping() {
                        bail!("root of the document must be a mapping");
                    }
                    Ok(Self::Yaml(root))
                }
                Err(yaml_err) => {
                    bail!(
                        "document is neither JSON nor YAML:\n- JSON: {json_err}\n- YAML: {yaml_err}"
                    )
                }
            },
        }
    }

    /// Rewrite every `image` entry referencing the rule's repository to the
    /// rule's `repository:tag`. Returns the number of rewritten entries.
    ///
    /// The traversal is depth-first: it inspects the `image` key of each
    /// mapping, recurses into mapping values, and into mapping elements of
    /// sequence values. Scalars, sequences of scalars, and strings naming a
    /// different repository are left untouched.
    pub fn patch_images(&mut self, rule: &ImageRule) -> usize {
        let mut replaced = 0;
        match self {
            Self::Json(root) => patch_json(root, rule, &mut replaced),
            Self::Yaml(root) => patch_yaml(root, rule, &mut replaced),
        }
        replaced
    }

    /// Serialize back through the format family that parsed the document.
    pub fn to_text(&self) -> Result<String> {
        match self {
            Self::Json(root) => {
                let mut text = serde_json::to_string_pretty(root)?;
                text.push('\n');
                Ok(text)
            }
            Self::Yaml(root) => Ok(serde_yaml::to_string(root)?),
        }
    }
}

fn patch_json(node: &mut serde_json::Value, rule: &ImageRule, replaced: &mut usize) {
    let serde_json::Value::Object(map) = node else {
        return;
    };
    if let Some(serde_json::Value::String(image)) = map.get_mut("image")
        && rule.matches(image)
    {
        *image = rule.full_name();
        *replaced += 1;
    }
    for value in map.values_mut() {
        match value {
            serde_json::Value::Object(_) => patch_json(value, rule, replaced),
            serde_json::Value::Array(items) => {
                for item in items.iter_mut().filter(|item| item.is_object()) {
                    patch_json(item, rule, replaced);
                }
            }
            _ => {}
        }
    }
}

fn patch_yaml(node: &mut serde_yaml::Value, rule: &ImageRule, replaced: &mut usize) {
    let serde_yaml::Value::Mapping(map) = node else {
        return;
    };
    let image_key = serde_yaml::Value::from("image");
    if let Some(serde_yaml::Value::String(image)) = map.get_mut(&image_key)
        && rule.matches(image)
    {
        *image = rule.full_name();
        *replaced += 1;
    }
    for value in map.values_mut() {
        match value {
            serde_yaml::Value::Mapping(_) => patch_yaml(value, rule, replaced),
            serde_yaml::Value::Sequence(items) => {
                for item in items.iter_mut().filter(|item| item.is_mapping()) {
                    patch_yaml(item, rule, replaced);
                }
            }
            _ => {}
        }
    }
}
