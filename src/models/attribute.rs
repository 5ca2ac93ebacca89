//! Symbolic attribute applications
//!
//! An attribute here is language-neutral: a resolved attribute class plus an
//! (always empty) argument list. Rendering into source syntax is the node
//! transformer's job.

use serde::Serialize;

const ATTRIBUTE_SUFFIX: &str = "Attribute";

/// Attributes the fixers know how to synthesize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WellKnownAttribute {
    NonSerialized,
    Serializable,
}

impl WellKnownAttribute {
    /// Fully qualified metadata name of the attribute class
    pub fn metadata_name(self) -> &'static str {
        match self {
            Self::NonSerialized => "System.NonSerializedAttribute",
            Self::Serializable => "System.SerializableAttribute",
        }
    }
}

/// Resolved attribute class
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AttributeDescriptor {
    pub namespace: String,
    pub name: String,
}

impl AttributeDescriptor {
    pub fn from_metadata_name(full_name: &str) -> Self {
        match full_name.rsplit_once('.') {
            Some((namespace, name)) => Self {
                namespace: namespace.to_string(),
                name: name.to_string(),
            },
            None => Self {
                namespace: String::new(),
                name: full_name.to_string(),
            },
        }
    }

    pub fn well_known(attribute: WellKnownAttribute) -> Self {
        Self::from_metadata_name(attribute.metadata_name())
    }

    /// Class name with the conventional `Attribute` suffix dropped
    pub fn short_name(&self) -> &str {
        self.name
            .strip_suffix(ATTRIBUTE_SUFFIX)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.name)
    }

    pub fn qualified_short_name(&self) -> String {
        if self.namespace.is_empty() {
            self.short_name().to_string()
        } else {
            format!("{}.{}", self.namespace, self.short_name())
        }
    }
}

/// An attribute application with no constructor or named arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeData {
    pub class: AttributeDescriptor,
}

impl AttributeData {
    pub fn new(class: AttributeDescriptor) -> Self {
        Self { class }
    }

    pub fn has_arguments(&self) -> bool {
        false
    }
}

/// How an attribute name is spelled in source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AttributeNameStyle {
    /// `[NonSerialized]`
    #[default]
    Simple,
    /// `[System.NonSerialized]`
    Qualified,
}

impl AttributeNameStyle {
    pub fn render(self, attribute: &AttributeData) -> String {
        match self {
            Self::Simple => attribute.class.short_name().to_string(),
            Self::Qualified => attribute.class.qualified_short_name(),
        }
    }
}
