//! Request attribute accessor seam
//!
//! The classification and authentication layers never hold a concrete
//! request type; they read named string attributes (headers, server
//! variables) through this trait.

use std::collections::HashMap;

/// Read-only view of a request's named string attributes
pub trait RequestAttributes {
    /// Look up an attribute by name; absent attributes are `None`, never an
    /// error
    fn attribute(&self, name: &str) -> Option<&str>;
}

/// Simple map-backed attribute source
#[derive(Debug, Clone, Default)]
pub struct AttributeMap {
    attributes: HashMap<String, String>,
}

impl AttributeMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn remove(&mut self, name: &str) {
        self.attributes.remove(name);
    }
}

impl RequestAttributes for AttributeMap {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl<R: RequestAttributes + ?Sized> RequestAttributes for &R {
    fn attribute(&self, name: &str) -> Option<&str> {
        (**self).attribute(name)
    }
}
