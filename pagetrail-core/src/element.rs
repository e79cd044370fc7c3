// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! A producer-side description of the element an interaction targeted.

use std::collections::BTreeMap;

/// The target of a DOM event, captured by the producer at the time the event
/// fired.
///
/// Only what classification and labeling look at is kept: the tag name,
/// attributes, rendered text, form state, and the chain of parents.
///
/// ```
/// # use pagetrail_core::element::ElementSnapshot;
/// let button = ElementSnapshot::new("button").data("label", "Next");
/// let icon = ElementSnapshot::new("span").text("Next").within(button);
/// assert_eq!(icon.parent().map(|p| p.tag()), Some("BUTTON"));
/// assert_eq!(icon.ancestor(1).and_then(|p| p.dataset("label")), Some("Next"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementSnapshot {
    tag: String,
    attributes: BTreeMap<String, String>,
    inner_text: Option<String>,
    value: Option<String>,
    checked: Option<bool>,
    parent: Option<Box<ElementSnapshot>>,
}

impl ElementSnapshot {
    /// An element with tag name `tag`. Tag names are stored upper case.
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self {
            tag: tag.as_ref().to_ascii_uppercase(),
            ..Default::default()
        }
    }

    /// Set attribute `name`
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the `data-{key}` attribute
    pub fn data(self, key: &str, value: impl Into<String>) -> Self {
        self.attr(format!("data-{key}"), value)
    }

    /// Set the rendered text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.inner_text = Some(text.into());
        self
    }

    /// Set the current form value
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the checked state of a checkbox or radio
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    /// Place this element inside `parent`
    pub fn within(mut self, parent: ElementSnapshot) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Upper-case tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Whether the tag name is `tag` (case-insensitive)
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Attribute `name`, if present
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The `data-{key}` attribute, if present
    pub fn dataset(&self, key: &str) -> Option<&str> {
        self.attribute(&format!("data-{key}"))
    }

    /// The `type` attribute of an input, lower case as the DOM reports it
    pub fn input_type(&self) -> Option<&str> {
        self.attribute("type")
    }

    /// Rendered text
    pub fn inner_text(&self) -> Option<&str> {
        self.inner_text.as_deref()
    }

    /// Current form value
    pub fn form_value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Checked state of a checkbox or radio
    pub fn is_checked(&self) -> Option<bool> {
        self.checked
    }

    /// The direct parent
    pub fn parent(&self) -> Option<&ElementSnapshot> {
        self.parent.as_deref()
    }

    /// The ancestor `depth` levels up. `ancestor(0)` is the element itself.
    pub fn ancestor(&self, depth: usize) -> Option<&ElementSnapshot> {
        let mut current = self;
        for _ in 0..depth {
            current = current.parent()?;
        }
        Some(current)
    }
}
