// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Strategies that derive a human readable label from an [`ElementSnapshot`].
//!
//! Applications label their widgets differently (a `data-label` attribute, an
//! `aria-label`, the visible text, or an attribute on a wrapping component),
//! so the label is a pluggable [`LabelStrategy`] rather than a fixed rule.
//! When no strategy yields a label the entry is recorded as [`UNKNOWN_LABEL`].

use std::fmt::Debug;

use crate::element::ElementSnapshot;

/// Label recorded when no strategy finds one.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Derives a label for an element.
pub trait LabelStrategy: Send + Sync + Debug {
    /// The label, or `None` if this strategy has nothing to say about `element`.
    /// Implementations should return `None` rather than an empty string.
    fn label(&self, element: &ElementSnapshot) -> Option<String>;

    /// The label, or [`UNKNOWN_LABEL`].
    fn label_or_unknown(&self, element: &ElementSnapshot) -> String {
        self.label(element)
            .unwrap_or_else(|| UNKNOWN_LABEL.to_owned())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// The value of an attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute(String);

impl Attribute {
    /// Read attribute `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// `data-label`
    pub fn data_label() -> Self {
        Self::new("data-label")
    }

    /// `aria-label`
    pub fn aria_label() -> Self {
        Self::new("aria-label")
    }
}

impl LabelStrategy for Attribute {
    fn label(&self, element: &ElementSnapshot) -> Option<String> {
        non_blank(element.attribute(&self.0))
    }
}

/// The rendered text of the element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InnerText;

impl LabelStrategy for InnerText {
    fn label(&self, element: &ElementSnapshot) -> Option<String> {
        non_blank(element.inner_text())
    }
}

/// Applies `inner` to the ancestor `depth` levels up, for widgets whose label
/// lives on a wrapping component rather than on the event target.
#[derive(Debug)]
pub struct Ancestor {
    depth: usize,
    inner: Box<dyn LabelStrategy>,
}

impl Ancestor {
    /// Label the ancestor `depth` levels up with `inner`
    pub fn new(depth: usize, inner: impl LabelStrategy + 'static) -> Self {
        Self {
            depth,
            inner: Box::new(inner),
        }
    }
}

impl LabelStrategy for Ancestor {
    fn label(&self, element: &ElementSnapshot) -> Option<String> {
        self.inner.label(element.ancestor(self.depth)?)
    }
}

/// Tries each strategy in turn and keeps the first label found.
#[derive(Debug, Default)]
pub struct FirstOf(Vec<Box<dyn LabelStrategy>>);

impl FirstOf {
    /// An empty chain, which never finds a label
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `strategy` to the chain
    pub fn or(mut self, strategy: impl LabelStrategy + 'static) -> Self {
        self.0.push(Box::new(strategy));
        self
    }
}

impl LabelStrategy for FirstOf {
    fn label(&self, element: &ElementSnapshot) -> Option<String> {
        self.0.iter().find_map(|strategy| strategy.label(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_of_falls_through_blank_values() {
        let strategy = FirstOf::new()
            .or(Attribute::data_label())
            .or(Attribute::aria_label())
            .or(InnerText);

        let el = ElementSnapshot::new("button")
            .data("label", "  ")
            .text("Continue");
        assert_eq!(strategy.label(&el).as_deref(), Some("Continue"));

        let el = ElementSnapshot::new("button")
            .attr("aria-label", "Close dialog")
            .text("x");
        assert_eq!(strategy.label(&el).as_deref(), Some("Close dialog"));
    }

    #[test]
    fn missing_label_becomes_unknown() {
        let el = ElementSnapshot::new("button");
        assert_eq!(Attribute::data_label().label_or_unknown(&el), UNKNOWN_LABEL);
        assert_eq!(FirstOf::new().label_or_unknown(&el), UNKNOWN_LABEL);
    }

    #[test]
    fn ancestor_reads_the_wrapping_component() {
        let input = ElementSnapshot::new("input").within(
            ElementSnapshot::new("div")
                .within(ElementSnapshot::new("mat-radio-group").data("label", "plan")),
        );
        assert_eq!(
            Ancestor::new(2, Attribute::data_label())
                .label(&input)
                .as_deref(),
            Some("plan")
        );
        // chain too short
        assert_eq!(Ancestor::new(5, Attribute::data_label()).label(&input), None);
    }
}
