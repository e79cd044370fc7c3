// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Turning DOM event targets into [`RawEvent`]s.
//!
//! A producer listening on the document hands the event target to one of the
//! classifiers below. Targets that aren't interesting (plain text, layout
//! containers) give `None` and are not recorded. Interesting targets with no
//! discoverable label are recorded with [`UNKNOWN_LABEL`](crate::label::UNKNOWN_LABEL).

use crate::{
    ElementType, InputValue, RawEvent,
    element::ElementSnapshot,
    label::{Ancestor, Attribute, FirstOf, InnerText, LabelStrategy},
};

const FORM_CONTROL_ATTRIBUTE: &str = "data-formcontrolname";

fn is_toggle(target: &ElementSnapshot) -> bool {
    target.is("INPUT") && matches!(target.input_type(), Some("checkbox" | "radio"))
}

/// Classifies `click` targets.
#[derive(Debug)]
pub struct ClickClassifier {
    button_label: Box<dyn LabelStrategy>,
    link_label: Box<dyn LabelStrategy>,
    option_label: Box<dyn LabelStrategy>,
    option_value: Box<dyn LabelStrategy>,
    toggle_label: Box<dyn LabelStrategy>,
}

impl Default for ClickClassifier {
    fn default() -> Self {
        Self {
            button_label: Box::new(
                FirstOf::new()
                    .or(Attribute::data_label())
                    .or(Attribute::aria_label())
                    .or(InnerText),
            ),
            link_label: Box::new(
                FirstOf::new()
                    .or(Attribute::data_label())
                    .or(Attribute::aria_label())
                    .or(InnerText),
            ),
            option_label: Box::new(Attribute::data_label()),
            option_value: Box::new(InnerText),
            toggle_label: Box::new(
                FirstOf::new()
                    .or(Attribute::new("name"))
                    .or(Attribute::data_label()),
            ),
        }
    }
}

impl ClickClassifier {
    /// Classifier with the default label strategies
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategy for button labels. Defaults to `data-label`, then `aria-label`, then the text.
    pub fn button_label(mut self, strategy: impl LabelStrategy + 'static) -> Self {
        self.button_label = Box::new(strategy);
        self
    }

    /// Strategy for link labels. Defaults to `data-label`, then `aria-label`, then the text.
    pub fn link_label(mut self, strategy: impl LabelStrategy + 'static) -> Self {
        self.link_label = Box::new(strategy);
        self
    }

    /// Strategy naming the select an option belongs to. Defaults to `data-label`.
    pub fn option_label(mut self, strategy: impl LabelStrategy + 'static) -> Self {
        self.option_label = Box::new(strategy);
        self
    }

    /// Strategy naming a clicked checkbox or radio. Defaults to `name`, then `data-label`.
    pub fn toggle_label(mut self, strategy: impl LabelStrategy + 'static) -> Self {
        self.toggle_label = Box::new(strategy);
        self
    }

    /// Classify a click on `target`.
    ///
    /// In precedence order:
    /// 1. anything bound to a form control (`data-formcontrolname`) → [`RawEvent::FormControlClick`]
    /// 2. a button, or a `<span>` directly inside one → [`RawEvent::ButtonClick`]
    /// 3. a link → [`RawEvent::AnchorClick`]
    /// 4. a select option → [`RawEvent::InputChange`] with [`ElementType::MatOption`]
    /// 5. a checkbox or radio input → [`RawEvent::ActiveCheckOrRadio`]
    pub fn classify(&self, target: &ElementSnapshot) -> Option<RawEvent> {
        if let Some(name) = target
            .attribute(FORM_CONTROL_ATTRIBUTE)
            .filter(|n| !n.is_empty())
        {
            return Some(RawEvent::FormControlClick {
                name: name.to_owned(),
            });
        }

        if target.is("BUTTON") {
            return Some(RawEvent::ButtonClick {
                text: self.button_label.label_or_unknown(target),
            });
        }
        if target.is("SPAN")
            && let Some(button) = target.parent().filter(|p| p.is("BUTTON"))
        {
            return Some(RawEvent::ButtonClick {
                text: self.button_label.label_or_unknown(button),
            });
        }
        if target.is("A") {
            return Some(RawEvent::AnchorClick {
                text: self.link_label.label_or_unknown(target),
            });
        }
        if target.is("MAT-OPTION") {
            return Some(RawEvent::InputChange {
                element_type: ElementType::MatOption,
                element_label: self.option_label.label_or_unknown(target),
                value: self.option_value.label_or_unknown(target).into(),
            });
        }
        if is_toggle(target) {
            return Some(RawEvent::ActiveCheckOrRadio {
                name: self.toggle_label.label_or_unknown(target),
                is_checked: target.is_checked().unwrap_or(false),
            });
        }
        None
    }
}

/// Classifies `change` targets.
///
/// Checkbox and radio inputs are usually rendered inside wrapper components,
/// so by default their label is read from the `data-label` of an ancestor
/// (3 levels up for checkboxes, 4 for radios).
#[derive(Debug)]
pub struct ChangeClassifier {
    checkbox_label: Box<dyn LabelStrategy>,
    radio_label: Box<dyn LabelStrategy>,
    input_label: Box<dyn LabelStrategy>,
}

impl Default for ChangeClassifier {
    fn default() -> Self {
        Self {
            checkbox_label: Box::new(Ancestor::new(3, Attribute::data_label())),
            radio_label: Box::new(Ancestor::new(4, Attribute::data_label())),
            input_label: Box::new(Attribute::data_label()),
        }
    }
}

impl ChangeClassifier {
    /// Classifier with the default label strategies
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategy for checkbox labels
    pub fn checkbox_label(mut self, strategy: impl LabelStrategy + 'static) -> Self {
        self.checkbox_label = Box::new(strategy);
        self
    }

    /// Strategy for radio labels
    pub fn radio_label(mut self, strategy: impl LabelStrategy + 'static) -> Self {
        self.radio_label = Box::new(strategy);
        self
    }

    /// Strategy for other input labels
    pub fn input_label(mut self, strategy: impl LabelStrategy + 'static) -> Self {
        self.input_label = Box::new(strategy);
        self
    }

    /// Classify a change on `target`. Only `<input>` elements produce events.
    pub fn classify(&self, target: &ElementSnapshot) -> Option<RawEvent> {
        if !target.is("INPUT") {
            return None;
        }
        let (element_type, element_label, value): (ElementType, String, InputValue) =
            match target.input_type() {
                Some("checkbox") => (
                    ElementType::Checkbox,
                    self.checkbox_label.label_or_unknown(target),
                    target.is_checked().unwrap_or(false).into(),
                ),
                Some("radio") => (
                    ElementType::Radio,
                    self.radio_label.label_or_unknown(target),
                    target.form_value().unwrap_or_default().into(),
                ),
                _ => (
                    ElementType::Input,
                    self.input_label.label_or_unknown(target),
                    target.form_value().unwrap_or_default().into(),
                ),
            };
        Some(RawEvent::InputChange {
            element_type,
            element_label,
            value,
        })
    }
}

/// Classifies `focus` and `blur` targets. Only form widgets produce events.
#[derive(Debug)]
pub struct FocusClassifier {
    label: Box<dyn LabelStrategy>,
}

impl Default for FocusClassifier {
    fn default() -> Self {
        Self {
            label: Box::new(
                FirstOf::new()
                    .or(Attribute::data_label())
                    .or(Attribute::aria_label())
                    .or(Attribute::new("name")),
            ),
        }
    }
}

impl FocusClassifier {
    const WIDGETS: [&'static str; 4] = ["INPUT", "TEXTAREA", "SELECT", "MAT-SELECT"];

    /// Classifier with the default label strategy
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategy for widget labels. Defaults to `data-label`, then `aria-label`, then `name`.
    pub fn label(mut self, strategy: impl LabelStrategy + 'static) -> Self {
        self.label = Box::new(strategy);
        self
    }

    fn widget_label(&self, target: &ElementSnapshot) -> Option<String> {
        Self::WIDGETS
            .iter()
            .any(|tag| target.is(tag))
            .then(|| self.label.label_or_unknown(target))
    }

    /// [`RawEvent::Focus`] for a form widget
    pub fn focus(&self, target: &ElementSnapshot) -> Option<RawEvent> {
        self.widget_label(target)
            .map(|element_label| RawEvent::Focus { element_label })
    }

    /// [`RawEvent::Blur`] for a form widget
    pub fn blur(&self, target: &ElementSnapshot) -> Option<RawEvent> {
        self.widget_label(target)
            .map(|element_label| RawEvent::Blur { element_label })
    }
}
