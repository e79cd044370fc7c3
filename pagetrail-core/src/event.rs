// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The closed set of user interactions pagetrail records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::form::{FieldValidity, FormNode};

/// A user interaction as reported by a producer, before it is stamped with a
/// time and page.
///
/// Serializes with a `type` discriminator, e.g.
/// `{"type":"routerChange","text":"/welcome"}`. Each variant carries only the
/// fields that make sense for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RawEvent {
    /// A button was clicked. `text` is the button's label.
    ButtonClick { text: String },
    /// A link was clicked. `text` is the link's label.
    AnchorClick { text: String },
    /// An element bound to a named form control was clicked.
    FormControlClick { name: String },
    /// A checkbox or radio input was clicked.
    ActiveCheckOrRadio { name: String, is_checked: bool },
    /// The value of a form widget changed.
    InputChange {
        element_type: ElementType,
        element_label: String,
        value: InputValue,
    },
    /// A form widget gained focus.
    Focus { element_label: String },
    /// A form widget lost focus.
    Blur { element_label: String },
    /// A form was submitted while valid.
    FormSubmitValid { values: BTreeMap<String, String> },
    /// A form was submitted while at least one control was invalid.
    FormSubmitInvalid {
        values: BTreeMap<String, String>,
        field_validity: FieldValidity,
    },
    /// A dialog was opened. `component_name` identifies its content.
    OpenDialog { component_name: String },
    /// The last open dialog was closed.
    CloseDialog,
    /// Navigation completed. `text` is the destination, or `"<from> -> <to>"`.
    RouterChange { text: String },
    /// An outbound API request was sent.
    ApiCall { url: String },
    /// An outbound API request got a response.
    ApiResponse { url: String, status: u16 },
}

impl RawEvent {
    /// Separator between the previous and the next path of a route change.
    pub const ROUTE_SEPARATOR: &'static str = " -> ";

    /// Route change to `to`. When `from` is known the label reads `"<from> -> <to>"`.
    pub fn route_change(to: impl Into<String>, from: Option<&str>) -> Self {
        let to = to.into();
        let text = match from {
            Some(from) => format!("{from}{}{to}", Self::ROUTE_SEPARATOR),
            None => to,
        };
        Self::RouterChange { text }
    }

    /// Submission of a form with the given raw `values`. Picks
    /// [`RawEvent::FormSubmitValid`] or [`RawEvent::FormSubmitInvalid`] from the
    /// validity of `form`, attaching the per-field tree when invalid.
    pub fn form_submit(values: BTreeMap<String, String>, form: &FormNode) -> Self {
        if form.is_valid() {
            Self::FormSubmitValid { values }
        } else {
            Self::FormSubmitInvalid {
                values,
                field_validity: form.validity(),
            }
        }
    }

    /// The wire name of this event's `type` field.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ButtonClick { .. } => "buttonClick",
            Self::AnchorClick { .. } => "anchorClick",
            Self::FormControlClick { .. } => "formControlClick",
            Self::ActiveCheckOrRadio { .. } => "activeCheckOrRadio",
            Self::InputChange { .. } => "inputChange",
            Self::Focus { .. } => "focus",
            Self::Blur { .. } => "blur",
            Self::FormSubmitValid { .. } => "formSubmitValid",
            Self::FormSubmitInvalid { .. } => "formSubmitInvalid",
            Self::OpenDialog { .. } => "openDialog",
            Self::CloseDialog => "closeDialog",
            Self::RouterChange { .. } => "routerChange",
            Self::ApiCall { .. } => "apiCall",
            Self::ApiResponse { .. } => "apiResponse",
        }
    }

    /// True for [`RawEvent::ButtonClick`]
    pub fn is_button_click(&self) -> bool {
        matches!(self, Self::ButtonClick { .. })
    }
}

/// Kind of widget behind an [`RawEvent::InputChange`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementType {
    /// A free-form `<input>`
    Input,
    /// A checkbox input
    Checkbox,
    /// A radio input
    Radio,
    /// An option picked from a select overlay
    #[serde(rename = "MAT-OPTION")]
    MatOption,
}

/// New value of a changed widget: the checked state for checkboxes, text otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    /// Checked state
    Checked(bool),
    /// Text value
    Text(String),
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        Self::Checked(value)
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}
