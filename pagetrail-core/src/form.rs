// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Validity of submitted forms.
//!
//! A producer describes a form as a [`FormNode`] tree. On submission the tree
//! is flattened into a [`FieldValidity`] tree that mirrors its shape, with
//! `"VALID"`/`"INVALID"` at the leaves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Shape and state of a form as seen by the producer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormNode {
    /// A single control.
    Control {
        /// Whether the control passes its validators.
        valid: bool,
    },
    /// Named child controls.
    Group(BTreeMap<String, FormNode>),
    /// Positional child controls.
    Array(Vec<FormNode>),
}

impl FormNode {
    /// A leaf control
    pub fn control(valid: bool) -> Self {
        Self::Control { valid }
    }

    /// A group of named children
    pub fn group<K: Into<String>>(children: impl IntoIterator<Item = (K, FormNode)>) -> Self {
        Self::Group(children.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// An array of children
    pub fn array(children: impl IntoIterator<Item = FormNode>) -> Self {
        Self::Array(children.into_iter().collect())
    }

    /// A group or array is valid when every child is. Empty containers are valid.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Control { valid } => *valid,
            Self::Group(children) => children.values().all(FormNode::is_valid),
            Self::Array(children) => children.iter().all(FormNode::is_valid),
        }
    }

    /// Per-field validity, mirroring the shape of this node.
    pub fn validity(&self) -> FieldValidity {
        match self {
            Self::Control { valid } => FieldValidity::State(ValidityState::from(*valid)),
            Self::Group(children) => FieldValidity::Group(
                children
                    .iter()
                    .map(|(name, child)| (name.clone(), child.validity()))
                    .collect(),
            ),
            Self::Array(children) => {
                FieldValidity::List(children.iter().map(FormNode::validity).collect())
            }
        }
    }
}

/// Leaf state of a [`FieldValidity`] tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidityState {
    /// `"VALID"`
    Valid,
    /// `"INVALID"`
    Invalid,
}

impl From<bool> for ValidityState {
    fn from(valid: bool) -> Self {
        if valid { Self::Valid } else { Self::Invalid }
    }
}

/// Per-field validity attached to [`crate::RawEvent::FormSubmitInvalid`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValidity {
    /// A single control
    State(ValidityState),
    /// A group, keyed by control name
    Group(BTreeMap<String, FieldValidity>),
    /// An array of controls
    List(Vec<FieldValidity>),
}
