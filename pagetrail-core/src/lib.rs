// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(docsrs, feature(doc_cfg))]

//! Core types for pagetrail: the closed event taxonomy, the normalized
//! [`LogEntry`], ordering and chunking of an accumulated log, and the
//! [`RemoteSink`] seam that chunks are delivered through.
//!
//! Nothing in this crate owns threads or does IO. The accumulator and the
//! concrete sinks live in `pagetrail-writer`.

pub use crate::entry::{LogEntry, Normalizer};
pub use crate::event::{ElementType, InputValue, RawEvent};
pub use crate::form::{FieldValidity, FormNode, ValidityState};
pub use crate::order::LogOrder;
pub use crate::payload::{DEFAULT_CHUNK_SIZE, LogPayload, chunk_payloads};
pub use crate::sink::{BoxRemoteSink, RemoteSink};

pub mod classify;
pub mod element;
pub mod entry;
pub mod event;
pub mod form;
pub mod label;
pub mod order;
pub mod payload;
pub mod sink;
