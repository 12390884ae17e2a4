// Copyright 2017 Dmitry Tantsur <divius.inside@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Results of stack operations and the records extracted from them.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::de::{DeserializeOwned, Error as DeserError};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::protocol::StackStatus;
use crate::Result;

/// A link to a related resource.
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    /// Target URL.
    pub href: String,
    /// Relation to the current resource (`self`, `next`, ...).
    pub rel: String,
}

/// Stack reference returned on creation or adoption.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedStack {
    /// Stack ID.
    pub id: String,
    /// Links to the stack.
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A stack as returned in a list.
#[derive(Debug, Clone, Deserialize)]
pub struct ListedStack {
    /// When the stack was created.
    #[serde(rename = "creation_time", deserialize_with = "deser_opt_timestamp", default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    /// Stack description.
    #[serde(default)]
    pub description: Option<String>,
    /// Stack ID.
    pub id: String,
    /// Links to the stack.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Stack name.
    #[serde(rename = "stack_name")]
    pub name: String,
    /// Stack status.
    #[serde(rename = "stack_status", default)]
    pub status: StackStatus,
    /// Explanation of the status.
    #[serde(rename = "stack_status_reason", default)]
    pub status_reason: Option<String>,
    /// When the stack was last updated.
    #[serde(rename = "updated_time", deserialize_with = "deser_opt_timestamp", default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

/// An output of a stack.
#[derive(Debug, Clone, Deserialize)]
pub struct StackOutput {
    /// Output name.
    pub output_key: String,
    /// Output value.
    #[serde(default)]
    pub output_value: Value,
    /// Output description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A stack as returned by a get request.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievedStack {
    /// Template capabilities.
    #[serde(default)]
    pub capabilities: Vec<Value>,
    /// When the stack was created.
    #[serde(rename = "creation_time", deserialize_with = "deser_opt_timestamp", default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    /// Stack description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the resources are kept on failure.
    #[serde(default)]
    pub disable_rollback: bool,
    /// Stack ID.
    pub id: String,
    /// Links to the stack.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Stack name.
    #[serde(rename = "stack_name")]
    pub name: String,
    /// Notification topics.
    #[serde(default)]
    pub notification_topics: Vec<Value>,
    /// Stack outputs.
    #[serde(default)]
    pub outputs: Vec<StackOutput>,
    /// Input parameters (including the pseudo-parameters set by Heat).
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    /// Stack status.
    #[serde(rename = "stack_status", default)]
    pub status: StackStatus,
    /// Explanation of the status.
    #[serde(rename = "stack_status_reason", default)]
    pub status_reason: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Description from the template.
    #[serde(default)]
    pub template_description: Option<String>,
    /// Timeout in minutes.
    #[serde(rename = "timeout_mins", default)]
    pub timeout: Option<u32>,
    /// When the stack was last updated.
    #[serde(rename = "updated_time", deserialize_with = "deser_opt_timestamp", default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

/// A stack as it would be created.
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewedStack {
    /// Template capabilities.
    #[serde(default)]
    pub capabilities: Vec<Value>,
    /// When the preview was made.
    #[serde(rename = "creation_time", deserialize_with = "deser_opt_timestamp", default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    /// Stack description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the resources are kept on failure.
    #[serde(default)]
    pub disable_rollback: bool,
    /// Placeholder ID (the stack does not exist).
    #[serde(default)]
    pub id: Option<String>,
    /// Links.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Stack name.
    #[serde(rename = "stack_name")]
    pub name: String,
    /// Input parameters.
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    /// Resources that would be created.
    #[serde(default)]
    pub resources: Vec<Value>,
    /// Description from the template.
    #[serde(default)]
    pub template_description: Option<String>,
    /// Timeout in minutes.
    #[serde(rename = "timeout_mins", default)]
    pub timeout: Option<u32>,
}

/// Data describing an abandoned stack, suitable for adoption.
#[derive(Debug, Clone, Deserialize)]
pub struct AbandonedStack {
    /// Last action on the stack.
    #[serde(default)]
    pub action: Option<String>,
    /// Environment of the stack.
    #[serde(default)]
    pub environment: Value,
    /// Files of the stack.
    #[serde(default)]
    pub files: HashMap<String, Value>,
    /// Stack ID.
    pub id: String,
    /// Stack name.
    pub name: String,
    /// Project that owned the stack.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Resources left behind, keyed by name.
    #[serde(default)]
    pub resources: HashMap<String, Value>,
    /// Status of the last action.
    #[serde(default)]
    pub status: Option<String>,
    /// Stack template.
    #[serde(default)]
    pub template: Value,
}

#[derive(Debug, Deserialize)]
struct StackRoot<T> {
    stack: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StacksRoot {
    pub stacks: Vec<ListedStack>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Deserialize a timestamp with or without a time zone (UTC is assumed).
pub fn deser_opt_timestamp<'de, D>(
    des: D,
) -> ::std::result::Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Deserialize::deserialize(des)?;
    match value {
        Some(s) if !s.is_empty() => parse_timestamp(&s).map(Some).map_err(DeserError::custom),
        _ => Ok(None),
    }
}

fn parse_timestamp(value: &str) -> ::std::result::Result<DateTime<FixedOffset>, String> {
    if let Ok(result) = DateTime::parse_from_rfc3339(value) {
        return Ok(result);
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|e| format!("invalid timestamp {}: {}", value, e))
}

fn extract_stack<T: DeserializeOwned>(body: &Value) -> Result<T> {
    let root: StackRoot<T> = serde_json::from_value(body.clone())?;
    Ok(root.stack)
}

macro_rules! raw_result {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone)]
        pub struct $name {
            body: Value,
        }

        impl $name {
            pub(crate) fn new(body: Value) -> $name {
                $name { body }
            }

            /// Raw decoded response body.
            #[inline]
            pub fn body(&self) -> &Value {
                &self.body
            }

            /// Convert into the raw decoded response body.
            #[inline]
            pub fn into_body(self) -> Value {
                self.body
            }
        }
    };
}

raw_result! {
    /// Result of a stack creation or adoption.
    CreateResult
}

raw_result! {
    /// Result of fetching a stack.
    GetResult
}

raw_result! {
    /// Result of a stack preview.
    PreviewResult
}

raw_result! {
    /// Result of abandoning a stack.
    AbandonResult
}

/// Result of a stack update (the API returns no body).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateResult;

/// Result of a stack deletion (the API returns no body).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult;

impl CreateResult {
    /// Extract the reference to the new stack.
    pub fn extract(&self) -> Result<CreatedStack> {
        extract_stack(&self.body)
    }
}

impl GetResult {
    /// Extract the stack.
    pub fn extract(&self) -> Result<RetrievedStack> {
        extract_stack(&self.body)
    }
}

impl PreviewResult {
    /// Extract the previewed stack.
    pub fn extract(&self) -> Result<PreviewedStack> {
        extract_stack(&self.body)
    }
}

impl AbandonResult {
    /// Extract the abandoned stack data.
    pub fn extract(&self) -> Result<AbandonedStack> {
        serde_json::from_value(self.body.clone()).map_err(From::from)
    }
}
