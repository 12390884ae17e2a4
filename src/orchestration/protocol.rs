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

//! JSON structures and request builders for the Orchestration API.

use std::collections::HashMap;

use osauth::{Query, QueryItem};
use serde_json::{Map, Value};

use crate::utils::SortDir;
use crate::{Error, Result};

/// JSON object sent as a request body.
pub type JsonMap = Map<String, Value>;

/// Key of the envelope around an adoption request.
pub const ADOPT_ENVELOPE: &str = "stack";

protocol_enum! {
    /// Possible stack statuses.
    enum StackStatus = Unknown {
        /// Stack creation is running.
        CreateInProgress = "CREATE_IN_PROGRESS",
        /// Stack was created.
        CreateComplete = "CREATE_COMPLETE",
        /// Stack creation has failed.
        CreateFailed = "CREATE_FAILED",
        /// Stack update is running.
        UpdateInProgress = "UPDATE_IN_PROGRESS",
        /// Stack was updated.
        UpdateComplete = "UPDATE_COMPLETE",
        /// Stack update has failed.
        UpdateFailed = "UPDATE_FAILED",
        /// Stack deletion is running.
        DeleteInProgress = "DELETE_IN_PROGRESS",
        /// Stack was deleted.
        DeleteComplete = "DELETE_COMPLETE",
        /// Stack deletion has failed.
        DeleteFailed = "DELETE_FAILED",
        /// Rollback after a failure is running.
        RollbackInProgress = "ROLLBACK_IN_PROGRESS",
        /// Rollback has finished.
        RollbackComplete = "ROLLBACK_COMPLETE",
        /// Rollback has failed.
        RollbackFailed = "ROLLBACK_FAILED",
        /// Stack adoption is running.
        AdoptInProgress = "ADOPT_IN_PROGRESS",
        /// Stack was adopted.
        AdoptComplete = "ADOPT_COMPLETE",
        /// Stack adoption has failed.
        AdoptFailed = "ADOPT_FAILED",
        /// Stack is being checked.
        CheckInProgress = "CHECK_IN_PROGRESS",
        /// Stack check has finished.
        CheckComplete = "CHECK_COMPLETE",
        /// Stack check has failed.
        CheckFailed = "CHECK_FAILED",
        /// Stack is being suspended.
        SuspendInProgress = "SUSPEND_IN_PROGRESS",
        /// Stack is suspended.
        SuspendComplete = "SUSPEND_COMPLETE",
        /// Stack is being resumed.
        ResumeInProgress = "RESUME_IN_PROGRESS",
        /// Stack was resumed.
        ResumeComplete = "RESUME_COMPLETE",

        /// Reported status is not supported.
        Unknown = ""
    }
}

impl StackStatus {
    /// Whether an action is running on the stack.
    pub fn is_in_progress(&self) -> bool {
        self.as_ref().ends_with("_IN_PROGRESS")
    }

    /// Whether the last action has finished successfully.
    pub fn is_complete(&self) -> bool {
        self.as_ref().ends_with("_COMPLETE")
    }

    /// Whether the last action has failed.
    pub fn is_failure(&self) -> bool {
        self.as_ref().ends_with("_FAILED")
    }
}

protocol_enum! {
    /// Sort key for listing stacks.
    enum StackSortKey {
        /// Sort by the stack name.
        Name = "name",
        /// Sort by the stack status.
        Status = "status",
        /// Sort by the creation time.
        CreatedAt = "created_at",
        /// Sort by the last update time.
        UpdatedAt = "updated_at"
    }
}

/// Filter for listing stacks.
#[derive(Debug, Clone, QueryItem)]
pub enum StackFilter {
    /// Stacks with this status.
    Status(String),
    /// Stacks with this name.
    Name(String),
    /// Marker (last stack that was fetched).
    Marker(String),
    /// Limit on the number of fetched stacks.
    Limit(usize),
    /// Key to sort on.
    #[query_item = "sort_keys"]
    SortKey(StackSortKey),
    /// Sorting direction.
    SortDir(SortDir),
}

/// Options to create a stack.
#[derive(Debug, Clone, Default)]
pub struct CreateStackOpts {
    /// Whether to keep the resources if creation fails.
    pub disable_rollback: Option<bool>,
    /// Environment definition.
    pub environment: String,
    /// Files referenced from the template or the environment.
    pub files: Option<HashMap<String, Value>>,
    /// Stack name (required).
    pub name: String,
    /// Input parameters.
    pub parameters: Option<HashMap<String, String>>,
    /// Template body.
    pub template: String,
    /// Template URL (used when the template body is empty).
    pub template_url: String,
    /// Timeout in minutes.
    pub timeout: u32,
}

/// Options to adopt existing resources as a new stack.
#[derive(Debug, Clone, Default)]
pub struct AdoptStackOpts {
    /// Data produced by abandoning a stack (required).
    pub adopt_stack_data: String,
    /// Whether to keep the resources if adoption fails.
    pub disable_rollback: Option<bool>,
    /// Environment definition.
    pub environment: String,
    /// Files referenced from the template or the environment.
    pub files: Option<HashMap<String, Value>>,
    /// Stack name (required).
    pub name: String,
    /// Input parameters.
    pub parameters: Option<HashMap<String, String>>,
    /// Template body.
    pub template: String,
    /// Template URL (used when the template body is empty).
    pub template_url: String,
    /// Timeout in minutes.
    pub timeout: u32,
}

/// Options to update a stack.
#[derive(Debug, Clone, Default)]
pub struct UpdateStackOpts {
    /// Environment definition.
    pub environment: String,
    /// Files referenced from the template or the environment.
    pub files: Option<HashMap<String, Value>>,
    /// Input parameters.
    pub parameters: Option<HashMap<String, String>>,
    /// Template body.
    pub template: String,
    /// Template URL (used when the template body is empty).
    pub template_url: String,
    /// Timeout in minutes.
    pub timeout: u32,
}

/// Options to preview a stack.
#[derive(Debug, Clone, Default)]
pub struct PreviewStackOpts {
    /// Whether to keep the resources if creation fails.
    pub disable_rollback: Option<bool>,
    /// Environment definition.
    pub environment: String,
    /// Files referenced from the template or the environment.
    pub files: Option<HashMap<String, Value>>,
    /// Stack name (required).
    pub name: String,
    /// Input parameters.
    pub parameters: Option<HashMap<String, String>>,
    /// Template body.
    pub template: String,
    /// Template URL (used when the template body is empty).
    pub template_url: String,
    /// Timeout in minutes.
    pub timeout: u32,
}

/// Options to list stacks.
#[derive(Debug, Clone, Default)]
pub struct ListStacksOpts {
    /// Stacks with this status.
    pub status: String,
    /// Stacks with this name.
    pub name: String,
    /// Marker (last stack that was fetched).
    pub marker: String,
    /// Limit on the number of fetched stacks.
    pub limit: usize,
    /// Key to sort on.
    pub sort_key: Option<StackSortKey>,
    /// Sorting direction.
    pub sort_dir: Option<SortDir>,
}

/// Something that can be turned into a stack creation request.
pub trait CreateStackRequest {
    /// Build the request body.
    fn to_create_body(&self) -> Result<JsonMap>;
}

/// Something that can be turned into a stack adoption request.
pub trait AdoptStackRequest {
    /// Build the request body.
    fn to_adopt_body(&self) -> Result<JsonMap>;
}

/// Something that can be turned into a stack update request.
pub trait UpdateStackRequest {
    /// Build the request body.
    fn to_update_body(&self) -> Result<JsonMap>;
}

/// Something that can be turned into a stack preview request.
pub trait PreviewStackRequest {
    /// Build the request body.
    fn to_preview_body(&self) -> Result<JsonMap>;
}

/// Something that can be turned into a stack list query.
pub trait ListStacksRequest {
    /// Build the query.
    fn to_list_query(&self) -> Result<Query<StackFilter>>;
}

/// Fields shared by all request bodies.
struct StackFields<'a> {
    environment: &'a str,
    files: Option<&'a HashMap<String, Value>>,
    parameters: Option<&'a HashMap<String, String>>,
    template: &'a str,
    template_url: &'a str,
    timeout: u32,
}

fn require_name(body: &mut JsonMap, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation(
            "Name",
            "Required field 'Name' not provided.",
        ));
    }
    let _ = body.insert("stack_name".into(), name.into());
    Ok(())
}

fn insert_rollback(body: &mut JsonMap, disable_rollback: Option<bool>) {
    if let Some(value) = disable_rollback {
        let _ = body.insert("disable_rollback".into(), value.into());
    }
}

impl<'a> StackFields<'a> {
    fn insert_template(&self, body: &mut JsonMap) -> Result<()> {
        if !self.template.is_empty() {
            let _ = body.insert("template".into(), self.template.into());
        } else if !self.template_url.is_empty() {
            let _ = body.insert("template_url".into(), self.template_url.into());
        } else {
            return Err(Error::validation(
                "Template",
                "Either Template or TemplateURL must be provided.",
            ));
        }
        Ok(())
    }

    fn insert_optional(&self, body: &mut JsonMap) -> Result<()> {
        if !self.environment.is_empty() {
            let _ = body.insert("environment".into(), self.environment.into());
        }
        if let Some(files) = self.files {
            let _ = body.insert("files".into(), serde_json::to_value(files)?);
        }
        if let Some(parameters) = self.parameters {
            let _ = body.insert("parameters".into(), serde_json::to_value(parameters)?);
        }
        if self.timeout != 0 {
            let _ = body.insert("timeout_mins".into(), self.timeout.into());
        }
        Ok(())
    }
}

macro_rules! stack_fields {
    ($opts:expr) => {
        StackFields {
            environment: &$opts.environment,
            files: $opts.files.as_ref(),
            parameters: $opts.parameters.as_ref(),
            template: &$opts.template,
            template_url: &$opts.template_url,
            timeout: $opts.timeout,
        }
    };
}

impl CreateStackRequest for CreateStackOpts {
    fn to_create_body(&self) -> Result<JsonMap> {
        let fields = stack_fields!(self);
        let mut body = JsonMap::new();
        require_name(&mut body, &self.name)?;
        fields.insert_template(&mut body)?;
        insert_rollback(&mut body, self.disable_rollback);
        fields.insert_optional(&mut body)?;
        Ok(body)
    }
}

impl AdoptStackRequest for AdoptStackOpts {
    fn to_adopt_body(&self) -> Result<JsonMap> {
        let fields = stack_fields!(self);
        let mut body = JsonMap::new();
        require_name(&mut body, &self.name)?;
        fields.insert_template(&mut body)?;
        if self.adopt_stack_data.is_empty() {
            return Err(Error::validation(
                "AdoptStackData",
                "Required field 'AdoptStackData' not provided.",
            ));
        }
        let _ = body.insert(
            "adopt_stack_data".into(),
            self.adopt_stack_data.as_str().into(),
        );
        insert_rollback(&mut body, self.disable_rollback);
        fields.insert_optional(&mut body)?;

        let mut envelope = JsonMap::with_capacity(1);
        let _ = envelope.insert(ADOPT_ENVELOPE.into(), Value::Object(body));
        Ok(envelope)
    }
}

impl UpdateStackRequest for UpdateStackOpts {
    fn to_update_body(&self) -> Result<JsonMap> {
        let fields = stack_fields!(self);
        let mut body = JsonMap::new();
        fields.insert_template(&mut body)?;
        fields.insert_optional(&mut body)?;
        Ok(body)
    }
}

impl PreviewStackRequest for PreviewStackOpts {
    fn to_preview_body(&self) -> Result<JsonMap> {
        let fields = stack_fields!(self);
        let mut body = JsonMap::new();
        require_name(&mut body, &self.name)?;
        fields.insert_template(&mut body)?;
        insert_rollback(&mut body, self.disable_rollback);
        fields.insert_optional(&mut body)?;
        Ok(body)
    }
}

impl ListStacksRequest for ListStacksOpts {
    fn to_list_query(&self) -> Result<Query<StackFilter>> {
        let mut query = Query::default();
        if !self.status.is_empty() {
            query.push(StackFilter::Status(self.status.clone()));
        }
        if !self.name.is_empty() {
            query.push(StackFilter::Name(self.name.clone()));
        }
        if !self.marker.is_empty() {
            query.push(StackFilter::Marker(self.marker.clone()));
        }
        if self.limit != 0 {
            query.push(StackFilter::Limit(self.limit));
        }
        if let Some(key) = self.sort_key {
            query.push(StackFilter::SortKey(key));
        }
        if let Some(dir) = self.sort_dir {
            query.push(StackFilter::SortDir(dir));
        }
        Ok(query)
    }
}

impl ListStacksRequest for Query<StackFilter> {
    fn to_list_query(&self) -> Result<Query<StackFilter>> {
        Ok(self.clone())
    }
}

/// Serialize a query into a query string (without the leading `?`).
pub fn to_query_string(query: &Query<StackFilter>) -> Result<String> {
    serde_urlencoded::to_string(query).map_err(|e| Error::validation("ListOpts", e.to_string()))
}
