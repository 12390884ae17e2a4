// Copyright 2019 Dmitry Tantsur <divius.inside@gmail.com>
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

//! Stack management via Orchestration API.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use async_stream::try_stream;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use futures::pin_mut;
use futures::stream::{Stream, TryStreamExt};
use osauth::Query;
use serde_json::Value;

use super::api;
use super::protocol::*;
use super::results::*;
use crate::common::Refresh;
use crate::session::Session;
use crate::{Error, ErrorKind, Result, Sort};

/// A query to stack list.
#[derive(Clone, Debug)]
pub struct StackQuery {
    session: Session,
    query: Query<StackFilter>,
    can_paginate: bool,
}

/// Structure representing a summary of a single stack.
#[derive(Clone, Debug)]
pub struct StackSummary {
    session: Session,
    inner: ListedStack,
}

/// Structure representing a single stack.
#[derive(Clone, Debug)]
pub struct Stack {
    session: Session,
    inner: RetrievedStack,
}

/// A request to create a stack.
#[derive(Clone, Debug)]
pub struct NewStack {
    session: Session,
    inner: CreateStackOpts,
}

impl Display for Stack {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.inner.name, self.inner.id, self.inner.status)
    }
}

impl Stack {
    /// Load a Stack object.
    pub(crate) async fn load<N, I>(session: Session, name: N, id: I) -> Result<Stack>
    where
        N: AsRef<str>,
        I: AsRef<str>,
    {
        let inner = api::get_stack(&session, name, id).await?.extract()?;
        Ok(Stack { session, inner })
    }

    transparent_property! {
        #[doc = "Template capabilities."]
        capabilities: ref Vec<Value>
    }

    transparent_property! {
        #[doc = "Creation date and time."]
        created_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        #[doc = "Stack description."]
        description: ref Option<String>
    }

    transparent_property! {
        #[doc = "Whether rollback on failure is disabled."]
        disable_rollback: bool
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "Links to the stack."]
        links: ref Vec<Link>
    }

    transparent_property! {
        #[doc = "Stack name."]
        name: ref String
    }

    transparent_property! {
        #[doc = "Stack outputs."]
        outputs: ref Vec<StackOutput>
    }

    transparent_property! {
        #[doc = "Stack parameters."]
        parameters: ref HashMap<String, String>
    }

    transparent_property! {
        #[doc = "Stack status."]
        status: StackStatus
    }

    transparent_property! {
        #[doc = "Reason for the current status."]
        status_reason: ref Option<String>
    }

    transparent_property! {
        #[doc = "Stack tags."]
        tags: ref Option<Vec<String>>
    }

    transparent_property! {
        #[doc = "Description from the template."]
        template_description: ref Option<String>
    }

    transparent_property! {
        #[doc = "Creation timeout in minutes."]
        timeout: Option<u32>
    }

    transparent_property! {
        #[doc = "Last update date and time."]
        updated_at: Option<DateTime<FixedOffset>>
    }

    /// Find an output by its key.
    pub fn output<S: AsRef<str>>(&self, key: S) -> Option<&StackOutput> {
        let key = key.as_ref();
        self.inner.outputs.iter().find(|o| o.output_key == key)
    }

    /// Update the stack and refresh it.
    ///
    /// The update itself is asynchronous, watch `status()` for its progress.
    pub async fn update<R>(&mut self, request: &R) -> Result<()>
    where
        R: UpdateStackRequest + ?Sized,
    {
        let _ = api::update_stack(&self.session, &self.inner.name, &self.inner.id, request).await?;
        self.refresh().await
    }

    /// Delete the stack.
    pub async fn delete(self) -> Result<()> {
        let _ = api::delete_stack(&self.session, &self.inner.name, &self.inner.id).await?;
        Ok(())
    }

    /// Abandon the stack, keeping its resources.
    ///
    /// The returned data can be passed to `NewStack::adopt`.
    pub async fn abandon(self) -> Result<AbandonedStack> {
        api::abandon_stack(&self.session, &self.inner.name, &self.inner.id)
            .await?
            .extract()
    }
}

#[async_trait]
impl Refresh for Stack {
    /// Refresh the stack.
    async fn refresh(&mut self) -> Result<()> {
        let result = api::get_stack(&self.session, &self.inner.name, &self.inner.id).await?;
        self.inner = result.extract()?;
        Ok(())
    }
}

impl StackSummary {
    transparent_property! {
        #[doc = "Creation date and time."]
        created_at: Option<DateTime<FixedOffset>>
    }

    transparent_property! {
        #[doc = "Stack description."]
        description: ref Option<String>
    }

    transparent_property! {
        #[doc = "Unique ID."]
        id: ref String
    }

    transparent_property! {
        #[doc = "Stack name."]
        name: ref String
    }

    transparent_property! {
        #[doc = "Stack status."]
        status: StackStatus
    }

    transparent_property! {
        #[doc = "Reason for the current status."]
        status_reason: ref Option<String>
    }

    transparent_property! {
        #[doc = "Last update date and time."]
        updated_at: Option<DateTime<FixedOffset>>
    }

    /// Get details.
    pub async fn details(&self) -> Result<Stack> {
        Stack::load(self.session.clone(), &self.inner.name, &self.inner.id).await
    }
}

impl StackQuery {
    pub(crate) fn new(session: Session) -> StackQuery {
        StackQuery {
            session,
            query: Query::default(),
            can_paginate: true,
        }
    }

    /// Add a filter to the query.
    pub fn set(&mut self, filter: StackFilter) {
        if let StackFilter::Marker(..) | StackFilter::Limit(..) = filter {
            self.can_paginate = false;
        }
        self.query.push(filter)
    }

    /// Add a filter to the query.
    #[inline]
    pub fn with(mut self, filter: StackFilter) -> Self {
        self.set(filter);
        self
    }

    /// Filter by stack name.
    #[inline]
    pub fn with_name<S: Into<String>>(self, value: S) -> Self {
        self.with(StackFilter::Name(value.into()))
    }

    /// Filter by stack status.
    #[inline]
    pub fn with_status<S: Into<String>>(self, value: S) -> Self {
        self.with(StackFilter::Status(value.into()))
    }

    /// Add marker to the request.
    ///
    /// Using this disables automatic pagination.
    #[inline]
    pub fn with_marker<S: Into<String>>(self, value: S) -> Self {
        self.with(StackFilter::Marker(value.into()))
    }

    /// Add limit to the request.
    ///
    /// Using this disables automatic pagination.
    #[inline]
    pub fn with_limit(self, value: usize) -> Self {
        self.with(StackFilter::Limit(value))
    }

    /// Add sorting to the request.
    pub fn sort_by(mut self, sort: Sort<StackSortKey>) -> Self {
        let (field, direction) = sort.unwrap();
        self.query.push(StackFilter::SortKey(field));
        self.query.push(StackFilter::SortDir(direction));
        self
    }

    /// Convert this query into a stream executing the request.
    ///
    /// With a marker or a limit only one page is fetched, otherwise the
    /// `next` links are followed.
    ///
    /// Returns a `TryStream`, which is a stream with each `next`
    /// call returning a `Result`.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(self) -> impl Stream<Item = Result<StackSummary>> {
        debug!("Fetching stacks with {:?}", self.query);
        let StackQuery {
            session,
            query,
            can_paginate,
        } = self;

        try_stream! {
            let mut pager = api::list_stacks(&session, &query).await?;
            while let Some(page) = pager.next_page().await? {
                for inner in page.into_stacks() {
                    yield StackSummary {
                        session: session.clone(),
                        inner,
                    };
                }

                if !can_paginate {
                    break;
                }
            }
        }
    }

    /// Execute this request and return all results.
    ///
    /// A convenience shortcut for `self.into_stream().try_collect().await`.
    pub async fn all(self) -> Result<Vec<StackSummary>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(mut self) -> Result<StackSummary> {
        debug!("Fetching one stack with {:?}", self.query);
        if self.can_paginate {
            // Two are enough to detect an ambiguous query.
            self.query.push(StackFilter::Limit(2));
        }

        let stream = self.into_stream();
        pin_mut!(stream);
        match stream.try_next().await? {
            Some(result) => {
                if stream.try_next().await?.is_some() {
                    Err(Error::new(
                        ErrorKind::TooManyItems,
                        "Query returned more than one stack",
                    ))
                } else {
                    Ok(result)
                }
            }
            None => Err(Error::new(
                ErrorKind::ResourceNotFound,
                "Query returned no stacks",
            )),
        }
    }
}

impl NewStack {
    /// Start creating a stack.
    pub(crate) fn new(session: Session, name: String, template: String) -> NewStack {
        NewStack {
            session,
            inner: CreateStackOpts {
                name,
                template,
                ..Default::default()
            },
        }
    }

    /// Request creation of the stack and load it.
    ///
    /// The creation continues in the background, watch `status()` for its
    /// progress.
    pub async fn create(self) -> Result<Stack> {
        let created = api::create_stack(&self.session, &self.inner)
            .await?
            .extract()?;
        Stack::load(self.session, &self.inner.name, &created.id).await
    }

    /// Adopt resources described by the abandoned stack data.
    pub async fn adopt<S: Into<String>>(self, adopt_stack_data: S) -> Result<Stack> {
        let NewStack { session, inner } = self;
        let request = AdoptStackOpts {
            adopt_stack_data: adopt_stack_data.into(),
            disable_rollback: inner.disable_rollback,
            environment: inner.environment,
            files: inner.files,
            name: inner.name,
            parameters: inner.parameters,
            template: inner.template,
            template_url: inner.template_url,
            timeout: inner.timeout,
        };
        let created = api::adopt_stack(&session, &request).await?.extract()?;
        Stack::load(session, &request.name, &created.id).await
    }

    /// Preview the stack without creating anything.
    pub async fn preview(self) -> Result<PreviewedStack> {
        let NewStack { session, inner } = self;
        let request = PreviewStackOpts {
            disable_rollback: inner.disable_rollback,
            environment: inner.environment,
            files: inner.files,
            name: inner.name,
            parameters: inner.parameters,
            template: inner.template,
            template_url: inner.template_url,
            timeout: inner.timeout,
        };
        api::preview_stack(&session, &request).await?.extract()
    }

    /// Add one template parameter.
    pub fn set_parameter<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let _ = self
            .inner
            .parameters
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
    }

    /// Add one template parameter.
    #[inline]
    pub fn with_parameter<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_parameter(key, value);
        self
    }

    creation_inner_field! {
        #[doc = "Set whether to disable rollback on failure."]
        set_disable_rollback, with_disable_rollback -> disable_rollback: optional bool
    }

    creation_inner_field! {
        #[doc = "Set the environment."]
        set_environment, with_environment -> environment: String
    }

    creation_inner_field! {
        #[doc = "Set the files referenced from the template or the environment."]
        set_files, with_files -> files: optional HashMap<String, Value>
    }

    creation_inner_field! {
        #[doc = "Set all template parameters."]
        set_parameters, with_parameters -> parameters: optional HashMap<String, String>
    }

    creation_inner_field! {
        #[doc = "Set the template URL (ignored when the template body is set)."]
        set_template_url, with_template_url -> template_url: String
    }

    creation_inner_field! {
        #[doc = "Set the creation timeout in minutes."]
        set_timeout, with_timeout -> timeout: copy u32
    }
}
