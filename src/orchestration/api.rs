// Copyright 2018 Dmitry Tantsur <divius.inside@gmail.com>
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

//! Foundation bits exposing the Orchestration API.
//!
//! Every function issues exactly one HTTP request and accepts exactly one
//! status code, anything else is reported as `ErrorKind::UnexpectedStatus`.

use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::pager::StackPager;
use super::protocol::*;
use super::results::*;
use super::urls;
use crate::session::Session;
use crate::{Error, Result};

async fn dispatch(
    session: &Session,
    method: Method,
    url: Url,
    body: Option<Value>,
    expected: StatusCode,
) -> Result<Vec<u8>> {
    trace!("{} {} with body {:?}", method, url, body);
    let response = session.request(method, url, body).await?;
    if response.status != expected {
        let body = String::from_utf8_lossy(&response.body).into_owned();
        debug!(
            "Expected HTTP {}, received {} with body {}",
            expected, response.status, body
        );
        return Err(Error::unexpected_status(response.status, expected, body));
    }
    Ok(response.body)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(From::from)
}

/// Create a stack.
pub async fn create_stack<R>(session: &Session, request: &R) -> Result<CreateResult>
where
    R: CreateStackRequest + ?Sized,
{
    let body = request.to_create_body()?;
    debug!("Creating a new stack with {:?}", body);
    let url = urls::create_url(&session.endpoint().await?)?;
    let raw = dispatch(
        session,
        Method::POST,
        url,
        Some(Value::Object(body)),
        StatusCode::CREATED,
    )
    .await?;
    let result = CreateResult::new(decode(&raw)?);
    debug!("Created stack {:?}", result.body());
    Ok(result)
}

/// Adopt existing resources as a new stack.
pub async fn adopt_stack<R>(session: &Session, request: &R) -> Result<CreateResult>
where
    R: AdoptStackRequest + ?Sized,
{
    let body = request.to_adopt_body()?;
    debug!("Adopting a new stack with {:?}", body);
    let url = urls::adopt_url(&session.endpoint().await?)?;
    let raw = dispatch(
        session,
        Method::POST,
        url,
        Some(Value::Object(body)),
        StatusCode::CREATED,
    )
    .await?;
    let result = CreateResult::new(decode(&raw)?);
    debug!("Adopted stack {:?}", result.body());
    Ok(result)
}

/// List stacks.
///
/// Returns a pager, no stacks are fetched until the first page is requested.
pub async fn list_stacks<R>(session: &Session, request: &R) -> Result<StackPager>
where
    R: ListStacksRequest + ?Sized,
{
    let query = to_query_string(&request.to_list_query()?)?;
    trace!("Listing stacks with query {:?}", query);
    let url = urls::list_url(&session.endpoint().await?, &query)?;
    Ok(StackPager::new(session.clone(), url))
}

/// Fetch one page of stacks from an absolute URL.
pub(crate) async fn fetch_stacks_page(session: &Session, url: Url) -> Result<StacksRoot> {
    let raw = dispatch(session, Method::GET, url, None, StatusCode::OK).await?;
    let root: StacksRoot = decode(&raw)?;
    trace!("Received stacks: {:?}", root.stacks);
    Ok(root)
}

/// Get a stack.
pub async fn get_stack<N, I>(session: &Session, name: N, id: I) -> Result<GetResult>
where
    N: AsRef<str>,
    I: AsRef<str>,
{
    trace!("Fetching stack {}/{}", name.as_ref(), id.as_ref());
    let url = urls::get_url(&session.endpoint().await?, name.as_ref(), id.as_ref())?;
    let raw = dispatch(session, Method::GET, url, None, StatusCode::OK).await?;
    let result = GetResult::new(decode(&raw)?);
    trace!("Received {:?}", result.body());
    Ok(result)
}

/// Update a stack.
pub async fn update_stack<N, I, R>(
    session: &Session,
    name: N,
    id: I,
    request: &R,
) -> Result<UpdateResult>
where
    N: AsRef<str>,
    I: AsRef<str>,
    R: UpdateStackRequest + ?Sized,
{
    let body = request.to_update_body()?;
    debug!(
        "Updating stack {}/{} with {:?}",
        name.as_ref(),
        id.as_ref(),
        body
    );
    let url = urls::update_url(&session.endpoint().await?, name.as_ref(), id.as_ref())?;
    let _ = dispatch(
        session,
        Method::PUT,
        url,
        Some(Value::Object(body)),
        StatusCode::ACCEPTED,
    )
    .await?;
    debug!("Update of stack {}/{} accepted", name.as_ref(), id.as_ref());
    Ok(UpdateResult)
}

/// Delete a stack.
pub async fn delete_stack<N, I>(session: &Session, name: N, id: I) -> Result<DeleteResult>
where
    N: AsRef<str>,
    I: AsRef<str>,
{
    debug!("Deleting stack {}/{}", name.as_ref(), id.as_ref());
    let url = urls::delete_url(&session.endpoint().await?, name.as_ref(), id.as_ref())?;
    let _ = dispatch(session, Method::DELETE, url, None, StatusCode::NO_CONTENT).await?;
    debug!("Stack {}/{} was deleted", name.as_ref(), id.as_ref());
    Ok(DeleteResult)
}

/// Preview a stack.
pub async fn preview_stack<R>(session: &Session, request: &R) -> Result<PreviewResult>
where
    R: PreviewStackRequest + ?Sized,
{
    let body = request.to_preview_body()?;
    debug!("Previewing a stack with {:?}", body);
    let url = urls::preview_url(&session.endpoint().await?)?;
    let raw = dispatch(
        session,
        Method::POST,
        url,
        Some(Value::Object(body)),
        StatusCode::OK,
    )
    .await?;
    let result = PreviewResult::new(decode(&raw)?);
    trace!("Received preview {:?}", result.body());
    Ok(result)
}

/// Abandon a stack, keeping its resources.
pub async fn abandon_stack<N, I>(session: &Session, name: N, id: I) -> Result<AbandonResult>
where
    N: AsRef<str>,
    I: AsRef<str>,
{
    debug!("Abandoning stack {}/{}", name.as_ref(), id.as_ref());
    let url = urls::abandon_url(&session.endpoint().await?, name.as_ref(), id.as_ref())?;
    let raw = dispatch(session, Method::POST, url, None, StatusCode::OK).await?;
    let result = AbandonResult::new(decode(&raw)?);
    debug!("Stack {}/{} was abandoned", name.as_ref(), id.as_ref());
    Ok(result)
}
