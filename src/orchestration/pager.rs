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

//! Link-following pager over stack listings.

use std::collections::HashSet;

use async_stream::try_stream;
use futures::stream::Stream;
use reqwest::Url;

use super::api;
use super::results::{Link, ListedStack};
use crate::session::Session;
use crate::{Error, ErrorKind, Result};

const NEXT: &str = "next";

/// A single page of stacks.
#[derive(Debug, Clone)]
pub struct StackPage {
    stacks: Vec<ListedStack>,
    next: Option<Url>,
}

/// Sequential pager over the stack list.
///
/// Each page is fetched from the `next` link of the previous one. A `next`
/// link pointing to an already fetched page ends the listing.
#[derive(Debug, Clone)]
pub struct StackPager {
    session: Session,
    next: Option<Url>,
    visited: HashSet<Url>,
}

impl StackPage {
    /// Stacks on this page.
    #[inline]
    pub fn stacks(&self) -> &[ListedStack] {
        &self.stacks
    }

    /// Convert into the stacks on this page.
    #[inline]
    pub fn into_stacks(self) -> Vec<ListedStack> {
        self.stacks
    }

    /// Link to the next page, if any.
    #[inline]
    pub fn next_url(&self) -> Option<&Url> {
        self.next.as_ref()
    }
}

fn next_link(current: &Url, links: &[Link]) -> Result<Option<Url>> {
    match links.iter().find(|link| link.rel == NEXT) {
        Some(link) => current.join(&link.href).map(Some).map_err(|e| {
            Error::new(
                ErrorKind::Decode,
                format!("Invalid next link {}: {}", link.href, e),
            )
        }),
        None => Ok(None),
    }
}

impl StackPager {
    pub(crate) fn new(session: Session, url: Url) -> StackPager {
        StackPager {
            session,
            next: Some(url),
            visited: HashSet::new(),
        }
    }

    /// Whether another page can be requested.
    ///
    /// True before the first page is fetched.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Fetch the next page.
    ///
    /// Returns `None` once the last page has been fetched. On failure the
    /// pager stays on the same page, so the call can be repeated.
    pub async fn next_page(&mut self) -> Result<Option<StackPage>> {
        let url = match self.next {
            Some(ref url) => url.clone(),
            None => return Ok(None),
        };

        let root = api::fetch_stacks_page(&self.session, url.clone()).await?;
        let mut next = next_link(&url, &root.links)?;
        let _ = self.visited.insert(url.clone());
        if let Some(ref link) = next {
            if self.visited.contains(link) {
                warn!("Next link {} points to an already fetched page, stopping", link);
                next = None;
            }
        }
        debug!(
            "Received {} stacks from {}, next page is {:?}",
            root.stacks.len(),
            url,
            next
        );

        self.next = next.clone();
        Ok(Some(StackPage {
            stacks: root.stacks,
            next,
        }))
    }

    /// Convert into a stream of stacks from all remaining pages.
    ///
    /// Note that no requests are done until you start iterating.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<ListedStack>> {
        try_stream! {
            while let Some(page) = self.next_page().await? {
                for stack in page.stacks {
                    yield stack;
                }
            }
        }
    }

    /// Fetch all remaining pages.
    pub async fn all_pages(mut self) -> Result<Vec<StackPage>> {
        let mut result = Vec::new();
        while let Some(page) = self.next_page().await? {
            result.push(page);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use futures::TryStreamExt;
    use reqwest::Method;

    use super::super::api::list_stacks;
    use super::super::protocol::ListStacksOpts;
    use crate::session::test::new_session;
    use crate::ErrorKind;

    const PAGE_WITH_NEXT: &str = r#"
    {
        "stacks": [
            {"id": "1", "stack_name": "first", "stack_status": "CREATE_COMPLETE"}
        ],
        "links": [
            {
                "href": "http://127.0.2.1:8004/v1/tenant/stacks?limit=1&marker=1",
                "rel": "next"
            }
        ]
    }"#;

    const LAST_PAGE: &str = r#"
    {
        "stacks": [
            {"id": "2", "stack_name": "second", "stack_status": "UPDATE_FAILED"}
        ]
    }"#;

    #[tokio::test]
    async fn test_single_page() {
        let (session, transport) = new_session().await;
        transport.respond(200, LAST_PAGE);

        let mut pager = list_stacks(&session, &ListStacksOpts::default()).await.unwrap();
        assert!(pager.has_next());

        let page = pager.next_page().await.unwrap().unwrap();
        assert_eq!(page.stacks().len(), 1);
        assert_eq!(page.stacks()[0].name, "second");
        assert!(page.next_url().is_none());
        assert!(!pager.has_next());
        assert!(pager.next_page().await.unwrap().is_none());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(
            requests[0].url.as_str(),
            "http://127.0.2.1:8004/v1/tenant/stacks"
        );
    }

    #[tokio::test]
    async fn test_follows_next_link() {
        let (session, transport) = new_session().await;
        transport.respond(200, PAGE_WITH_NEXT);
        transport.respond(200, LAST_PAGE);
        let opts = ListStacksOpts {
            limit: 1,
            ..Default::default()
        };

        let mut pager = list_stacks(&session, &opts).await.unwrap();
        let first = pager.next_page().await.unwrap().unwrap();
        assert_eq!(first.stacks()[0].id, "1");
        assert!(pager.has_next());

        let second = pager.next_page().await.unwrap().unwrap();
        assert_eq!(second.stacks()[0].id, "2");
        assert!(!pager.has_next());
        assert!(pager.next_page().await.unwrap().is_none());

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].url.as_str(),
            "http://127.0.2.1:8004/v1/tenant/stacks?limit=1"
        );
        assert_eq!(
            requests[1].url.as_str(),
            "http://127.0.2.1:8004/v1/tenant/stacks?limit=1&marker=1"
        );
    }

    #[tokio::test]
    async fn test_into_stream() {
        let (session, transport) = new_session().await;
        transport.respond(200, PAGE_WITH_NEXT);
        transport.respond(200, LAST_PAGE);

        let pager = list_stacks(&session, &ListStacksOpts::default()).await.unwrap();
        let stacks: Vec<_> = pager.into_stream().try_collect().await.unwrap();
        let names: Vec<_> = stacks.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_all_pages() {
        let (session, transport) = new_session().await;
        transport.respond(200, PAGE_WITH_NEXT);
        transport.respond(200, LAST_PAGE);

        let pager = list_stacks(&session, &ListStacksOpts::default()).await.unwrap();
        let pages = pager.all_pages().await.unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].next_url().is_some());
        assert!(pages[1].next_url().is_none());
    }

    #[tokio::test]
    async fn test_failure_keeps_position() {
        let (session, transport) = new_session().await;
        transport.respond(500, "boom");
        transport.respond(200, LAST_PAGE);

        let mut pager = list_stacks(&session, &ListStacksOpts::default()).await.unwrap();
        let err = pager.next_page().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
        assert!(pager.has_next());

        let page = pager.next_page().await.unwrap().unwrap();
        assert_eq!(page.stacks()[0].id, "2");
    }

    const PAGE_LINKING_ITSELF: &str = r#"
    {
        "stacks": [
            {"id": "1", "stack_name": "first", "stack_status": "CREATE_COMPLETE"}
        ],
        "links": [
            {"href": "http://127.0.2.1:8004/v1/tenant/stacks", "rel": "next"}
        ]
    }"#;

    const PAGE_LINKING_BACK: &str = r#"
    {
        "stacks": [
            {"id": "2", "stack_name": "second", "stack_status": "CREATE_COMPLETE"}
        ],
        "links": [
            {"href": "/v1/tenant/stacks?limit=1", "rel": "next"}
        ]
    }"#;

    #[tokio::test]
    async fn test_next_link_to_same_page_ends_listing() {
        let (session, transport) = new_session().await;
        for _ in 0..5 {
            transport.respond(200, PAGE_LINKING_ITSELF);
        }

        let pager = list_stacks(&session, &ListStacksOpts::default()).await.unwrap();
        let stacks: Vec<_> = pager.into_stream().try_collect().await.unwrap();
        assert_eq!(stacks.len(), 1);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_next_link_to_earlier_page_ends_listing() {
        let (session, transport) = new_session().await;
        transport.respond(200, PAGE_WITH_NEXT);
        for _ in 0..5 {
            transport.respond(200, PAGE_LINKING_BACK);
        }
        let opts = ListStacksOpts {
            limit: 1,
            ..Default::default()
        };

        let pager = list_stacks(&session, &opts).await.unwrap();
        let pages = pager.all_pages().await.unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[1].next_url().is_none());
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_body() {
        let (session, transport) = new_session().await;
        transport.respond(200, r#"{"servers": []}"#);

        let mut pager = list_stacks(&session, &ListStacksOpts::default()).await.unwrap();
        let err = pager.next_page().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
