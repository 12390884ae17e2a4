// Copyright 2024 Dmitry Tantsur <divius.inside@gmail.com>
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

//! End-to-end tests against a minimal in-process Heat server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use futures::TryStreamExt;
use openstack_orchestration::orchestration::{api, CreateStackOpts, ListStacksOpts, StackStatus};
use openstack_orchestration::{Cloud, ErrorKind, Refresh, Session, Sort};
use osauth::NoAuth;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

static INIT: Once = Once::new();

const TOKEN: &str = "secret-token";
const PREFIX: &str = "/v1/tenant/stacks";
const TEMPLATE: &str = "heat_template_version: 2016-10-14";

#[derive(Debug, Clone)]
struct FakeStack {
    id: String,
    name: String,
    status: String,
}

#[derive(Debug, Default)]
struct FakeHeat {
    counter: usize,
    stacks: Vec<FakeStack>,
}

struct Request {
    method: String,
    path: String,
    query: HashMap<String, String>,
    token: Option<String>,
    body: Value,
}

fn stack_json(base: &str, stack: &FakeStack) -> Value {
    json!({
        "id": stack.id,
        "stack_name": stack.name,
        "stack_status": stack.status,
        "creation_time": "2024-01-01T12:00:00",
        "links": [{"href": format!("{}{}/{}/{}", base, PREFIX, stack.name, stack.id), "rel": "self"}]
    })
}

impl FakeHeat {
    fn find(&self, name: &str, id: &str) -> Option<usize> {
        self.stacks
            .iter()
            .position(|s| s.name == name && s.id == id)
    }

    fn handle(&mut self, base: &str, req: Request) -> (u16, Value) {
        if req.token.as_deref() != Some(TOKEN) {
            return (401, json!({"error": "unauthorized"}));
        }

        let rest = match req.path.strip_prefix(PREFIX) {
            Some(rest) => rest.trim_start_matches('/').to_string(),
            None => return (404, json!({"error": "no such path"})),
        };
        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

        match (req.method.as_str(), segments.as_slice()) {
            ("POST", []) => {
                let (body, status) = match req.body.get("stack") {
                    Some(inner) => (inner.clone(), "ADOPT_COMPLETE"),
                    None => (req.body.clone(), "CREATE_COMPLETE"),
                };
                if body.get("template").is_none() && body.get("template_url").is_none() {
                    return (400, json!({"error": "no template"}));
                }
                self.counter += 1;
                let stack = FakeStack {
                    id: format!("id-{}", self.counter),
                    name: body["stack_name"].as_str().unwrap_or_default().to_string(),
                    status: status.to_string(),
                };
                let result = json!({"stack": {"id": stack.id, "links": []}});
                self.stacks.push(stack);
                (201, result)
            }
            ("GET", []) => {
                let mut stacks: Vec<&FakeStack> = self
                    .stacks
                    .iter()
                    .filter(|s| req.query.get("name").map_or(true, |n| *n == s.name))
                    .collect();
                if req.query.get("sort_dir").map(String::as_str) == Some("desc") {
                    stacks.reverse();
                }
                if let Some(marker) = req.query.get("marker") {
                    if let Some(pos) = stacks.iter().position(|s| &s.id == marker) {
                        stacks = stacks.split_off(pos + 1);
                    }
                }
                let mut links = Vec::new();
                if let Some(limit) = req.query.get("limit").and_then(|l| l.parse().ok()) {
                    if stacks.len() > limit {
                        stacks.truncate(limit);
                        let last = stacks[limit - 1];
                        links.push(json!({
                            "href": format!("{}{}?limit={}&marker={}", base, PREFIX, limit, last.id),
                            "rel": "next"
                        }));
                    }
                }
                let items: Vec<Value> = stacks.iter().map(|s| stack_json(base, s)).collect();
                (200, json!({"stacks": items, "links": links}))
            }
            ("POST", ["preview"]) => (
                200,
                json!({"stack": {
                    "id": "None",
                    "stack_name": req.body["stack_name"],
                    "resources": [{"resource_name": "server"}]
                }}),
            ),
            ("GET", [name, id]) => match self.find(name, id) {
                Some(idx) => (200, json!({"stack": stack_json(base, &self.stacks[idx])})),
                None => (404, json!({"error": "stack not found"})),
            },
            ("PUT", [name, id]) => match self.find(name, id) {
                Some(idx) => {
                    self.stacks[idx].status = "UPDATE_COMPLETE".to_string();
                    (202, Value::Null)
                }
                None => (404, json!({"error": "stack not found"})),
            },
            ("DELETE", [name, id]) => match self.find(name, id) {
                Some(idx) => {
                    let _ = self.stacks.remove(idx);
                    (204, Value::Null)
                }
                None => (404, json!({"error": "stack not found"})),
            },
            ("POST", [name, id, "abandon"]) => match self.find(name, id) {
                Some(idx) => {
                    let stack = self.stacks.remove(idx);
                    (
                        200,
                        json!({
                            "id": stack.id,
                            "name": stack.name,
                            "action": "CREATE",
                            "status": "COMPLETE",
                            "template": {"heat_template_version": "2016-10-14"},
                            "resources": {}
                        }),
                    )
                }
                None => (404, json!({"error": "stack not found"})),
            },
            _ => (405, json!({"error": "method not allowed"})),
        }
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(k), Some(v)) if !k.is_empty() => Some((k.to_string(), v.to_string())),
                _ => None,
            }
        })
        .collect()
}

async fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let mut content_length = 0;
    let mut token = None;
    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim().to_ascii_lowercase();
            if key == "content-length" {
                content_length = value.trim().parse().ok()?;
            } else if key == "x-auth-token" {
                token = Some(value.trim().to_string());
            }
        }
    }

    while buffer.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    let raw_body = &buffer[header_end..header_end + content_length];
    let body = if raw_body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(raw_body).ok()?
    };

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), parse_query(query)),
        None => (target, HashMap::new()),
    };

    Some(Request {
        method,
        path,
        query,
        token,
        body,
    })
}

async fn serve(listener: TcpListener, heat: Arc<Mutex<FakeHeat>>, base: String) {
    loop {
        let (mut stream, _) = match listener.accept().await {
            Ok(conn) => conn,
            Err(_) => return,
        };
        let heat = heat.clone();
        let base = base.clone();
        let _ = tokio::spawn(async move {
            let request = match read_request(&mut stream).await {
                Some(request) => request,
                None => return,
            };
            let (status, body) = heat.lock().unwrap().handle(&base, request);
            let body = if body.is_null() {
                String::new()
            } else {
                body.to_string()
            };
            let response = format!(
                "HTTP/1.1 {} Fake\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        });
    }
}

async fn set_up_with_token(token: &str) -> (Cloud, Arc<Mutex<FakeHeat>>) {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Cannot bind a local port");
    let base = format!("http://{}", listener.local_addr().unwrap());
    let heat = Arc::new(Mutex::new(FakeHeat::default()));
    let _ = tokio::spawn(serve(listener, heat.clone(), base.clone()));

    let session = Session::new(NoAuth::new(format!("{}/v1/tenant", base)).unwrap())
        .await
        .unwrap()
        .with_token(token)
        .unwrap();
    (Cloud::new(session), heat)
}

async fn set_up() -> (Cloud, Arc<Mutex<FakeHeat>>) {
    set_up_with_token(TOKEN).await
}

#[tokio::test]
async fn test_stack_create_get_update_delete() {
    let (os, heat) = set_up().await;

    let mut stack = os
        .new_stack("web", TEMPLATE)
        .with_parameter("flavor", "m1.small")
        .with_timeout(10)
        .create()
        .await
        .expect("Could not create stack");
    assert_eq!(stack.name(), "web");
    assert_eq!(stack.status(), StackStatus::CreateComplete);
    assert!(stack.created_at().is_some());
    let id = stack.id().clone();

    let same = os
        .get_stack("web", &id)
        .await
        .expect("Could not get stack");
    assert_eq!(same.id(), stack.id());

    let opts = openstack_orchestration::orchestration::UpdateStackOpts {
        template: TEMPLATE.into(),
        ..Default::default()
    };
    stack.update(&opts).await.expect("Could not update stack");
    assert_eq!(stack.status(), StackStatus::UpdateComplete);

    stack.refresh().await.expect("Could not refresh stack");
    stack.delete().await.expect("Could not delete stack");
    assert!(heat.lock().unwrap().stacks.is_empty());

    let err = os.get_stack("web", &id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
}

#[tokio::test]
async fn test_list_pagination() {
    let (os, _heat) = set_up().await;

    for name in &["one", "two", "three"] {
        let _ = os
            .new_stack(*name, TEMPLATE)
            .create()
            .await
            .expect("Could not create stack");
    }

    let session = os.session().clone();
    let opts = ListStacksOpts {
        limit: 2,
        ..Default::default()
    };
    let mut pager = api::list_stacks(&session, &opts).await.expect("Could not build a pager");
    let first = pager.next_page().await.unwrap().unwrap();
    assert_eq!(first.stacks().len(), 2);
    assert!(pager.has_next());
    let second = pager.next_page().await.unwrap().unwrap();
    assert_eq!(second.stacks().len(), 1);
    assert_eq!(second.stacks()[0].name, "three");
    assert!(!pager.has_next());
    assert!(pager.next_page().await.unwrap().is_none());

    let all: Vec<_> = api::list_stacks(&session, &opts)
        .await
        .unwrap()
        .into_stream()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let names: Vec<String> = os
        .find_stacks()
        .sort_by(Sort::Desc(openstack_orchestration::orchestration::StackSortKey::CreatedAt))
        .all()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name().clone())
        .collect();
    assert_eq!(names, vec!["three", "two", "one"]);

    let found = os.find_stacks().with_name("two").one().await.unwrap();
    assert_eq!(found.name(), "two");
    let err = os.find_stacks().one().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TooManyItems);
}

#[tokio::test]
async fn test_preview_abandon_adopt() {
    let (os, heat) = set_up().await;

    let preview = os
        .new_stack("db", TEMPLATE)
        .preview()
        .await
        .expect("Could not preview stack");
    assert_eq!(preview.name, "db");
    assert_eq!(preview.resources.len(), 1);
    assert!(heat.lock().unwrap().stacks.is_empty());

    let stack = os.new_stack("db", TEMPLATE).create().await.unwrap();
    let data = stack.abandon().await.expect("Could not abandon stack");
    assert_eq!(data.name, "db");
    assert!(heat.lock().unwrap().stacks.is_empty());

    let adopt_data = serde_json::to_string(&json!({
        "id": data.id,
        "name": data.name,
        "resources": data.resources,
    }))
    .unwrap();
    let adopted = os
        .new_stack("db", TEMPLATE)
        .adopt(adopt_data)
        .await
        .expect("Could not adopt stack");
    assert_eq!(adopted.status(), StackStatus::AdoptComplete);
}

#[tokio::test]
async fn test_low_level_errors() {
    let (os, _heat) = set_up().await;
    let session = os.session();

    let err = api::create_stack(session, &CreateStackOpts::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.field(), Some("Name"));

    let err = api::delete_stack(session, "ghost", "nope")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
    assert!(err.body().unwrap().contains("stack not found"));
}

#[tokio::test]
async fn test_wrong_token() {
    let (os, _heat) = set_up_with_token("wrong").await;

    let err = os.find_stacks().all().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let session = Session::new(NoAuth::new(format!("http://{}/v1/tenant", addr)).unwrap())
        .await
        .unwrap()
        .with_token(TOKEN)
        .unwrap();
    let err = api::get_stack(&session, "web", "id-1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_endpoint_override() {
    let (os, _heat) = set_up().await;
    let endpoint = os.session().endpoint().await.unwrap();

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    // The authentication points to a closed port, the override to the server.
    let session = Session::new(NoAuth::new(format!("http://{}/v1/tenant", addr)).unwrap())
        .await
        .unwrap()
        .with_token(TOKEN)
        .unwrap()
        .with_endpoint(endpoint);
    let stacks = Cloud::new(session).find_stacks().all().await.unwrap();
    assert!(stacks.is_empty());
}
