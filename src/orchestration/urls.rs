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

//! URLs of the stack endpoints.

use reqwest::Url;

use crate::utils::url;
use crate::Result;

const STACKS: &str = "stacks";

pub fn create_url(base: &Url) -> Result<Url> {
    url::extend(base.clone(), &[STACKS])
}

pub fn adopt_url(base: &Url) -> Result<Url> {
    create_url(base)
}

/// URL of the stack list, `query` is appended if not empty.
pub fn list_url(base: &Url, query: &str) -> Result<Url> {
    let mut result = create_url(base)?;
    if !query.is_empty() {
        result.set_query(Some(query));
    }
    Ok(result)
}

pub fn get_url(base: &Url, name: &str, id: &str) -> Result<Url> {
    url::extend(base.clone(), &[STACKS, name, id])
}

pub fn update_url(base: &Url, name: &str, id: &str) -> Result<Url> {
    get_url(base, name, id)
}

pub fn delete_url(base: &Url, name: &str, id: &str) -> Result<Url> {
    get_url(base, name, id)
}

pub fn preview_url(base: &Url) -> Result<Url> {
    url::extend(base.clone(), &[STACKS, "preview"])
}

pub fn abandon_url(base: &Url, name: &str, id: &str) -> Result<Url> {
    url::extend(base.clone(), &[STACKS, name, id, "abandon"])
}

#[cfg(test)]
mod test {
    use reqwest::Url;

    use super::*;

    fn base() -> Url {
        Url::parse("http://heat.local:8004/v1/1234").unwrap()
    }

    #[test]
    fn test_collection_urls() {
        let expected = "http://heat.local:8004/v1/1234/stacks";
        assert_eq!(create_url(&base()).unwrap().as_str(), expected);
        assert_eq!(adopt_url(&base()).unwrap().as_str(), expected);
        assert_eq!(list_url(&base(), "").unwrap().as_str(), expected);
    }

    #[test]
    fn test_list_url_with_query() {
        let url = list_url(&base(), "name=foo&limit=2").unwrap();
        assert_eq!(
            url.as_str(),
            "http://heat.local:8004/v1/1234/stacks?name=foo&limit=2"
        );
    }

    #[test]
    fn test_stack_urls() {
        let expected = "http://heat.local:8004/v1/1234/stacks/mystack/abc-123";
        assert_eq!(get_url(&base(), "mystack", "abc-123").unwrap().as_str(), expected);
        assert_eq!(update_url(&base(), "mystack", "abc-123").unwrap().as_str(), expected);
        assert_eq!(delete_url(&base(), "mystack", "abc-123").unwrap().as_str(), expected);
    }

    #[test]
    fn test_action_urls() {
        assert_eq!(
            preview_url(&base()).unwrap().as_str(),
            "http://heat.local:8004/v1/1234/stacks/preview"
        );
        assert_eq!(
            abandon_url(&base(), "mystack", "abc-123").unwrap().as_str(),
            "http://heat.local:8004/v1/1234/stacks/mystack/abc-123/abandon"
        );
    }

    #[test]
    fn test_segments_are_encoded() {
        let url = get_url(&base(), "my/stack", "id").unwrap();
        assert_eq!(
            url.as_str(),
            "http://heat.local:8004/v1/1234/stacks/my%2Fstack/id"
        );
    }
}
