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

//! Session configuration from `OS_*` environment variables and `clouds.yaml`.
//!
//! Loading itself is done by `osauth`, so all its authentication types are
//! supported. The orchestration endpoint can be pinned with
//! `orchestration_endpoint_override` in `clouds.yaml` or with the
//! `OS_ORCHESTRATION_ENDPOINT` environment variable.

use std::env;

use reqwest::Url;

use super::session::Session;
use super::{Error, ErrorKind, Result};

const ENDPOINT_VARIABLE: &str = "OS_ORCHESTRATION_ENDPOINT";

// This is only used for unit testing.
trait Environment {
    fn get(&self, name: &'static str) -> Option<String>;
}

#[derive(Debug, Clone, Copy)]
struct RealEnvironment;

impl Environment for RealEnvironment {
    fn get(&self, name: &'static str) -> Option<String> {
        env::var(name).ok()
    }
}

fn config_error(err: osauth::Error) -> Error {
    Error::new(ErrorKind::InvalidConfig, err.to_string())
}

fn apply_environment<E: Environment>(mut session: Session, env: E) -> Result<Session> {
    if let Some(value) = env.get(ENDPOINT_VARIABLE) {
        let endpoint = Url::parse(&value).map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Invalid {} `{}`: {}", ENDPOINT_VARIABLE, value, e),
            )
        })?;
        debug!("Using orchestration endpoint {} from the environment", endpoint);
        session.set_endpoint(endpoint);
    }
    Ok(session)
}

/// Create a `Session` from environment variables.
///
/// See `osauth::from_env` for the supported variables. If
/// `OS_ORCHESTRATION_ENDPOINT` is set, it overrides the endpoint from the
/// service catalog.
pub fn from_env() -> Result<Session> {
    let session = osauth::from_env().map_err(config_error)?;
    apply_environment(session.into(), RealEnvironment)
}

/// Create a `Session` from a `clouds.yaml` entry.
///
/// See `osauth::from_config` for the lookup rules.
pub fn from_config<S: AsRef<str>>(cloud_name: S) -> Result<Session> {
    let cloud_name = cloud_name.as_ref();
    debug!("Loading cloud {} from clouds.yaml", cloud_name);
    let session = osauth::from_config(cloud_name).map_err(config_error)?;
    Ok(session.into())
}
