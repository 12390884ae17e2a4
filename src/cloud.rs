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

//! Cloud API.

use osauth::AuthType;

use super::orchestration::{NewStack, Stack, StackQuery};
use super::session::Session;
use super::Result;

/// OpenStack cloud API.
///
/// Provides high-level API for working with Orchestration stacks.
#[derive(Debug, Clone)]
pub struct Cloud {
    session: Session,
}

impl Cloud {
    /// Create a new cloud object with a given session.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// async fn cloud() -> openstack_orchestration::Result<openstack_orchestration::Cloud> {
    ///     let auth = osauth::NoAuth::new("https://cloud.example.com:8004/v1/project1")
    ///         .expect("Invalid endpoint URL");
    ///     let session = openstack_orchestration::Session::new(auth)
    ///         .await?
    ///         .with_token("gAAAAABe...")?;
    ///     Ok(openstack_orchestration::Cloud::new(session))
    /// }
    ///
    /// # #[tokio::main]
    /// # async fn main() { cloud().await.unwrap(); }
    /// ```
    ///
    /// # See Also
    ///
    /// * [from_config](#method.from_config) to create a Cloud from clouds.yaml
    /// * [from_env](#method.from_env) to create a Cloud from environment variables
    #[inline]
    pub fn new(session: Session) -> Cloud {
        Cloud { session }
    }

    /// Create a new cloud object from a configuration file
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # fn cloud_from_config() -> openstack_orchestration::Result<()> {
    /// let os = openstack_orchestration::Cloud::from_config("cloud-1")?;
    /// # Ok(()) }
    /// # fn main() { cloud_from_config().unwrap(); }
    /// ```
    pub fn from_config<S: AsRef<str>>(cloud_name: S) -> Result<Cloud> {
        Ok(Cloud::new(Session::from_config(cloud_name)?))
    }

    /// Create a new cloud object from environment variables.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # fn cloud_from_env() -> openstack_orchestration::Result<()> {
    /// let os = openstack_orchestration::Cloud::from_env()?;
    /// # Ok(()) }
    /// # fn main() { cloud_from_env().unwrap(); }
    /// ```
    pub fn from_env() -> Result<Cloud> {
        Ok(Cloud::new(Session::from_env()?))
    }

    /// Convert this cloud into one using the given authentication.
    pub fn with_auth_type<Auth: AuthType + 'static>(self, auth_type: Auth) -> Cloud {
        Cloud::new(self.session.with_auth_type(auth_type))
    }

    /// Session used by this cloud.
    ///
    /// Pass it to the functions in [orchestration::api](orchestration/api/index.html)
    /// for low-level access.
    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Build a query against stack list.
    ///
    /// The returned object is a builder that should be used to construct
    /// the query.
    #[inline]
    pub fn find_stacks(&self) -> StackQuery {
        StackQuery::new(self.session.clone())
    }

    /// Find a stack by its name and ID.
    pub async fn get_stack<N, I>(&self, name: N, id: I) -> Result<Stack>
    where
        N: AsRef<str>,
        I: AsRef<str>,
    {
        Stack::load(self.session.clone(), name, id).await
    }

    /// Prepare a new stack for creation.
    ///
    /// This call returns a `NewStack` object, which is a builder to populate
    /// stack fields. Pass an empty template to use `with_template_url`.
    pub fn new_stack<N, T>(&self, name: N, template: T) -> NewStack
    where
        N: Into<String>,
        T: Into<String>,
    {
        NewStack::new(self.session.clone(), name.into(), template.into())
    }
}
