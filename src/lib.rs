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

//! OpenStack Orchestration (Heat) client in Rust.
//!
//! The goal of this project is to provide a simple API for managing
//! Orchestration stacks.
//!
//! # Usage
//!
//! Start with creating a [Cloud](struct.Cloud.html) object, for example from
//! environment variables or a `clouds.yaml` entry:
//!
//! ```rust,no_run
//! use futures::TryStreamExt;
//!
//! # async fn example() -> openstack_orchestration::Result<()> {
//! let os = openstack_orchestration::Cloud::from_env()?;
//!
//! let stack = os
//!     .new_stack("mystack", "heat_template_version: 2016-10-14")
//!     .with_parameter("flavor", "m1.small")
//!     .create()
//!     .await?;
//! println!("Stack {} is {}", stack.id(), stack.status());
//!
//! let failed: Vec<_> = os
//!     .find_stacks()
//!     .with_status("CREATE_FAILED")
//!     .into_stream()
//!     .try_collect()
//!     .await?;
//! println!("{} stacks have failed", failed.len());
//! # Ok(()) }
//! # #[tokio::main]
//! # async fn main() { example().await.unwrap(); }
//! ```
//!
//! The [orchestration::api](orchestration/api/index.html) module provides
//! one function per API call for lower-level access.

#![crate_name = "openstack_orchestration"]
#![crate_type = "lib"]
// NOTE: we do not use generic deny(warnings) to avoid breakages with new
// versions of the compiler. Add more warnings here as you discover them.
// Taken from https://github.com/rust-unofficial/patterns/
#![deny(
    dead_code,
    improper_ctypes,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    trivial_casts,
    trivial_numeric_casts,
    unconditional_recursion,
    unsafe_code,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_extern_crates,
    unused_import_braces,
    unused_parens,
    unused_results,
    while_true
)]

#[macro_use]
extern crate log;

#[macro_use]
mod utils;

mod cloud;
mod common;
pub mod config;
mod error;
pub mod orchestration;
pub mod session;

pub use crate::cloud::Cloud;
pub use crate::common::Refresh;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::session::{Session, ORCHESTRATION};
pub use crate::utils::{Sort, SortDir};
