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

//! Orchestration API implementation bits.
//!
//! The `api` module exposes one function per stack operation, taking typed
//! request options. The high-level `Stack`, `NewStack` and `StackQuery`
//! objects are built on top of it.

pub mod api;
mod pager;
mod protocol;
mod results;
mod stacks;
mod urls;

pub use self::pager::{StackPage, StackPager};
pub use self::protocol::{
    AdoptStackOpts, AdoptStackRequest, CreateStackOpts, CreateStackRequest, JsonMap,
    ListStacksOpts, ListStacksRequest, PreviewStackOpts, PreviewStackRequest, StackFilter,
    StackSortKey, StackStatus, UpdateStackOpts, UpdateStackRequest,
};
pub use self::results::{
    AbandonResult, AbandonedStack, CreateResult, CreatedStack, DeleteResult, GetResult, Link,
    ListedStack, PreviewResult, PreviewedStack, RetrievedStack, StackOutput, UpdateResult,
};
pub use self::stacks::{NewStack, Stack, StackQuery, StackSummary};
