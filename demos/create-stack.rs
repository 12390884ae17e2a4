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

use std::env;
use std::fs;
use std::time::Duration;

use openstack_orchestration::Refresh;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let os = openstack_orchestration::Cloud::from_env()
        .expect("Failed to create a session from the environment");

    let name = env::args().nth(1).expect("Provide a stack name");
    let template_file = env::args().nth(2).expect("Provide a template file");
    let template = fs::read_to_string(&template_file).expect("Cannot read the template");

    let mut stack = os
        .new_stack(name, template)
        .with_timeout(10)
        .create()
        .await
        .expect("Cannot create a stack");
    println!(
        "ID = {}, Name = {}, Status = {}",
        stack.id(),
        stack.name(),
        stack.status(),
    );

    while stack.status().is_in_progress() {
        tokio::time::sleep(Duration::from_secs(5)).await;
        stack.refresh().await.expect("Cannot refresh the stack");
    }

    println!(
        "ID = {}, Name = {}, Status = {}, Reason = {:?}",
        stack.id(),
        stack.name(),
        stack.status(),
        stack.status_reason(),
    );
    for output in stack.outputs() {
        println!("{} = {}", output.output_key, output.output_value);
    }

    stack.delete().await.expect("Failed to delete the stack");
}
