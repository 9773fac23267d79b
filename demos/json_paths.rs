//! Reading lenient JSON and navigating it with paths.
//!
//! Run with: cargo run --example json_paths

use serde::{Deserialize, Serialize};
use serde_pivot::path;
use serde_pivot::{json, JsonOptions, JsonSerializer, Value};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize)]
struct Service {
    name: String,
    replicas: u32,
    ports: Vec<u16>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Comments, single quotes and bare keys are all accepted
    let text = r#"
        // deployment
        {
            name: 'gateway',
            replicas: 3,
            ports: [80, 443], /* public */
            "labels": { tier: 'edge' }
        }
    "#;

    let mut root = json::parse(text)?;
    println!("parsed: {}", root);

    println!("first port: {:?}", path::get_i32(&root, "ports[0]")?);
    println!("tier: {:?}", path::get_str(&root, "labels.tier")?);

    path::put(&mut root, "labels['owner.team']", Value::from("platform"))?;
    path::put(&mut root, "replicas", Value::from(5))?;
    path::remove(&mut root, "ports[1]")?;
    println!("edited: {}", root);

    let service: Service = serde_pivot::from_value(root.clone())?;
    println!("bound: {:?}", service);

    let strict = JsonSerializer::with_options(JsonOptions::new().with_always_delimit_map_keys(true));
    println!("delimited: {}", strict.write_to_string(&root)?);

    // Struct fields are reachable by path as well
    let mut service = service;
    path::put_property(&mut service, "ports[0]", Value::from("8080"))?;
    println!("property: {:?}", path::get_property(&service, "ports[0]")?);

    Ok(())
}
