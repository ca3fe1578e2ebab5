use groundwater_insight::api::generate_openapi_spec;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let spec = generate_openapi_spec();
    let json = serde_json::to_string_pretty(&spec)?;

    fs::write("openapi.json", json)?;
    println!("Generated openapi.json");
    Ok(())
}
