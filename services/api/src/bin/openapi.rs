//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI 3.0 specification for the REST API to a JSON file.
//! The output path is the first argument, defaulting to `openapi.json`.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());
    std::fs::write(&path, ApiDoc::openapi().to_pretty_json()?)?;
    println!("OpenAPI specification written to {path}");
    Ok(())
}
