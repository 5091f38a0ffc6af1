//! Print the Postboard OpenAPI document as JSON.

use color_eyre::eyre::{Context, Result};
use postboard::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    color_eyre::install()?;
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .wrap_err("serialising the OpenAPI document")?;
    println!("{json}");
    Ok(())
}
