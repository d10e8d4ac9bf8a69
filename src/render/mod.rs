//! Renderer module — trait-based format dispatch.

pub mod json;
pub mod rest;

use crate::model::Document;
use anyhow::{anyhow, Result};

/// Trait for rendering a parsed Document into a specific output format.
pub trait Renderer {
    fn render(&self, doc: &Document) -> String;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str, preamble: bool) -> Result<Box<dyn Renderer>> {
    match format {
        "rest" | "rst" => Ok(Box::new(rest::RestRenderer { preamble })),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(anyhow!("unknown format: {}. Use rest or json", format)),
    }
}
