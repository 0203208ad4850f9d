use crate::value::Value;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub fn save(path: &str, value: &Value) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create file: {}", path))?;
    crate::encoder::save(value, BufWriter::new(file))
        .with_context(|| format!("Failed to write graph to file: {}", path))?;
    log::debug!("saved graph to {}", path);
    Ok(())
}

pub fn load(path: &str) -> Result<Value> {
    let file = File::open(path).with_context(|| format!("Failed to read file: {}", path))?;
    let value = crate::decoder::load(BufReader::new(file))
        .with_context(|| format!("Failed to load graph from file: {}", path))?;
    log::debug!("loaded graph from {}", path);
    Ok(value)
}

pub fn exists(path: &str) -> bool {
    Path::new(path).exists()
}
