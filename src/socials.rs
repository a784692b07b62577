use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

pub const SOCIALS_FILE: &str = "socialData.json";

/// Read-only social-links document: platform name ("github", "linkedin",
/// "email", ...) mapped to a URL or contact string. Unlike the snapshots,
/// a missing file is an error; the document is authored by hand and never
/// written by the service.
pub fn load(dir: &Path) -> Result<BTreeMap<String, String>> {
    let raw = std::fs::read_to_string(dir.join(SOCIALS_FILE))?;
    Ok(serde_json::from_str(&raw)?)
}
