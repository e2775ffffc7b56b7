// SPDX-License-Identifier: MIT

//! The built-in voice catalog and name-resolution rules, fully specified in
//! `original_source/src/local_tts/service.py` (`VOICES` and the
//! voice-name-cleanup branch of its request handler) and therefore fully
//! implemented rather than left as an opaque boundary.

use rand::seq::SliceRandom;

/// Catalog voice names, in the order the original Python service lists
/// them.
pub const VOICE_CATALOG: &[&str] = &[
    "alba", "marius", "javert", "jean", "fantine", "cosette", "eponine", "azelma",
];

/// The voice used when no name is given, "random" is requested, or a
/// requested name doesn't match the catalog.
pub const DEFAULT_VOICE: &str = "alba";

/// Resolve a client-supplied catalog voice name to a concrete catalog
/// entry:
///
/// - `None`, `Some("")`, or `Some("random")` (case-insensitive) picks a
///   uniformly random catalog voice.
/// - Anything else is stripped of a trailing `" (...)"` annotation (as the
///   client UI might display `"alba (default)"`) and, if the result isn't a
///   catalog name, falls back to [`DEFAULT_VOICE`].
pub fn resolve_catalog_voice(requested: Option<&str>) -> String {
    let requested = requested.map(str::trim);
    match requested {
        None => random_voice(),
        Some(name) if name.is_empty() || name.eq_ignore_ascii_case("random") => random_voice(),
        Some(name) => {
            let clean = name.split(" (").next().unwrap_or(name);
            if VOICE_CATALOG.contains(&clean) {
                clean.to_string()
            } else {
                DEFAULT_VOICE.to_string()
            }
        }
    }
}

fn random_voice() -> String {
    VOICE_CATALOG
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(DEFAULT_VOICE)
        .to_string()
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
