//! Stream manifest decoder for kwik embed pages
//!
//! The embed page hides the playlist URL inside a packed inline script. The
//! packer's word dictionary is a single `|`-delimited run, and a fixed window
//! of that run holds the host labels and path segments of the playlist URL in
//! reverse order. Decoding is pure position reconstruction; no script is run.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::warn;

use crate::error::{AnisourceError, Result};

/// Positional assumptions about the embed page
///
/// These are inferred from the obfuscator's current output. When the site
/// changes, derive a new contract and bump `version` instead of loosening
/// the checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestContract {
    /// Identifier of this set of assumptions
    pub version: &'static str,
    /// 0-based index of the `<script>` element holding the packed payload
    pub script_index: usize,
    /// Position of the first token of the window in the `|`-split run
    pub window_start: usize,
}

impl ManifestContract {
    /// The contract matching the embed pages currently served
    pub const CURRENT: ManifestContract = ManifestContract {
        version: "kwik-2023.1",
        script_index: 6,
        window_start: 88,
    };

    /// Minimum number of tokens a run needs to cover the window
    pub fn min_tokens(&self) -> usize {
        self.window_start + WINDOW_LEN
    }
}

impl Default for ManifestContract {
    fn default() -> Self {
        Self::CURRENT
    }
}

/// Tokens in the window: five host labels and five path parts
pub const WINDOW_LEN: usize = 10;

/// Where the playlist lives, as reconstructed from the token window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLocation {
    /// `https://{t9}-{t8}.{t7}.{t6}.{t5}`
    pub host: String,
    /// `{host}/{t4}/{t3}/{t2}/{t1}.{t0}`
    pub url: String,
}

/// Run of packer dictionary words: starts with `|||`, ends at its own `'.`
///
/// Dictionary words never contain `'`, so a run cannot reach into the next one.
fn token_run_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\|\|\|[^']*'\.").expect("token run pattern is valid"))
}

/// Decodes an embed page into the playlist location
///
/// # Errors
/// - `StructuralMismatch` if the script block or the token run is missing,
///   or if the run is ambiguous
/// - `DecodeError` if the run is too short or the window has empty tokens
pub fn parse_manifest_location(html: &str, contract: &ManifestContract) -> Result<ManifestLocation> {
    let script = extract_script_block(html, contract)?;
    let run = find_token_run(&script)?;
    decode_token_run(run, contract)
}

/// Returns the raw text of the contract's script block
pub fn extract_script_block(html: &str, contract: &ManifestContract) -> Result<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script")
        .map_err(|e| AnisourceError::StructuralMismatch(format!("Invalid selector: {:?}", e)))?;

    let scripts: Vec<_> = document.select(&selector).collect();
    match scripts.get(contract.script_index) {
        Some(script) => Ok(script.text().collect()),
        None => {
            warn!(
                contract = contract.version,
                found = scripts.len(),
                wanted = contract.script_index,
                "Embed page has too few script blocks"
            );
            Err(AnisourceError::StructuralMismatch(format!(
                "Expected script block {} but page has {} scripts",
                contract.script_index,
                scripts.len()
            )))
        }
    }
}

/// Finds the single packer dictionary run inside a script
///
/// Zero or several candidates are both refused; picking one of several would
/// be a guess.
pub fn find_token_run(script: &str) -> Result<&str> {
    let mut matches = token_run_pattern().find_iter(script);

    let Some(first) = matches.next() else {
        warn!("No token run found in script block");
        return Err(AnisourceError::StructuralMismatch(
            "No '|||...'.' token run in script block".to_string(),
        ));
    };

    let extra = matches.count();
    if extra > 0 {
        warn!(candidates = extra + 1, "Ambiguous token run in script block");
        return Err(AnisourceError::StructuralMismatch(format!(
            "Found {} token run candidates, expected exactly one",
            extra + 1
        )));
    }

    Ok(first.as_str())
}

/// Reassembles the playlist location from a token run
///
/// Window token `t{i}` is the run's token at `window_start + i`.
pub fn decode_token_run(run: &str, contract: &ManifestContract) -> Result<ManifestLocation> {
    let body = run.strip_suffix("'.").unwrap_or(run);
    let tokens: Vec<&str> = body.split('|').collect();

    if tokens.len() < contract.min_tokens() {
        return Err(AnisourceError::DecodeError(format!(
            "Token run has {} tokens, need at least {}",
            tokens.len(),
            contract.min_tokens()
        )));
    }

    let window = &tokens[contract.window_start..contract.min_tokens()];
    if let Some(pos) = window.iter().position(|t| t.is_empty()) {
        return Err(AnisourceError::DecodeError(format!(
            "Empty token at window position {}",
            pos
        )));
    }

    let host = format!(
        "https://{}-{}.{}.{}.{}",
        window[9], window[8], window[7], window[6], window[5]
    );
    let url = format!(
        "{}/{}/{}/{}/{}.{}",
        host, window[4], window[3], window[2], window[1], window[0]
    );

    Ok(ManifestLocation { host, url })
}
