//! Stateless line rewrites from the legacy dialect to the target dialect.
//!
//! Each rule maps the text of a line to `Some(replacement)` or `None` when it
//! does not apply. Rules run in a fixed order, each one seeing the output of
//! the one before, so later patterns never re-match earlier replacements.

use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

/// A single text rewrite.
pub type Rule = fn(&str) -> Option<String>;

/// Rules applied before fence reconciliation.
pub const BEFORE_FENCE: &[Rule] = &[patch_source_subs];

/// Rules applied after fence reconciliation. Block macros must precede
/// inline macros so a whole-line macro is converted once.
pub const AFTER_FENCE: &[Rule] = &[block_macro, inline_macro, snippet_marker];

lazy_static! {
    static ref SOURCE_SUBS_RE: Regex =
        Regex::new(r#"^(\[\s*"source"\s*,\s*"[^"]+"\s*,\s*subs=")([^"]+)(".*)$"#).unwrap();
    static ref FENCE_RE: Regex = Regex::new(r"^-{4,}$").unwrap();
    static ref BLOCK_MACRO_RE: Regex = Regex::new(
        r"^\s*(added|beta|coming|deprecated|experimental)\[([^\]]*)\]\s*$"
    )
    .unwrap();
    static ref INLINE_MACRO_RE: Regex =
        Regex::new(r"\b(added|beta|coming|deprecated|experimental)\[([^\]]*)\]").unwrap();
    static ref SNIPPET_MARKER_RE: Regex =
        Regex::new(r"^// (AUTOSENSE|KIBANA|CONSOLE|SENSE:[^\]]+?)\s*$").unwrap();
}

/// Whether `text` could be touched by any rule. Lines that fail this check
/// are passed through untouched.
pub fn needs_rewrite(text: &str) -> bool {
    text.contains('[') || text.contains('-') || text.contains("//")
}

/// Whether `text` is a listing fence.
pub fn is_fence(text: &str) -> bool {
    FENCE_RE.is_match(text)
}

/// Run `rules` over `text` in order, replacing it as each one fires.
pub fn apply(text: &mut String, rules: &[Rule]) {
    for rule in rules {
        if let Some(replaced) = rule(text) {
            trace!("rewrite '{text}' => '{replaced}'");
            *text = replaced;
        }
    }
}

/// Add `callouts` to the substitutions of a source block header.
pub fn patch_source_subs(text: &str) -> Option<String> {
    let caps = SOURCE_SUBS_RE.captures(text)?;
    let subs = &caps[2];
    if subs.split(',').any(|s| s.trim() == "callouts") {
        return None;
    }
    Some(format!("{}{},callouts{}", &caps[1], subs, &caps[3]))
}

/// `deprecated[1.0]` alone on a line becomes `deprecated::[1.0]`. Leading
/// indentation is dropped: block macros must start in the first column.
pub fn block_macro(text: &str) -> Option<String> {
    let caps = BLOCK_MACRO_RE.captures(text)?;
    Some(format!("{}::[{}]", &caps[1], &caps[2]))
}

/// `deprecated[1.0]` inside other text becomes `deprecated:[1.0]`.
pub fn inline_macro(text: &str) -> Option<String> {
    if !INLINE_MACRO_RE.is_match(text) {
        return None;
    }
    Some(INLINE_MACRO_RE.replace_all(text, "$1:[$2]").into_owned())
}

/// `// CONSOLE` and friends become `lang_override::[CONSOLE]`.
pub fn snippet_marker(text: &str) -> Option<String> {
    let caps = SNIPPET_MARKER_RE.captures(text)?;
    Some(format!("lang_override::[{}]", &caps[1]))
}
