use std::path::{Component, Path};

use url::Url;

use crate::foundation::error::{ReelError, ReelResult};

/// Resolve a manifest media reference against the manifest's base location.
///
/// - empty (or whitespace) sources stay empty;
/// - sources with their own scheme (`https://...`, `data:`) and Windows drive paths pass through;
/// - URL bases (`https://host/deck/`, `file:///srv/deck`) are treated as directories and the
///   source is joined with standard URL reference resolution, so queries, fragments and
///   protocol-relative sources behave as in a browser;
/// - plain path bases join lexically: `.` is dropped, `..` pops a base segment and is kept when
///   nothing is left to pop on a relative base. Absolute path sources pass through.
///
/// Backslashes in plain paths are treated as `/`. A base that looks like a URL but does not parse
/// is a validation error.
pub fn resolve_media_src(base: &str, src: &str) -> ReelResult<String> {
    let src = src.trim();
    if src.is_empty() {
        return Ok(String::new());
    }
    if is_drive_path(src) || has_scheme(src) {
        return Ok(src.to_string());
    }

    let base = base.trim();
    if base.contains("://") {
        return join_url(base, src);
    }
    if src.starts_with('/') {
        return Ok(src.to_string());
    }
    Ok(join_path(base, src))
}

fn join_url(base: &str, src: &str) -> ReelResult<String> {
    let mut base_url = Url::parse(base)
        .map_err(|e| ReelError::validation(format!("invalid media base URL '{base}': {e}")))?;
    if !base_url.cannot_be_a_base() && !base_url.path().ends_with('/') {
        let dir = format!("{}/", base_url.path());
        base_url.set_path(&dir);
    }
    let joined = base_url.join(src).map_err(|e| {
        ReelError::validation(format!("cannot resolve media '{src}' against '{base}': {e}"))
    })?;
    Ok(joined.into())
}

fn join_path(base: &str, src: &str) -> String {
    let base = base.replace('\\', "/");
    let src = src.replace('\\', "/");
    let joined = Path::new(&base).join(&src);

    let mut prefix = String::new();
    let mut rooted = false;
    let mut parts: Vec<String> = Vec::new();
    for comp in joined.components() {
        match comp {
            Component::Prefix(p) => prefix = p.as_os_str().to_string_lossy().into_owned(),
            Component::RootDir => rooted = true,
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = parts.last().is_some_and(|last| last != "..");
                if can_pop {
                    parts.pop();
                } else if !rooted {
                    parts.push("..".to_string());
                }
            }
            Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
        }
    }

    let joined = parts.join("/");
    if rooted {
        format!("{prefix}/{joined}")
    } else {
        format!("{prefix}{joined}")
    }
}

fn has_scheme(src: &str) -> bool {
    src.starts_with("data:") || Url::parse(src).is_ok()
}

fn is_drive_path(src: &str) -> bool {
    let b = src.as_bytes();
    b.len() >= 3 && b[0].is_ascii_alphabetic() && b[1] == b':' && (b[2] == b'\\' || b[2] == b'/')
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/resolve.rs"]
mod tests;
