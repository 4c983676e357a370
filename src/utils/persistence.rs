//! Small filesystem helpers shared by the JSON state store and the config manager.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

pub const JSON_EXTENSION: &str = "json";
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";
const TMP_SUFFIX: &str = "tmp";

pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Stages `data` next to `path` and renames it into place.
pub fn write_atomic(path: &Path, data: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(data.as_bytes())?;
        file.flush()?;
    }
    fs::rename(&tmp, path)
}

/// Turns a free-form backup note into a lowercase, dash separated file name fragment.
pub fn sanitize_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Splits names shaped like `<prefix>_<date>_<time>[_<millis>][_<note>].json`
/// into the backup timestamp and the note, if any.
pub fn parse_backup_name(name: &str) -> Option<(DateTime<Utc>, Option<String>)> {
    let stem = name.strip_suffix(&format!(".{}", JSON_EXTENSION))?;
    let parts: Vec<&str> = stem.split('_').collect();
    let index = parts
        .windows(2)
        .position(|pair| is_digits(pair[0], 8) && is_digits(pair[1], 6))?;
    let raw = format!("{}{}", parts[index], parts[index + 1]);
    let mut naive = NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M%S").ok()?;
    let mut rest = index + 2;
    if let Some(millis) = parts.get(rest).filter(|part| is_digits(part, 3)) {
        naive += Duration::milliseconds(millis.parse().ok()?);
        rest += 1;
    }
    let note = (rest < parts.len()).then(|| parts[rest..].join("_"));
    Some((DateTime::from_naive_utc_and_offset(naive, Utc), note))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}
