use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Character used to build the indentation unit.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    /// Non-breaking spaces (U+00A0)
    Nbsp,
    Space,
    Tab,
}

impl IndentStyle {
    /// The indentation unit: `width` copies of the character (a single tab for `Tab`).
    pub fn unit(self, width: usize) -> String {
        match self {
            Self::Nbsp => "\u{a0}".repeat(width.max(1)),
            Self::Space => " ".repeat(width.max(1)),
            Self::Tab => "\t".to_string(),
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Nbsp => "nbsp",
            Self::Space => "space",
            Self::Tab => "tab",
        }
    }
}

pub const DEFAULT_INDENT_WIDTH: usize = 2;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub no_color: bool,
    pub perf: bool,
    pub indent: Option<IndentStyle>,
    pub indent_width: Option<usize>,
    pub store_dir: Option<PathBuf>,
    pub rules: Option<PathBuf>,
    pub debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            no_color: self.no_color || other.no_color,
            perf: self.perf || other.perf,
            indent: other.indent.or(self.indent),
            indent_width: other.indent_width.or(self.indent_width),
            store_dir: other.store_dir.clone().or_else(|| self.store_dir.clone()),
            rules: other.rules.clone().or_else(|| self.rules.clone()),
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
        }
    }

    /// Effective indentation unit (two non-breaking spaces by default).
    pub fn indent_unit(&self) -> String {
        self.indent
            .unwrap_or(IndentStyle::Nbsp)
            .unit(self.indent_width.unwrap_or(DEFAULT_INDENT_WIDTH))
    }

    /// Effective snapshot directory.
    pub fn store_dir(&self) -> PathBuf {
        self.store_dir.clone().unwrap_or_else(default_store_dir)
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("keyline").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("keyline")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("keyline").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("keyline").join("config");
        }
    }

    PathBuf::from(".keylinerc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".keylinerc")
}

/// Directory holding saved snapshots when `--store-dir` is not given.
pub fn default_store_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("LOCALAPPDATA") {
            return PathBuf::from(appdata).join("keyline");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("keyline")
                .join("data");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("keyline");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".local").join("share").join("keyline");
        }
    }

    PathBuf::from(".keyline")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(line_tokens)
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// A `--flag=value` line is one token so values may contain spaces;
/// anything else splits on whitespace.
fn line_tokens(line: &str) -> Vec<String> {
    let single = line
        .split_once('=')
        .is_some_and(|(name, _)| name.starts_with("--") && !name.contains(char::is_whitespace));
    if single {
        vec![line.to_string()]
    } else {
        line.split_whitespace().map(ToOwned::to_owned).collect()
    }
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# keyline defaults (saved with --save)".to_string());
    if flags.no_color {
        lines.push("--no-color".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(indent) = flags.indent {
        lines.push(format!("--indent={}", indent.as_str()));
    }
    if let Some(width) = flags.indent_width {
        lines.push(format!("--indent-width={width}"));
    }
    if let Some(dir) = &flags.store_dir {
        lines.push(format!("--store-dir={}", dir.display()));
    }
    if let Some(rules) = &flags.rules {
        lines.push(format!("--rules={}", rules.display()));
    }
    if let Some(log) = &flags.debug_log {
        lines.push(format!("--debug-log={}", log.display()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Extract known flags from a token list; unknown tokens are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let takes_value = matches!(
            name,
            "--indent" | "--indent-width" | "--store-dir" | "--rules" | "--debug-log"
        );
        let value = if takes_value && inline_value.is_none() {
            i += 1;
            tokens.get(i).map(String::as_str)
        } else {
            inline_value
        };

        match (name, value) {
            ("--no-color", None) => flags.no_color = true,
            ("--perf", None) => flags.perf = true,
            ("--indent", Some(v)) => flags.indent = parse_indent(v),
            ("--indent-width", Some(v)) => flags.indent_width = v.parse().ok(),
            ("--store-dir", Some(v)) => flags.store_dir = Some(PathBuf::from(v)),
            ("--rules", Some(v)) => flags.rules = Some(PathBuf::from(v)),
            ("--debug-log", Some(v)) => flags.debug_log = Some(PathBuf::from(v)),
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_indent(s: &str) -> Option<IndentStyle> {
    match s {
        "nbsp" => Some(IndentStyle::Nbsp),
        "space" => Some(IndentStyle::Space),
        "tab" => Some(IndentStyle::Tab),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = tokens(&[
            "keyline",
            "--no-color",
            "--indent",
            "space",
            "--indent-width=4",
            "--store-dir",
            "/tmp/notes",
            "--rules=rules.json",
            "show",
        ]);
        let flags = parse_flag_tokens(&args);
        assert!(flags.no_color);
        assert_eq!(flags.indent, Some(IndentStyle::Space));
        assert_eq!(flags.indent_width, Some(4));
        assert_eq!(flags.store_dir, Some(PathBuf::from("/tmp/notes")));
        assert_eq!(flags.rules, Some(PathBuf::from("rules.json")));
        assert!(!flags.perf);
    }

    #[test]
    fn test_parse_flag_tokens_ignores_unknown_indent() {
        let flags = parse_flag_tokens(&tokens(&["--indent", "emoji"]));
        assert_eq!(flags.indent, None);
    }

    #[test]
    fn test_indent_unit_defaults_to_two_nbsp() {
        assert_eq!(ConfigFlags::default().indent_unit(), "\u{a0}\u{a0}");
    }

    #[test]
    fn test_indent_unit_from_flags() {
        let flags = ConfigFlags {
            indent: Some(IndentStyle::Space),
            indent_width: Some(4),
            ..ConfigFlags::default()
        };
        assert_eq!(flags.indent_unit(), "    ");
        let tab = ConfigFlags {
            indent: Some(IndentStyle::Tab),
            indent_width: Some(4),
            ..ConfigFlags::default()
        };
        assert_eq!(tab.indent_unit(), "\t");
    }

    #[test]
    fn test_zero_width_still_indents() {
        assert_eq!(IndentStyle::Nbsp.unit(0), "\u{a0}");
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            perf: true,
            indent: Some(IndentStyle::Tab),
            store_dir: Some(PathBuf::from("file-dir")),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            no_color: true,
            indent: Some(IndentStyle::Space),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.perf);
        assert!(merged.no_color);
        assert_eq!(merged.indent, Some(IndentStyle::Space));
        assert_eq!(merged.store_dir, Some(PathBuf::from("file-dir")));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".keylinerc");
        let flags = ConfigFlags {
            no_color: true,
            perf: true,
            indent: Some(IndentStyle::Space),
            indent_width: Some(3),
            store_dir: Some(PathBuf::from("notes")),
            rules: Some(PathBuf::from("rules.json")),
            debug_log: Some(PathBuf::from("debug.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_saved_paths_with_spaces_reload_intact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config");
        let flags = ConfigFlags {
            store_dir: Some(PathBuf::from("/home/me/My Notes")),
            rules: Some(PathBuf::from("Application Support/keyline rules.json")),
            debug_log: Some(PathBuf::from("logs/debug log.txt")),
            ..ConfigFlags::default()
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);
    }

    #[test]
    fn test_hand_written_space_separated_lines_still_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".keylinerc");
        std::fs::write(&path, "--no-color --perf\n--indent tab\n--store-dir=/srv/my notes\n").unwrap();
        let flags = load_config_flags(&path).unwrap();
        assert!(flags.no_color);
        assert!(flags.perf);
        assert_eq!(flags.indent, Some(IndentStyle::Tab));
        assert_eq!(flags.store_dir, Some(PathBuf::from("/srv/my notes")));
    }

    #[test]
    fn test_load_missing_config_is_default() {
        let dir = tempdir().unwrap();
        let flags = load_config_flags(&dir.path().join("absent")).unwrap();
        assert_eq!(flags, ConfigFlags::default());
    }
}
