/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub map_path: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
    pub sight: SightConfig,
    pub keys: KeyConfig,
    /// Problems met while loading, reported once logging is up.
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct SightConfig {
    /// Applied to every actor after load when set.
    pub radius: Option<usize>,
    pub reveal_on_start: bool,
}

/// Key names per direction, e.g. `"Up"`, `"k"`, `"8"`.
#[derive(Clone, Debug)]
pub struct KeyConfig {
    pub north: Vec<String>,
    pub north_east: Vec<String>,
    pub east: Vec<String>,
    pub south_east: Vec<String>,
    pub south: Vec<String>,
    pub south_west: Vec<String>,
    pub west: Vec<String>,
    pub north_west: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    sight: TomlSight,
    #[serde(default)]
    keys: TomlKeys,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_map")]
    map: String,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

#[derive(Deserialize, Debug)]
struct TomlSight {
    #[serde(default)]
    radius: Option<usize>,
    #[serde(default = "default_true")]
    reveal_on_start: bool,
}

#[derive(Deserialize, Debug)]
struct TomlKeys {
    #[serde(default = "default_north")]
    north: Vec<String>,
    #[serde(default = "default_north_east")]
    north_east: Vec<String>,
    #[serde(default = "default_east")]
    east: Vec<String>,
    #[serde(default = "default_south_east")]
    south_east: Vec<String>,
    #[serde(default = "default_south")]
    south: Vec<String>,
    #[serde(default = "default_south_west")]
    south_west: Vec<String>,
    #[serde(default = "default_west")]
    west: Vec<String>,
    #[serde(default = "default_north_west")]
    north_west: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_map() -> String { "maps/demo.map".into() }
fn default_log_file() -> String { "fogwalk.log".into() }
fn default_log_level() -> String { "info".into() }
fn default_true() -> bool { true }

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn default_north() -> Vec<String> { keys(&["Up", "k", "8"]) }
fn default_north_east() -> Vec<String> { keys(&["u", "9"]) }
fn default_east() -> Vec<String> { keys(&["Right", "l", "6"]) }
fn default_south_east() -> Vec<String> { keys(&["n", "3"]) }
fn default_south() -> Vec<String> { keys(&["Down", "j", "2"]) }
fn default_south_west() -> Vec<String> { keys(&["b", "1"]) }
fn default_west() -> Vec<String> { keys(&["Left", "h", "4"]) }
fn default_north_west() -> Vec<String> { keys(&["y", "7"]) }
fn default_quit() -> Vec<String> { keys(&["q", "Esc"]) }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            map: default_map(),
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

impl Default for TomlSight {
    fn default() -> Self {
        TomlSight { radius: None, reveal_on_start: true }
    }
}

impl Default for TomlKeys {
    fn default() -> Self {
        TomlKeys {
            north: default_north(),
            north_east: default_north_east(),
            east: default_east(),
            south_east: default_south_east(),
            south: default_south(),
            south_west: default_south_west(),
            west: default_west(),
            north_west: default_north_west(),
            quit: default_quit(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = vec![];
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        let mut cfg = Self::from_toml(toml_cfg, &search_dirs);
        cfg.warnings = warnings;
        cfg
    }

    /// Parse config text directly. Relative paths resolve against `base`.
    pub fn parse(text: &str, base: &Path) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(toml_cfg, &[base.to_path_buf()]))
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        GameConfig {
            map_path: resolve_path(&toml_cfg.general.map, search_dirs),
            log_file: PathBuf::from(&toml_cfg.general.log_file),
            log_level: toml_cfg.general.log_level,
            sight: SightConfig {
                radius: toml_cfg.sight.radius,
                reveal_on_start: toml_cfg.sight.reveal_on_start,
            },
            keys: KeyConfig {
                north: toml_cfg.keys.north,
                north_east: toml_cfg.keys.north_east,
                east: toml_cfg.keys.east,
                south_east: toml_cfg.keys.south_east,
                south: toml_cfg.keys.south,
                south_west: toml_cfg.keys.south_west,
                west: toml_cfg.keys.west,
                north_west: toml_cfg.keys.north_west,
                quit: toml_cfg.keys.quit,
            },
            warnings: vec![],
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), &[])
    }
}

/// Absolute paths pass through; relative ones are looked up in the
/// candidate dirs, falling back to CWD-relative.
fn resolve_path(value: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        return path;
    }
    search_dirs
        .iter()
        .map(|d| d.join(value))
        .find(|p| p.exists())
        .unwrap_or(path)
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so data is found next to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warnings.push(format!("{}: parse error, using defaults: {e}", path.display()));
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warnings.push(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::parse("", Path::new("/nonexistent")).unwrap();
        assert_eq!(cfg.map_path, PathBuf::from("maps/demo.map"));
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.sight.radius, None);
        assert!(cfg.sight.reveal_on_start);
        assert!(cfg.keys.north.contains(&"Up".to_string()));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let text = r#"
            [sight]
            radius = 5

            [keys]
            quit = ["x"]
        "#;
        let cfg = GameConfig::parse(text, Path::new("/nonexistent")).unwrap();
        assert_eq!(cfg.sight.radius, Some(5));
        assert!(cfg.sight.reveal_on_start);
        assert_eq!(cfg.keys.quit, vec!["x".to_string()]);
        assert_eq!(cfg.keys.west, default_west());
    }

    #[test]
    fn absolute_map_path_is_kept() {
        let cfg = GameConfig::parse("[general]\nmap = \"/tmp/x.map\"", Path::new("/nonexistent")).unwrap();
        assert_eq!(cfg.map_path, PathBuf::from("/tmp/x.map"));
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(GameConfig::parse("[sight]\nradius = \"far\"", Path::new(".")).is_err());
    }
}
