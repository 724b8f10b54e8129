//! FTP daemon settings backed by a vsftpd-style `key=value` configuration file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ManagerError;
use crate::manager::{ResourceManager, Verb};
use crate::model::{FtpSetting, ResourceItem, ResourceKind};

pub const DEFAULT_CONFIG: &str = "/etc/vsftpd.conf";

/// Reads the configuration file on every call; mutations rewrite it atomically.
pub struct VsftpdConfig {
    path: PathBuf,
}

impl VsftpdConfig {
    /// Open the configuration at `path`. A missing file means the daemon is
    /// not installed, which is fatal for the console.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ManagerError> {
        let path = path.into();
        if !path.is_file() {
            return Err(ManagerError::Unreachable(format!(
                "{} does not exist",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String, ManagerError> {
        fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                ManagerError::Unreachable(format!("{} disappeared", self.path.display()))
            }
            _ => ManagerError::Io(e),
        })
    }

    fn find(&self, key: &str) -> Result<(String, FtpSetting), ManagerError> {
        let text = self.read()?;
        let setting = parse_settings(&text)
            .into_iter()
            .find(|s| s.key == key)
            .ok_or_else(|| ManagerError::NotFound(key.to_string()))?;
        Ok((text, setting))
    }

    /// Replace line `line` (1-based) with `replacement` and write the file back.
    fn rewrite_line(&self, text: &str, line: usize, replacement: &str) -> Result<(), ManagerError> {
        let mut out = String::with_capacity(text.len() + replacement.len());
        for (idx, l) in text.lines().enumerate() {
            if idx + 1 == line {
                out.push_str(replacement);
            } else {
                out.push_str(l);
            }
            out.push('\n');
        }
        write_atomically(&self.path, &out)
    }
}

impl ResourceManager for VsftpdConfig {
    fn list(&mut self, kind: ResourceKind) -> Result<Vec<ResourceItem>, ManagerError> {
        if kind != ResourceKind::FtpSetting {
            return Ok(Vec::new());
        }
        let text = self.read()?;
        Ok(parse_settings(&text).into_iter().map(ResourceItem::FtpSetting).collect())
    }

    fn inspect(&mut self, _kind: ResourceKind, id: &str) -> Result<String, ManagerError> {
        let (_, setting) = self.find(id)?;
        Ok(format!(
            "{}={}\n\nfile: {}\nline: {}",
            setting.key,
            setting.value,
            self.path.display(),
            setting.line
        ))
    }

    fn mutate(&mut self, kind: ResourceKind, verb: Verb, id: &str) -> Result<(), ManagerError> {
        if kind != ResourceKind::FtpSetting {
            return Err(ManagerError::Unsupported { kind, verb });
        }
        let (text, setting) = self.find(id)?;
        let replacement = match verb {
            Verb::Toggle => {
                if !setting.is_boolean() {
                    return Err(ManagerError::Rejected(format!(
                        "{} is not a YES/NO setting",
                        setting.key
                    )));
                }
                let flipped = if setting.value.eq_ignore_ascii_case("YES") { "NO" } else { "YES" };
                format!("{}={}", setting.key, flipped)
            }
            Verb::Remove => format!("#{}={}", setting.key, setting.value),
            _ => return Err(ManagerError::Unsupported { kind, verb }),
        };
        tracing::info!(path = %self.path.display(), key = id, %verb, "rewriting ftp setting");
        self.rewrite_line(&text, setting.line, &replacement)
    }

    fn prune(&mut self, kind: ResourceKind) -> Result<String, ManagerError> {
        Err(ManagerError::Unsupported { kind, verb: Verb::Remove })
    }
}

/// Parse directives out of the file text.
///
/// Blank lines and `#` comments are skipped. Lines without `=` or with an
/// empty key are rejected with a warning. Only the first occurrence of a key
/// is kept.
pub fn parse_settings(text: &str) -> Vec<FtpSetting> {
    let mut settings: Vec<FtpSetting> = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            tracing::warn!(line = idx + 1, "skipping malformed ftp setting");
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            tracing::warn!(line = idx + 1, "skipping ftp setting without key");
            continue;
        }
        if settings.iter().any(|s| s.key == key) {
            continue;
        }
        settings.push(FtpSetting {
            key: key.to_string(),
            value: value.trim().to_string(),
            line: idx + 1,
        });
    }
    settings
}

fn write_atomically(path: &Path, contents: &str) -> Result<(), ManagerError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());
    let tmp = dir.join(format!(".{}.berth-tmp", file_name));
    let result = replace_with(&tmp, path, contents);
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result.map_err(ManagerError::from)
}

fn replace_with(tmp: &Path, path: &Path, contents: &str) -> std::io::Result<()> {
    {
        let mut f = fs::File::create(tmp)?;
        f.write_all(contents.as_bytes())?;
        f.sync_all()?;
    }
    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp, meta.permissions())?;
    }
    fs::rename(tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# vsftpd config
listen=YES
anonymous_enable=NO

local_enable=YES
garbage line
=novalue
ftpd_banner=Welcome to the server
listen=NO
";

    fn config_with(text: &str) -> (tempfile::TempDir, VsftpdConfig) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vsftpd.conf");
        fs::write(&path, text).unwrap();
        let cfg = VsftpdConfig::open(&path).unwrap();
        (dir, cfg)
    }

    #[test]
    fn parse_skips_comments_and_malformed_rows() {
        let settings = parse_settings(SAMPLE);
        let keys: Vec<&str> = settings.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["listen", "anonymous_enable", "local_enable", "ftpd_banner"]);
        assert_eq!(settings[0].value, "YES");
        assert_eq!(settings[2].line, 5);
        assert_eq!(settings[3].value, "Welcome to the server");
    }

    #[test]
    fn missing_file_is_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let err = VsftpdConfig::open(dir.path().join("nope.conf")).err().unwrap();
        assert!(err.is_fatal());
    }

    #[test]
    fn toggle_rewrites_only_target_line() {
        let (_dir, mut cfg) = config_with(SAMPLE);
        cfg.mutate(ResourceKind::FtpSetting, Verb::Toggle, "anonymous_enable").unwrap();

        let text = fs::read_to_string(cfg.path()).unwrap();
        assert!(text.contains("anonymous_enable=YES"));
        assert!(text.contains("listen=YES"));
        assert!(text.contains("garbage line"));
        assert_eq!(text.lines().count(), SAMPLE.lines().count());
    }

    #[test]
    fn toggle_of_non_boolean_is_rejected() {
        let (_dir, mut cfg) = config_with(SAMPLE);
        let err = cfg.mutate(ResourceKind::FtpSetting, Verb::Toggle, "ftpd_banner").err().unwrap();
        assert!(matches!(err, ManagerError::Rejected(_)));
    }

    #[test]
    fn remove_comments_the_directive_out() {
        let (_dir, mut cfg) = config_with(SAMPLE);
        cfg.mutate(ResourceKind::FtpSetting, Verb::Remove, "local_enable").unwrap();

        let items = cfg.list(ResourceKind::FtpSetting).unwrap();
        assert!(items.iter().all(|i| i.id() != "local_enable"));
        let text = fs::read_to_string(cfg.path()).unwrap();
        assert!(text.contains("#local_enable=YES"));
    }

    #[test]
    fn unknown_key_is_not_found() {
        let (_dir, mut cfg) = config_with(SAMPLE);
        let err = cfg.mutate(ResourceKind::FtpSetting, Verb::Remove, "nope").err().unwrap();
        assert!(matches!(err, ManagerError::NotFound(_)));
        assert!(cfg.inspect(ResourceKind::FtpSetting, "nope").is_err());
    }

    #[test]
    fn inspect_shows_location() {
        let (_dir, mut cfg) = config_with(SAMPLE);
        let detail = cfg.inspect(ResourceKind::FtpSetting, "listen").unwrap();
        assert!(detail.starts_with("listen=YES"));
        assert!(detail.contains("line: 2"));
    }

    #[test]
    fn prune_is_unsupported() {
        let (_dir, mut cfg) = config_with(SAMPLE);
        assert!(matches!(
            cfg.prune(ResourceKind::FtpSetting),
            Err(ManagerError::Unsupported { .. })
        ));
    }

    #[test]
    fn failed_rewrite_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory where the file should be makes the rename fail.
        let target = dir.path().join("vsftpd.conf");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        assert!(write_atomically(&target, "listen=YES\n").is_err());
        assert!(!dir.path().join(".vsftpd.conf.berth-tmp").exists());
    }
}
