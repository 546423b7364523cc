use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    MacOs,
    Windows,
    Linux,
    ChromeOs,
}

impl OperatingSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            OperatingSystem::MacOs => "macos",
            OperatingSystem::Windows => "windows",
            OperatingSystem::Linux => "linux",
            OperatingSystem::ChromeOs => "chromeos",
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a user-agent / platform string. `None` means unknown.
///
/// Checks run in a fixed order and the first hit wins: `Mac` (macOS and iOS),
/// `Win`, `Linux`/`X11` without `Android`, then `CrOS`. ChromeOS agents that
/// also advertise `X11` therefore classify as Linux.
pub fn detect_os(platform: &str) -> Option<OperatingSystem> {
    if platform.contains("Mac") {
        return Some(OperatingSystem::MacOs);
    }
    if platform.contains("Win") {
        return Some(OperatingSystem::Windows);
    }
    if (platform.contains("Linux") || platform.contains("X11")) && !platform.contains("Android") {
        return Some(OperatingSystem::Linux);
    }
    if platform.contains("CrOS") {
        return Some(OperatingSystem::ChromeOs);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_wins_over_everything() {
        assert_eq!(
            detect_os("Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0)"),
            Some(OperatingSystem::MacOs)
        );
        assert_eq!(
            detect_os("Mac Windows Linux X11 CrOS"),
            Some(OperatingSystem::MacOs)
        );
        assert_eq!(
            detect_os("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"),
            Some(OperatingSystem::MacOs)
        );
    }

    #[test]
    fn windows_before_linux() {
        assert_eq!(
            detect_os("Mozilla/5.0 (Windows NT 10.0; Win64; x64)"),
            Some(OperatingSystem::Windows)
        );
        assert_eq!(detect_os("Win Linux"), Some(OperatingSystem::Windows));
    }

    #[test]
    fn android_is_not_linux() {
        let ua = "Mozilla/5.0 (Linux; Android 14; Pixel 8)";
        assert_ne!(detect_os(ua), Some(OperatingSystem::Linux));
        assert_eq!(detect_os(ua), None);
    }

    #[test]
    fn linux_and_x11() {
        assert_eq!(detect_os("(X11; Ubuntu; Linux x86_64)"), Some(OperatingSystem::Linux));
        assert_eq!(detect_os("X11; FreeBSD"), Some(OperatingSystem::Linux));
        assert_eq!(
            detect_os("Mozilla/5.0 (X11; CrOS x86_64 14541.0.0)"),
            Some(OperatingSystem::Linux)
        );
    }

    #[test]
    fn chromeos_without_x11() {
        assert_eq!(detect_os("CrOS armv7l"), Some(OperatingSystem::ChromeOs));
        assert_eq!(detect_os("CrOS Android"), Some(OperatingSystem::ChromeOs));
    }

    #[test]
    fn unknown_platforms() {
        assert_eq!(detect_os(""), None);
        assert_eq!(detect_os("Nintendo Switch"), None);
        assert_eq!(detect_os("mac windows linux"), None);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OperatingSystem::ChromeOs).unwrap(),
            "\"chromeos\""
        );
        assert_eq!(OperatingSystem::MacOs.to_string(), "macos");
    }
}
