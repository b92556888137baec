//! Startup detection of an available converter.
//!
//! Detection happens once; the selected capability is an immutable value handed to
//! [`FormatNormalizer`](super::FormatNormalizer).

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

/// Converter selected for this host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConverterCapability {
    /// ImageMagick, either `magick` (v7) or `convert` (v6)
    ImageMagick { program: PathBuf },
    /// macOS scriptable image processing
    Sips { program: PathBuf },
    /// libheif example tool
    HeifConvert { program: PathBuf },
    /// In-process decoder and JPEG encoder. Re-encodes formats the `image`
    /// crate reads; HEIC/HEIF payloads fail to decode and are stored as-is.
    Embedded,
    None,
}

impl ConverterCapability {
    pub fn name(&self) -> &'static str {
        match self {
            ConverterCapability::ImageMagick { .. } => "imagemagick",
            ConverterCapability::Sips { .. } => "sips",
            ConverterCapability::HeifConvert { .. } => "heif-convert",
            ConverterCapability::Embedded => "embedded",
            ConverterCapability::None => "none",
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, ConverterCapability::None)
    }

    /// Whether HEIC/HEIF input can actually be converted
    pub fn decodes_heif(&self) -> bool {
        !matches!(self, ConverterCapability::Embedded | ConverterCapability::None)
    }

    /// Name reported by the health endpoint
    pub fn health_label(&self) -> &'static str {
        match self {
            ConverterCapability::Embedded => "embedded (no heif)",
            other => other.name(),
        }
    }
}

impl fmt::Display for ConverterCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolves an executable name to a path
pub trait ToolLocator {
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// Looks programs up in a list of directories, `$PATH` by default
#[derive(Debug, Clone, Default)]
pub struct PathLocator {
    dirs: Vec<PathBuf>,
}

impl PathLocator {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    pub fn from_env() -> Self {
        let dirs = env::var_os("PATH")
            .map(|paths| env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self { dirs }
    }
}

impl ToolLocator for PathLocator {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.dirs.iter().find_map(|dir| {
            let candidate = dir.join(program);
            if is_executable(&candidate) {
                return Some(candidate);
            }
            if cfg!(windows) {
                let exe = dir.join(format!("{}.exe", program));
                if is_executable(&exe) {
                    return Some(exe);
                }
            }
            None
        })
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Search in fixed priority order: ImageMagick, sips, heif-convert, then the
/// embedded decoder when it was compiled in.
pub fn detect_capability(locator: &dyn ToolLocator, embedded_available: bool) -> ConverterCapability {
    let capability = if let Some(program) = locator
        .locate("magick")
        .or_else(|| locator.locate("convert"))
    {
        ConverterCapability::ImageMagick { program }
    } else if let Some(program) = locator.locate("sips") {
        ConverterCapability::Sips { program }
    } else if let Some(program) = locator.locate("heif-convert") {
        ConverterCapability::HeifConvert { program }
    } else if embedded_available {
        ConverterCapability::Embedded
    } else {
        ConverterCapability::None
    };

    match &capability {
        ConverterCapability::None => {
            tracing::warn!("No image converter available, legacy images will be stored as-is")
        }
        ConverterCapability::Embedded => tracing::warn!(
            tool = %capability,
            "No external converter found, the embedded decoder cannot read HEIC/HEIF"
        ),
        other => tracing::info!(tool = %other, "Image converter selected"),
    }

    capability
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeLocator(HashMap<&'static str, PathBuf>);

    impl FakeLocator {
        fn with(programs: &[&'static str]) -> Self {
            Self(
                programs
                    .iter()
                    .map(|p| (*p, PathBuf::from("/usr/bin").join(p)))
                    .collect(),
            )
        }
    }

    impl ToolLocator for FakeLocator {
        fn locate(&self, program: &str) -> Option<PathBuf> {
            self.0.get(program).cloned()
        }
    }

    #[test]
    fn test_detection_order() {
        let all = FakeLocator::with(&["magick", "convert", "sips", "heif-convert"]);
        assert_eq!(
            detect_capability(&all, true),
            ConverterCapability::ImageMagick {
                program: PathBuf::from("/usr/bin/magick")
            }
        );

        let legacy_magick = FakeLocator::with(&["convert", "heif-convert"]);
        assert_eq!(
            detect_capability(&legacy_magick, true),
            ConverterCapability::ImageMagick {
                program: PathBuf::from("/usr/bin/convert")
            }
        );

        let mac = FakeLocator::with(&["sips", "heif-convert"]);
        assert_eq!(detect_capability(&mac, true).name(), "sips");

        let libheif = FakeLocator::with(&["heif-convert"]);
        assert_eq!(detect_capability(&libheif, true).name(), "heif-convert");
    }

    #[test]
    fn test_embedded_and_none() {
        let empty = FakeLocator::with(&[]);
        assert_eq!(detect_capability(&empty, true), ConverterCapability::Embedded);
        let none = detect_capability(&empty, false);
        assert_eq!(none, ConverterCapability::None);
        assert!(!none.is_available());
    }

    #[test]
    fn test_heif_support_in_health_label() {
        let embedded = ConverterCapability::Embedded;
        assert!(embedded.is_available());
        assert!(!embedded.decodes_heif());
        assert_eq!(embedded.health_label(), "embedded (no heif)");

        let magick = ConverterCapability::ImageMagick {
            program: PathBuf::from("/usr/bin/magick"),
        };
        assert!(magick.decodes_heif());
        assert_eq!(magick.health_label(), "imagemagick");
        assert_eq!(ConverterCapability::None.health_label(), "none");
    }

    #[cfg(unix)]
    #[test]
    fn test_path_locator_requires_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("heif-convert");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();

        let locator = PathLocator::new(vec![dir.path().to_path_buf()]);
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert_eq!(locator.locate("heif-convert"), None);

        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(locator.locate("heif-convert"), Some(tool));
        assert_eq!(locator.locate("magick"), None);
    }
}
