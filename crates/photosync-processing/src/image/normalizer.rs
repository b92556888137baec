use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use photosync_core::config::ProcessingConfig;
use photosync_core::constants::{LEGACY_IMAGE_EXTENSIONS, NORMALIZED_IMAGE_EXTENSION};
use tokio::process::Command;

use super::capability::{detect_capability, ConverterCapability, PathLocator};
use super::metadata::{embed_exif, read_metadata, ImageMetadata};

const MAX_STDERR_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerSettings {
    pub enabled: bool,
    /// JPEG quality, 0-100
    pub quality: u8,
    pub preserve_metadata: bool,
}

impl From<&ProcessingConfig> for NormalizerSettings {
    fn from(config: &ProcessingConfig) -> Self {
        Self {
            enabled: config.convert_heic,
            quality: config.heic_quality.min(100),
            preserve_metadata: config.preserve_exif,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("encode failed: {0}")]
    Encode(String),

    #[error("converter output is not a JPEG: {0}")]
    InvalidOutput(String),

    #[error("conversion task aborted: {0}")]
    Aborted(String),

    #[error("embedded decoder is not compiled in")]
    EmbeddedUnavailable,
}

/// Result of one conversion attempt. Conversion never fails the pipeline;
/// `converted = false` tells the caller to keep the original bytes.
#[derive(Debug, Clone, Default)]
pub struct ConversionOutcome {
    pub converted: bool,
    pub output: Option<Vec<u8>>,
    pub tool_used: Option<String>,
    pub failure_reason: Option<String>,
    /// Metadata read from the source, whether or not it was copied
    pub metadata: ImageMetadata,
}

impl ConversionOutcome {
    fn success(output: Vec<u8>, tool: &str, metadata: ImageMetadata) -> Self {
        Self {
            converted: true,
            output: Some(output),
            tool_used: Some(tool.to_string()),
            failure_reason: None,
            metadata,
        }
    }

    fn failure(reason: impl Into<String>, tool: Option<&str>, metadata: ImageMetadata) -> Self {
        Self {
            converted: false,
            output: None,
            tool_used: tool.map(str::to_string),
            failure_reason: Some(reason.into()),
            metadata,
        }
    }
}

/// Converts legacy image containers to JPEG with the capability selected at startup.
#[derive(Debug, Clone)]
pub struct FormatNormalizer {
    settings: NormalizerSettings,
    capability: ConverterCapability,
}

impl FormatNormalizer {
    pub fn new(settings: NormalizerSettings, capability: ConverterCapability) -> Self {
        Self {
            settings,
            capability,
        }
    }

    /// Search `$PATH` for a converter. Skipped entirely when conversion is off.
    pub fn detect(settings: NormalizerSettings) -> Self {
        let capability = if settings.enabled {
            detect_capability(&PathLocator::from_env(), cfg!(feature = "embedded-decoder"))
        } else {
            ConverterCapability::None
        };
        Self::new(settings, capability)
    }

    pub fn settings(&self) -> &NormalizerSettings {
        &self.settings
    }

    pub fn capability(&self) -> &ConverterCapability {
        &self.capability
    }

    /// `true` for `.heic` / `.heif` in any letter case
    pub fn is_legacy_image(name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                LEGACY_IMAGE_EXTENSIONS
                    .iter()
                    .any(|legacy| e.eq_ignore_ascii_case(legacy))
            })
            .unwrap_or(false)
    }

    /// Name of the converted file: same stem, `.jpg` extension.
    pub fn converted_name(name: &str) -> String {
        let stem = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name);
        format!("{}.{}", stem, NORMALIZED_IMAGE_EXTENSION)
    }

    pub async fn convert(
        &self,
        input: &[u8],
        quality: u8,
        preserve_metadata: bool,
    ) -> ConversionOutcome {
        if !self.settings.enabled {
            return ConversionOutcome::failure("disabled", None, ImageMetadata::default());
        }
        if !self.capability.is_available() {
            return ConversionOutcome::failure("no tool", None, ImageMetadata::default());
        }

        let tool = self.capability.name();
        let quality = quality.min(100);
        let metadata = read_metadata(input);
        let start = Instant::now();

        let result = match self.run(input, quality, preserve_metadata).await {
            Ok(output) => finalize_jpeg(output, preserve_metadata, &metadata),
            Err(e) => Err(e),
        };

        match result {
            Ok(output) => {
                tracing::info!(
                    tool = tool,
                    input_bytes = input.len(),
                    output_bytes = output.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Image converted to JPEG"
                );
                ConversionOutcome::success(output, tool, metadata)
            }
            Err(e) => {
                tracing::warn!(tool = tool, error = %e, "Image conversion failed");
                ConversionOutcome::failure(e.to_string(), Some(tool), metadata)
            }
        }
    }

    async fn run(
        &self,
        input: &[u8],
        quality: u8,
        preserve_metadata: bool,
    ) -> Result<Vec<u8>, ConversionError> {
        match &self.capability {
            ConverterCapability::ImageMagick { program } => {
                let mut args = vec![
                    "-colorspace".to_string(),
                    "sRGB".to_string(),
                    "-quality".to_string(),
                    quality.to_string(),
                ];
                if !preserve_metadata {
                    args.push("-strip".to_string());
                }
                run_tool(program, "imagemagick", input, |src, dst| {
                    let mut all = vec![src.to_string()];
                    all.extend(args.iter().cloned());
                    all.push(dst.to_string());
                    all
                })
                .await
            }
            ConverterCapability::Sips { program } => {
                run_tool(program, "sips", input, |src, dst| {
                    vec![
                        "-s".to_string(),
                        "format".to_string(),
                        "jpeg".to_string(),
                        "-s".to_string(),
                        "formatOptions".to_string(),
                        quality.to_string(),
                        src.to_string(),
                        "--out".to_string(),
                        dst.to_string(),
                    ]
                })
                .await
            }
            ConverterCapability::HeifConvert { program } => {
                run_tool(program, "heif-convert", input, |src, dst| {
                    vec![
                        "-q".to_string(),
                        quality.to_string(),
                        src.to_string(),
                        dst.to_string(),
                    ]
                })
                .await
            }
            ConverterCapability::Embedded => run_embedded(input, quality).await,
            ConverterCapability::None => Err(ConversionError::Aborted("no tool".to_string())),
        }
    }
}

/// Run an external converter on temp files. The child is killed if the
/// future is dropped, so a caller-side timeout also stops the process.
async fn run_tool<F>(
    program: &Path,
    tool: &'static str,
    input: &[u8],
    build_args: F,
) -> Result<Vec<u8>, ConversionError>
where
    F: FnOnce(&str, &str) -> Vec<String>,
{
    let workdir = tempfile::tempdir()?;
    let source = workdir.path().join("source.heic");
    let target = workdir.path().join("output.jpg");
    tokio::fs::write(&source, input).await?;

    let args = build_args(&source.to_string_lossy(), &target.to_string_lossy());
    tracing::debug!(tool = tool, program = %program.display(), "Running converter");

    let output = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await?;

    if !output.status.success() {
        let stderr: String = String::from_utf8_lossy(&output.stderr)
            .trim()
            .chars()
            .take(MAX_STDERR_CHARS)
            .collect();
        return Err(ConversionError::ToolFailed {
            tool,
            status: output.status.to_string(),
            stderr,
        });
    }

    Ok(tokio::fs::read(&target).await?)
}

#[cfg(feature = "embedded-decoder")]
async fn run_embedded(input: &[u8], quality: u8) -> Result<Vec<u8>, ConversionError> {
    let data = input.to_vec();
    tokio::task::spawn_blocking(move || super::encoder::encode_jpeg(&data, quality))
        .await
        .map_err(|e| ConversionError::Aborted(e.to_string()))?
}

#[cfg(not(feature = "embedded-decoder"))]
async fn run_embedded(_input: &[u8], _quality: u8) -> Result<Vec<u8>, ConversionError> {
    Err(ConversionError::EmbeddedUnavailable)
}

/// Verify the output is a JPEG, then copy or strip EXIF.
fn finalize_jpeg(
    output: Vec<u8>,
    preserve_metadata: bool,
    source: &ImageMetadata,
) -> Result<Vec<u8>, ConversionError> {
    let exif = match (preserve_metadata, source.exif.as_deref()) {
        (true, Some(exif)) => Some(exif),
        // Nothing to copy; keep whatever the tool wrote
        (true, None) => {
            return ensure_jpeg(&output).map(|_| output);
        }
        (false, _) => None,
    };
    embed_exif(&output, exif).map_err(|e| ConversionError::InvalidOutput(e.to_string()))
}

fn ensure_jpeg(output: &[u8]) -> Result<(), ConversionError> {
    img_parts::jpeg::Jpeg::from_bytes(bytes::Bytes::copy_from_slice(output))
        .map(|_| ())
        .map_err(|e| ConversionError::InvalidOutput(e.to_string()))
}
