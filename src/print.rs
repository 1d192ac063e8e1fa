//! Printing label images through the `brother_ql` command-line tool.
//!
//! The raster protocol and USB/network transport stay inside `brother_ql`;
//! this module only hands it a PNG and the three pass-through settings.

use crate::error::LabelError;
use image::{ImageFormat, RgbImage};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Pass-through settings for the print collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterConfig {
    /// Printer model, selects the raster profile (e.g. `QL-600`).
    pub model: String,
    /// Printer identifier, selects the transport target
    /// (e.g. `usb://0x04f9:0x20c0` or `tcp://192.168.0.23`).
    pub printer: String,
    /// Label size identifier (e.g. `62` for 62 mm endless tape).
    pub label: String,
    /// Cut after each label.
    pub cut: bool,
}

/// Sends a single label image to a printer.
pub trait LabelPrinter {
    fn print(&self, image: &RgbImage, name: &str) -> Result<(), LabelError>;

    fn backend_name(&self) -> &str;
}

/// Print backend running `brother_ql print` for every label.
pub struct BrotherQlCommand {
    config: PrinterConfig,
    program: PathBuf,
}

impl BrotherQlCommand {
    pub fn new(config: PrinterConfig) -> Self {
        Self {
            config,
            program: PathBuf::from("brother_ql"),
        }
    }

    /// Use a different executable, e.g. one inside a virtualenv.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Check if the print tool can be started.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--help")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Arguments for printing `image_path`.
    ///
    /// `brother_ql print` cuts by default and only knows `--no-cut`.
    pub fn args(&self, image_path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--model".into(),
            self.config.model.as_str().into(),
            "--printer".into(),
            self.config.printer.as_str().into(),
            "print".into(),
            "--label".into(),
            self.config.label.as_str().into(),
        ];
        if !self.config.cut {
            args.push("--no-cut".into());
        }
        args.push(image_path.as_os_str().to_owned());
        args
    }
}

impl LabelPrinter for BrotherQlCommand {
    fn print(&self, image: &RgbImage, name: &str) -> Result<(), LabelError> {
        let mut png = tempfile::Builder::new()
            .prefix("label-")
            .suffix(".png")
            .tempfile()?;
        image
            .write_to(png.as_file_mut(), ImageFormat::Png)
            .map_err(|e| LabelError::Save {
                path: png.path().to_path_buf(),
                reason: e.to_string(),
            })?;
        png.flush()?;

        let args = self.args(png.path());
        debug!(program = %self.program.display(), ?args, "running print tool");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    LabelError::PrintToolNotFound {
                        program: self.program.display().to_string(),
                    }
                } else {
                    LabelError::Io(e)
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = last_line(&String::from_utf8_lossy(&output.stderr));
            return Err(LabelError::PrintFailed { code, stderr });
        }

        info!(
            label = name,
            model = %self.config.model,
            printer = %self.config.printer,
            "printed label"
        );
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "brother_ql"
    }
}

/// Last non-empty line of a tool's stderr; Python tracebacks end with the error.
fn last_line(stderr: &str) -> String {
    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or_default()
        .to_string()
}
