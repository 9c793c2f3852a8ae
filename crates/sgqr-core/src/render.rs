//! Rendering composed payloads into QR symbols

use serde::Serialize;

use crate::error::RenderError;

/// Turns a payload string into something scannable.
pub trait QrRenderer {
    type Output;

    fn render(&self, payload: &str) -> Result<Self::Output, RenderError>;
}

/// Module matrix of a QR symbol, row-major, `true` = dark
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QrMatrix {
    pub width: usize,
    pub modules: Vec<bool>,
}

impl QrMatrix {
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width
            && y < self.width
            && self.modules.get(y * self.width + x).copied().unwrap_or(false)
    }
}

/// Renders with the `qrcode` crate at error-correction level M.
#[cfg(feature = "render")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixRenderer;

#[cfg(feature = "render")]
impl QrRenderer for MatrixRenderer {
    type Output = QrMatrix;

    fn render(&self, payload: &str) -> Result<QrMatrix, RenderError> {
        use qrcode::types::QrError;
        use qrcode::{Color, EcLevel, QrCode};

        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
            .map_err(|e| match e {
                QrError::DataTooLong => RenderError::DataTooLong(e.to_string()),
                other => RenderError::Failed(other.to_string()),
            })?;

        let width = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == Color::Dark)
            .collect();

        log::debug!("Rendered {} chars into a {}x{} symbol", payload.len(), width, width);
        Ok(QrMatrix { width, modules })
    }
}
