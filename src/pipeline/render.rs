//! PDF rasterisation: render page 1 of a resume to a `DynamicImage` via pdfium.
//!
//! Only the first page is ever rendered; later pages are never touched.
//! pdfium is not async-safe, so the work runs in `spawn_blocking`.

use crate::config::EvaluatorConfig;
use crate::error::AtsError;
use crate::pipeline::input::UploadedDocument;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rasterise page 1 of `document`.
pub async fn render_first_page(
    document: &UploadedDocument,
    config: &EvaluatorConfig,
) -> Result<DynamicImage, AtsError> {
    let bytes = document.bytes().to_vec();
    let name = document.name().to_string();
    let max_pixels = config.max_rendered_pixels;
    let password = config.password.clone();
    let lib_dir = config.pdfium_lib_path.clone();

    tokio::task::spawn_blocking(move || {
        render_first_page_blocking(&bytes, &name, max_pixels, password.as_deref(), lib_dir)
    })
    .await
    .map_err(|e| AtsError::Internal(format!("Render task panicked: {}", e)))?
}

/// Bind to pdfium: `lib_dir` if given, else the working directory, else the
/// system library.
pub fn bind_pdfium(lib_dir: Option<&Path>) -> Result<Pdfium, AtsError> {
    let bindings = match lib_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| AtsError::PdfiumBinding(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

fn render_first_page_blocking(
    bytes: &[u8],
    name: &str,
    max_pixels: u32,
    password: Option<&str>,
    lib_dir: Option<PathBuf>,
) -> Result<DynamicImage, AtsError> {
    let pdfium = bind_pdfium(lib_dir.as_deref())?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| {
            let err_str = format!("{:?}", e);
            let detail = if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    "wrong password".to_string()
                } else {
                    "document is encrypted; provide --password".to_string()
                }
            } else {
                err_str
            };
            AtsError::DocumentRender {
                name: name.to_string(),
                detail,
            }
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages, rendering page 1", total_pages);

    if total_pages == 0 {
        return Err(AtsError::DocumentRender {
            name: name.to_string(),
            detail: "document has no pages".to_string(),
        });
    }

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let page = pages.get(0).map_err(|e| AtsError::DocumentRender {
        name: name.to_string(),
        detail: format!("page 1: {:?}", e),
    })?;

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| AtsError::DocumentRender {
            name: name.to_string(),
            detail: format!("page 1: {:?}", e),
        })?;

    let image = bitmap.as_image();
    debug!("Rendered page 1 → {}x{} px", image.width(), image.height());

    Ok(image)
}
