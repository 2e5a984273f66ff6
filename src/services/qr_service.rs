// src/services/qr_service.rs

use image::{GenericImage, ImageBuffer, ImageOutputFormat, Luma};
use qrcode::{EcLevel, QrCode};

use crate::common::error::AppError;

/// Pixels por módulo do QR Code.
pub const MODULE_PX: u32 = 10;

/// Borda branca, em módulos.
pub const BORDER_MODULES: u32 = 5;

/// Gera o PNG (preto no branco, correção M, versão automática) que codifica `data`.
pub fn render_png(data: &str) -> Result<Vec<u8>, AppError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| AppError::QrCodeError(e.to_string()))?;

    // Renderizamos sem a zona de silêncio padrão (4 módulos) e aplicamos a nossa borda
    let symbol = code
        .render::<Luma<u8>>()
        .quiet_zone(false)
        .module_dimensions(MODULE_PX, MODULE_PX)
        .build();

    let border = BORDER_MODULES * MODULE_PX;
    let side = symbol.width() + 2 * border;
    let mut canvas = ImageBuffer::from_pixel(side, side, Luma([255u8]));
    canvas
        .copy_from(&symbol, border, border)
        .map_err(|e| AppError::QrCodeError(e.to_string()))?;

    let mut png = Vec::new();
    image::DynamicImage::ImageLuma8(canvas)
        .write_to(&mut png, ImageOutputFormat::Png)
        .map_err(|e| AppError::QrCodeError(e.to_string()))?;

    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_has_ten_pixel_modules_and_five_module_border() {
        let url = "https://cartoes.example/acme/pessoa/ana-silva/";
        let modules = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::M)
            .unwrap()
            .width() as u32;

        let png = render_png(url).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_luma8();

        assert_eq!(img.width(), (modules + 2 * BORDER_MODULES) * MODULE_PX);
        assert_eq!(img.width(), img.height());

        // Borda branca, e o canto do padrão de posição é preto
        assert_eq!(img.get_pixel(0, 0).0[0], 255);
        assert_eq!(img.get_pixel(BORDER_MODULES * MODULE_PX - 1, BORDER_MODULES * MODULE_PX - 1).0[0], 255);
        assert_eq!(img.get_pixel(BORDER_MODULES * MODULE_PX, BORDER_MODULES * MODULE_PX).0[0], 0);
    }

    #[test]
    fn version_grows_with_content() {
        let short = render_png("https://a.example/x/pet/rex/").unwrap();
        let long = render_png(&format!("https://a.example/{}/pet/rex/", "x".repeat(200))).unwrap();

        let short = image::load_from_memory(&short).unwrap();
        let long = image::load_from_memory(&long).unwrap();
        assert!(long.to_luma8().width() > short.to_luma8().width());
    }
}
