//! PDFレポート生成（printpdf）
//!
//! レイアウトは `pneumoscan_common::report` で組んだものをそのまま描く。
//! 画像の埋め込みに失敗してもログだけ残して残りを出力する。

use crate::error::{PneumoScanError, Result};
use pneumoscan_common::data_uri;
use pneumoscan_common::report::{
    FontStyle, ImageSlot, ReportData, ReportLayout, HEADER_HEIGHT_MM, HEADER_RGB, PAGE_HEIGHT_MM,
    PAGE_WIDTH_MM, TITLE,
};
use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use printpdf::*;
use std::path::{Path, PathBuf};

/// 画像をこのDPIで読み込んでから目標サイズに拡縮する
const IMAGE_DPI: f32 = 300.0;

/// 描画結果
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub image_embedded: bool,
}

/// 保存したレポート
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub path: PathBuf,
    pub image_embedded: bool,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let add = |font: BuiltinFont| {
            doc.add_builtin_font(font)
                .map_err(|e| PneumoScanError::PdfGeneration(format!("フォント追加エラー: {:?}", e)))
        };
        Ok(Self {
            regular: add(BuiltinFont::Helvetica)?,
            bold: add(BuiltinFont::HelveticaBold)?,
            italic: add(BuiltinFont::HelveticaOblique)?,
        })
    }

    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

/// レポートをPDFバイト列に描画
pub fn render_report(data: &ReportData) -> Result<RenderedReport> {
    let layout = ReportLayout::build(data);

    let (doc, page1, layer1) = PdfDocument::new(
        TITLE,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let layer = doc.get_page(page1).get_layer(layer1);
    let fonts = Fonts::load(&doc)?;

    // ヘッダー帯
    layer.set_fill_color(rgb(HEADER_RGB));
    layer.add_rect(Rect::new(
        Mm(0.0),
        Mm(PAGE_HEIGHT_MM - HEADER_HEIGHT_MM),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
    ));

    for line in &layout.lines {
        let color = if line.inverted { (255, 255, 255) } else { (0, 0, 0) };
        layer.set_fill_color(rgb(color));
        layer.use_text(
            line.text.as_str(),
            line.size_pt,
            Mm(line.x_mm),
            Mm(PAGE_HEIGHT_MM - line.y_mm),
            fonts.get(line.style),
        );
    }

    let image_embedded = match decode_image(&data.image_data) {
        Ok(image) => {
            place_image(&layer, image, &layout.image);
            true
        }
        Err(reason) => {
            tracing::warn!("report image could not be embedded: {}", reason);
            false
        }
    };

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| PneumoScanError::PdfGeneration(format!("PDF保存エラー: {:?}", e)))?;

    Ok(RenderedReport {
        bytes,
        image_embedded,
    })
}

/// レポートを出力先ディレクトリに保存。ファイル名は生成時刻から決まる。
pub fn generate_report(data: &ReportData, output_dir: &Path) -> Result<ReportArtifact> {
    let rendered = render_report(data)?;

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(data.file_name());
    std::fs::write(&path, &rendered.bytes)?;

    Ok(ReportArtifact {
        path,
        image_embedded: rendered.image_embedded,
    })
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn decode_image(image_data: &str) -> std::result::Result<DynamicImage, String> {
    let bytes = data_uri::decode(image_data).ok_or_else(|| "not a base64 data URI".to_string())?;
    let image = image_crate::load_from_memory(&bytes).map_err(|e| e.to_string())?;
    // アルファチャンネルは落とす
    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}

fn place_image(layer: &PdfLayerReference, image: DynamicImage, slot: &ImageSlot) {
    let natural_width_mm = image.width() as f32 / IMAGE_DPI * 25.4;
    let natural_height_mm = image.height() as f32 / IMAGE_DPI * 25.4;

    let transform = ImageTransform {
        translate_x: Some(Mm(slot.x_mm)),
        translate_y: Some(Mm(PAGE_HEIGHT_MM - slot.y_mm - slot.height_mm)),
        scale_x: Some(slot.width_mm / natural_width_mm),
        scale_y: Some(slot.height_mm / natural_height_mm),
        dpi: Some(IMAGE_DPI),
        ..Default::default()
    };

    Image::from_dynamic_image(&image).add_to_layer(layer.clone(), transform);
}
