use std::io::ErrorKind;
use std::path::Path;
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tokio::fs;
use crate::inspection::utils::bounding_box::BoundingBox;
use crate::inspection::utils::count_map::normalize_label;
use crate::inspection::utils::detection_class;
use crate::utils::config::Config;
use crate::utils::logging::*;

const WORKING_FOLDERS: [&str; 3] = ["SavedModel", "SavedFile", "Result"];
//Session folders are emptied on terminate; SavedModel survives restarts.
const SESSION_FOLDERS: [&str; 2] = ["SavedFile", "Result"];

pub struct FileManager;

impl FileManager {
    pub async fn initialize() {
        logging_information!("File Manager", "Initializing.");
        for &folder_name in &WORKING_FOLDERS {
            match fs::create_dir(folder_name).await {
                Ok(_) => logging_information!("File Manager", format!("Created {folder_name} folder.")),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {},
                Err(err) => logging_critical!("File Manager", format!("Cannot create {folder_name} folder."), format!("Err: {err}")),
            }
        }
        logging_information!("File Manager", "Initialization completed.");
    }

    pub async fn cleanup() {
        logging_information!("File Manager", "Cleaning up.");
        for &folder_name in &SESSION_FOLDERS {
            if let Err(err) = fs::remove_dir_all(folder_name).await {
                logging_error!("File Manager", format!("Cannot delete {folder_name} folder."), format!("Err: {err}"));
            }
        }
        logging_information!("File Manager", "Cleanup completed.");
    }

    ///Draws every detection onto a copy of the captured image and saves it.
    pub async fn annotate_image(image_path: &Path, detections: &[BoundingBox], output_path: &Path) -> Result<(), String> {
        let config = Config::now().await;
        let font_data = fs::read(&config.font_path).await
            .map_err(|err| format!("Cannot read font {path}.\nReason: {err}", path = config.font_path))?;
        let font = FontVec::try_from_vec(font_data)
            .map_err(|err| format!("Invalid font file {path}.\nReason: {err}", path = config.font_path))?;
        let mut image = image::open(image_path)
            .map_err(|err| format!("Cannot read image {path}.\nReason: {err}", path = image_path.display()))?
            .to_rgb8();
        for bounding_box in detections {
            Self::draw_bounding_box(&mut image, bounding_box, &config, &font);
        }
        image.save(output_path)
            .map_err(|err| format!("Cannot save annotated image {path}.\nReason: {err}", path = output_path.display()))?;
        Ok(())
    }

    fn draw_bounding_box(image: &mut RgbImage, bounding_box: &BoundingBox, config: &Config, font: &FontVec) {
        let class_color = detection_class::display_color(&normalize_label(&bounding_box.name));
        let border_color = Rgb(class_color.unwrap_or(config.border_color));
        let text_color = Rgb(config.text_color);
        let base_rectangle = Rect::at(bounding_box.xmin as i32, bounding_box.ymin as i32)
            .of_size(bounding_box.width().max(1), bounding_box.height().max(1));
        for i in 0..config.border_width {
            let offset_rectangle = Rect::at(base_rectangle.left() - i as i32, base_rectangle.top() - i as i32)
                .of_size(base_rectangle.width() + 2 * i, base_rectangle.height() + 2 * i);
            draw_hollow_rect_mut(image, offset_rectangle, border_color);
        }
        let scale = PxScale::from(config.font_size);
        let text = format!("{name}: {confidence:.2}", name = bounding_box.name, confidence = bounding_box.confidence);
        let position_x = bounding_box.xmin as i32;
        let position_y = (bounding_box.ymax + config.border_width + 10) as i32;
        draw_text_mut(image, text_color, position_x, position_y, scale, font, &text);
    }
}
