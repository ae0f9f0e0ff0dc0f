use crate::{
    error::Result,
    models::GeneratedImage,
};
use std::fs;
use std::path::{Path, PathBuf};

pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

/// `<prefix>-<unix millis>.<ext>`
pub fn download_file_name(prefix: &str, mime_type: &str, timestamp_millis: i64) -> String {
    format!(
        "{}-{}.{}",
        prefix,
        timestamp_millis,
        extension_for_mime(mime_type)
    )
}

pub fn save_image(image: &GeneratedImage, dir: &Path, prefix: &str) -> Result<PathBuf> {
    let bytes = image.decode_bytes()?;
    fs::create_dir_all(dir)?;

    let filename = download_file_name(
        prefix,
        &image.mime_type,
        chrono::Utc::now().timestamp_millis(),
    );
    let path = dir.join(filename);
    fs::write(&path, bytes)?;

    log::info!("💾 Image saved to: {}", path.display());
    Ok(path)
}

pub fn save_data_url(data_url: &str, dir: &Path, prefix: &str) -> Result<PathBuf> {
    let image = GeneratedImage::from_data_url(data_url)?;
    save_image(&image, dir, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudioError;

    #[test]
    fn test_file_name() {
        assert_eq!(download_file_name("i59", "image/png", 1700000000000), "i59-1700000000000.png");
        assert_eq!(download_file_name("edit", "image/jpeg", 7), "edit-7.jpg");
        assert_eq!(extension_for_mime("image/unknown"), "png");
    }

    #[test]
    fn test_save_data_url_writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("renders");
        let path = save_data_url("data:image/webp;base64,QUJD", &out, "i59").unwrap();

        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("i59-"));
        assert!(name.ends_with(".webp"));
        assert_eq!(fs::read(&path).unwrap(), b"ABC");
    }

    #[test]
    fn test_save_rejects_bad_payload() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_data_url("data:image/png;base64,@@@", dir.path(), "i59").unwrap_err();
        assert!(matches!(err, StudioError::InvalidDataUrl(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
