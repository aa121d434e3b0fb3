/* src/server/injector/rust/src/media.rs */

use crate::asset::PreloadType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaType {
  pub media_type: &'static str,
  pub preload_type: PreloadType,
}

const fn media(media_type: &'static str, preload_type: PreloadType) -> Option<MediaType> {
  Some(MediaType { media_type, preload_type })
}

/// Infer the MIME type and preload destination of a build output from its
/// file extension. Query strings and fragments are ignored.
pub fn infer_media_type(src: &str) -> Option<MediaType> {
  let path = src.split(['?', '#']).next().unwrap_or(src);
  let file_name = path.rsplit('/').next().unwrap_or(path);
  let (_, ext) = file_name.rsplit_once('.')?;

  match ext.to_ascii_lowercase().as_str() {
    // Basics
    "css" | "scss" | "sass" | "less" | "styl" | "stylus" | "pcss" | "postcss" => {
      media("text/css", PreloadType::Style)
    }
    "js" | "mjs" | "cjs" | "jsx" | "ts" | "mts" | "cts" | "tsx" => {
      media("text/javascript", PreloadType::Script)
    }

    // Images
    "png" => media("image/png", PreloadType::Image),
    "jpg" | "jpeg" => media("image/jpeg", PreloadType::Image),
    "gif" => media("image/gif", PreloadType::Image),
    "svg" => media("image/svg+xml", PreloadType::Image),
    "webp" => media("image/webp", PreloadType::Image),
    "avif" => media("image/avif", PreloadType::Image),
    "ico" => media("image/x-icon", PreloadType::Image),

    // Fonts
    "ttf" => media("font/ttf", PreloadType::Font),
    "otf" => media("font/otf", PreloadType::Font),
    "woff" => media("font/woff", PreloadType::Font),
    "woff2" => media("font/woff2", PreloadType::Font),

    // Videos
    "mp4" => media("video/mp4", PreloadType::Video),
    "webm" => media("video/webm", PreloadType::Video),
    "ogv" => media("video/ogg", PreloadType::Video),

    // Audio
    "mp3" => media("audio/mpeg", PreloadType::Audio),
    "ogg" | "oga" => media("audio/ogg", PreloadType::Audio),
    "wav" => media("audio/wav", PreloadType::Audio),
    "flac" => media("audio/flac", PreloadType::Audio),
    "aac" => media("audio/aac", PreloadType::Audio),
    "m4a" => media("audio/mp4", PreloadType::Audio),

    _ => None,
  }
}
