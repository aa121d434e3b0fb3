/* src/server/injector/rust/src/asset.rs */

use serde::{Deserialize, Serialize};
use ssrkit_composer::escape_html;

use crate::errors::InjectError;
use crate::media::infer_media_type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
  Script,
  Style,
  Preload,
}

/// Value of the `as` attribute of a preload link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreloadType {
  Script,
  Style,
  Font,
  Image,
  Video,
  Audio,
  Fetch,
}

impl PreloadType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Script => "script",
      Self::Style => "style",
      Self::Font => "font",
      Self::Image => "image",
      Self::Video => "video",
      Self::Audio => "audio",
      Self::Fetch => "fetch",
    }
  }
}

/// One build output relevant to the page being rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAsset {
  pub src: String,
  pub asset_type: AssetType,
  #[serde(default)]
  pub media_type: Option<String>,
  #[serde(default)]
  pub preload_type: Option<PreloadType>,
}

impl PageAsset {
  /// Build an asset, inferring media and preload type from the extension.
  pub fn from_src(src: impl Into<String>, asset_type: AssetType) -> Self {
    let src = src.into();
    let media = infer_media_type(&src);
    Self {
      media_type: media.map(|m| m.media_type.to_string()),
      preload_type: media.map(|m| m.preload_type),
      src,
      asset_type,
    }
  }
}

/// Render the HTML tag that loads or preloads an asset.
pub fn infer_asset_tag(asset: &PageAsset) -> Result<String, InjectError> {
  let src = escape_html(&asset.src);
  let type_attr = |media_type: &Option<String>| {
    media_type.as_deref().map(|m| format!(r#" type="{}""#, escape_html(m))).unwrap_or_default()
  };

  match asset.asset_type {
    AssetType::Script => {
      if asset.media_type.as_deref() != Some("text/javascript") {
        return Err(InjectError::internal(format!(
          "script asset {} has media type {:?}, expected text/javascript",
          asset.src, asset.media_type
        )));
      }
      Ok(format!(r#"<script type="module" src="{src}"></script>"#))
    }
    AssetType::Style => Ok(format!(r#"<link rel="stylesheet" type="text/css" href="{src}">"#)),
    AssetType::Preload => match asset.preload_type {
      // Fonts are always fetched in CORS mode
      Some(PreloadType::Font) => Ok(format!(
        r#"<link rel="preload" as="font" crossorigin{} href="{src}">"#,
        type_attr(&asset.media_type)
      )),
      Some(PreloadType::Script) => Ok(format!(
        r#"<link rel="modulepreload" as="script"{} href="{src}">"#,
        type_attr(&asset.media_type)
      )),
      preload_type => {
        let as_attr = preload_type.map(|p| format!(r#" as="{}""#, p.as_str())).unwrap_or_default();
        Ok(format!(r#"<link rel="preload" href="{src}"{as_attr}{}>"#, type_attr(&asset.media_type)))
      }
    },
  }
}
