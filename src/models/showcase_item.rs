use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp" | "tiff" | "tif" => Some(Self::Image),
            "webm" | "mp4" | "mkv" | "mov" => Some(Self::Video),
            _ => None,
        }
    }
}

/// One entry of the showcase sequence.
///
/// Items are immutable and ordered; the position in the catalog determines
/// both title stacking order and animation timing offset. The `image` path is
/// also the lookup key for the item's background layer, even when the layer
/// plays `video` instead.
#[derive(Debug, Clone)]
pub struct ShowcaseItem {
    pub name: String,
    pub image: PathBuf,
    pub video: Option<PathBuf>,
    pub blurb: String,
    pub live_url: String,
    pub repo_url: String,
}

impl ShowcaseItem {
    pub fn new(name: &str, image: &str, blurb: &str, live_url: &str, repo_url: &str) -> Self {
        Self {
            name: name.to_owned(),
            image: PathBuf::from(image),
            video: None,
            blurb: blurb.to_owned(),
            live_url: live_url.to_owned(),
            repo_url: repo_url.to_owned(),
        }
    }

    pub fn with_video(mut self, video: &str) -> Self {
        self.video = Some(PathBuf::from(video));
        self
    }

    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    /// Kind of the media this item's background layer shows.
    pub fn layer_kind(&self) -> MediaKind {
        if self.has_video() {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_from_extension() {
        assert_eq!(MediaKind::from_extension("JPEG"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_extension("webm"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_extension("txt"), None);
    }

    #[test]
    fn test_layer_kind_follows_video_presence() {
        let item = ShowcaseItem::new("a", "a.jpeg", "", "https://a", "https://b");
        assert_eq!(item.layer_kind(), MediaKind::Image);
        let item = item.with_video("a.mp4");
        assert_eq!(item.layer_kind(), MediaKind::Video);
        assert!(item.has_video());
    }
}
