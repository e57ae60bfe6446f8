use std::path::{Path, PathBuf};

use super::ShowcaseItem;

/// The ordered showcase content plus the directory its asset paths resolve
/// against. Effectively embedded configuration data, not a runtime format.
#[derive(Debug, Clone)]
pub struct Catalog {
    assets_root: PathBuf,
    items: Vec<ShowcaseItem>,
}

impl Catalog {
    /// The built-in showcase sequence.
    pub fn builtin(assets_root: PathBuf) -> Self {
        let items = vec![
            ShowcaseItem::new(
                "Tidewater Storefront",
                "img-1.jpeg",
                "A responsive storefront landing page with a clean product hero, \
                 staggered reveal animations and a checkout flow mock.",
                "https://example.com/tidewater",
                "https://github.com/example/tidewater-storefront",
            )
            .with_video("clip-1.mp4"),
            ShowcaseItem::new(
                "Meridian Type Study",
                "img-2.jpeg",
                "An interactive typography study: variable fonts respond to \
                 pointer velocity with weight and slant shifts.",
                "https://example.com/meridian",
                "https://github.com/example/meridian-type",
            )
            .with_video("clip-2.mp4"),
            ShowcaseItem::new(
                "Orrery Dashboard",
                "img-3.jpeg",
                "A data dashboard rendered as an orbital system, with live \
                 series spiraling around a central metric.",
                "https://example.com/orrery",
                "https://github.com/example/orrery-dashboard",
            )
            .with_video("clip-3.mp4"),
            ShowcaseItem::new(
                "Driftline Gallery",
                "img-4.jpeg",
                "A horizontal-drift photo gallery where frames ease along a \
                 shoreline curve as the viewport pans.",
                "https://example.com/driftline",
                "https://github.com/example/driftline-gallery",
            )
            .with_video("clip-4.mp4"),
        ];

        Self { assets_root, items }
    }

    #[cfg(test)]
    pub fn from_items(assets_root: PathBuf, items: Vec<ShowcaseItem>) -> Self {
        Self { assets_root, items }
    }

    pub fn items(&self) -> &[ShowcaseItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn assets_root(&self) -> &Path {
        &self.assets_root
    }

    /// Resolve a catalog-relative asset path against the assets root.
    pub fn resolve(&self, asset: &Path) -> PathBuf {
        self.assets_root.join(asset)
    }

    /// Image sources deduplicated by path, preserving first-occurrence order.
    /// One background layer is created per entry returned here.
    pub fn unique_image_sources(&self) -> Vec<PathBuf> {
        let mut seen = std::collections::HashSet::new();
        self.items
            .iter()
            .filter(|item| seen.insert(item.image.clone()))
            .map(|item| item.image.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, image: &str) -> ShowcaseItem {
        ShowcaseItem::new(name, image, "", "https://a", "https://b")
    }

    #[test]
    fn test_unique_sources_preserve_order() {
        let catalog = Catalog::from_items(
            PathBuf::from("/assets"),
            vec![
                item("a", "one.jpeg"),
                item("b", "two.jpeg"),
                item("c", "one.jpeg"),
                item("d", "three.jpeg"),
            ],
        );

        let sources = catalog.unique_image_sources();
        assert_eq!(
            sources,
            vec![
                PathBuf::from("one.jpeg"),
                PathBuf::from("two.jpeg"),
                PathBuf::from("three.jpeg"),
            ]
        );
    }

    #[test]
    fn test_resolve_joins_assets_root() {
        let catalog = Catalog::from_items(PathBuf::from("/media/assets"), vec![]);
        assert_eq!(
            catalog.resolve(Path::new("img-1.jpeg")),
            PathBuf::from("/media/assets/img-1.jpeg")
        );
    }

    #[test]
    fn test_builtin_is_ordered_and_nonempty() {
        let catalog = Catalog::builtin(PathBuf::from("assets"));
        assert!(!catalog.is_empty());
        assert_eq!(catalog.unique_image_sources().len(), catalog.len());
        assert!(catalog.items().iter().all(|i| i.has_video()));
    }
}
