use tiny_skia::{Path, PathBuilder};

use super::path_data::{PathDataError, parse_path_data};

/// Icons are authored in a square view box of this many units.
pub const VIEW_BOX: f32 = 24.0;

#[derive(Clone, Debug, PartialEq)]
pub enum IconElement {
    /// SVG path data
    Path(String),
    Circle { cx: f32, cy: f32, r: f32 },
}

/// A stroked outline icon. Colors and stroke widths are decided at raster
/// time, so an icon only carries geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Icon {
    name: String,
    elements: Vec<IconElement>,
}

impl Icon {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: vec![],
        }
    }

    pub fn path(mut self, data: impl Into<String>) -> Self {
        self.elements.push(IconElement::Path(data.into()));
        self
    }

    pub fn circle(mut self, cx: f32, cy: f32, r: f32) -> Self {
        self.elements.push(IconElement::Circle { cx, cy, r });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> &[IconElement] {
        &self.elements
    }

    /// Merges every element into a single path in view-box coordinates.
    pub fn outline(&self) -> Result<Path, PathDataError> {
        let mut builder = PathBuilder::new();

        for element in &self.elements {
            match element {
                IconElement::Path(data) => {
                    let path = parse_path_data(data)?;
                    builder.push_path(&path);
                }
                IconElement::Circle { cx, cy, r } => {
                    if *r > 0.0 {
                        builder.push_circle(*cx, *cy, *r);
                    }
                }
            }
        }

        builder.finish().ok_or(PathDataError::Empty)
    }
}

/// The host-supplied set of doodles. Cells refer to icons by index, so order
/// is significant.
#[derive(Clone, Debug, Default)]
pub struct IconCatalog {
    icons: Vec<Icon>,
}

impl IconCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, icon: Icon) {
        self.icons.push(icon);
    }

    pub fn with(mut self, icon: Icon) -> Self {
        self.push(icon);
        self
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Icon> {
        self.icons.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Icon> {
        self.icons.iter()
    }

    pub fn icons(&self) -> &[Icon] {
        &self.icons
    }
}

impl FromIterator<Icon> for IconCatalog {
    fn from_iter<T: IntoIterator<Item = Icon>>(iter: T) -> Self {
        Self {
            icons: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_merges_elements() {
        let icon = Icon::new("target")
            .circle(12.0, 12.0, 10.0)
            .path("M12 2v4");

        let bounds = icon.outline().unwrap().bounds();
        assert!(bounds.left() <= 2.01);
        assert!(bounds.right() >= 21.99);
        assert!(bounds.top() <= 2.01);
    }

    #[test]
    fn test_bad_path_surfaces_error() {
        let icon = Icon::new("broken").path("M1 1 Q");
        assert!(matches!(
            icon.outline(),
            Err(PathDataError::Syntax(_))
        ));
    }

    #[test]
    fn test_icon_without_geometry_is_empty() {
        assert!(matches!(
            Icon::new("blank").outline(),
            Err(PathDataError::Empty)
        ));
    }

    #[test]
    fn test_catalog_keeps_order() {
        let catalog: IconCatalog =
            ["a", "b", "c"].into_iter().map(Icon::new).collect();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(1).map(Icon::name), Some("b"));
        assert!(IconCatalog::new().is_empty());
    }
}
