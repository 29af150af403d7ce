//! The doodle set: outline icons on a 24x24 grid, drawn with round caps.

use hexglow::prelude::{Icon, IconCatalog};

pub fn catalog() -> IconCatalog {
    IconCatalog::new()
        .with(
            Icon::new("coffee")
                .path("M10 2v2M14 2v2M6 2v2")
                .path(
                    "M16 8a1 1 0 0 1 1 1v8a4 4 0 0 1-4 4H7a4 4 0 0 1-4-4V9\
                     a1 1 0 0 1 1-1h14a4 4 0 1 1 0 8h-1",
                ),
        )
        .with(Icon::new("clock").circle(12.0, 12.0, 10.0).path("M12 6v6l4 2"))
        .with(Icon::new("zap").path(
            "M4 14a1 1 0 0 1-.78-1.63l9.9-10.2a.5.5 0 0 1 .86.46l-1.92 6.02\
             A1 1 0 0 0 13 10h7a1 1 0 0 1 .78 1.63l-9.9 10.2a.5.5 0 0 1-.86-.46\
             l1.92-6.02A1 1 0 0 0 11 14z",
        ))
        .with(Icon::new("code").path("m16 18 6-6-6-6M8 6l-6 6 6 6"))
        .with(
            Icon::new("brain")
                .path(
                    "M12 5a3 3 0 1 0-5.997.125 4 4 0 0 0-2.526 5.77 \
                     4 4 0 0 0 .556 6.588A4 4 0 1 0 12 18Z",
                )
                .path(
                    "M12 5a3 3 0 1 1 5.997.125 4 4 0 0 1 2.526 5.77 \
                     4 4 0 0 1-.556 6.588A4 4 0 1 1 12 18Z",
                )
                .path("M12 5v13"),
        )
        .with(
            Icon::new("rocket")
                .path(
                    "M4.5 16.5c-1.5 1.26-2 5-2 5s3.74-.5 5-2c.71-.84.7-2.13\
                     -.09-2.91a2.18 2.18 0 0 0-2.91-.09z",
                )
                .path(
                    "m12 15-3-3a22 22 0 0 1 2-3.95A12.88 12.88 0 0 1 22 2\
                     c0 2.72-.78 7.5-6 11a22.35 22.35 0 0 1-4 2z",
                )
                .path("M9 12H4s.55-3.03 2-4c1.62-1.08 5 0 5 0")
                .path("M12 15v5s3.03-.55 4-2c1.08-1.62 0-5 0-5"),
        )
        .with(Icon::new("star").path(
            "M12 2l3.09 6.26L22 9.27l-5 4.87 1.18 6.88L12 17.77l-6.18 3.25\
             L7 14.14 2 9.27l6.91-1.01L12 2z",
        ))
        .with(Icon::new("heart").path(
            "M19 14c1.49-1.46 3-3.21 3-5.5A5.5 5.5 0 0 0 16.5 3c-1.76 0-3 .5\
             -4.5 2-1.5-1.5-2.74-2-4.5-2A5.5 5.5 0 0 0 2 8.5c0 2.3 1.5 4.05 3 5.5\
             l7 7Z",
        ))
        .with(
            Icon::new("music")
                .path("M9 18V5l12-2v13")
                .circle(6.0, 18.0, 3.0)
                .circle(18.0, 16.0, 3.0),
        )
        .with(
            Icon::new("camera")
                .path(
                    "M14.5 4h-5L7 7H4a2 2 0 0 0-2 2v9a2 2 0 0 0 2 2h16\
                     a2 2 0 0 0 2-2V9a2 2 0 0 0-2-2h-3l-2.5-3z",
                )
                .circle(12.0, 13.0, 3.0),
        )
        .with(
            Icon::new("globe")
                .circle(12.0, 12.0, 10.0)
                .path("M12 2a14.5 14.5 0 0 0 0 20 14.5 14.5 0 0 0 0-20")
                .path("M2 12h20"),
        )
        .with(
            Icon::new("anchor")
                .path("M12 22V8")
                .path("M5 12H2a10 10 0 0 0 20 0h-3")
                .circle(12.0, 5.0, 3.0),
        )
        .with(
            Icon::new("beer")
                .path("M17 11h1a3 3 0 0 1 0 6h-1M9 12v6M13 12v6")
                .path(
                    "M14 7.5c-1 0-1.44.5-3 .5s-2-.5-3-.5-1.72.5-2.5.5\
                     a2.5 2.5 0 0 1 0-5c.78 0 1.57.5 2.5.5S9.44 2 11 2s2 1.5 3 1.5 \
                     1.72-.5 2.5-.5a2.5 2.5 0 0 1 0 5c-.78 0-1.5-.5-2.5-.5Z",
                )
                .path("M5 8v12a2 2 0 0 0 2 2h8a2 2 0 0 0 2-2V8"),
        )
        .with(
            Icon::new("gamepad")
                .path("M6 12h4M8 10v4M15 13h.01M18 11h.01")
                .path(
                    "M17.32 5H6.68a4 4 0 0 0-3.978 3.59C2.604 9.416 2 14.456 2 16\
                     a3 3 0 0 0 3 3c1 0 1.5-.5 2-1l1.414-1.414A2 2 0 0 1 9.828 16\
                     h4.344a2 2 0 0 1 1.414.586L17 18c.5.5 1 1 2 1a3 3 0 0 0 3-3\
                     c0-1.545-.604-6.584-.685-7.258A4 4 0 0 0 17.32 5z",
                ),
        )
        .with(Icon::new("headphones").path(
            "M3 14h3a2 2 0 0 1 2 2v3a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2v-7\
             a9 9 0 0 1 18 0v7a2 2 0 0 1-2 2h-1a2 2 0 0 1-2-2v-3a2 2 0 0 1 2-2h3",
        ))
        .with(Icon::new("terminal").path("m4 17 6-6-6-6M12 19h8"))
        .with(
            Icon::new("cpu")
                .path(
                    "M6 4h12a2 2 0 0 1 2 2v12a2 2 0 0 1-2 2H6a2 2 0 0 1-2-2V6\
                     a2 2 0 0 1 2-2z",
                )
                .path("M9 9h6v6H9z")
                .path(
                    "M15 2v2M15 20v2M2 15h2M2 9h2M20 15h2M20 9h2M9 2v2M9 20v2",
                ),
        )
        .with(
            Icon::new("database")
                .path("M3 5a9 3 0 1 0 18 0a9 3 0 1 0-18 0")
                .path("M3 5v14a9 3 0 0 0 18 0V5")
                .path("M3 12a9 3 0 0 0 18 0"),
        )
        .with(Icon::new("cloud").path(
            "M17.5 19H9a7 7 0 1 1 6.71-9h1.79a4.5 4.5 0 1 1 0 9Z",
        ))
        .with(
            Icon::new("server")
                .path(
                    "M4 2h16a2 2 0 0 1 2 2v4a2 2 0 0 1-2 2H4a2 2 0 0 1-2-2V4\
                     a2 2 0 0 1 2-2z",
                )
                .path(
                    "M4 14h16a2 2 0 0 1 2 2v4a2 2 0 0 1-2 2H4a2 2 0 0 1-2-2v-4\
                     a2 2 0 0 1 2-2z",
                )
                .path("M6 6h.01M6 18h.01"),
        )
        .with(
            Icon::new("wifi")
                .path("M12 20h.01")
                .path("M2 8.82a15 15 0 0 1 20 0")
                .path("M5 12.859a10 10 0 0 1 14 0")
                .path("M8.5 16.429a5 5 0 0 1 7 0"),
        )
        .with(
            Icon::new("cricket-bat")
                .path("M18.5 4.5 20 6l-6 6-1.5-1.5 6-6Z")
                .path(
                    "M14 12 8 18c-1 1-2 1-3 0l-1-1c-1-1-1-2 0-3l6-6 4 4Z",
                )
                .path("M12.5 10.5 11 12h3M10 8l-4 4")
                .circle(16.0, 18.0, 3.0),
        )
        .with(
            Icon::new("football")
                .circle(12.0, 12.0, 10.0)
                .path("M12 7l3.5 2.5-1 4.5h-5l-1-4.5L12 7Z")
                .path(
                    "M12 7V3M15.5 9.5 19 8M14.5 14l2.5 4M9.5 14 7 18M8.5 9.5 5 8",
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_icon_has_an_outline() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 23);
        for icon in catalog.iter() {
            assert!(icon.outline().is_ok(), "{} failed to parse", icon.name());
        }
    }
}
