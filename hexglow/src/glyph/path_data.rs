//! SVG path data (the `d` attribute) to [`tiny_skia::Path`].
//!
//! `svgtypes` does the parsing and hands back absolute segments with
//! shorthand commands expanded and arcs already converted to cubics.

use std::error::Error;
use std::fmt;

use svgtypes::{SimplePathSegment, SimplifyingPathParser};
use tiny_skia::{Path, PathBuilder};

#[derive(Debug, PartialEq)]
pub enum PathDataError {
    /// The data does not follow the path grammar
    Syntax(svgtypes::Error),
    /// The data described no drawable geometry
    Empty,
}

impl fmt::Display for PathDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(err) => write!(f, "Invalid path data: {}", err),
            Self::Empty => write!(f, "Path data contains no geometry"),
        }
    }
}

impl Error for PathDataError {}

impl From<svgtypes::Error> for PathDataError {
    fn from(err: svgtypes::Error) -> Self {
        Self::Syntax(err)
    }
}

pub fn parse_path_data(data: &str) -> Result<Path, PathDataError> {
    let mut builder = PathBuilder::new();

    for segment in SimplifyingPathParser::from(data) {
        match segment? {
            SimplePathSegment::MoveTo { x, y } => {
                builder.move_to(x as f32, y as f32);
            }
            SimplePathSegment::LineTo { x, y } => {
                builder.line_to(x as f32, y as f32);
            }
            SimplePathSegment::Quadratic { x1, y1, x, y } => {
                builder.quad_to(x1 as f32, y1 as f32, x as f32, y as f32);
            }
            SimplePathSegment::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                builder.cubic_to(
                    x1 as f32, y1 as f32, x2 as f32, y2 as f32, x as f32,
                    y as f32,
                );
            }
            SimplePathSegment::ClosePath => builder.close(),
        }
    }

    builder.finish().ok_or(PathDataError::Empty)
}
