use super::Geometry;
use crate::coords::CoordinateSystem;
use crate::element::SvgElement;
use crate::emit::EntitySink;
use crate::errors::ParseError;
use crate::log::debug;
use crate::path_data::parse_path_data;
use crate::segments::{FlattenOptions, PathSegment};
use crate::types::ScaleFactors;

/// A `<path>` as a sequence of drawing-space segments
#[derive(Debug, Clone, PartialEq)]
pub struct PathShape {
    pub segments: Vec<PathSegment>,
}

impl PathShape {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn from_element(element: &SvgElement, cs: &CoordinateSystem) -> Result<Self, ParseError> {
        let d = element.attribute("d").ok_or_else(|| ParseError::MissingAttribute {
            element: element.tag.clone(),
            attribute: "d",
        })?;
        let raw = parse_path_data(d)?;
        let transform = element.transform()?;
        debug!(segments = raw.len(), "parsed path data");
        Ok(Self::new(
            raw.into_iter()
                .map(|segment| PathSegment::from_raw(segment, &transform, cs))
                .collect(),
        ))
    }
}

impl Geometry for PathShape {
    fn name(&self) -> &'static str {
        "path"
    }

    fn scale(&mut self, factors: ScaleFactors) {
        for segment in &mut self.segments {
            segment.scale(factors);
        }
    }

    fn emit(&self, sink: &mut dyn EntitySink, options: &FlattenOptions) {
        for segment in &self.segments {
            segment.emit(sink, options);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Entity;
    use crate::segments::ArcSegment;
    use crate::types::Point;
    use glam::dvec2;

    const D: &str = "M100 100 L200 100 Q250 50, 300 100 C350 150, 450 50, 500 100 A50 50 0 0 1 600 100";

    fn path(transform: Option<&str>) -> PathShape {
        let mut el = SvgElement::new("path").with_attr("d", D);
        if let Some(t) = transform {
            el = el.with_attr("transform", t);
        }
        PathShape::from_element(&el, &CoordinateSystem::new(1000.0)).unwrap()
    }

    fn assert_near(p: Point, x: f64, y: f64) {
        assert!((p.x - x).abs() < 1e-4 && (p.y - y).abs() < 1e-4, "expected ({x}, {y}), got {p}");
    }

    fn arc(shape: &PathShape) -> ArcSegment {
        match shape.segments[3] {
            PathSegment::Arc(arc) => arc,
            other => panic!("expected an arc, got {other:?}"),
        }
    }

    #[test]
    fn untransformed_segments() {
        let p = path(None);
        assert_eq!(
            p.segments,
            vec![
                PathSegment::Line {
                    start: dvec2(100.0, 900.0),
                    end: dvec2(200.0, 900.0)
                },
                PathSegment::Quadratic {
                    start: dvec2(200.0, 900.0),
                    control: dvec2(250.0, 950.0),
                    end: dvec2(300.0, 900.0)
                },
                PathSegment::Cubic {
                    start: dvec2(300.0, 900.0),
                    control1: dvec2(350.0, 850.0),
                    control2: dvec2(450.0, 950.0),
                    end: dvec2(500.0, 900.0)
                },
                PathSegment::Arc(ArcSegment {
                    start: dvec2(500.0, 900.0),
                    end: dvec2(600.0, 900.0),
                    radii: dvec2(50.0, 50.0),
                    rotation: 0.0,
                    large_arc: false,
                    sweep: true,
                }),
            ]
        );
    }

    #[test]
    fn rescale() {
        let mut p = path(None);
        p.scale(ScaleFactors::uniform(0.5).unwrap());
        assert_eq!(
            p.segments[1],
            PathSegment::Quadratic {
                start: dvec2(100.0, 450.0),
                control: dvec2(125.0, 475.0),
                end: dvec2(150.0, 450.0)
            }
        );
        let a = arc(&p);
        assert_eq!((a.start, a.end, a.radii), (dvec2(250.0, 450.0), dvec2(300.0, 450.0), dvec2(25.0, 25.0)));
    }

    #[test]
    fn translated_path() {
        let p = path(Some("translate(-10, 90)"));
        assert_eq!(
            p.segments[2],
            PathSegment::Cubic {
                start: dvec2(290.0, 810.0),
                control1: dvec2(340.0, 760.0),
                control2: dvec2(440.0, 860.0),
                end: dvec2(490.0, 810.0)
            }
        );
        let a = arc(&p);
        assert_near(a.start, 490.0, 810.0);
        assert_near(a.end, 590.0, 810.0);
        assert_near(a.radii, 50.0, 50.0);
        assert!(a.sweep);
    }

    #[test]
    fn rotated_path() {
        let p = path(Some("rotate(19)"));
        let PathSegment::Line { start, end } = p.segments[0] else {
            panic!("expected a line");
        };
        assert_near(start, 61.9950, 1000.0 - 127.1087);
        assert_near(end, 156.5469, 1000.0 - 159.6655);

        let PathSegment::Cubic { control1, control2, .. } = p.segments[2] else {
            panic!("expected a cubic");
        };
        assert_near(control1, 282.0963, 1000.0 - 255.7766);
        assert_near(control2, 409.2050, 1000.0 - 193.7816);

        let a = arc(&p);
        assert_near(a.end, 534.7543, 1000.0 - 289.8928);
        assert_near(a.radii, 50.0, 50.0);

        let p = path(Some("rotate(38, 375, 175)"));
        let PathSegment::Quadratic { control, .. } = p.segments[1] else {
            panic!("expected a quadratic");
        };
        assert_near(control, 353.4563, 1000.0 + 0.4590);
        assert_near(arc(&p).end, 598.4770, 1000.0 - 254.4230);
    }

    #[test]
    fn skewed_arc_radii() {
        let a = arc(&path(Some("skewX(24)")));
        assert_near(a.start, 544.5229, 900.0);
        assert_near(a.end, 644.5229, 900.0);
        assert_near(a.radii, 62.3547, 40.0932);
    }

    #[test]
    fn emitted_entities() {
        let mut sink: Vec<Entity> = Vec::new();
        path(None).emit(&mut sink, &FlattenOptions::default());
        let names: Vec<_> = sink.iter().map(Entity::name).collect();
        assert_eq!(names, ["LINE", "LWPOLYLINE", "LWPOLYLINE", "ARC"]);
    }

    #[test]
    fn missing_d_is_an_error() {
        assert!(matches!(
            PathShape::from_element(&SvgElement::new("path"), &CoordinateSystem::new(10.0)),
            Err(ParseError::MissingAttribute { attribute: "d", .. })
        ));
    }
}
