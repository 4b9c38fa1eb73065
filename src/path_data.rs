//! Path data (`d` attribute) to absolute segments.
//!
//! The grammar splits the attribute into command letters with their numbers;
//! this module runs the SVG path state machine over them: relative
//! coordinates, implicit repetition, smooth-curve reflections and sub-path
//! closing. Output stays in the element's own user space.

use glam::{DVec2, dvec2};
use pest::Parser;
use pest::iterators::Pair;

use crate::element::parse_number;
use crate::errors::{ParseError, Syntax};
use crate::log::warn;
use crate::types::Point;
use crate::{Rule, SvgParser};

/// An absolute path segment in user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawSegment {
    Line {
        start: Point,
        end: Point,
    },
    Quadratic {
        start: Point,
        control: Point,
        end: Point,
    },
    Cubic {
        start: Point,
        control1: Point,
        control2: Point,
        end: Point,
    },
    Arc {
        start: Point,
        end: Point,
        radii: DVec2,
        /// x-axis rotation in degrees
        rotation: f64,
        large_arc: bool,
        sweep: bool,
    },
}

/// Parse a `d` attribute.
///
/// Syntax errors fail the whole attribute. Unknown commands and commands
/// with leftover numbers are reported and dropped; the path continues.
pub fn parse_path_data(d: &str) -> Result<Vec<RawSegment>, ParseError> {
    let pairs =
        SvgParser::parse(Rule::path_data, d).map_err(|e| ParseError::syntax(Syntax::Path, d, e))?;

    let mut pen = Pen::default();
    for pair in pairs.flatten() {
        match pair.as_rule() {
            Rule::arc_command => pen.arc_command(pair)?,
            Rule::plain_command => pen.plain_command(pair)?,
            _ => {}
        }
    }
    Ok(pen.segments)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum LastControl {
    #[default]
    None,
    Cubic(Point),
    Quadratic(Point),
}

#[derive(Debug, Default)]
struct Pen {
    current: Point,
    subpath_start: Point,
    last_control: LastControl,
    segments: Vec<RawSegment>,
}

impl Pen {
    fn resolve(&self, relative: bool, p: Point) -> Point {
        if relative { self.current + p } else { p }
    }

    fn plain_command(&mut self, pair: Pair<Rule>) -> Result<(), ParseError> {
        let mut letter = ' ';
        let mut args = Vec::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::command_letter => letter = inner.as_str().chars().next().unwrap_or(' '),
                Rule::path_arguments => {
                    for number in inner.into_inner() {
                        args.push(parse_number(number.as_str(), "d")?);
                    }
                }
                _ => {}
            }
        }

        let relative = letter.is_ascii_lowercase();
        let arity = match letter.to_ascii_uppercase() {
            'M' | 'L' | 'T' => 2,
            'H' | 'V' => 1,
            'C' => 6,
            'S' | 'Q' => 4,
            'Z' => 0,
            _ => {
                warn!(command = %letter, "unsupported path segment, dropped");
                return Ok(());
            }
        };

        if arity == 0 {
            if !args.is_empty() {
                warn!(command = %letter, arguments = args.len(), "close path takes no arguments, ignoring them");
            }
            self.close();
            return Ok(());
        }

        let groups = args.chunks_exact(arity);
        if !groups.remainder().is_empty() || args.is_empty() {
            warn!(
                command = %letter,
                arguments = args.len(),
                "path command arguments do not fill whole groups, dropping the rest"
            );
        }
        for (index, group) in groups.enumerate() {
            self.apply(letter.to_ascii_uppercase(), relative, index, group);
        }
        Ok(())
    }

    fn arc_command(&mut self, pair: Pair<Rule>) -> Result<(), ParseError> {
        let mut relative = false;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::arc_letter => relative = inner.as_str() == "a",
                Rule::arc_arguments => {
                    let mut numbers = Vec::with_capacity(5);
                    let mut flags = Vec::with_capacity(2);
                    for token in inner.into_inner() {
                        match token.as_rule() {
                            Rule::flag => flags.push(token.as_str() == "1"),
                            _ => numbers.push(parse_number(token.as_str(), "d")?),
                        }
                    }
                    if let ([rx, ry, rotation, x, y], [large_arc, sweep]) =
                        (numbers.as_slice(), flags.as_slice())
                    {
                        let end = self.resolve(relative, dvec2(*x, *y));
                        self.arc(dvec2(*rx, *ry), *rotation, *large_arc, *sweep, end);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn apply(&mut self, command: char, relative: bool, index: usize, args: &[f64]) {
        match (command, args) {
            ('M', &[x, y]) => {
                let p = self.resolve(relative, dvec2(x, y));
                if index == 0 {
                    self.current = p;
                    self.subpath_start = p;
                    self.last_control = LastControl::None;
                } else {
                    // pairs after the first move-to are implicit line-tos
                    self.line_to(p);
                }
            }
            ('L', &[x, y]) => {
                let p = self.resolve(relative, dvec2(x, y));
                self.line_to(p);
            }
            ('H', &[x]) => {
                let x = if relative { self.current.x + x } else { x };
                self.line_to(dvec2(x, self.current.y));
            }
            ('V', &[y]) => {
                let y = if relative { self.current.y + y } else { y };
                self.line_to(dvec2(self.current.x, y));
            }
            ('C', &[x1, y1, x2, y2, x, y]) => {
                let control1 = self.resolve(relative, dvec2(x1, y1));
                let control2 = self.resolve(relative, dvec2(x2, y2));
                let end = self.resolve(relative, dvec2(x, y));
                self.cubic_to(control1, control2, end);
            }
            ('S', &[x2, y2, x, y]) => {
                let control1 = match self.last_control {
                    LastControl::Cubic(c) => 2.0 * self.current - c,
                    _ => self.current,
                };
                let control2 = self.resolve(relative, dvec2(x2, y2));
                let end = self.resolve(relative, dvec2(x, y));
                self.cubic_to(control1, control2, end);
            }
            ('Q', &[x1, y1, x, y]) => {
                let control = self.resolve(relative, dvec2(x1, y1));
                let end = self.resolve(relative, dvec2(x, y));
                self.quadratic_to(control, end);
            }
            ('T', &[x, y]) => {
                let control = match self.last_control {
                    LastControl::Quadratic(c) => 2.0 * self.current - c,
                    _ => self.current,
                };
                let end = self.resolve(relative, dvec2(x, y));
                self.quadratic_to(control, end);
            }
            _ => {}
        }
    }

    fn line_to(&mut self, end: Point) {
        self.segments.push(RawSegment::Line {
            start: self.current,
            end,
        });
        self.current = end;
        self.last_control = LastControl::None;
    }

    fn cubic_to(&mut self, control1: Point, control2: Point, end: Point) {
        self.segments.push(RawSegment::Cubic {
            start: self.current,
            control1,
            control2,
            end,
        });
        self.current = end;
        self.last_control = LastControl::Cubic(control2);
    }

    fn quadratic_to(&mut self, control: Point, end: Point) {
        self.segments.push(RawSegment::Quadratic {
            start: self.current,
            control,
            end,
        });
        self.current = end;
        self.last_control = LastControl::Quadratic(control);
    }

    fn arc(&mut self, radii: DVec2, rotation: f64, large_arc: bool, sweep: bool, end: Point) {
        let start = self.current;
        if start == end {
            // an arc between identical points draws nothing
            self.last_control = LastControl::None;
            return;
        }
        if radii.x == 0.0 || radii.y == 0.0 {
            self.line_to(end);
            return;
        }
        self.segments.push(RawSegment::Arc {
            start,
            end,
            radii: radii.abs(),
            rotation,
            large_arc,
            sweep,
        });
        self.current = end;
        self.last_control = LastControl::None;
    }

    fn close(&mut self) {
        if self.current != self.subpath_start {
            self.line_to(self.subpath_start);
        }
        self.current = self.subpath_start;
        self.last_control = LastControl::None;
    }
}
