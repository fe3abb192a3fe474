use smallvec::SmallVec;
use tracing::trace;

use crate::core::coords::PixelPositions;
use crate::render::RenderedGeometryProvider;

/// Per-point pixel positions recovered from SVG path data.
///
/// `M`/`L` contribute every coordinate pair; `C` contributes the end point of
/// each six-number cubic segment. Other commands are skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgPathGeometry {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathCommand {
    MoveOrLine,
    Cubic,
    Other,
}

impl PathCommand {
    fn from_char(letter: char) -> Self {
        match letter {
            'M' | 'L' => Self::MoveOrLine,
            'C' => Self::Cubic,
            _ => Self::Other,
        }
    }
}

impl SvgPathGeometry {
    #[must_use]
    pub fn parse(path_data: &str) -> Self {
        let mut geometry = Self::default();
        let mut command = None;
        let mut numbers: SmallVec<[f64; 6]> = SmallVec::new();
        let mut rest = path_data;

        while let Some(next) = rest.chars().next() {
            if next.is_ascii_alphabetic() && next != 'e' && next != 'E' {
                geometry.flush(command, &numbers);
                numbers.clear();
                command = Some(PathCommand::from_char(next));
                rest = &rest[next.len_utf8()..];
                continue;
            }
            if let Some((value, consumed)) = scan_number(rest) {
                numbers.push(value);
                rest = &rest[consumed..];
                continue;
            }
            rest = &rest[next.len_utf8()..];
        }
        geometry.flush(command, &numbers);

        trace!(point_count = geometry.xs.len(), "parsed svg path geometry");
        geometry
    }

    fn flush(&mut self, command: Option<PathCommand>, numbers: &[f64]) {
        match command {
            Some(PathCommand::MoveOrLine) => {
                for pair in numbers.chunks_exact(2) {
                    self.push(pair[0], pair[1]);
                }
            }
            Some(PathCommand::Cubic) => {
                for segment in numbers.chunks_exact(6) {
                    self.push(segment[4], segment[5]);
                }
            }
            Some(PathCommand::Other) | None => {}
        }
    }

    fn push(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.xs.push(x);
            self.ys.push(y);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    #[must_use]
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    #[must_use]
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }
}

impl RenderedGeometryProvider for SvgPathGeometry {
    fn rendered_positions(&self) -> Option<PixelPositions> {
        if self.is_empty() {
            return None;
        }
        Some(PixelPositions {
            xs: self.xs.clone(),
            ys: self.ys.clone(),
        })
    }
}

/// Scans one decimal number at the start of `input`.
///
/// Returns the value and the number of bytes consumed. A second `.` starts a
/// new number, so `1.5.5` reads as `1.5` then `.5`.
fn scan_number(input: &str) -> Option<(f64, usize)> {
    let bytes = input.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end += 1;
    }
    let mut saw_digit = false;
    let mut saw_dot = false;
    while let Some(&byte) = bytes.get(end) {
        match byte {
            b'0'..=b'9' => saw_digit = true,
            b'.' if !saw_dot => saw_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !saw_digit {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'-' | b'+')) {
            exponent_end += 1;
        }
        let digits_start = exponent_end;
        while matches!(bytes.get(exponent_end), Some(b'0'..=b'9')) {
            exponent_end += 1;
        }
        if exponent_end > digits_start {
            end = exponent_end;
        }
    }
    input[..end].parse::<f64>().ok().map(|value| (value, end))
}
