use winnow::{
    Result as WResult,
    ascii::{space0, space1},
    combinator::{alt, delimited, opt, preceded, separated_pair},
    prelude::*,
    token::take_while,
};

use super::{
    Label,
    instruction::{
        Angle, DeclareLine, DeclarePoint, Distance, EndpointSpec, Instruction, Length,
    },
};
use crate::TextualError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Preamble,
    Geometry,
    Constraints,
}

/// Parse a whole sketch, one line at a time.
pub(super) fn parse_sketch(s: &str) -> Result<Vec<Instruction>, TextualError> {
    let mut section = Section::Preamble;
    let mut instructions = Vec::new();
    for (i, raw) in s.lines().enumerate() {
        let line_number = i + 1;
        let text = strip_comment(raw).trim();
        if text.is_empty() {
            continue;
        }
        match section {
            Section::Preamble => {
                if geometry_header.parse(text).is_err() {
                    return Err(TextualError::MissingHeader { header: "geometry" });
                }
                section = Section::Geometry;
            }
            Section::Geometry => {
                if constraints_header.parse(text).is_ok() {
                    section = Section::Constraints;
                    continue;
                }
                let instruction = geometry_instruction
                    .parse(text)
                    .map_err(|e| parse_error(line_number, text, "geometry", e.offset()))?;
                instructions.push(instruction);
            }
            Section::Constraints => {
                let instruction = constraint_instruction
                    .parse(text)
                    .map_err(|e| parse_error(line_number, text, "a constraint", e.offset()))?;
                instructions.push(instruction);
            }
        }
    }
    match section {
        Section::Preamble => Err(TextualError::MissingHeader { header: "geometry" }),
        Section::Geometry => Err(TextualError::MissingHeader {
            header: "constraints",
        }),
        Section::Constraints => Ok(instructions),
    }
}

fn parse_error(line: usize, text: &str, expected: &str, offset: usize) -> TextualError {
    TextualError::Parse {
        line,
        message: format!(
            "could not parse `{text}` as {expected} (column {})",
            offset + 1
        ),
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(i) => &line[..i],
        None => line,
    }
}

fn geometry_header(i: &mut &str) -> WResult<()> {
    ('#', ws, "geometry").void().parse_next(i)
}

fn constraints_header(i: &mut &str) -> WResult<()> {
    ('#', ws, "constraints").void().parse_next(i)
}

fn geometry_instruction(i: &mut &str) -> WResult<Instruction> {
    alt((
        DeclarePoint::parse.map(Instruction::DeclarePoint),
        DeclareLine::parse.map(Instruction::DeclareLine),
    ))
    .parse_next(i)
}

fn constraint_instruction(i: &mut &str) -> WResult<Instruction> {
    alt((
        preceded("fixed", one_arg).map(Instruction::Fixed),
        Length::parse.map(Instruction::Length),
        Angle::parse.map(Instruction::Angle),
        Distance::parse.map(Instruction::Distance),
    ))
    .parse_next(i)
}

impl DeclarePoint {
    // point p (0, 0)
    fn parse(i: &mut &str) -> WResult<Self> {
        ("point", space1, Label::parse, ws, coords)
            .map(|(_, _, label, _, (x, y))| Self { label, x, y })
            .parse_next(i)
    }
}

impl DeclareLine {
    // line b a.end (30, 31)
    fn parse(i: &mut &str) -> WResult<Self> {
        let _ = "line".parse_next(i)?;
        space1.parse_next(i)?;
        let label = Label::parse(i)?;
        space1.parse_next(i)?;
        let start = EndpointSpec::parse(i)?;
        space1.parse_next(i)?;
        let end = EndpointSpec::parse(i)?;
        Ok(Self { label, start, end })
    }
}

impl EndpointSpec {
    fn parse(i: &mut &str) -> WResult<Self> {
        alt((
            coords.map(|(x, y)| Self::At(x, y)),
            Label::parse_point_ref.map(Self::Named),
        ))
        .parse_next(i)
    }
}

impl Length {
    // length(b) = 30
    fn parse(i: &mut &str) -> WResult<Self> {
        (preceded("length", one_arg), equals_number)
            .map(|(line, length)| Self { line, length })
            .parse_next(i)
    }
}

impl Angle {
    // angle(a, b) = -90
    fn parse(i: &mut &str) -> WResult<Self> {
        (preceded("angle", two_args), equals_number)
            .map(|((line0, line1), degrees)| Self {
                line0,
                line1,
                degrees,
            })
            .parse_next(i)
    }
}

impl Distance {
    // distance(p, b.end) = 12
    fn parse(i: &mut &str) -> WResult<Self> {
        (preceded("distance", two_args), equals_number)
            .map(|((point0, point1), distance)| Self {
                point0,
                point1,
                distance,
            })
            .parse_next(i)
    }
}

impl Label {
    /// A plain name, as used when declaring something.
    fn parse(i: &mut &str) -> WResult<Label> {
        take_while(1.., |c: char| c.is_alphanumeric() || c == '_')
            .map(|s: &str| Label(s.to_owned()))
            .parse_next(i)
    }

    /// A name which may also refer to a line's implicit endpoint, e.g. `a.end`.
    fn parse_point_ref(i: &mut &str) -> WResult<Label> {
        (Label::parse, opt(alt((".start", ".end"))))
            .take()
            .map(|s: &str| Label(s.to_owned()))
            .parse_next(i)
    }
}

fn one_arg(i: &mut &str) -> WResult<Label> {
    delimited((ws, '(', ws), Label::parse_point_ref, (ws, ')')).parse_next(i)
}

fn two_args(i: &mut &str) -> WResult<(Label, Label)> {
    delimited(
        (ws, '(', ws),
        separated_pair(
            Label::parse_point_ref,
            (ws, ',', ws),
            Label::parse_point_ref,
        ),
        (ws, ')'),
    )
    .parse_next(i)
}

fn equals_number(i: &mut &str) -> WResult<f64> {
    preceded((ws, '=', ws), parse_number).parse_next(i)
}

fn coords(i: &mut &str) -> WResult<(f64, f64)> {
    delimited(
        ('(', ws),
        separated_pair(parse_number, (ws, ',', ws), parse_number),
        (ws, ')'),
    )
    .parse_next(i)
}

fn parse_number(i: &mut &str) -> WResult<f64> {
    winnow::ascii::float.parse_next(i)
}

fn ws(i: &mut &str) -> WResult<()> {
    space0.void().parse_next(i)
}
