use crate::{Endpoint, Error, Problem};

use super::{EndpointSpec, Instruction, Sketch};

impl Sketch {
    /// Build a [`Problem`] from this sketch, running each instruction in order
    /// through the normal construction API.
    pub fn to_problem(&self) -> Result<Problem, Error> {
        let mut problem = Problem::new();
        for instruction in &self.instructions {
            instruction.apply(&mut problem)?;
        }
        Ok(problem)
    }
}

impl Instruction {
    fn apply(&self, problem: &mut Problem) -> Result<(), Error> {
        match self {
            Instruction::DeclarePoint(point) => {
                problem.add_point(point.label.as_str(), point.x, point.y)?;
            }
            Instruction::DeclareLine(line) => {
                let start = line.start.resolve(problem)?;
                let end = line.end.resolve(problem)?;
                problem.add_line(line.label.as_str(), start, end)?;
            }
            Instruction::Fixed(label) => problem.constrain_position(label.as_str())?,
            Instruction::Length(length) => {
                problem.constrain_line_length(length.line.as_str(), length.length)?;
            }
            Instruction::Angle(angle) => problem.constrain_angle_between_lines(
                angle.line0.as_str(),
                angle.line1.as_str(),
                angle.degrees,
            )?,
            Instruction::Distance(distance) => problem.constrain_point_distance(
                distance.point0.as_str(),
                distance.point1.as_str(),
                distance.distance,
            )?,
        }
        Ok(())
    }
}

impl EndpointSpec {
    fn resolve(&self, problem: &Problem) -> Result<Endpoint, Error> {
        match self {
            EndpointSpec::At(x, y) => Ok(Endpoint::At(*x, *y)),
            EndpointSpec::Named(label) => Ok(Endpoint::Shared(problem.point(label.as_str())?.id())),
        }
    }
}
