//! A sketch: named primitives, the constraints between them, and the solve loop.

use std::cell::OnceCell;

use indexmap::{IndexMap, IndexSet};

use crate::{
    Config, Constraint, Error, SolveOutcome,
    datatypes::{Endpoint, Line, LineRef, Point, PointArena, PointRef, Primitive, PrimitiveRef},
    id::{ParamId, PointId},
    parameter::Parameter,
    solver::{Minimizer, NelderMead},
    warnings::{Warning, WarningContent, lint},
};

/// A constraint, plus the names it was declared with.
#[derive(Clone, Debug)]
struct ConstraintEntry {
    constraint: Constraint,
    names: Vec<String>,
}

/// Named geometry and the constraints between it.
///
/// Primitives are registered by name; lines own or share [`Point`]s stored in
/// the problem's [`PointArena`]. Solving varies every free parameter to
/// minimize the sum of all constraint errors, then writes the result back.
#[derive(Debug, Default)]
pub struct Problem {
    points: PointArena,
    primitives: IndexMap<String, Primitive>,
    constraints: Vec<ConstraintEntry>,
    /// Parameters fixed by [`Problem::constrain_position`].
    fixed_by_position: IndexSet<ParamId>,
    /// Bumped whenever `free` is invalidated.
    generation: u64,
    free: OnceCell<Vec<ParamId>>,
}

impl Problem {
    /// An empty problem.
    pub fn new() -> Self {
        Self::default()
    }

    fn invalidate(&mut self) {
        self.free.take();
        self.generation += 1;
    }

    /// How many times the free-parameter cache has been invalidated.
    /// Changes whenever a primitive is added or a parameter's fixedness might have changed.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Register a standalone point.
    pub fn add_point(&mut self, name: &str, x: f64, y: f64) -> Result<PointId, Error> {
        self.check_name_free(name)?;
        let point = Point::new(name.to_owned(), x, y)?;
        let id = self.points.insert(point)?;
        self.primitives.insert(name.to_owned(), Primitive::Point(id));
        self.invalidate();
        Ok(id)
    }

    /// Register a line. Each endpoint is either new coordinates, which create
    /// a point named `<name>.start` or `<name>.end`, or an existing point to share.
    /// On error, nothing is registered.
    pub fn add_line(
        &mut self,
        name: &str,
        start: impl Into<Endpoint>,
        end: impl Into<Endpoint>,
    ) -> Result<(), Error> {
        let start = start.into();
        let end = end.into();
        self.check_name_free(name)?;

        // Check everything before touching the arena.
        let start_name = format!("{name}.start");
        let end_name = format!("{name}.end");
        for (endpoint, implicit_name) in [(start, &start_name), (end, &end_name)] {
            // Reserved even for shared endpoints, which are reachable under this name too.
            self.check_name_free(implicit_name)?;
            match endpoint {
                Endpoint::At(x, y) => {
                    Parameter::new(x)?;
                    Parameter::new(y)?;
                }
                Endpoint::Shared(id) => {
                    if !self.points.contains(id) {
                        return Err(Error::UnknownPoint(id));
                    }
                }
            }
        }

        let start = self.endpoint(start, start_name)?;
        let end = self.endpoint(end, end_name)?;
        self.primitives
            .insert(name.to_owned(), Primitive::Line(Line::new(start, end)));
        self.invalidate();
        Ok(())
    }

    fn endpoint(&mut self, endpoint: Endpoint, name: String) -> Result<PointId, Error> {
        match endpoint {
            Endpoint::At(x, y) => self.points.insert(Point::new(name, x, y)?),
            Endpoint::Shared(id) => Ok(id),
        }
    }

    fn check_name_free(&self, name: &str) -> Result<(), Error> {
        if self.get(name).is_ok() {
            return Err(Error::DuplicateName(name.to_owned()));
        }
        Ok(())
    }

    /// Look up a primitive by name.
    /// Line endpoints can be found too, as `<line>.start` and `<line>.end`,
    /// even when the endpoint is shared with something else.
    pub fn get(&self, name: &str) -> Result<PrimitiveRef<'_>, Error> {
        if let Some((name, primitive)) = self.primitives.get_key_value(name) {
            return Ok(PrimitiveRef::new(name, *primitive, &self.points));
        }
        self.points
            .id_of(name)
            .or_else(|| self.line_endpoint(name))
            .map(|id| PrimitiveRef::Point(PointRef::new(id, &self.points)))
            .ok_or_else(|| Error::NotFound(name.to_owned()))
    }

    /// Resolve `<line>.start` or `<line>.end`.
    fn line_endpoint(&self, name: &str) -> Option<PointId> {
        let (line, which) = name.rsplit_once('.')?;
        let Some(Primitive::Line(line)) = self.primitives.get(line) else {
            return None;
        };
        match which {
            "start" => Some(line.start()),
            "end" => Some(line.end()),
            _ => None,
        }
    }

    /// Look up a line by name.
    pub fn line(&self, name: &str) -> Result<LineRef<'_>, Error> {
        self.get(name)?
            .as_line()
            .ok_or_else(|| Error::NotALine(name.to_owned()))
    }

    /// Look up a point by name, whether registered directly or as a line endpoint.
    pub fn point(&self, name: &str) -> Result<PointRef<'_>, Error> {
        self.get(name)?
            .as_point()
            .ok_or_else(|| Error::NotAPoint(name.to_owned()))
    }

    /// Every registered primitive, in registration order.
    /// Implicit line endpoints are only visible through their lines.
    pub fn primitives(&self) -> impl Iterator<Item = PrimitiveRef<'_>> {
        self.primitives
            .iter()
            .map(|(name, primitive)| PrimitiveRef::new(name, *primitive, &self.points))
    }

    /// Every point, registered or implicit.
    pub fn points(&self) -> &PointArena {
        &self.points
    }

    /// Every constraint, in the order they were added.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().map(|entry| &entry.constraint)
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    fn push_constraint(&mut self, constraint: Constraint, names: &[&str]) {
        self.constraints.push(ConstraintEntry {
            constraint,
            names: names.iter().map(|name| (*name).to_owned()).collect(),
        });
    }

    /// Constrain the named line to have this length.
    pub fn constrain_line_length(&mut self, name: &str, length: f64) -> Result<(), Error> {
        let line = self.line(name)?.line();
        let constraint = Constraint::line_length(line, length)?;
        self.push_constraint(constraint, &[name]);
        Ok(())
    }

    /// Constrain the signed angle, in degrees, from line `a`'s direction to line `b`'s.
    /// Angles are normalized into (-180, 180].
    pub fn constrain_angle_between_lines(
        &mut self,
        a: &str,
        b: &str,
        degrees: f64,
    ) -> Result<(), Error> {
        let line_a = self.line(a)?.line();
        let line_b = self.line(b)?.line();
        let constraint = Constraint::line_angle(line_a, line_b, degrees)?;
        self.push_constraint(constraint, &[a, b]);
        Ok(())
    }

    /// Constrain two points to be this far apart.
    pub fn constrain_point_distance(&mut self, a: &str, b: &str, distance: f64) -> Result<(), Error> {
        let point_a = self.point(a)?.id();
        let point_b = self.point(b)?.id();
        let constraint = Constraint::point_distance(point_a, point_b, distance)?;
        self.push_constraint(constraint, &[a, b]);
        Ok(())
    }

    /// All parameter handles of the named primitive, deduplicated.
    fn params_of(&self, name: &str) -> Result<IndexSet<ParamId>, Error> {
        Ok(self
            .get(name)?
            .points()
            .iter()
            .flat_map(|point| ParamId::both(point.id()))
            .collect())
    }

    /// Stop the solver from moving the named primitive. Idempotent.
    /// Kept separately from each parameter's own fixed flag, so
    /// [`Problem::is_fixed`] sees it but [`crate::PointRef::is_fixed`] doesn't.
    pub fn constrain_position(&mut self, name: &str) -> Result<(), Error> {
        let params = self.params_of(name)?;
        self.fixed_by_position.extend(params);
        self.invalidate();
        Ok(())
    }

    /// Undo [`Problem::constrain_position`]. Parameters fixed through their
    /// own flag stay fixed.
    pub fn release_position(&mut self, name: &str) -> Result<(), Error> {
        let params = self.params_of(name)?;
        for param in &params {
            self.fixed_by_position.shift_remove(param);
        }
        self.invalidate();
        Ok(())
    }

    /// Mark every parameter of the named primitive fixed or free.
    /// Positions fixed by [`Problem::constrain_position`] stay fixed until released.
    pub fn set_fixed(&mut self, name: &str, fixed: bool) -> Result<(), Error> {
        let params = self.params_of(name)?;
        for param in params {
            self.param_mut_checked(param)?.set_fixed(fixed);
        }
        self.invalidate();
        Ok(())
    }

    /// Is the named primitive entirely fixed?
    pub fn is_fixed(&self, name: &str) -> Result<bool, Error> {
        Ok(self
            .params_of(name)?
            .iter()
            .all(|param| self.is_param_fixed(*param)))
    }

    /// Look up a parameter.
    pub fn parameter(&self, param: ParamId) -> Result<&Parameter, Error> {
        self.points
            .param(param)
            .ok_or(Error::UnknownPoint(param.point))
    }

    /// Edit a parameter directly, e.g. to change its value or fixedness.
    pub fn parameter_mut(&mut self, param: ParamId) -> Result<&mut Parameter, Error> {
        if !self.points.contains(param.point) {
            return Err(Error::UnknownPoint(param.point));
        }
        // The caller might change the fixed flag.
        self.invalidate();
        self.param_mut_checked(param)
    }

    /// Move the named point to new coordinates, whether or not it's fixed.
    pub fn move_point(&mut self, name: &str, x: f64, y: f64) -> Result<(), Error> {
        let id = self.point(name)?.id();
        // Check both before writing either.
        Parameter::new(x)?;
        Parameter::new(y)?;
        self.param_mut_checked(ParamId::x(id))?.set(x)?;
        self.param_mut_checked(ParamId::y(id))?.set(y)?;
        self.invalidate();
        Ok(())
    }

    fn param_mut_checked(&mut self, param: ParamId) -> Result<&mut Parameter, Error> {
        self.points
            .param_mut(param)
            .ok_or(Error::UnknownPoint(param.point))
    }

    fn is_param_fixed(&self, param: ParamId) -> bool {
        self.fixed_by_position.contains(&param)
            || self.points.param(param).is_some_and(Parameter::is_fixed)
    }

    fn value_of(&self, param: ParamId) -> f64 {
        self.points[param.point].param(param.component).value()
    }

    /// Every parameter the solver may vary, in a stable order: registration
    /// order of primitives, then of their points, X before Y.
    /// Shared points appear once.
    pub fn free_parameters(&self) -> &[ParamId] {
        self.free.get_or_init(|| {
            tracing::trace!(generation = self.generation, "Recomputing free parameters");
            let all: IndexSet<ParamId> = self
                .primitives
                .values()
                .flat_map(|primitive| primitive.points().iter().copied())
                .flat_map(ParamId::both)
                .collect();
            all.into_iter()
                .filter(|param| !self.is_param_fixed(*param))
                .collect()
        })
    }

    /// Check every primitive can be solved.
    /// Reports every invalid primitive, not just the first.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid: Vec<_> = self
            .primitives()
            .filter_map(|primitive| primitive.validate().err())
            .collect();
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidGeometry(invalid))
        }
    }

    /// Sum of every constraint's error, at the current parameter values.
    pub fn error(&self) -> f64 {
        total_error(&self.constraints, &self.points)
    }

    /// Solve with the default Nelder-Mead minimizer.
    pub fn solve(&mut self, config: Config) -> Result<SolveOutcome, Error> {
        self.solve_with(&NelderMead, config)
    }

    /// Solve with any minimizer.
    ///
    /// Returns `Ok` whenever the minimizer returns, even if it didn't converge;
    /// check [`SolveOutcome::success`]. The best values found are written back either way.
    /// If the minimizer fails with an error, every parameter is restored to
    /// its value from before the call.
    pub fn solve_with(
        &mut self,
        minimizer: &dyn Minimizer,
        config: Config,
    ) -> Result<SolveOutcome, Error> {
        self.invalidate();
        self.validate()?;

        let mut warnings = lint(self.constraints());
        for warning in &warnings {
            tracing::warn!(%warning, "Lint");
        }

        let free = self.free_parameters().to_vec();
        tracing::debug!(
            free_parameters = free.len(),
            constraints = self.constraints.len(),
            "Starting solve"
        );

        if free.is_empty() {
            warnings.push(Warning {
                about_constraint: None,
                content: WarningContent::NoFreeParameters,
            });
            return Ok(SolveOutcome {
                parameters: free,
                final_values: Vec::new(),
                success: true,
                iterations: 0,
                evaluations: 0,
                error: self.error(),
                warnings,
            });
        }

        let x_pre: Vec<f64> = free.iter().map(|param| self.value_of(*param)).collect();
        let points = &mut self.points;
        let constraints = &self.constraints;
        let mut objective = |candidate: &[f64]| -> f64 {
            if candidate.iter().any(|value| !value.is_finite()) {
                return f64::INFINITY;
            }
            write_values(points, &free, candidate);
            total_error(constraints, points)
        };
        let result = minimizer.minimize(&mut objective, x_pre.clone(), &config);

        let minimum = match result {
            Ok(minimum)
                if minimum.x.len() == free.len() && minimum.x.iter().all(|v| v.is_finite()) =>
            {
                minimum
            }
            Ok(minimum) => {
                self.roll_back(&free, &x_pre);
                return Err(Error::SolverFailure(
                    format!(
                        "minimizer returned {} values for {} parameters, or a non-finite value",
                        minimum.x.len(),
                        free.len()
                    )
                    .into(),
                ));
            }
            Err(e) => {
                self.roll_back(&free, &x_pre);
                return Err(match e {
                    Error::SolverFailure(_) => e,
                    other => Error::SolverFailure(Box::new(other)),
                });
            }
        };

        write_values(&mut self.points, &free, &minimum.x);
        let error = self.error();
        tracing::debug!(
            iterations = minimum.iterations,
            evaluations = minimum.evaluations,
            error,
            success = minimum.success,
            "Minimizer finished"
        );
        if !minimum.success {
            tracing::warn!(
                iterations = minimum.iterations,
                error,
                "Minimizer did not converge, keeping its best values"
            );
            warnings.push(Warning {
                about_constraint: None,
                content: WarningContent::DidNotConverge {
                    iterations: minimum.iterations,
                    error,
                },
            });
        }

        Ok(SolveOutcome {
            parameters: free,
            final_values: minimum.x,
            success: minimum.success,
            iterations: minimum.iterations,
            evaluations: minimum.evaluations,
            error,
            warnings,
        })
    }

    fn roll_back(&mut self, free: &[ParamId], x_pre: &[f64]) {
        tracing::warn!(
            parameters = free.len(),
            "Minimizer failed, restoring pre-solve values"
        );
        write_values(&mut self.points, free, x_pre);
    }
}

/// Write candidate values into the free parameters, in order.
fn write_values(points: &mut PointArena, free: &[ParamId], values: &[f64]) {
    for (param, value) in free.iter().zip(values) {
        if let Some(parameter) = points.param_mut(*param) {
            parameter.assign(*value);
        }
    }
}

fn total_error(constraints: &[ConstraintEntry], points: &PointArena) -> f64 {
    constraints
        .iter()
        .map(|entry| entry.constraint.error(points))
        .sum()
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Problem with {} free parameter(s) and {} constraint(s)",
            self.free_parameters().len(),
            self.constraints.len()
        )?;
        for entry in &self.constraints {
            writeln!(
                f,
                "  {}({}): value {}, target {}, error {}",
                entry.constraint.constraint_kind(),
                entry.names.join(", "),
                entry.constraint.value(&self.points),
                entry.constraint.target(),
                entry.constraint.error(&self.points),
            )?;
        }
        write!(f, "Total error: {}", self.error())
    }
}
