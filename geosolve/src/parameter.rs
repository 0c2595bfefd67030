use crate::Error;

/// Component of a 2D point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    /// Horizontal (X) component.
    X,
    /// Vertical (Y) component.
    Y,
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Component::X => write!(f, "x"),
            Component::Y => write!(f, "y"),
        }
    }
}

/// A scalar the solver may vary (free) or must leave alone (fixed).
/// The value is always finite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Parameter {
    value: f64,
    fixed: bool,
}

impl Parameter {
    /// A new free parameter.
    pub fn new(value: f64) -> Result<Self, Error> {
        check_finite(value)?;
        Ok(Self {
            value,
            fixed: false,
        })
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Is the solver forbidden from changing this parameter?
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Assign a new value. Works regardless of the fixed flag, since the
    /// flag only restricts the solver, not the caller.
    pub fn set(&mut self, value: f64) -> Result<(), Error> {
        check_finite(value)?;
        self.value = value;
        Ok(())
    }

    /// Mark as fixed or free. Leaves the value untouched.
    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
    }

    /// Write a solver candidate. Callers must have checked it's finite.
    pub(crate) fn assign(&mut self, value: f64) {
        debug_assert!(value.is_finite(), "tried to assign non-finite {value}");
        self.value = value;
    }
}

fn check_finite(value: f64) -> Result<(), Error> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidValue { value })
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.fixed { "fixed" } else { "free" };
        write!(f, "Parameter({}, {state})", self.value)
    }
}
