//! Evaluation outcomes.

use std::fmt;
use std::str::FromStr;

/// Result of evaluating a behaviour node for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    Failure,
    /// The node started work that spans more than one tick.
    Running,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Failure => "failure",
            Status::Running => "running",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Status::Success),
            "failure" => Ok(Status::Failure),
            "running" => Ok(Status::Running),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_variants() {
        assert_eq!("success".parse(), Ok(Status::Success));
        assert_eq!("failure".parse(), Ok(Status::Failure));
        assert_eq!("running".parse(), Ok(Status::Running));
        assert!("done".parse::<Status>().is_err());
    }
}
