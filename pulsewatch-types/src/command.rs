//! Velocity command payload relayed through the command gate.

/// A planar velocity command (the payload the safety gate forwards or zeroes).
///
/// Mirrors the usual six-axis twist layout: linear velocity in m/s and
/// angular velocity in rad/s, each over x/y/z.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "minicbor", derive(minicbor::Encode, minicbor::Decode))]
pub struct VelocityCommand {
    /// Linear velocity components (x, y, z) in m/s.
    #[cfg_attr(feature = "minicbor", n(0))]
    pub linear: [f64; 3],

    /// Angular velocity components (x, y, z) in rad/s.
    #[cfg_attr(feature = "minicbor", n(1))]
    pub angular: [f64; 3],
}

impl VelocityCommand {
    /// Create a command from linear and angular components.
    pub const fn new(linear: [f64; 3], angular: [f64; 3]) -> Self {
        Self { linear, angular }
    }

    /// The all-zero stop command.
    pub const fn zero() -> Self {
        Self {
            linear: [0.0; 3],
            angular: [0.0; 3],
        }
    }

    /// Check whether this command requests no motion at all.
    pub fn is_zero(&self) -> bool {
        self.linear.iter().chain(self.angular.iter()).all(|v| *v == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_command_is_zero() {
        assert!(VelocityCommand::zero().is_zero());
        assert_eq!(VelocityCommand::default(), VelocityCommand::zero());
    }

    #[test]
    fn nonzero_command_is_not_zero() {
        let cmd = VelocityCommand::new([0.5, 0.0, 0.0], [0.0, 0.0, 0.1]);
        assert!(!cmd.is_zero());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let cmd = VelocityCommand::new([1.0, 0.0, 0.0], [0.0, 0.0, -0.25]);
        let json = serde_json::to_string(&cmd).unwrap();
        let parsed: VelocityCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, parsed);
    }
}
