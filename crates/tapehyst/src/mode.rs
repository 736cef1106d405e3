//! Tape mode selection.

use crate::solver::SolverKind;

/// Display names in parameter-index order.
pub const MODE_NAMES: [&str; 6] = ["RK2", "RK4", "NR4", "NR8", "STN", "V1"];

/// Processing mode: one of the classic solvers, or the legacy V1 model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TapeMode {
    Classic(SolverKind),
    /// V1 model: RK4 on a scaled signal with an explicit bias tone.
    Legacy,
}

impl TapeMode {
    /// Mode for a parameter index, `None` if out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(TapeMode::Classic(SolverKind::Rk2)),
            1 => Some(TapeMode::Classic(SolverKind::Rk4)),
            2 => Some(TapeMode::Classic(SolverKind::Nr4)),
            3 => Some(TapeMode::Classic(SolverKind::Nr8)),
            4 => Some(TapeMode::Classic(SolverKind::Stn)),
            5 => Some(TapeMode::Legacy),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            TapeMode::Classic(SolverKind::Rk2) => 0,
            TapeMode::Classic(SolverKind::Rk4) => 1,
            TapeMode::Classic(SolverKind::Nr4) => 2,
            TapeMode::Classic(SolverKind::Nr8) => 3,
            TapeMode::Classic(SolverKind::Stn) => 4,
            TapeMode::Legacy => 5,
        }
    }

    /// Solver that runs the ODE in this mode.
    pub fn solver(self) -> SolverKind {
        match self {
            TapeMode::Classic(kind) => kind,
            TapeMode::Legacy => SolverKind::Rk4,
        }
    }

    #[inline]
    pub fn is_legacy(self) -> bool {
        self == TapeMode::Legacy
    }

    /// Input ceiling for this mode.
    pub fn clip_level(self) -> f64 {
        self.solver().clip_level()
    }

    pub fn name(self) -> &'static str {
        MODE_NAMES[self.index()]
    }
}

impl Default for TapeMode {
    fn default() -> Self {
        TapeMode::Classic(SolverKind::Rk2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for index in 0..MODE_NAMES.len() {
            let mode = TapeMode::from_index(index).unwrap();
            assert_eq!(mode.index(), index);
            assert_eq!(mode.name(), MODE_NAMES[index]);
        }
        assert_eq!(TapeMode::from_index(6), None);
    }

    #[test]
    fn test_legacy_uses_rk4_ceiling() {
        assert_eq!(TapeMode::Legacy.solver(), SolverKind::Rk4);
        assert_eq!(TapeMode::Legacy.clip_level(), 10.0);
        assert!(TapeMode::Legacy.is_legacy());
        assert!(!TapeMode::default().is_legacy());
    }
}
