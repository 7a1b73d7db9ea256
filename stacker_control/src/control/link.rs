//! Coupling between the drive loops.
//!
//! While driving straight the distance loop commands forward speed and the
//! heading-hold loop feeds its correction into the same arcade command.
//! While turning in place the forward channel and the correction are nulled
//! and only the turn loop's output reaches the drive.

/// Arcade drive command.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ArcadeCommand {
    pub forward: f64,
    pub turn: f64,
}

impl ArcadeCommand {
    pub const STOP: Self = Self {
        forward: 0.0,
        turn: 0.0,
    };

    /// Both channels multiplied by `factor`.
    #[inline]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            forward: self.forward * factor,
            turn: self.turn * factor,
        }
    }
}

/// Which coupling is in force.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkMode {
    /// Straight drive: forward from distance, turn from heading correction.
    Linked,
    /// Turn in place: forward and correction nulled.
    #[default]
    Unlinked,
}

/// Mutual-exclusion link between the straight-drive and turn loops.
#[derive(Debug, Clone, Default)]
pub struct MutualExclusionLink {
    mode: LinkMode,
    forward: f64,
    correction: f64,
    turn: f64,
}

impl MutualExclusionLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to straight-drive coupling. All channels are nulled.
    pub fn link(&mut self) {
        self.mode = LinkMode::Linked;
        self.null();
    }

    /// Switch to turn-in-place coupling. All channels are nulled.
    pub fn unlink(&mut self) {
        self.mode = LinkMode::Unlinked;
        self.null();
    }

    #[inline]
    pub fn mode(&self) -> LinkMode {
        self.mode
    }

    /// Zero every channel without changing mode.
    pub fn null(&mut self) {
        self.forward = 0.0;
        self.correction = 0.0;
        self.turn = 0.0;
    }

    /// Forward output of the distance loop. Dropped while unlinked.
    pub fn write_forward(&mut self, value: f64) {
        self.forward = match self.mode {
            LinkMode::Linked => value,
            LinkMode::Unlinked => 0.0,
        };
    }

    /// Heading correction. Dropped while unlinked.
    pub fn write_correction(&mut self, value: f64) {
        self.correction = match self.mode {
            LinkMode::Linked => value,
            LinkMode::Unlinked => 0.0,
        };
    }

    /// Rotate-in-place output. Dropped while linked.
    pub fn write_turn(&mut self, value: f64) {
        self.turn = match self.mode {
            LinkMode::Linked => 0.0,
            LinkMode::Unlinked => value,
        };
    }

    /// Combined arcade command for this tick.
    pub fn command(&self) -> ArcadeCommand {
        match self.mode {
            LinkMode::Linked => ArcadeCommand {
                forward: self.forward,
                turn: self.correction,
            },
            LinkMode::Unlinked => ArcadeCommand {
                forward: 0.0,
                turn: self.turn,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linked_combines_forward_and_correction() {
        let mut link = MutualExclusionLink::new();
        link.link();
        link.write_forward(0.6);
        link.write_correction(-0.05);
        link.write_turn(0.3);
        assert_eq!(
            link.command(),
            ArcadeCommand {
                forward: 0.6,
                turn: -0.05
            }
        );
    }

    #[test]
    fn unlinked_nulls_forward() {
        let mut link = MutualExclusionLink::new();
        link.unlink();
        link.write_forward(0.6);
        link.write_correction(0.2);
        link.write_turn(-0.3);
        assert_eq!(
            link.command(),
            ArcadeCommand {
                forward: 0.0,
                turn: -0.3
            }
        );
    }

    #[test]
    fn switching_mode_nulls_channels() {
        let mut link = MutualExclusionLink::new();
        link.link();
        link.write_forward(0.7);
        link.unlink();
        assert_eq!(link.command(), ArcadeCommand::STOP);
        link.link();
        assert_eq!(link.command(), ArcadeCommand::STOP);
    }

    #[test]
    fn scaled_command() {
        let c = ArcadeCommand {
            forward: 0.8,
            turn: -0.4,
        }
        .scaled(0.5);
        assert_eq!(c.forward, 0.4);
        assert_eq!(c.turn, -0.2);
    }
}
