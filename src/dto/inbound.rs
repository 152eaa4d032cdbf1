use crate::state::TeamId;

/// Line announcing a new round.
const RESET_LINE: &str = "ROUND:RESET";
/// Prefix announcing a buzz; the remainder is the team number.
const BUZZ_PREFIX: &str = "BUZZ:";

/// Commands accepted from the microcontroller link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCommand {
    /// Start a new round.
    Reset,
    /// The given team pressed its button.
    Buzz(TeamId),
}

impl LinkCommand {
    /// Parse one raw line from the link.
    ///
    /// Returns `None` for anything that is not a well-formed command: empty
    /// lines, unknown tags, non-integer or out-of-range team numbers. The
    /// link is noisy by nature, so unparseable input is a non-event rather
    /// than an error.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();

        if line == RESET_LINE {
            return Some(Self::Reset);
        }

        let team = line.strip_prefix(BUZZ_PREFIX)?;
        let team = team.trim().parse::<u8>().ok()?;
        TeamId::new(team).map(Self::Buzz)
    }
}
