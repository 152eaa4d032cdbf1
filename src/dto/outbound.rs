use crate::state::TeamId;

/// Tag leading every outbound ranking line.
const ORDER_TAG: &str = "ORDER:";

/// Encode a ranking as a single newline-terminated ASCII line.
///
/// An empty ranking encodes as the bare tag, which the board reads as
/// "clear all indicators".
pub fn order_line(ranking: &[TeamId]) -> String {
    let teams = ranking
        .iter()
        .map(|team| team.get().to_string())
        .collect::<Vec<_>>()
        .join(",");

    format!("{ORDER_TAG}{teams}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(raw: u8) -> TeamId {
        TeamId::new(raw).unwrap()
    }

    #[test]
    fn encodes_empty_ranking_as_bare_tag() {
        assert_eq!(order_line(&[]), "ORDER:\n");
    }

    #[test]
    fn encodes_single_team() {
        assert_eq!(order_line(&[team(3)]), "ORDER:3\n");
    }

    #[test]
    fn encodes_comma_joined_ranking() {
        assert_eq!(order_line(&[team(3), team(1), team(4)]), "ORDER:3,1,4\n");
    }
}
