use super::config::{DisplayConfig, DisplayToggles, Labels};
use super::state::DisplaySnapshot;

/// Text lines of the info panel, top to bottom. Empty when the display is
/// disabled.
pub fn panel_lines(
    config: &DisplayConfig,
    snapshot: &DisplaySnapshot,
    labels: &Labels,
) -> Vec<String> {
    let mut lines = Vec::new();
    if !config.enabled {
        return lines;
    }

    if config.shows(DisplayToggles::TITLE) {
        lines.push(config.title.clone());
    }

    let latency = snapshot
        .latency
        .display_with(&labels.timed_out, &labels.not_applicable);
    lines.push(format!("{}: {}", labels.latency, latency));
    lines.push(format!("{}: {}", labels.players, snapshot.player_count));

    if config.shows(DisplayToggles::EXPERIENCE) {
        lines.push(format!(
            "{}: {}%",
            labels.experience, snapshot.experience_percent
        ));
    }

    if config.shows(DisplayToggles::DESCRIPTION) && !config.description.is_empty() {
        if config.typing_effect {
            lines.push(snapshot.revealed_text.clone());
        } else {
            lines.push(config.description.clone());
        }
    }

    lines
}
