use crate::core::geo::LatLng;
use crate::core::state::{Direction, ViewportState};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User-facing map control, one per button in a typical map overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapAction {
    ZoomIn,
    ZoomOut,
    Pan(Direction),
    CenterOn(LatLng),
}

impl MapAction {
    /// Applies the action to `state`, never zooming past `max_zoom`.
    /// Returns whether the state changed, i.e. whether the host should redraw.
    pub fn apply(&self, state: &mut ViewportState, max_zoom: u8) -> bool {
        match *self {
            Self::ZoomIn => state.zoom_in_to(max_zoom),
            Self::ZoomOut => state.zoom_out(),
            Self::Pan(direction) => {
                state.pan(direction);
                true
            }
            Self::CenterOn(location) => {
                let before = (state.center_x, state.center_y);
                state.center_on(&location);
                before != (state.center_x, state.center_y)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown map action '{0}' (expected in, out, up, down, left or right)")]
pub struct ParseActionError(String);

impl FromStr for MapAction {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" | "zoom-in" | "+" => Ok(Self::ZoomIn),
            "out" | "zoom-out" | "-" => Ok(Self::ZoomOut),
            "up" => Ok(Self::Pan(Direction::Up)),
            "down" => Ok(Self::Pan(Direction::Down)),
            "left" => Ok(Self::Pan(Direction::Left)),
            "right" => Ok(Self::Pan(Direction::Right)),
            _ => Err(ParseActionError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        assert_eq!("in".parse::<MapAction>().unwrap(), MapAction::ZoomIn);
        assert_eq!(" Left ".parse::<MapAction>().unwrap(), MapAction::Pan(Direction::Left));
        assert!("sideways".parse::<MapAction>().is_err());
    }

    #[test]
    fn test_apply_reports_changes() {
        let mut state = ViewportState::new(256, 256, 2);
        assert!(MapAction::ZoomIn.apply(&mut state, 3));
        assert!(!MapAction::ZoomIn.apply(&mut state, 3));
        assert_eq!(state.zoom, 3);

        assert!(MapAction::Pan(Direction::Down).apply(&mut state, 3));
        assert_eq!(state.center_y, 1);

        let mut state = ViewportState::new(256, 256, 0);
        assert!(!MapAction::ZoomOut.apply(&mut state, 19));
    }

    #[test]
    fn test_center_on_action() {
        let mut state = ViewportState::new(256, 256, 4);
        let sydney = LatLng::new(-33.87, 151.21);
        assert!(MapAction::CenterOn(sydney).apply(&mut state, 19));
        assert!(!MapAction::CenterOn(sydney).apply(&mut state, 19));
    }
}
