//! Point selection state machine
//!
//! Clicks cycle through `Empty -> HasSource -> HasBoth -> HasSource -> ...`.
//! The destination can only exist together with a source, which the enum shape
//! enforces.

use super::GeoPoint;

/// Currently selected points
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Selection {
    #[default]
    Empty,
    HasSource {
        source: GeoPoint,
    },
    HasBoth {
        source: GeoPoint,
        destination: GeoPoint,
    },
}

impl Selection {
    /// State after a map click at `point`
    pub fn advance(self, point: GeoPoint) -> Self {
        match self {
            Self::Empty => Self::HasSource { source: point },
            Self::HasSource { source } => Self::HasBoth {
                source,
                destination: point,
            },
            // Restart the cycle with the clicked point as the new source
            Self::HasBoth { .. } => Self::HasSource { source: point },
        }
    }

    /// Apply a map click in place
    pub fn click(&mut self, point: GeoPoint) {
        *self = self.advance(point);
    }

    pub fn reset(&mut self) {
        *self = Self::Empty;
    }

    pub fn source(&self) -> Option<GeoPoint> {
        match *self {
            Self::Empty => None,
            Self::HasSource { source } | Self::HasBoth { source, .. } => Some(source),
        }
    }

    pub fn destination(&self) -> Option<GeoPoint> {
        match *self {
            Self::HasBoth { destination, .. } => Some(destination),
            _ => None,
        }
    }

    /// Source and destination, once both are selected
    pub fn pair(&self) -> Option<(GeoPoint, GeoPoint)> {
        match *self {
            Self::HasBoth {
                source,
                destination,
            } => Some((source, destination)),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::HasBoth { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(n: f64) -> GeoPoint {
        GeoPoint::new(n, n)
    }

    #[test]
    fn test_initial_state_is_empty() {
        let selection = Selection::default();
        assert_eq!(selection, Selection::Empty);
        assert_eq!(selection.source(), None);
        assert_eq!(selection.destination(), None);
        assert!(!selection.is_complete());
    }

    #[test]
    fn test_click_cycle() {
        let mut selection = Selection::default();

        selection.click(p(1.0));
        assert_eq!(selection, Selection::HasSource { source: p(1.0) });

        selection.click(p(2.0));
        assert_eq!(selection.pair(), Some((p(1.0), p(2.0))));
        assert!(selection.is_complete());

        selection.click(p(3.0));
        assert_eq!(selection.source(), Some(p(3.0)));
        assert_eq!(selection.destination(), None);

        selection.click(p(4.0));
        assert_eq!(selection.pair(), Some((p(3.0), p(4.0))));
    }

    #[test]
    fn test_destination_never_without_source() {
        let mut selection = Selection::default();
        for i in 0..10 {
            selection.click(p(i as f64));
            if selection.destination().is_some() {
                assert!(selection.source().is_some());
            }
        }
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut selection = Selection::default();
        for clicks in 0..4 {
            for i in 0..clicks {
                selection.click(p(i as f64));
            }
            selection.reset();
            assert_eq!(selection, Selection::Empty);
        }
    }
}
