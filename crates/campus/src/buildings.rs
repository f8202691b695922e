use foundation::math::LatLng;
use serde::{Deserialize, Serialize};

use crate::surface::{MarkerSpec, PanelAction, PanelContent};

/// Inclusive floor range; `start > end` means the building has no viewable floors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorRange {
    pub start: i32,
    pub end: i32,
}

impl FloorRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn floors(&self) -> std::ops::RangeInclusive<i32> {
        self.start..=self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// A campus building with a permanent marker and a per-floor info panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingDescriptor {
    /// Prefix of the building's floor model files.
    pub code: String,
    pub title: String,
    pub localized_name: String,
    pub icon_url: String,
    pub position: LatLng,
    pub floor_range: FloorRange,
}

impl BuildingDescriptor {
    pub fn marker_spec(&self) -> MarkerSpec {
        MarkerSpec {
            position: self.position,
            title: self.title.clone(),
            icon_url: Some(self.icon_url.clone()),
        }
    }

    /// One button per floor, then the route button.
    pub fn panel_actions(&self) -> Vec<PanelAction> {
        let mut actions: Vec<PanelAction> = self
            .floor_range
            .floors()
            .map(|floor| PanelAction::ViewFloor {
                building: self.code.clone(),
                floor,
            })
            .collect();
        actions.push(PanelAction::PlanRoute);
        actions
    }

    pub fn panel_content(&self, photo_url: &str) -> PanelContent {
        PanelContent {
            title: self.title.clone(),
            subtitle: Some(self.localized_name.clone()),
            photo_url: photo_url.to_string(),
            lines: Vec::new(),
            actions: self.panel_actions(),
        }
    }
}

pub fn default_buildings() -> Vec<BuildingDescriptor> {
    vec![
        BuildingDescriptor {
            code: "GCB".to_string(),
            title: "General Classroom Building".to_string(),
            localized_name: "綜合院館".to_string(),
            icon_url: "images/building.png".to_string(),
            position: LatLng::new(24.9873, 121.5754),
            floor_range: FloorRange::new(1, 5),
        },
        BuildingDescriptor {
            code: "LIB".to_string(),
            title: "Library".to_string(),
            localized_name: "圖書館".to_string(),
            icon_url: "images/library.png".to_string(),
            position: LatLng::new(24.9869, 121.5762),
            floor_range: FloorRange::new(1, 3),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::{BuildingDescriptor, FloorRange, default_buildings};
    use crate::surface::PanelAction;
    use foundation::math::LatLng;
    use pretty_assertions::assert_eq;

    fn building(start: i32, end: i32) -> BuildingDescriptor {
        BuildingDescriptor {
            code: "ENG".to_string(),
            title: "Engineering".to_string(),
            localized_name: "工程館".to_string(),
            icon_url: "eng.png".to_string(),
            position: LatLng::new(24.98, 121.57),
            floor_range: FloorRange::new(start, end),
        }
    }

    #[test]
    fn one_action_per_floor_plus_route() {
        let actions = building(2, 4).panel_actions();
        assert_eq!(
            actions,
            vec![
                PanelAction::ViewFloor {
                    building: "ENG".to_string(),
                    floor: 2
                },
                PanelAction::ViewFloor {
                    building: "ENG".to_string(),
                    floor: 3
                },
                PanelAction::ViewFloor {
                    building: "ENG".to_string(),
                    floor: 4
                },
                PanelAction::PlanRoute,
            ]
        );
    }

    #[test]
    fn empty_range_leaves_only_route() {
        let b = building(3, 1);
        assert!(b.floor_range.is_empty());
        assert_eq!(b.panel_actions(), vec![PanelAction::PlanRoute]);
    }

    #[test]
    fn marker_uses_building_icon() {
        let spec = building(1, 1).marker_spec();
        assert_eq!(spec.icon_url.as_deref(), Some("eng.png"));
        assert_eq!(spec.title, "Engineering");
    }

    #[test]
    fn defaults_have_finite_positions() {
        for b in default_buildings() {
            assert!(b.position.is_finite(), "{}", b.code);
            assert!(!b.floor_range.is_empty(), "{}", b.code);
        }
    }
}
