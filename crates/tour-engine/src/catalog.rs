//! The read-only set of tours available to a session.
//!
//! A catalog is built once at startup, either from the built-in literal list
//! or from a JSON document, and is shared behind an `Arc` for the lifetime of
//! the process.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;

use crate::error::{Error, Result};
use crate::tour::{Difficulty, Easing, Tour, Waypoint};

/// Immutable mapping from tour id to tour, preserving declaration order.
#[derive(Debug, Clone, Default)]
pub struct TourCatalog {
    tours: Vec<Arc<Tour>>,
    index: HashMap<String, usize>,
}

impl TourCatalog {
    /// Build a catalog from a list of tours.
    ///
    /// Every tour is validated and ids must be unique.
    pub fn new(tours: impl IntoIterator<Item = Tour>) -> Result<Self> {
        let mut catalog = Self::default();
        for tour in tours {
            tour.validate()?;
            if catalog.index.contains_key(&tour.id) {
                return Err(Error::DuplicateTour { id: tour.id });
            }
            catalog
                .index
                .insert(tour.id.clone(), catalog.tours.len());
            catalog.tours.push(Arc::new(tour));
        }
        Ok(catalog)
    }

    /// Parse a catalog from a JSON array of tours.
    pub fn from_json(json: &str) -> Result<Self> {
        let tours: Vec<Tour> = serde_json::from_str(json)?;
        Self::new(tours)
    }

    /// Serialize the catalog as a JSON array of tours.
    pub fn to_json_pretty(&self) -> Result<String> {
        let tours: Vec<&Tour> = self.tours.iter().map(AsRef::as_ref).collect();
        Ok(serde_json::to_string_pretty(&tours)?)
    }

    /// Look up a tour by id.
    pub fn lookup(&self, id: &str) -> Result<&Arc<Tour>> {
        self.index
            .get(id)
            .map(|&i| &self.tours[i])
            .ok_or_else(|| Error::UnknownTour { id: id.to_owned() })
    }

    /// Iterate over tours in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Tour>> {
        self.tours.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tours.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }

    /// The tours shipped with the viewer.
    #[must_use]
    pub fn builtin() -> Self {
        // The literal list is covered by tests; failure here is a programming error.
        Self::new(builtin_tours()).expect("built-in tour catalog is valid")
    }
}

fn wp(position: [f32; 3], target: [f32; 3], hold: f32, label: &str) -> Waypoint {
    Waypoint::new(Vec3::from_array(position), Vec3::from_array(target), hold).with_label(label)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|&s| s.to_owned()).collect()
}

/// Literal tour definitions.
///
/// Plant layout (metres, Y up): reactor building at the origin, turbine hall
/// along +X, control building behind the reactor at -Z, auxiliary blocks at -X,
/// switchyard to the south-east.
#[allow(clippy::too_many_lines)]
fn builtin_tours() -> Vec<Tour> {
    vec![
        Tour {
            id: "reactor-core".into(),
            title: "Reactor Core Tour".into(),
            description: "Walk through the heart of nuclear power generation, exploring the \
                          reactor vessel and its control systems."
                .into(),
            total_duration: 120.0,
            difficulty: Difficulty::Beginner,
            highlights: strings(&["Reactor vessel", "Control rods", "Steam generators"]),
            easing: Easing::Linear,
            waypoints: vec![
                wp([50.0, 30.0, 50.0], [0.0, 15.0, 0.0], 60.0, "Containment approach"),
                wp([0.0, 20.0, 40.0], [0.0, 20.0, 0.0], 60.0, "Reactor building"),
                wp([0.0, 40.0, 0.0], [0.0, 12.0, -20.0], 60.0, "Control rod drives"),
            ],
        },
        Tour {
            id: "turbine-hall".into(),
            title: "Turbine Hall Experience".into(),
            description: "See how nuclear energy becomes electricity through massive \
                          turbo-generators."
                .into(),
            total_duration: 100.0,
            difficulty: Difficulty::Intermediate,
            highlights: strings(&["Steam turbines", "Generator hall", "Energy conversion"]),
            easing: Easing::SmoothStep,
            waypoints: vec![
                wp([20.0, 25.0, 45.0], [65.0, 9.0, 0.0], 20.0, "Hall exterior"),
                wp([35.0, 14.0, 20.0], [65.0, 8.0, 0.0], 30.0, "High-pressure turbine"),
                wp([70.0, 14.0, 20.0], [90.0, 8.0, 0.0], 30.0, "Low-pressure turbines"),
                wp([115.0, 20.0, 25.0], [90.0, 6.0, 0.0], 20.0, "Generator"),
            ],
        },
        Tour {
            id: "safety-systems".into(),
            title: "Safety Systems Tour".into(),
            description: "Learn about the layers of safety that protect both workers and the \
                          environment."
                .into(),
            total_duration: 150.0,
            difficulty: Difficulty::Advanced,
            highlights: strings(&["Emergency systems", "Containment", "Safety protocols"]),
            easing: Easing::SmoothStep,
            waypoints: vec![
                wp([-60.0, 35.0, 60.0], [0.0, 15.0, 0.0], 25.0, "Site overview"),
                wp([-30.0, 12.0, 30.0], [-35.0, 6.0, 0.0], 35.0, "Emergency diesel block"),
                wp([-20.0, 45.0, -20.0], [0.0, 30.0, 0.0], 40.0, "Containment dome"),
                wp([25.0, 15.0, -45.0], [0.0, 8.0, -28.0], 30.0, "Emergency control"),
                wp([60.0, 50.0, -60.0], [0.0, 10.0, 0.0], 20.0, "Exclusion zone"),
            ],
        },
        Tour {
            id: "control-room".into(),
            title: "Control Room Operations".into(),
            description: "Step into the nerve centre where operators monitor and control the \
                          entire facility."
                .into(),
            total_duration: 80.0,
            difficulty: Difficulty::Intermediate,
            highlights: strings(&["Control panels", "Monitoring systems", "Operations centre"]),
            easing: Easing::Linear,
            waypoints: vec![
                wp([30.0, 20.0, -60.0], [0.0, 8.0, -28.0], 30.0, "Control building"),
                wp([8.0, 10.0, -40.0], [0.0, 8.0, -28.0], 30.0, "Operator desks"),
                wp([0.0, 14.0, -36.0], [0.0, 20.0, 0.0], 20.0, "View to the reactor"),
            ],
        },
        Tour {
            id: "complete-facility".into(),
            title: "Complete Facility Overview".into(),
            description: "A comprehensive tour covering every major system and area of the \
                          plant."
                .into(),
            total_duration: 250.0,
            difficulty: Difficulty::AllLevels,
            highlights: strings(&[
                "Full plant tour",
                "All major systems",
                "Comprehensive overview",
            ]),
            easing: Easing::SmoothStep,
            waypoints: vec![
                wp([50.0, 30.0, 50.0], [0.0, 15.0, 0.0], 30.0, "Arrival"),
                wp([0.0, 20.0, 40.0], [0.0, 20.0, 0.0], 30.0, "Reactor building"),
                wp([45.0, 16.0, 25.0], [75.0, 8.0, 0.0], 35.0, "Turbine hall"),
                wp([90.0, 18.0, 75.0], [70.0, 3.0, 60.0], 30.0, "Switchyard"),
                wp([-45.0, 15.0, 30.0], [-35.0, 6.0, 0.0], 30.0, "Auxiliary buildings"),
                wp([15.0, 14.0, -50.0], [0.0, 8.0, -28.0], 30.0, "Control building"),
                wp([-20.0, 12.0, -85.0], [0.0, 0.0, -110.0], 30.0, "Cooling water intake"),
                wp([120.0, 90.0, 120.0], [20.0, 0.0, 0.0], 0.0, "Farewell"),
            ],
        },
    ]
}
