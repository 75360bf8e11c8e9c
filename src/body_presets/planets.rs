//! This module contains presets for the eight planets.
//!
//! Each orbit is given as `[value at J2000, rate per century]` pairs, with
//! the semi-major axis in AU and every angle in degrees, matching the
//! published table they were taken from.

use crate::{
    config::CacheConfig, ephemeris::OrbitalElements, error::Result, BodyId, CelestialBody,
};

/// The static description of a planet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetPreset {
    /// Which planet this is.
    pub id: BodyId,
    /// The mass, in kilograms.
    pub mass: f64,
    /// The radius, in meters.
    pub radius: f64,
    /// Semi-major axis, in AU and AU per century.
    pub semi_major_axis: [f64; 2],
    /// Eccentricity, and its rate per century.
    pub eccentricity: [f64; 2],
    /// Inclination, in degrees and degrees per century.
    pub inclination: [f64; 2],
    /// Mean longitude, in degrees and degrees per century.
    pub mean_longitude: [f64; 2],
    /// Longitude of perihelion, in degrees and degrees per century.
    pub longitude_of_perihelion: [f64; 2],
    /// Longitude of the ascending node, in degrees and degrees per century.
    pub longitude_of_ascending_node: [f64; 2],
}

impl PlanetPreset {
    /// The orbital elements, converted into radians.
    pub fn elements(&self) -> OrbitalElements {
        OrbitalElements::from_table(
            self.semi_major_axis,
            self.eccentricity,
            self.inclination,
            self.mean_longitude,
            self.longitude_of_perihelion,
            self.longitude_of_ascending_node,
        )
    }

    /// Builds the planet as a body orbiting a star of `central_mass` kilograms.
    pub fn build(&self, central_mass: f64, config: &CacheConfig) -> Result<CelestialBody> {
        CelestialBody::orbiting(
            self.id,
            self.mass,
            self.radius,
            central_mass,
            self.elements(),
            config,
        )
    }
}

/// Mercury.
pub const MERCURY: PlanetPreset = PlanetPreset {
    id: BodyId::Mercury,
    mass: 3.285e23,
    radius: 2.4e6,
    semi_major_axis: [0.38709927, 0.00000037],
    eccentricity: [0.20563593, 0.00001906],
    inclination: [7.00497902, -0.00594749],
    mean_longitude: [252.25032350, 149472.67411175],
    longitude_of_perihelion: [77.45779628, 0.16047689],
    longitude_of_ascending_node: [48.33076593, -0.12534081],
};

/// Venus.
pub const VENUS: PlanetPreset = PlanetPreset {
    id: BodyId::Venus,
    mass: 4.867e24,
    radius: 6e6,
    semi_major_axis: [0.72333566, 0.00000390],
    eccentricity: [0.00677672, -0.00004107],
    inclination: [3.39467605, -0.00078890],
    mean_longitude: [181.97909950, 58517.81538729],
    longitude_of_perihelion: [131.60246718, 0.00268329],
    longitude_of_ascending_node: [76.67984255, -0.27769418],
};

/// The Earth-Moon barycenter.
pub const EARTH: PlanetPreset = PlanetPreset {
    id: BodyId::Earth,
    mass: 5.97219e24,
    radius: 6.4e6,
    semi_major_axis: [1.00000261, 0.00000562],
    eccentricity: [0.01671123, -0.00004392],
    inclination: [-0.00001531, -0.01294668],
    mean_longitude: [100.46457166, 35999.37244981],
    longitude_of_perihelion: [102.93768193, 0.32327364],
    longitude_of_ascending_node: [0.0, 0.0],
};

/// Mars.
pub const MARS: PlanetPreset = PlanetPreset {
    id: BodyId::Mars,
    mass: 6.39e23,
    radius: 3.4e6,
    semi_major_axis: [1.52371034, 0.00001847],
    eccentricity: [0.09339410, 0.00007882],
    inclination: [1.84969142, -0.00813131],
    mean_longitude: [-4.55343205, 19140.30268499],
    longitude_of_perihelion: [-23.94362959, 0.44441088],
    longitude_of_ascending_node: [49.55953891, -0.29257343],
};

/// Jupiter.
pub const JUPITER: PlanetPreset = PlanetPreset {
    id: BodyId::Jupiter,
    mass: 1.898e27,
    radius: 7e7,
    semi_major_axis: [5.20288700, -0.00011607],
    eccentricity: [0.04838624, -0.00013253],
    inclination: [1.30439695, -0.00183714],
    mean_longitude: [34.39644051, 3034.74612775],
    longitude_of_perihelion: [14.72847983, 0.21252668],
    longitude_of_ascending_node: [100.47390909, 0.20469106],
};

/// Saturn.
pub const SATURN: PlanetPreset = PlanetPreset {
    id: BodyId::Saturn,
    mass: 5.683e26,
    radius: 6e7,
    semi_major_axis: [9.53667594, -0.00125060],
    eccentricity: [0.05386179, -0.00050991],
    inclination: [2.48599187, 0.00193609],
    mean_longitude: [49.95424423, 1222.49362201],
    longitude_of_perihelion: [92.59887831, -0.41897216],
    longitude_of_ascending_node: [113.66242448, -0.28867794],
};

/// Uranus.
pub const URANUS: PlanetPreset = PlanetPreset {
    id: BodyId::Uranus,
    mass: 8.681e25,
    radius: 2.5e7,
    semi_major_axis: [19.18916464, -0.00196176],
    eccentricity: [0.04725744, -0.00004397],
    inclination: [0.77263783, -0.00242939],
    mean_longitude: [313.23810451, 428.48202785],
    longitude_of_perihelion: [170.95427630, 0.40805281],
    longitude_of_ascending_node: [74.01692503, 0.04240589],
};

/// Neptune.
pub const NEPTUNE: PlanetPreset = PlanetPreset {
    id: BodyId::Neptune,
    mass: 1.024e26,
    radius: 2.5e7,
    semi_major_axis: [30.06992276, 0.00026291],
    eccentricity: [0.00859048, 0.00005105],
    inclination: [1.77004347, 0.00035372],
    mean_longitude: [-55.12002969, 218.45945325],
    longitude_of_perihelion: [44.96476227, -0.32241464],
    longitude_of_ascending_node: [131.78422574, -0.00508664],
};

/// Every planet, outwards from the Sun.
pub const ALL: [PlanetPreset; 8] = [
    MERCURY, VENUS, EARTH, MARS, JUPITER, SATURN, URANUS, NEPTUNE,
];
