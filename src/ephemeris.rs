//! Analytic planetary ephemeris from slowly varying Keplerian elements.
//!
//! Each element is modeled as an initial value at J2000 plus a linear rate
//! per Julian century, in the form published for the approximate positions
//! of the major planets. Positions come out in astronomical units, in the
//! heliocentric ecliptic frame.

use glam::{DVec2, DVec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{solvers::solve_eccentric_anomaly, Matrix3x2};

/// A single orbital element that varies linearly over time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Element {
    /// The value at J2000.
    pub initial: f64,

    /// The change in value per Julian century.
    pub rate: f64,
}

impl Element {
    /// Creates a new element from its value at J2000 and its rate of change.
    pub const fn new(initial: f64, rate: f64) -> Self {
        Self { initial, rate }
    }

    /// Creates a new angular element, converting both values from degrees
    /// into radians.
    pub fn from_degrees(initial: f64, rate: f64) -> Self {
        Self {
            initial: initial.to_radians(),
            rate: rate.to_radians(),
        }
    }

    /// Gets the value of the element at `centuries` Julian centuries
    /// since J2000.
    #[inline]
    pub fn at(&self, centuries: f64) -> f64 {
        self.initial + self.rate * centuries
    }
}

/// The classical orbital elements of a body around the Sun.
///
/// The semi-major axis is in astronomical units and every angle is in
/// radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrbitalElements {
    /// The semi-major axis, in AU.
    pub semi_major_axis: Element,

    /// The eccentricity.
    pub eccentricity: Element,

    /// The inclination to the ecliptic.
    pub inclination: Element,

    /// The mean longitude.
    pub mean_longitude: Element,

    /// The longitude of perihelion, ϖ = Ω + ω.
    pub longitude_of_perihelion: Element,

    /// The longitude of the ascending node.
    pub longitude_of_ascending_node: Element,
}

/// The orbital elements evaluated at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElementSnapshot {
    /// The semi-major axis, in AU.
    pub semi_major_axis: f64,
    /// The eccentricity.
    pub eccentricity: f64,
    /// The inclination, in radians.
    pub inclination: f64,
    /// The argument of perihelion ω = ϖ - Ω, in radians.
    pub argument_of_perihelion: f64,
    /// The longitude of the ascending node, in radians.
    pub longitude_of_ascending_node: f64,
    /// The mean anomaly M = L - ϖ, in radians. Not normalized.
    pub mean_anomaly: f64,
}

impl OrbitalElements {
    /// Creates a new set of elements from the tabulated form.
    ///
    /// Each argument is `[value at J2000, rate per century]`, with the
    /// semi-major axis in AU and all angles in degrees.
    pub fn from_table(
        semi_major_axis: [f64; 2],
        eccentricity: [f64; 2],
        inclination: [f64; 2],
        mean_longitude: [f64; 2],
        longitude_of_perihelion: [f64; 2],
        longitude_of_ascending_node: [f64; 2],
    ) -> Self {
        Self {
            semi_major_axis: Element::new(semi_major_axis[0], semi_major_axis[1]),
            eccentricity: Element::new(eccentricity[0], eccentricity[1]),
            inclination: Element::from_degrees(inclination[0], inclination[1]),
            mean_longitude: Element::from_degrees(mean_longitude[0], mean_longitude[1]),
            longitude_of_perihelion: Element::from_degrees(
                longitude_of_perihelion[0],
                longitude_of_perihelion[1],
            ),
            longitude_of_ascending_node: Element::from_degrees(
                longitude_of_ascending_node[0],
                longitude_of_ascending_node[1],
            ),
        }
    }

    /// Creates a circular, uninclined orbit of the given radius (in AU)
    /// whose mean longitude advances by `mean_motion` radians per century.
    pub fn circular(radius: f64, mean_motion: f64) -> Self {
        Self {
            semi_major_axis: Element::new(radius, 0.0),
            mean_longitude: Element::new(0.0, mean_motion),
            ..Default::default()
        }
    }

    /// Evaluates every element at `centuries` Julian centuries since J2000.
    pub fn at(&self, centuries: f64) -> ElementSnapshot {
        let longitude_of_perihelion = self.longitude_of_perihelion.at(centuries);
        let longitude_of_ascending_node = self.longitude_of_ascending_node.at(centuries);

        ElementSnapshot {
            semi_major_axis: self.semi_major_axis.at(centuries),
            eccentricity: self.eccentricity.at(centuries),
            inclination: self.inclination.at(centuries),
            argument_of_perihelion: longitude_of_perihelion - longitude_of_ascending_node,
            longitude_of_ascending_node,
            mean_anomaly: self.mean_longitude.at(centuries) - longitude_of_perihelion,
        }
    }

    /// Gets the mean anomaly at `centuries` Julian centuries since J2000,
    /// without normalizing it.
    #[inline]
    pub fn mean_anomaly_at(&self, centuries: f64) -> f64 {
        self.mean_longitude.at(centuries) - self.longitude_of_perihelion.at(centuries)
    }

    /// The rate of change of the mean anomaly, in radians per century.
    #[inline]
    pub fn mean_anomaly_rate(&self) -> f64 {
        self.mean_longitude.rate - self.longitude_of_perihelion.rate
    }
}

/// Gets the matrix that rotates a vector from the perifocal (PQW) frame
/// into the reference frame.
///
/// This is the 3-1-3 Euler rotation `Rz(Ω) Rx(I) Rz(ω)` composed into
/// closed form. Only the first two columns are kept, since perifocal
/// vectors have no Z component.
pub fn transformation_matrix(inclination: f64, arg_pe: f64, long_asc_node: f64) -> Matrix3x2 {
    let (sin_inc, cos_inc) = inclination.sin_cos();
    let (sin_arg_pe, cos_arg_pe) = arg_pe.sin_cos();
    let (sin_lan, cos_lan) = long_asc_node.sin_cos();

    Matrix3x2 {
        e11: cos_arg_pe * cos_lan - sin_arg_pe * cos_inc * sin_lan,
        e12: -(sin_arg_pe * cos_lan + cos_arg_pe * cos_inc * sin_lan),

        e21: cos_arg_pe * sin_lan + sin_arg_pe * cos_inc * cos_lan,
        e22: cos_arg_pe * cos_inc * cos_lan - sin_arg_pe * sin_lan,

        e31: sin_arg_pe * sin_inc,
        e32: cos_arg_pe * sin_inc,
    }
}

/// Gets the heliocentric ecliptic position of a body.
///
/// `centuries` is the time in Julian centuries since J2000.
///
/// Returns the position in AU, along with the mean anomaly the position
/// was computed from (recomputed from the solved eccentric anomaly, so
/// it lies within [-π, π]).
///
/// # Example
/// ```
/// use patched_conic_sim::{body_presets::planets, ephemeris::position_at};
///
/// let (position, mean_anomaly) = position_at(&planets::EARTH.elements(), 0.0);
///
/// assert!((position.length() - 1.0).abs() < 0.02);
/// assert!((mean_anomaly.to_degrees() + 2.47311).abs() < 1e-4);
/// ```
pub fn position_at(elements: &OrbitalElements, centuries: f64) -> (DVec3, f64) {
    let snapshot = elements.at(centuries);
    let eccentricity = snapshot.eccentricity;

    let solution = solve_eccentric_anomaly(snapshot.mean_anomaly, eccentricity);
    if !solution.converged {
        log::warn!(
            "ephemeris anomaly solve did not converge at T = {centuries} (M = {})",
            snapshot.mean_anomaly
        );
    }

    let eccentric_anomaly = solution.value;
    let (sin, cos) = eccentric_anomaly.sin_cos();

    let perifocal = DVec2::new(
        snapshot.semi_major_axis * (cos - eccentricity),
        snapshot.semi_major_axis * (1.0 - eccentricity * eccentricity).sqrt() * sin,
    );

    let matrix = transformation_matrix(
        snapshot.inclination,
        snapshot.argument_of_perihelion,
        snapshot.longitude_of_ascending_node,
    );

    (
        matrix.dot_vec(perifocal),
        eccentric_anomaly - eccentricity * sin,
    )
}
