// Sun position and direct-beam irradiance on a tilted, flat collector.
//
// All angles are in degrees on the way in and the way out; they are shadowed as radians
// internally wherever trig functions need them. Azimuths are measured from south, with east
// negative and west positive.

use crate::core::units::DEGREES_PER_HOUR;

/// Latitude of the reference site (Shenzhen), in degrees north.
pub const LATITUDE_SHENZHEN: f64 = 22.5;
/// Approximate radiation at the top of the atmosphere, in W/m².
pub const SOLAR_CONSTANT: f64 = 1361.;
/// Simplified clear-sky transmittance of the atmosphere for one air mass.
pub const ATMOSPHERIC_TRANSMITTANCE: f64 = 0.7;
/// Tilt of the earth's axis relative to its orbital plane, in degrees.
pub const EARTH_AXIAL_TILT: f64 = 23.45;
/// Hour angle step used when integrating over a day (10 minutes of solar time).
pub const INTEGRATION_STEP: f64 = 2.5;
/// Panel azimuth for a collector facing due south.
pub const SOUTH_FACING: f64 = 0.;

// day of the year on which the declination sinusoid crosses zero (spring equinox)
const EQUINOX_DAY_OFFSET: i32 = 81;

/// Calculate the solar declination, in degrees, for the given (1-indexed) day of the year.
///
/// Uses the non-leap year approximation `23.45 * sin(360/365 * (n - 81))`. Any integer is
/// accepted - the result is periodic over 365 days.
pub fn declination(day_of_year: i32) -> f64 {
    let earth_orbit_angle =
        ((360.0 / 365.0) * (day_of_year - EQUINOX_DAY_OFFSET) as f64).to_radians();

    EARTH_AXIAL_TILT * earth_orbit_angle.sin()
}

/// Calculate the solar elevation (altitude) angle - the angle between the solar beam and the
/// horizontal surface - in degrees.
///
/// Arguments:
/// * `latitude` - geographic latitude, in degrees
/// * `declination` - solar declination for the day, in degrees
/// * `hour_angle` - solar hour angle, in degrees (negative before solar noon)
pub fn elevation(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    //all three params provided as degrees, but we need to shadow each as radians for trig calcs
    let latitude = latitude.to_radians();
    let declination = declination.to_radians();
    let hour_angle = hour_angle.to_radians();

    let sin_elevation =
        latitude.sin() * declination.sin() + latitude.cos() * declination.cos() * hour_angle.cos();

    // rounding can push the sine just past +/-1 with the sun at the zenith or nadir
    sin_elevation.clamp(-1.0, 1.0).asin().to_degrees()
}

/// Calculate the solar azimuth angle, in degrees from south (east negative, west positive).
///
/// The arccosine only yields 0..180, so the side of the meridian is taken from the sign of
/// the hour angle: mornings (negative hour angles) give eastern (negative) azimuths. This is
/// not a general azimuth solver and relies on the caller knowing the hour angle that produced
/// `elevation`.
///
/// With the sun exactly at the zenith or nadir the azimuth is undefined and 0 is returned.
pub fn azimuth(latitude: f64, declination: f64, elevation: f64, hour_angle: f64) -> f64 {
    let latitude = latitude.to_radians();
    let declination = declination.to_radians();
    let elevation = elevation.to_radians();

    if elevation.cos() == 0.0 {
        return 0.0;
    }

    let cos_azimuth = (elevation.sin() * latitude.sin() - declination.sin())
        / (elevation.cos() * latitude.cos());
    let azimuth = cos_azimuth.clamp(-1.0, 1.0).acos().to_degrees();

    if hour_angle < 0.0 {
        -azimuth
    } else {
        azimuth
    }
}

/// Calculate the angle of incidence, in degrees, between the solar beam and the normal of a
/// tilted flat surface.
///
/// Arguments:
/// * `elevation` - solar elevation angle, in degrees
/// * `azimuth` - solar azimuth angle, in degrees from south
/// * `panel_tilt` - tilt of the surface from horizontal, 0 (flat) to 90 (vertical), in degrees
/// * `panel_azimuth` - direction the surface faces, in degrees from south (see [`SOUTH_FACING`])
///
/// When the sun is behind the plane of the surface the result is exactly 90, i.e. no direct
/// radiation is received - angles beyond 90 are never returned.
pub fn incidence_angle(elevation: f64, azimuth: f64, panel_tilt: f64, panel_azimuth: f64) -> f64 {
    let elevation = elevation.to_radians();
    let azimuth = azimuth.to_radians();
    let panel_tilt = panel_tilt.to_radians();
    let panel_azimuth = panel_azimuth.to_radians();

    let cos_incidence = elevation.sin() * panel_tilt.cos()
        + elevation.cos() * panel_tilt.sin() * (azimuth - panel_azimuth).cos();

    cos_incidence.clamp(0.0, 1.0).acos().to_degrees()
}

pub fn incidence_angle_south_facing(elevation: f64, azimuth: f64, panel_tilt: f64) -> f64 {
    incidence_angle(elevation, azimuth, panel_tilt, SOUTH_FACING)
}

/// Relative path length of the solar beam through the atmosphere, `1 / sin(elevation)`.
///
/// Only meaningful for a sun above the horizon; callers must not pass elevations <= 0.
pub fn air_mass(elevation: f64) -> f64 {
    1.0 / elevation.to_radians().sin()
}

/// Instantaneous direct irradiance on the surface, in W/m².
///
/// `I = I0 * transmittance^AM * cos(incidence)` for a clear sky. The sun must be above the
/// horizon (`elevation > 0`) and in front of the surface (`incidence < 90`) - both are guarded
/// by the caller.
pub fn direct_irradiance(elevation: f64, incidence_angle: f64) -> f64 {
    SOLAR_CONSTANT
        * ATMOSPHERIC_TRANSMITTANCE.powf(air_mass(elevation))
        * incidence_angle.to_radians().cos()
}

/// The span of hour angles over which the sun is above the horizon on a given day.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DaylightWindow {
    /// The sun never rises.
    PolarNight,
    /// The sun never sets.
    MidnightSun,
    /// Sunrise at `-sunset_hour_angle`, sunset at `+sunset_hour_angle`.
    Standard { sunset_hour_angle: f64 },
}

impl DaylightWindow {
    /// The hour angle of sunset in degrees, or `None` if the sun does not rise at all.
    pub fn sunset_hour_angle(&self) -> Option<f64> {
        match self {
            DaylightWindow::PolarNight => None,
            DaylightWindow::MidnightSun => Some(180.),
            DaylightWindow::Standard { sunset_hour_angle } => Some(*sunset_hour_angle),
        }
    }

    /// Length of the day in hours of solar time.
    pub fn day_length(&self) -> f64 {
        self.sunset_hour_angle()
            .map_or(0., |sunset_hour_angle| 2. * sunset_hour_angle / DEGREES_PER_HOUR)
    }
}

/// Work out the sunrise/ sunset hour angles from `cos(Hs) = -tan(latitude) * tan(declination)`.
pub fn daylight_window(latitude: f64, declination: f64) -> DaylightWindow {
    let cos_sunset_hour_angle = -latitude.to_radians().tan() * declination.to_radians().tan();

    if cos_sunset_hour_angle >= 1.0 {
        DaylightWindow::PolarNight
    } else if cos_sunset_hour_angle <= -1.0 {
        DaylightWindow::MidnightSun
    } else {
        DaylightWindow::Standard {
            sunset_hour_angle: cos_sunset_hour_angle.acos().to_degrees(),
        }
    }
}

/// Hour angles sampled by the daily integration: `[-sunset, sunset)` in steps of `step`.
pub(crate) fn sample_hour_angles(sunset_hour_angle: f64, step: f64) -> impl Iterator<Item = f64> {
    let sample_count = ((2. * sunset_hour_angle) / step).ceil().max(0.) as usize;

    (0..sample_count).map(move |idx| -sunset_hour_angle + idx as f64 * step)
}

/// Calculate the total direct radiation, in Wh/m², received over one day by a flat panel.
///
/// Irradiance is sampled every [`INTEGRATION_STEP`] degrees of hour angle between sunrise and
/// sunset and each sample contributes for `step / 15` hours. Returns 0 on days the sun does
/// not rise at `latitude`.
pub fn daily_energy(latitude: f64, day_of_year: i32, panel_tilt: f64, panel_azimuth: f64) -> f64 {
    let declination = declination(day_of_year);

    let Some(sunset_hour_angle) = daylight_window(latitude, declination).sunset_hour_angle()
    else {
        return 0.0;
    };

    let step_in_hours = INTEGRATION_STEP / DEGREES_PER_HOUR;

    sample_hour_angles(sunset_hour_angle, INTEGRATION_STEP)
        .filter_map(|hour_angle| {
            let elevation = elevation(latitude, declination, hour_angle);
            if elevation <= 0.0 {
                return None;
            }

            let azimuth = azimuth(latitude, declination, elevation, hour_angle);
            let incidence_angle = incidence_angle(elevation, azimuth, panel_tilt, panel_azimuth);
            if incidence_angle >= 90.0 {
                return None;
            }

            Some(direct_irradiance(elevation, incidence_angle) * step_in_hours)
        })
        .sum()
}

pub fn daily_energy_south_facing(latitude: f64, day_of_year: i32, panel_tilt: f64) -> f64 {
    daily_energy(latitude, day_of_year, panel_tilt, SOUTH_FACING)
}
