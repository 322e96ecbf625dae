//! Shared fixtures for integration tests.

#![allow(dead_code)]

use sky_covariance::{PixelCoordinates, PixelOrdering, PowerSpectrum, SkyMask};

/// 4 latitude rings × 12 longitudes = 48 pixels.
pub const UNIVERSE: usize = 48;

/// Coarse latitude/longitude grid covering the sphere.
pub fn grid_coordinates(ordering: PixelOrdering) -> PixelCoordinates {
    let mut lon = Vec::with_capacity(UNIVERSE);
    let mut lat = Vec::with_capacity(UNIVERSE);
    for &b in &[-60.0, -20.0, 20.0, 60.0] {
        for k in 0..12 {
            lon.push(30.0 * k as f64);
            lat.push(b);
        }
    }
    PixelCoordinates::new(lon, lat, ordering).unwrap()
}

/// Every other pixel of the grid.
pub fn checkerboard_mask(ordering: PixelOrdering) -> SkyMask {
    SkyMask::new((0..UNIVERSE).map(|i| i % 2 == 0).collect(), ordering)
}

/// Slowly falling spectrum `C_l = 1/(l+1)` up to `lmax`.
pub fn falling_spectrum(lmax: usize) -> PowerSpectrum {
    PowerSpectrum::new((0..=lmax).map(|l| 1.0 / (l as f64 + 1.0)).collect()).unwrap()
}
