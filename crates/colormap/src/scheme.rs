//! Color schemes and multi-stop interpolation engine.

/// RGB color with channel values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

/// Color schemes for the supported vegetation indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorScheme {
    /// Brown -> gold -> greens (vegetation vigor)
    Ndvi,
    /// Brown -> gold -> greens, compressed (high-biomass contrast)
    Evi,
    /// Green -> yellow -> red (senescence)
    Psri,
    /// Red -> yellow -> greens (burn severity, red = burned)
    Nbr,
    /// Brown -> white -> ice blue (snow cover)
    Ndsi,
}

impl ColorScheme {
    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ndvi => "NDVI",
            Self::Evi => "EVI",
            Self::Psri => "PSRI",
            Self::Nbr => "NBR",
            Self::Ndsi => "NDSI",
        }
    }

    fn stops(&self) -> &'static [ColorStop] {
        match self {
            Self::Ndvi => NDVI_STOPS,
            Self::Evi => EVI_STOPS,
            Self::Psri => PSRI_STOPS,
            Self::Nbr => NBR_STOPS,
            Self::Ndsi => NDSI_STOPS,
        }
    }
}

const NDVI_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 0x8b, 0x45, 0x13), // brown, bare soil
    ColorStop::new(0.2, 0xd2, 0x69, 0x1e),
    ColorStop::new(0.3, 0xff, 0xd7, 0x00),
    ColorStop::new(0.4, 0xff, 0xff, 0x00),
    ColorStop::new(0.5, 0xad, 0xff, 0x2f),
    ColorStop::new(0.6, 0x7f, 0xff, 0x00),
    ColorStop::new(0.7, 0x00, 0xff, 0x00),
    ColorStop::new(0.8, 0x22, 0x8b, 0x22),
    ColorStop::new(1.0, 0x00, 0x64, 0x00), // dark green, dense canopy
];

const EVI_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 0x8b, 0x45, 0x13),
    ColorStop::new(0.2, 0xff, 0xd7, 0x00),
    ColorStop::new(0.4, 0xad, 0xff, 0x2f),
    ColorStop::new(0.6, 0x00, 0xff, 0x00),
    ColorStop::new(1.0, 0x00, 0x64, 0x00),
];

const PSRI_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 0x00, 0xff, 0x00), // green, healthy
    ColorStop::new(0.5, 0xff, 0xff, 0x00),
    ColorStop::new(1.0, 0xff, 0x00, 0x00), // red, senescent
];

const NBR_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 0xff, 0x00, 0x00), // red, burned
    ColorStop::new(0.3, 0xff, 0xff, 0x00),
    ColorStop::new(0.5, 0x00, 0xff, 0x00),
    ColorStop::new(1.0, 0x00, 0x64, 0x00),
];

const NDSI_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 0x8b, 0x45, 0x13), // brown, no snow
    ColorStop::new(0.3, 0xff, 0xff, 0xff), // white, snow
    ColorStop::new(1.0, 0xe0, 0xf8, 0xff), // light blue, ice
];

/// Evaluate a scheme at normalized position `t` in [0, 1], linearly
/// interpolating between neighboring stops. Out-of-range positions are
/// clamped.
pub fn evaluate(scheme: ColorScheme, t: f64) -> Rgb {
    let stops = scheme.stops();
    let t = t.clamp(0.0, 1.0);

    if t <= stops[0].t {
        return stops[0].color;
    }
    for window in stops.windows(2) {
        let (lo, hi) = (window[0], window[1]);
        if t <= hi.t {
            let span = hi.t - lo.t;
            let f = if span > 0.0 { (t - lo.t) / span } else { 0.0 };
            return Rgb::new(
                lerp(lo.color.r, hi.color.r, f),
                lerp(lo.color.g, hi.color.g, f),
                lerp(lo.color.b, hi.color.b, f),
            );
        }
    }
    stops[stops.len() - 1].color
}

fn lerp(a: u8, b: u8, f: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * f).round() as u8
}
