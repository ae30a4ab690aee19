//! Depth and speed color mapping
//!
//! Schemes are a closed set ([`ColorScheme`]); each one carries its behaviour
//! as data ([`SchemeKind`]):
//! - two-stop: linear RGB blend from a deep color to a shallow color
//! - bands: piecewise-linear ramp through several stops
//! - hue sweep: blue (deep) to red (shallow) with rising lightness
//! - alpha fade: constant color whose opacity tracks depth
//! - constant: one color regardless of depth
//!
//! Depth convention: 0 = far/deep, 1 = near/shallow. With `emphasize_deep`,
//! depth is first remapped by `1 - (1 - d)^power`.

use std::fmt;

/// Display color with straight (non-premultiplied) alpha in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb`, alpha dropped
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Fallback for unknown scheme names
pub const NEUTRAL_GRAY: Rgba = Rgba::rgb(128, 128, 128);

/// Default exponent for deep-end emphasis
pub const DEFAULT_DEPTH_POWER: f64 = 1.5;

/// A color stop on a banded ramp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub value: f64,
    pub color: [u8; 3],
}

/// Blue (far) → teal → yellow → red (near)
static DEPTH_BANDS: [ColorStop; 4] = [
    ColorStop { value: 0.0, color: [0, 50, 150] },
    ColorStop { value: 0.33, color: [0, 150, 200] },
    ColorStop { value: 0.67, color: [200, 200, 0] },
    ColorStop { value: 1.0, color: [200, 50, 0] },
];

/// Rendering behaviour of a scheme
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemeKind {
    TwoStop { deep: [u8; 3], shallow: [u8; 3] },
    Bands(&'static [ColorStop]),
    HueSweep,
    AlphaFade { color: [u8; 3] },
    Constant(Rgba),
    /// The speed ramp applied to the (transformed) scalar
    SpeedRamp,
}

/// Supported color schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorScheme {
    #[default]
    Ocean,
    Sunset,
    Forest,
    Rainbow,
    White,
    Depth,
    Uniform,
    /// Segments colored by local flow speed instead of depth
    Speed,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 8] = [
        ColorScheme::Ocean,
        ColorScheme::Sunset,
        ColorScheme::Forest,
        ColorScheme::Rainbow,
        ColorScheme::White,
        ColorScheme::Depth,
        ColorScheme::Uniform,
        ColorScheme::Speed,
    ];

    /// Case-insensitive lookup; `None` for unknown names
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "ocean" => Some(Self::Ocean),
            "sunset" => Some(Self::Sunset),
            "forest" => Some(Self::Forest),
            "rainbow" => Some(Self::Rainbow),
            "white" => Some(Self::White),
            "depth" => Some(Self::Depth),
            "uniform" => Some(Self::Uniform),
            "speed" => Some(Self::Speed),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ocean => "ocean",
            Self::Sunset => "sunset",
            Self::Forest => "forest",
            Self::Rainbow => "rainbow",
            Self::White => "white",
            Self::Depth => "depth",
            Self::Uniform => "uniform",
            Self::Speed => "speed",
        }
    }

    pub fn kind(&self) -> SchemeKind {
        match self {
            Self::Ocean => SchemeKind::TwoStop {
                deep: [8, 48, 107],
                shallow: [120, 210, 230],
            },
            Self::Sunset => SchemeKind::TwoStop {
                deep: [63, 20, 90],
                shallow: [255, 170, 80],
            },
            Self::Forest => SchemeKind::TwoStop {
                deep: [20, 55, 30],
                shallow: [175, 220, 120],
            },
            Self::Rainbow => SchemeKind::HueSweep,
            Self::White => SchemeKind::AlphaFade {
                color: [255, 255, 255],
            },
            Self::Depth => SchemeKind::Bands(&DEPTH_BANDS),
            Self::Uniform => SchemeKind::Constant(Rgba::rgb(40, 40, 40)),
            Self::Speed => SchemeKind::SpeedRamp,
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Deep-end emphasis: `1 - (1 - depth)^power`
pub fn emphasize_depth(depth: f64, power: f64) -> f64 {
    1.0 - (1.0 - depth).powf(power)
}

/// Map a depth value to a color under `scheme`
pub fn depth_color(depth: f64, scheme: ColorScheme, emphasize_deep: bool, power: f64) -> Rgba {
    let depth = clamp_unit(depth);
    let t = if emphasize_deep {
        clamp_unit(emphasize_depth(depth, power))
    } else {
        depth
    };

    match scheme.kind() {
        SchemeKind::TwoStop { deep, shallow } => {
            let [r, g, b] = lerp_rgb(deep, shallow, t);
            Rgba::rgb(r, g, b)
        }
        SchemeKind::Bands(stops) => {
            let [r, g, b] = interpolate_stops(stops, t);
            Rgba::rgb(r, g, b)
        }
        SchemeKind::HueSweep => {
            let [r, g, b] = hsl_to_rgb(240.0 * (1.0 - t), 0.8, 0.35 + 0.3 * t);
            Rgba::rgb(r, g, b)
        }
        SchemeKind::AlphaFade { color } => Rgba::rgba(color[0], color[1], color[2], t),
        SchemeKind::Constant(color) => color,
        SchemeKind::SpeedRamp => speed_color(t, 1.0),
    }
}

/// Like [`depth_color`] but keyed by scheme name; unknown names give [`NEUTRAL_GRAY`]
pub fn depth_color_named(depth: f64, name: &str, emphasize_deep: bool, power: f64) -> Rgba {
    match ColorScheme::parse(name) {
        Some(scheme) => depth_color(depth, scheme, emphasize_deep, power),
        None => NEUTRAL_GRAY,
    }
}

/// Viridis-like speed ramp: hue 240° → 60° with rising lightness
pub fn speed_color(speed: f64, max_speed: f64) -> Rgba {
    let t = if max_speed > 0.0 {
        clamp_unit(speed / max_speed)
    } else {
        0.0
    };
    let [r, g, b] = hsl_to_rgb(240.0 - 180.0 * t, 0.7, 0.3 + 0.4 * t);
    Rgba::rgb(r, g, b)
}

/// Depth styling snapshot: scheme plus the depth transform settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthStyle {
    pub scheme: ColorScheme,
    pub emphasize_deep: bool,
    pub power: f64,
    /// Swap near and far before any transform
    pub invert: bool,
}

impl Default for DepthStyle {
    fn default() -> Self {
        Self {
            scheme: ColorScheme::default(),
            emphasize_deep: true,
            power: DEFAULT_DEPTH_POWER,
            invert: false,
        }
    }
}

impl DepthStyle {
    /// Depth after the optional inversion
    pub fn oriented(&self, depth: f64) -> f64 {
        if self.invert {
            1.0 - depth
        } else {
            depth
        }
    }

    pub fn color(&self, depth: f64) -> Rgba {
        depth_color(
            self.oriented(depth),
            self.scheme,
            self.emphasize_deep,
            self.power,
        )
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 * (1.0 - t) + b as f64 * t).round().clamp(0.0, 255.0) as u8
}

fn lerp_rgb(a: [u8; 3], b: [u8; 3], t: f64) -> [u8; 3] {
    [
        lerp_channel(a[0], b[0], t),
        lerp_channel(a[1], b[1], t),
        lerp_channel(a[2], b[2], t),
    ]
}

/// Piecewise-linear interpolation through sorted stops
fn interpolate_stops(stops: &[ColorStop], t: f64) -> [u8; 3] {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return [NEUTRAL_GRAY.r, NEUTRAL_GRAY.g, NEUTRAL_GRAY.b],
    };
    if t <= first.value {
        return first.color;
    }
    if t >= last.value {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (lower, upper) = (&pair[0], &pair[1]);
        if t <= upper.value {
            let span = upper.value - lower.value;
            let local = if span > 0.0 {
                (t - lower.value) / span
            } else {
                0.0
            };
            return lerp_rgb(lower.color, upper.color, local);
        }
    }
    last.color
}

/// HSL (hue in degrees, s/l in `[0, 1]`) to 8-bit RGB
fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 3] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_u8(r1), to_u8(g1), to_u8(b1)]
}
