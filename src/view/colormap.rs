use serde::Deserialize;

/// Color scale used for the top-down height view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Viridis,
    Inferno,
    Terrain,
    Gray,
}

const VIRIDIS: &[[u8; 3]] = &[
    [68, 1, 84],
    [59, 82, 139],
    [33, 145, 140],
    [94, 201, 98],
    [253, 231, 37],
];

const INFERNO: &[[u8; 3]] = &[
    [0, 0, 4],
    [87, 16, 110],
    [188, 55, 84],
    [249, 142, 9],
    [252, 255, 164],
];

const TERRAIN: &[[u8; 3]] = &[
    [51, 51, 153],
    [0, 153, 255],
    [0, 204, 102],
    [255, 255, 153],
    [128, 92, 84],
    [255, 255, 255],
];

const GRAY: &[[u8; 3]] = &[[0, 0, 0], [255, 255, 255]];

impl Colormap {
    fn anchors(self) -> &'static [[u8; 3]] {
        match self {
            Self::Viridis => VIRIDIS,
            Self::Inferno => INFERNO,
            Self::Terrain => TERRAIN,
            Self::Gray => GRAY,
        }
    }

    /// Color at `t`, clamped to `[0, 1]`; NaN maps to the low end
    pub fn sample(self, t: f64) -> [u8; 3] {
        let anchors = self.anchors();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let pos = t * (anchors.len() - 1) as f64;
        let i = (pos.floor() as usize).min(anchors.len() - 2);
        let frac = pos - i as f64;

        let (a, b) = (anchors[i], anchors[i + 1]);
        [0, 1, 2].map(|c| {
            let (from, to) = (f64::from(a[c]), f64::from(b[c]));
            (from + (to - from) * frac).round() as u8
        })
    }
}
